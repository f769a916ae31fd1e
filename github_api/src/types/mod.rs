mod meta;
pub use self::meta::SearchResults;

mod users;
pub use self::users::{AccountID, Assignee, Organization, Team, User};
pub(crate) use self::users::unsupported_type;

mod seats;
pub use self::seats::{SeatAssignment, SeatsPage};

mod issue;
pub use self::issue::{Issue, IssueRequest, Label};
