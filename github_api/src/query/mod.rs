mod common;
pub use self::common::{ListOptions, Query, SortDirection};

mod issue;
pub use self::issue::{IssueListOptions, IssueSort, IssueState};
