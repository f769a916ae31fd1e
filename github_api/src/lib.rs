//! Typed async client for the GitHub REST API.
//!
//! Every call takes a [`CancellationToken`] and returns the decoded body
//! together with [`ResponseMeta`] (status, headers, page cursors and rate
//! counters). List endpoints can be walked lazily with a [`Pager`].

mod client;
mod errors;
mod pagination;
mod path;
mod query;
mod rate;
mod request;
mod response;
mod transport;
pub mod types;
mod user_agent;

pub use self::client::{Client, ClientBuilder};
pub use self::errors::{
    sanitize_url, ApiError, Error, ErrorResponse, FieldError, RateLimitError,
    SecondaryRateLimitError, TransportError,
};
pub use self::pagination::{parse_link_header, Links, Page, PageToken, Pager};
pub use self::path::{escape_segment, expand_path};
pub use self::query::{IssueListOptions, IssueSort, IssueState, ListOptions, Query, SortDirection};
pub use self::rate::{Rate, RateLimits, RateResources};
pub use self::request::Request;
pub use self::response::{Conditional, Response, ResponseMeta};
pub use self::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, MAX_ERROR_BODY};
pub use tokio_util::sync::CancellationToken;
