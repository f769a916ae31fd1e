//! Error types for the API client.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::rate::Rate;

/// Errors that can occur when building, sending, or decoding API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A path argument cannot be used as a URL path segment.
    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidPathSegment {
        segment: String,
        reason: &'static str,
    },
    /// The resolved URL could not be parsed.
    #[error("invalid URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The configured base URL is unusable (e.g. no trailing slash).
    #[error("invalid base URL {0:?}: must be an absolute URL ending in '/'")]
    InvalidBaseUrl(String),
    /// A caller-supplied header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// The request body could not be encoded as JSON.
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
    /// The request never produced an HTTP response.
    #[error("transport error")]
    Transport(#[from] TransportError),
    /// The caller's cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,
    /// The per-request deadline elapsed before the call completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    /// The API answered with a non-success status.
    #[error("{0}")]
    Api(Box<ApiError>),
    /// The primary rate limit is exhausted.
    #[error("{0}")]
    RateLimited(Box<RateLimitError>),
    /// The API applied a secondary (abuse) rate limit.
    #[error("{0}")]
    SecondaryRateLimit(Box<SecondaryRateLimitError>),
    /// A success body did not match the expected shape.
    #[error("failed to decode response body: {snippet}")]
    Decode {
        #[source]
        source: serde_json::Error,
        snippet: String,
    },
    /// A polymorphic assignee carried a missing or unknown `type` discriminator.
    #[error("unsupported assignee type: {}", found.as_deref().unwrap_or("<missing>"))]
    UnsupportedAssigneeType { found: Option<String> },
    /// Writing a raw response body to the caller's writer failed.
    #[error("failed to write response body")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status of the response that caused this error, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(e) => Some(e.status),
            Error::RateLimited(e) => Some(e.status),
            Error::SecondaryRateLimit(e) => Some(e.status),
            _ => None,
        }
    }

    /// True when the request never reached the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// True for caller-initiated cancellation or an elapsed deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Field-level validation causes, empty for anything but [`Error::Api`].
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Api(e) => &e.errors,
            _ => &[],
        }
    }
}

/// Failures raised by an [`HttpTransport`](crate::HttpTransport) implementation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

/// A non-success response decoded from the API's error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub method: Method,
    /// Request URL with credentials redacted.
    pub url: String,
    pub status: StatusCode,
    pub message: String,
    pub documentation_url: Option<String>,
    pub errors: Vec<FieldError>,
}

impl ApiError {
    pub(crate) fn new(method: &Method, url: &Url, status: StatusCode, envelope: ErrorResponse) -> Self {
        let message = envelope.message.unwrap_or_else(|| default_message(status));
        Self {
            method: method.clone(),
            url: sanitize_url(url),
            status,
            message,
            documentation_url: envelope.documentation_url,
            errors: envelope.errors,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message
        )?;
        if !self.errors.is_empty() {
            let causes: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", causes.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// The primary rate limit was exhausted (`X-RateLimit-Remaining: 0`).
#[derive(Debug)]
pub struct RateLimitError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub message: String,
    pub rate: Rate,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {} [rate reset at {}]",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message,
            self.rate.reset.to_rfc3339()
        )
    }
}

impl std::error::Error for RateLimitError {}

/// A secondary rate limit; callers should wait `retry_after` before retrying.
#[derive(Debug)]
pub struct SecondaryRateLimitError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl fmt::Display for SecondaryRateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message
        )?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " [retry after {}s]", retry_after.as_secs())?;
        }
        Ok(())
    }
}

impl std::error::Error for SecondaryRateLimitError {}

/// Wire shape of an error body.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// A single validation failure reported alongside a 4xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub resource: String,
    pub field: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldError {
    pub fn new(resource: &str, field: &str, code: &str) -> Self {
        Self {
            resource: resource.to_string(),
            field: field.to_string(),
            code: code.to_string(),
            message: None,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.resource.is_empty()) {
            (Some(message), true) => write!(f, "{}", message),
            (Some(message), false) => write!(
                f,
                "{}.{} {}: {}",
                self.resource, self.field, self.code, message
            ),
            (None, _) => write!(f, "{}.{} {}", self.resource, self.field, self.code),
        }
    }
}

// Some endpoints report errors as plain strings instead of objects.
impl<'de> Deserialize<'de> for FieldError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Message(String),
            Detail {
                #[serde(default)]
                resource: String,
                #[serde(default)]
                field: String,
                #[serde(default)]
                code: String,
                message: Option<String>,
            },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Message(message) => FieldError {
                message: Some(message),
                ..FieldError::default()
            },
            Wire::Detail {
                resource,
                field,
                code,
                message,
            } => FieldError {
                resource,
                field,
                code,
                message,
            },
        })
    }
}

pub(crate) fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Renders a URL with credential-bearing query parameters redacted.
pub fn sanitize_url(url: &Url) -> String {
    const SECRET_KEYS: [&str; 2] = ["client_secret", "access_token"];

    if !url
        .query_pairs()
        .any(|(k, _)| SECRET_KEYS.contains(&k.as_ref()))
    {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_KEYS.contains(&k.as_ref()) {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_accepts_object_and_string_forms() {
        let body = r#"{
            "message": "Validation Failed",
            "errors": [
                {"resource": "Issue", "field": "title", "code": "missing_field"},
                "title is too long"
            ]
        }"#;
        let resp: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.errors.len(), 2);
        assert_eq!(resp.errors[0], FieldError::new("Issue", "title", "missing_field"));
        assert_eq!(resp.errors[1].message.as_deref(), Some("title is too long"));
        assert!(resp.errors[1].resource.is_empty());
    }

    #[test]
    fn api_error_display_includes_method_url_and_status() {
        let url = Url::parse("https://api.github.com/repos/o/r/issues").unwrap();
        let envelope = ErrorResponse {
            message: Some("bad".to_string()),
            documentation_url: None,
            errors: vec![FieldError::new("Issue", "title", "missing_field")],
        };
        let err = ApiError::new(&Method::POST, &url, StatusCode::BAD_REQUEST, envelope);
        assert_eq!(
            err.to_string(),
            "POST https://api.github.com/repos/o/r/issues: 400 bad [Issue.title missing_field]"
        );
    }

    #[test]
    fn api_error_falls_back_to_reason_phrase() {
        let url = Url::parse("https://api.github.com/user").unwrap();
        let err = ApiError::new(
            &Method::GET,
            &url,
            StatusCode::BAD_GATEWAY,
            ErrorResponse::default(),
        );
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn sanitize_url_redacts_secrets_only() {
        let url =
            Url::parse("https://api.github.com/applications?client_id=abc&client_secret=shh")
                .unwrap();
        assert_eq!(
            sanitize_url(&url),
            "https://api.github.com/applications?client_id=abc&client_secret=REDACTED"
        );

        let plain = Url::parse("https://api.github.com/user?page=2").unwrap();
        assert_eq!(sanitize_url(&plain), "https://api.github.com/user?page=2");
    }

    #[test]
    fn status_is_only_reported_for_server_errors() {
        assert!(Error::Cancelled.status().is_none());
        assert!(Error::Transport(TransportError::Timeout).is_transport());
        assert!(Error::DeadlineExceeded.is_cancelled());
    }
}
