//! Response metadata and status classification.

use reqwest::header::{HeaderMap, HeaderName, ETAG, LAST_MODIFIED, LINK};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{
    default_message, sanitize_url, ApiError, ErrorResponse, RateLimitError,
    SecondaryRateLimitError,
};
use crate::pagination::{parse_link_header, Links, PageToken};
use crate::rate::{retry_after, Rate};
use crate::transport::{HttpResponse, MAX_ERROR_BODY};
use crate::types::unsupported_type;
use crate::Error;

/// Metadata surfaced with every response: status, headers, page cursors and
/// rate-limit counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub pagination: Links,
    /// Rate counters for this call. `None` when the headers are absent.
    pub rate: Option<Rate>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl ResponseMeta {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let pagination = header(LINK)
            .map(|h| parse_link_header(&h))
            .unwrap_or_default();
        let etag = header(ETAG);
        let last_modified = header(LAST_MODIFIED);
        let rate = Rate::from_headers(&headers);
        Self {
            status,
            headers,
            pagination,
            rate,
            etag,
            last_modified,
        }
    }

    /// Cursor of the following page; `None` on the last page.
    pub fn next_page(&self) -> Option<PageToken> {
        self.pagination.next.clone()
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.next.is_some()
    }
}

/// A decoded body together with its [`ResponseMeta`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub body: T,
    pub meta: ResponseMeta,
}

impl<T> Response<T> {
    pub fn into_body(self) -> T {
        self.body
    }

    pub fn into_parts(self) -> (T, ResponseMeta) {
        (self.body, self.meta)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            body: f(self.body),
            meta: self.meta,
        }
    }
}

/// Outcome of a request carrying `If-None-Match` / `If-Modified-Since`.
#[derive(Debug, Clone)]
pub enum Conditional<T> {
    /// 304: the caller's cached copy is still current.
    NotModified(ResponseMeta),
    /// Fresh data, with a new ETag in `meta.etag` when the server sent one.
    Modified(Response<T>),
}

impl<T> Conditional<T> {
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Conditional::NotModified(_))
    }

    pub fn meta(&self) -> &ResponseMeta {
        match self {
            Conditional::NotModified(meta) => meta,
            Conditional::Modified(response) => &response.meta,
        }
    }

    /// Extract data if fetched, returning `None` if not modified.
    pub fn into_body(self) -> Option<T> {
        match self {
            Conditional::NotModified(_) => None,
            Conditional::Modified(response) => Some(response.body),
        }
    }
}

/// Splits a raw response into metadata and body, turning any non-2xx status
/// into a structured error.
pub(crate) fn check_response(
    method: &Method,
    url: &Url,
    response: HttpResponse,
) -> Result<(ResponseMeta, Vec<u8>), Error> {
    let meta = ResponseMeta::new(response.status, response.headers);
    if meta.status.is_success() {
        return Ok((meta, response.body?));
    }

    let body = match response.body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(
                "Failed to read error body for {} {}: {}",
                method,
                sanitize_url(url),
                e
            );
            Vec::new()
        }
    };
    let bounded = &body[..body.len().min(MAX_ERROR_BODY)];
    let envelope = match serde_json::from_slice::<ErrorResponse>(bounded) {
        Ok(envelope) => envelope,
        Err(e) => {
            if !bounded.is_empty() {
                tracing::debug!(
                    "Undecodable error body ({}): {}",
                    e,
                    truncate_body(&String::from_utf8_lossy(bounded))
                );
            }
            ErrorResponse::default()
        }
    };

    Err(classify(method, url, &meta, envelope))
}

fn classify(method: &Method, url: &Url, meta: &ResponseMeta, envelope: ErrorResponse) -> Error {
    let status = meta.status;
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(rate) = meta.rate.clone().filter(Rate::is_exhausted) {
            tracing::warn!(
                "Rate limit exhausted for {} {}, resets at {}",
                method,
                sanitize_url(url),
                rate.reset
            );
            return Error::RateLimited(Box::new(RateLimitError {
                method: method.clone(),
                url: sanitize_url(url),
                status,
                message: envelope.message.unwrap_or_else(|| default_message(status)),
                rate,
            }));
        }

        let retry_after = retry_after(&meta.headers);
        let secondary_docs = envelope.documentation_url.as_deref().is_some_and(|doc| {
            doc.contains("secondary-rate-limits") || doc.contains("abuse-rate-limits")
        });
        if retry_after.is_some() || secondary_docs {
            tracing::warn!(
                "Secondary rate limit for {} {} (retry after {:?})",
                method,
                sanitize_url(url),
                retry_after
            );
            return Error::SecondaryRateLimit(Box::new(SecondaryRateLimitError {
                method: method.clone(),
                url: sanitize_url(url),
                status,
                message: envelope.message.unwrap_or_else(|| default_message(status)),
                retry_after,
            }));
        }
    }

    let err = ApiError::new(method, url, status, envelope);
    tracing::debug!("Request failed: {}", err);
    Error::Api(Box::new(err))
}

/// Decodes a success body. An empty body decodes as JSON `null`, so callers
/// expecting no content can ask for `()` or `Option<_>`.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(bytes).map_err(|e| {
        if let Some(found) = unsupported_type(&e) {
            tracing::error!("Unsupported assignee type in body: {:?}", found);
            return Error::UnsupportedAssigneeType { found };
        }
        let snippet = truncate_body(&String::from_utf8_lossy(body));
        tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
        Error::Decode { source: e, snippet }
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
