//! Per-call request descriptor.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, IF_MODIFIED_SINCE, IF_NONE_MATCH,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::sanitize_url;
use crate::transport::HttpRequest;
use crate::Error;

/// A request built by [`Client::new_request`](crate::Client::new_request).
///
/// Standard headers are already attached; callers may add conditional or
/// media-type headers before dispatching it.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) deadline: Option<Duration>,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The encoded JSON payload, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decodes the encoded payload back into `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.body.as_deref().map(serde_json::from_slice)
    }

    /// Sets (or replaces) a header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replaces the default `Accept` media type (e.g. for preview or raw formats).
    pub fn accept(self, media_type: &str) -> Result<Self, Error> {
        self.header(ACCEPT.as_str(), media_type)
    }

    /// Makes the request conditional on the entity tag having changed.
    pub fn if_none_match(self, etag: &str) -> Result<Self, Error> {
        self.header(IF_NONE_MATCH.as_str(), etag)
    }

    /// Makes the request conditional on the resource changing after `since`.
    pub fn if_modified_since(self, since: DateTime<Utc>) -> Result<Self, Error> {
        let value = since.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        self.header(IF_MODIFIED_SINCE.as_str(), &value)
    }

    /// Fails the call with [`Error::DeadlineExceeded`] if it takes longer than `timeout`.
    pub fn deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(timeout);
        self
    }

    /// URL with credentials redacted, for logs and error messages.
    pub fn sanitized_url(&self) -> String {
        sanitize_url(&self.url)
    }

    pub(crate) fn to_http(&self) -> HttpRequest {
        HttpRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
