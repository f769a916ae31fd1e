//! HTTP transport abstraction for pluggable backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::errors::TransportError;

/// Bodies of non-2xx responses are read up to this many bytes.
pub const MAX_ERROR_BODY: usize = 1024 * 1024;

/// A fully-qualified request handed to an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A raw response returned by an [`HttpTransport`].
///
/// A failure while reading the body is kept separate from a failure to send,
/// so the status of an error response survives a truncated body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Result<Vec<u8>, TransportError>,
}

impl HttpResponse {
    /// A response with the given status, no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Ok(Vec::new()),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Ok(body.into());
        self
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }
}

/// Transport boundary for all HTTP I/O.
///
/// Implementations must be cancel-safe: the client drops the returned future
/// when the caller's cancellation token fires.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// An [`HttpTransport`] backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client })
    }

    /// Create a transport from an existing [`reqwest::Client`].
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = if status.is_success() {
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(map_reqwest_error)
        } else {
            read_bounded(response, MAX_ERROR_BODY).await
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Reads at most `limit` bytes of the body, then drops the connection.
async fn read_bounded(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            tracing::debug!("Error body exceeds {} bytes; rest discarded", limit);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetch(server: &MockServer, route: &str) -> HttpResponse {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(10)).unwrap();
        let url = Url::parse(&format!("{}/{}", server.uri(), route)).unwrap();
        transport
            .send(HttpRequest {
                method: Method::GET,
                url,
                headers: HeaderMap::new(),
                body: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn error_bodies_are_read_up_to_the_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge-error"))
            .respond_with(ResponseTemplate::new(500).set_body_bytes(vec![b'x'; 3 * MAX_ERROR_BODY]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/small-error"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"Not Found\"}"))
            .mount(&server)
            .await;

        let response = fetch(&server, "huge-error").await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.unwrap().len(), MAX_ERROR_BODY);

        let response = fetch(&server, "small-error").await;
        assert_eq!(response.body.unwrap(), b"{\"message\":\"Not Found\"}".to_vec());
    }

    #[tokio::test]
    async fn success_bodies_are_not_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 2 * MAX_ERROR_BODY]))
            .mount(&server)
            .await;

        let response = fetch(&server, "archive").await;
        assert_eq!(response.body.unwrap().len(), 2 * MAX_ERROR_BODY);
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
pub(crate) use self::mock::MockTransport;
