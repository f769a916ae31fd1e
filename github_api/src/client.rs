//! HTTP client for the GitHub REST API.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    pagination::{Page, Pager},
    path::expand_path,
    query::{IssueListOptions, ListOptions, Query},
    rate::RateLimits,
    request::Request,
    response::{check_response, decode_json, Conditional, Response, ResponseMeta},
    transport::{HttpResponse, HttpTransport, ReqwestTransport},
    types::{Issue, SeatsPage, User},
    user_agent::default_user_agent,
    Error,
};

const DEFAULT_BASE_URL: &str = "https://api.github.com/";
const DEFAULT_API_VERSION: &str = "2022-11-28";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MEDIA_TYPE_JSON: &str = "application/vnd.github+json";
const HEADER_API_VERSION: &str = "x-github-api-version";

/// HTTP client for the GitHub REST API.
///
/// Cheap to clone and safe to share across tasks: configuration is fixed at
/// build time and no call mutates client state. Every call takes a
/// [`CancellationToken`]; cancelling it aborts the in-flight request.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Always ends in `/` so relative paths append instead of replacing.
    base_url: Url,
    user_agent: HeaderValue,
    api_version: HeaderValue,
    authorization: Option<HeaderValue>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("user_agent", &self.inner.user_agent)
            .field("authenticated", &self.inner.authorization.is_some())
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    base_url: String,
    user_agent: String,
    api_version: String,
    token: Option<String>,
    timeout: Duration,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }
}

impl ClientBuilder {
    /// Reads `GITHUB_TOKEN` and `GITHUB_API_URL` from the environment.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                builder.token = Some(token.trim().to_string());
            }
        }
        if let Ok(base_url) = std::env::var("GITHUB_API_URL") {
            if !base_url.trim().is_empty() {
                builder.base_url = base_url.trim().to_string();
            }
        }
        builder
    }

    /// API root, e.g. `https://ghe.example.com/api/v3/`. A missing trailing
    /// slash is added.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Value of the `X-GitHub-Api-Version` header.
    pub fn api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Timeout for the default reqwest transport. Ignored when a custom
    /// transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|_| Error::InvalidBaseUrl(self.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(self.base_url));
        }

        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| Error::InvalidHeader(format!("user-agent: {}", e)))?;
        let api_version = HeaderValue::from_str(&self.api_version)
            .map_err(|e| Error::InvalidHeader(format!("{}: {}", HEADER_API_VERSION, e)))?;
        let authorization = match self.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| Error::InvalidHeader("authorization: invalid token".to_string()))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(self.timeout)?),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url,
                user_agent,
                api_version,
                authorization,
                transport,
            }),
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates an unauthenticated client pointing at the public API.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::builder().base_url(base_url).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Builds a request for `path`, resolved against the base URL.
    ///
    /// `body`, when present, is encoded as JSON.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        self.build_request(method, url, body)
    }

    /// Like [`Client::new_request`], appending the query string of `query`.
    /// `None` leaves the URL untouched.
    pub fn new_request_with_query<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Request, Error>
    where
        Q: Query,
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let url = match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        };
        self.build_request(method, url, body)
    }

    fn resolve(&self, path: &str) -> Result<Url, Error> {
        let base = &self.inner.base_url;
        if !base.path().ends_with('/') {
            return Err(Error::InvalidBaseUrl(base.to_string()));
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|source| {
                tracing::error!("Invalid URL constructed from {:?}: {}", path, source);
                Error::InvalidUrl {
                    url: path.to_string(),
                    source,
                }
            })
    }

    fn build_request<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.inner.user_agent.clone());
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE_JSON));
        headers.insert(HEADER_API_VERSION, self.inner.api_version.clone());
        if let Some(authorization) = &self.inner.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }

        let body = match body {
            Some(body) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Some(serde_json::to_vec(body).map_err(Error::Encode)?)
            }
            None => None,
        };

        Ok(Request {
            method,
            url,
            headers,
            body,
            deadline: None,
        })
    }

    /// Sends the request through the transport, racing it against the
    /// cancellation token and the request deadline.
    async fn send(&self, cancel: &CancellationToken, request: &Request) -> Result<HttpResponse, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tracing::debug!("{} {}", request.method, request.sanitized_url());

        let deadline = async {
            match request.deadline {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Cancelled {} {}", request.method, request.sanitized_url());
                return Err(Error::Cancelled);
            }
            _ = deadline => {
                tracing::debug!("Deadline exceeded for {} {}", request.method, request.sanitized_url());
                return Err(Error::DeadlineExceeded);
            }
            result = self.inner.transport.send(request.to_http()) => result?,
        };

        tracing::debug!(
            "{} {} -> {}",
            request.method,
            request.sanitized_url(),
            response.status
        );
        Ok(response)
    }

    /// Send + status check; returns metadata and the raw success body.
    async fn round_trip(
        &self,
        cancel: &CancellationToken,
        request: &Request,
    ) -> Result<(ResponseMeta, Vec<u8>), Error> {
        let response = self.send(cancel, request).await?;
        let (meta, body) = check_response(&request.method, &request.url, response)?;
        if let Some(rate) = &meta.rate {
            tracing::debug!("Rate limit: {}/{} remaining", rate.remaining, rate.limit);
        }
        Ok((meta, body))
    }

    /// Sends the request and decodes the JSON body into `T`.
    ///
    /// An empty body (e.g. 204) decodes as JSON `null`; use `()` or
    /// `Option<_>` for endpoints that return no content.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<Response<T>, Error> {
        let (meta, body) = self.round_trip(cancel, &request).await?;
        let body = decode_json(&body)?;
        Ok(Response { body, meta })
    }

    /// Sends the request and decodes the JSON body into `dest`. An empty body
    /// leaves `dest` untouched.
    pub async fn execute_into<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        request: Request,
        dest: &mut T,
    ) -> Result<ResponseMeta, Error> {
        let (meta, body) = self.round_trip(cancel, &request).await?;
        if !body.iter().all(u8::is_ascii_whitespace) {
            *dest = decode_json(&body)?;
        }
        Ok(meta)
    }

    /// Sends the request and copies the raw success body into `writer`
    /// without JSON decoding.
    pub async fn download<W: Write + ?Sized>(
        &self,
        cancel: &CancellationToken,
        request: Request,
        writer: &mut W,
    ) -> Result<ResponseMeta, Error> {
        let (meta, body) = self.round_trip(cancel, &request).await?;
        writer.write_all(&body)?;
        writer.flush()?;
        Ok(meta)
    }

    /// For endpoints that answer yes/no through the status code: 204 is
    /// `true`, 404 is `false`, anything else non-2xx is an error.
    pub async fn execute_bool(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<(bool, ResponseMeta), Error> {
        let response = self.send(cancel, &request).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Ok((false, ResponseMeta::new(response.status, response.headers)));
        }
        let (meta, _) = check_response(&request.method, &request.url, response)?;
        Ok((true, meta))
    }

    /// Sends a conditional request; a 304 yields [`Conditional::NotModified`].
    pub async fn execute_conditional<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<Conditional<T>, Error> {
        let response = self.send(cancel, &request).await?;
        if response.status == StatusCode::NOT_MODIFIED {
            return Ok(Conditional::NotModified(ResponseMeta::new(
                response.status,
                response.headers,
            )));
        }
        let (meta, body) = check_response(&request.method, &request.url, response)?;
        let body = decode_json(&body)?;
        Ok(Conditional::Modified(Response { body, meta }))
    }

    /// Returns a [`Pager`] over every page of the list endpoint at `path`.
    ///
    /// Without `options` the defaults of `Q` are used.
    pub fn paginate<P, Q>(&self, cancel: &CancellationToken, path: &str, options: Option<Q>) -> Pager<P, Q>
    where
        P: Page + DeserializeOwned,
        Q: Query,
    {
        Pager::new(
            self.clone(),
            cancel.clone(),
            path.to_string(),
            options.unwrap_or_default(),
        )
    }

    /// Fetches a user by login.
    pub async fn get_user(&self, cancel: &CancellationToken, login: &str) -> Result<Response<User>, Error> {
        let path = expand_path("users/{}", &[login])?;
        let request = self.new_request(Method::GET, &path, None::<&()>)?;
        self.execute(cancel, request).await
    }

    /// Fetches one page of a repository's issues.
    pub async fn list_repo_issues(
        &self,
        cancel: &CancellationToken,
        owner: &str,
        repo: &str,
        options: Option<&IssueListOptions>,
    ) -> Result<Response<Vec<Issue>>, Error> {
        let path = expand_path("repos/{}/{}/issues", &[owner, repo])?;
        let request = self.new_request_with_query(Method::GET, &path, options, None::<&()>)?;
        self.execute(cancel, request).await
    }

    /// Walks every page of a repository's issues.
    pub fn repo_issues(
        &self,
        cancel: &CancellationToken,
        owner: &str,
        repo: &str,
        options: Option<IssueListOptions>,
    ) -> Result<Pager<Vec<Issue>, IssueListOptions>, Error> {
        let path = expand_path("repos/{}/{}/issues", &[owner, repo])?;
        Ok(self.paginate(cancel, &path, options))
    }

    /// Whether the authenticated user has starred `owner/repo`.
    pub async fn is_starred(
        &self,
        cancel: &CancellationToken,
        owner: &str,
        repo: &str,
    ) -> Result<(bool, ResponseMeta), Error> {
        let path = expand_path("user/starred/{}/{}", &[owner, repo])?;
        let request = self.new_request(Method::GET, &path, None::<&()>)?;
        self.execute_bool(cancel, request).await
    }

    /// Walks every seat assignment of an organization's Copilot subscription.
    pub fn copilot_seats(
        &self,
        cancel: &CancellationToken,
        org: &str,
        options: Option<ListOptions>,
    ) -> Result<Pager<SeatsPage, ListOptions>, Error> {
        let path = expand_path("orgs/{}/copilot/billing/seats", &[org])?;
        Ok(self.paginate(cancel, &path, options))
    }

    /// Writes a repository tarball at `git_ref` into `writer`. The archive is
    /// held in memory until the transfer completes.
    pub async fn download_tarball<W: Write + ?Sized>(
        &self,
        cancel: &CancellationToken,
        owner: &str,
        repo: &str,
        git_ref: &str,
        writer: &mut W,
    ) -> Result<ResponseMeta, Error> {
        let path = expand_path("repos/{}/{}/tarball/{}", &[owner, repo, git_ref])?;
        let request = self.new_request(Method::GET, &path, None::<&()>)?;
        self.download(cancel, request, writer).await
    }

    /// Current rate-limit status. This call does not count against the limit.
    pub async fn rate_limits(&self, cancel: &CancellationToken) -> Result<Response<RateLimits>, Error> {
        let request = self.new_request(Method::GET, "rate_limit", None::<&()>)?;
        self.execute(cancel, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FieldError, TransportError};
    use crate::transport::MockTransport;
    use crate::types::{Assignee, IssueRequest};

    fn client(mock: &MockTransport) -> Client {
        Client::builder()
            .user_agent("test-agent")
            .transport(Arc::new(mock.clone()))
            .build()
            .unwrap()
    }

    #[test]
    fn new_request_resolves_against_base_url() {
        let client = Client::builder()
            .base_url("https://ghe.example.com/api/v3")
            .build()
            .unwrap();
        let request = client
            .new_request(Method::GET, "repos/o/r", None::<&()>)
            .unwrap();
        assert_eq!(request.url().as_str(), "https://ghe.example.com/api/v3/repos/o/r");

        let request = client
            .new_request(Method::GET, "/user", None::<&()>)
            .unwrap();
        assert_eq!(request.url().as_str(), "https://ghe.example.com/api/v3/user");
    }

    #[test]
    fn new_request_attaches_standard_headers() {
        let client = Client::builder()
            .user_agent("my-app/1.0")
            .token("secret")
            .build()
            .unwrap();
        let request = client
            .new_request(Method::GET, "user", None::<&()>)
            .unwrap()
            .if_none_match("\"etag\"")
            .unwrap();
        let headers = request.headers();
        assert_eq!(headers[USER_AGENT], "my-app/1.0");
        assert_eq!(headers[ACCEPT], MEDIA_TYPE_JSON);
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[HEADER_API_VERSION], DEFAULT_API_VERSION);
        assert_eq!(headers["if-none-match"], "\"etag\"");
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(!format!("{:?}", client).contains("secret"));
    }

    #[test]
    fn body_round_trips_through_request() {
        let client = Client::new().unwrap();
        let issue = IssueRequest {
            title: "Crash on start".to_string(),
            body: Some("stack trace".to_string()),
            labels: vec!["bug".to_string()],
            assignees: Vec::new(),
        };
        let request = client
            .new_request(Method::POST, "repos/o/r/issues", Some(&issue))
            .unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let decoded: IssueRequest = request.json_body().unwrap().unwrap();
        assert_eq!(decoded, issue);
    }

    #[test]
    fn query_options_only_add_set_fields() {
        let client = Client::new().unwrap();
        let request = client
            .new_request_with_query(
                Method::GET,
                "repos/o/r/issues",
                Some(&IssueListOptions::default()),
                None::<&()>,
            )
            .unwrap();
        assert_eq!(request.url().query(), None);

        let request = client
            .new_request_with_query(Method::GET, "repos/o/r/issues", None::<&ListOptions>, None::<&()>)
            .unwrap();
        assert_eq!(request.url().query(), None);
    }

    #[tokio::test]
    async fn execute_is_deterministic() {
        let mock = MockTransport::new();
        for _ in 0..2 {
            mock.push_response(
                HttpResponse::new(StatusCode::OK)
                    .with_body(r#"{"id": 1, "login": "octocat"}"#)
                    .with_header("x-ratelimit-limit", "5000")
                    .with_header("x-ratelimit-remaining", "4999")
                    .with_header("x-ratelimit-reset", "1700000000"),
            );
        }
        let client = client(&mock);
        let cancel = CancellationToken::new();
        let request = client.new_request(Method::GET, "users/octocat", None::<&()>).unwrap();

        let first: Response<User> = client.execute(&cancel, request.clone()).await.unwrap();
        let second: Response<User> = client.execute(&cancel, request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.body.login, "octocat");
        assert_eq!(first.meta.rate.as_ref().unwrap().remaining, 4999);
    }

    #[tokio::test]
    async fn no_content_leaves_destination_untouched() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::new(StatusCode::NO_CONTENT));
        let client = client(&mock);
        let request = client.new_request(Method::PUT, "user/starred/o/r", None::<&()>).unwrap();

        let mut dest = vec![7u32];
        let meta = client
            .execute_into(&CancellationToken::new(), request, &mut dest)
            .await
            .unwrap();
        assert_eq!(meta.status, StatusCode::NO_CONTENT);
        assert_eq!(dest, vec![7]);
    }

    #[tokio::test]
    async fn bool_outcome_maps_404_to_false() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::new(StatusCode::NO_CONTENT));
        mock.push_response(HttpResponse::new(StatusCode::NOT_FOUND).with_body(r#"{"message":"Not Found"}"#));
        mock.push_response(HttpResponse::new(StatusCode::UNAUTHORIZED).with_body(r#"{"message":"Requires authentication"}"#));
        let client = client(&mock);
        let cancel = CancellationToken::new();

        let (starred, _) = client.is_starred(&cancel, "o", "r").await.unwrap();
        assert!(starred);
        let (starred, meta) = client.is_starred(&cancel, "o", "r").await.unwrap();
        assert!(!starred);
        assert_eq!(meta.status, StatusCode::NOT_FOUND);
        let err = client.is_starred(&cancel, "o", "r").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn transport_errors_are_not_api_errors() {
        let mock = MockTransport::new();
        mock.push_error(TransportError::Connect("connection refused".to_string()));
        let client = client(&mock);
        let err = client
            .get_user(&CancellationToken::new(), "octocat")
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn structured_errors_keep_field_causes() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::new(StatusCode::BAD_REQUEST).with_body(
            r#"{"message":"bad","errors":[{"resource":"Issue","field":"title","code":"missing_field"}]}"#,
        ));
        let client = client(&mock);
        let request = client
            .new_request(Method::POST, "repos/o/r/issues", Some(&IssueRequest::default()))
            .unwrap();
        let err = client
            .execute::<Issue>(&CancellationToken::new(), request)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad"));
        assert!(message.contains("POST https://api.github.com/repos/o/r/issues: 400"));
        assert_eq!(err.field_errors(), &[FieldError::new("Issue", "title", "missing_field")]);
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_transport() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client.get_user(&cancel, "octocat").await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let mock = MockTransport::new();
        mock.push_hang();
        let client = client(&mock);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.get_user(&cancel, "octocat"),
        )
        .await
        .expect("cancellation should end the call promptly");
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_surfaces_as_deadline_exceeded() {
        let mock = MockTransport::new();
        mock.push_hang();
        let client = client(&mock);
        let request = client
            .new_request(Method::GET, "users/octocat", None::<&()>)
            .unwrap()
            .deadline(Duration::from_secs(10));
        let err = client
            .execute::<User>(&CancellationToken::new(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn not_modified_is_not_an_error() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::new(StatusCode::NOT_MODIFIED).with_header("etag", "\"v1\""));
        let client = client(&mock);
        let request = client
            .new_request(Method::GET, "users/octocat", None::<&()>)
            .unwrap()
            .if_none_match("\"v1\"")
            .unwrap();
        let result: Conditional<User> = client
            .execute_conditional(&CancellationToken::new(), request)
            .await
            .unwrap();
        assert!(result.is_not_modified());
        assert_eq!(result.meta().etag.as_deref(), Some("\"v1\""));
        assert_eq!(
            mock.requests()[0].headers["if-none-match"],
            "\"v1\""
        );
    }

    #[tokio::test]
    async fn download_writes_raw_bytes() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::new(StatusCode::OK).with_body(vec![0x1f, 0x8b, 0x00, 0xff]));
        let client = client(&mock);
        let mut sink = Vec::new();
        client
            .download_tarball(&CancellationToken::new(), "o", "r", "main", &mut sink)
            .await
            .unwrap();
        assert_eq!(sink, vec![0x1f, 0x8b, 0x00, 0xff]);
        assert_eq!(mock.requests()[0].url.path(), "/repos/o/r/tarball/main");
    }

    #[tokio::test]
    async fn copilot_seats_walk_envelope_pages() {
        let mock = MockTransport::new();
        mock.push_response(
            HttpResponse::new(StatusCode::OK)
                .with_body(r#"{"total_seats": 2, "seats": [{"assignee": {"type": "User", "id": 1, "login": "a"}}]}"#)
                .with_header(
                    "link",
                    "<https://api.github.com/orgs/acme/copilot/billing/seats?page=2>; rel=\"next\"",
                ),
        );
        mock.push_response(HttpResponse::new(StatusCode::OK).with_body(
            r#"{"total_seats": 2, "seats": [{"assignee": {"type": "Team", "id": 5}}]}"#,
        ));
        let client = client(&mock);
        let seats = client
            .copilot_seats(&CancellationToken::new(), "acme", None)
            .unwrap()
            .collect_all()
            .await
            .unwrap();
        assert_eq!(seats.len(), 2);
        assert!(matches!(seats[1].assignee, Assignee::Team(_)));
    }

    #[test]
    fn bad_path_arguments_fail_before_io() {
        let client = Client::new().unwrap();
        assert!(matches!(
            client.repo_issues(&CancellationToken::new(), "..", "r", None),
            Err(Error::InvalidPathSegment { .. })
        ));
    }
}
