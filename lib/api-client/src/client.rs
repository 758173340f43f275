//! Request client implementations.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::{ApiRequest, Method, RequestBody, ResponseType};
use crate::response::ApiResponse;
use crate::scope::{MemoKey, RequestScope};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Executes outbound calls on behalf of one incoming request.
#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Sends `request`, memoizing it in `scope`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures (503), non-2xx responses
    /// (status and message from the remote body) and anything else (500).
    async fn send(&self, scope: &RequestScope, request: ApiRequest)
    -> Result<ApiResponse, ApiError>;
}

/// Shared HTTP transport behind both client implementations.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    default_timeout: Option<Duration>,
}

/// A call with its URL and credential resolved.
struct PreparedCall {
    method: Method,
    url: Url,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
    credential: Option<String>,
    timeout: Option<Duration>,
    response_type: ResponseType,
}

impl Transport {
    /// Creates a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                warn!(error = %e, "failed to create HTTP client");
                ApiError::internal()
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            default_timeout: config.timeout(),
        })
    }

    /// Returns the base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(
        skip(self, scope, request),
        fields(method = %request.method, endpoint = %request.endpoint)
    )]
    async fn execute(
        &self,
        scope: &RequestScope,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let base_url = request.base_url.as_deref().unwrap_or(&self.base_url);
        let url = resolve_url(base_url, &request.endpoint, &request.query)?;
        let credential = scope.credential_for(request.access_token);

        let call = PreparedCall {
            method: request.method,
            url,
            body: request.body,
            headers: request.headers,
            credential,
            timeout: request.timeout.or(self.default_timeout),
            response_type: request.response_type,
        };

        let body_key = match &call.body {
            Some(RequestBody::Multipart(_)) => {
                debug!("multipart call bypasses memoization");
                return self.dispatch(call).await;
            }
            Some(RequestBody::Json(value)) => Some(value.to_string()),
            None => None,
        };

        let key = MemoKey {
            method: call.method,
            url: call.url.to_string(),
            body: body_key,
            headers: MemoKey::normalize_headers(&call.headers),
            credential: call.credential.clone(),
            timeout: call.timeout,
            response_type: call.response_type,
        };

        scope
            .memoized(key, &request.tags, || self.dispatch(call))
            .await
    }

    async fn dispatch(&self, call: PreparedCall) -> Result<ApiResponse, ApiError> {
        let mut builder = self.http.request(call.method.to_reqwest(), call.url.clone());

        builder = match call.body {
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            Some(RequestBody::Json(value)) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            None => builder.header(CONTENT_TYPE, "application/json"),
        };

        for (name, value) in &call.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(token) = &call.credential {
            builder = builder.bearer_auth(token);
        }

        if let Some(timeout) = call.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, url = %call.url, "outbound call failed");
            ApiError::from_transport(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let error = ApiError::from_http_response(status, &body);
            warn!(
                status = error.status,
                code = ?error.code,
                url = %call.url,
                "remote service returned an error"
            );
            return Err(error);
        }

        debug!(status = %status, "outbound call succeeded");
        ApiResponse::read(response, call.response_type).await
    }
}

/// Joins `base` and `endpoint` with exactly one slash and appends `query`.
fn resolve_url(base: &str, endpoint: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );

    let mut url = Url::parse(&joined).map_err(|e| {
        warn!(error = %e, url = %joined, "invalid request URL");
        ApiError::internal()
    })?;

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Request client for server-side execution.
///
/// After a successful write (POST, PUT, PATCH, DELETE) every tag attached to
/// the call is invalidated in the scope.
#[derive(Debug, Clone)]
pub struct ServerRequestClient {
    transport: Transport,
}

impl ServerRequestClient {
    /// Creates a server-side client.
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

#[async_trait]
impl RequestClient for ServerRequestClient {
    async fn send(
        &self,
        scope: &RequestScope,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let tags = request.tags.clone();

        let response = self.transport.execute(scope, request).await?;

        if method.is_write() {
            for tag in &tags {
                let dropped = scope.invalidate_tag(tag).await;
                debug!(tag = %tag, dropped, "invalidated cache tag");
            }
        }

        Ok(response)
    }
}

/// Request client for client-rendering contexts. Cache tags are ignored.
#[derive(Debug, Clone)]
pub struct BrowserRequestClient {
    transport: Transport,
}

impl BrowserRequestClient {
    /// Creates a client-rendering client.
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RequestClient for BrowserRequestClient {
    async fn send(
        &self,
        scope: &RequestScope,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        self.transport.execute(scope, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Hits(Arc<AtomicUsize>);

    impl Hits {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    async fn spawn_remote(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        format!("http://{addr}/api")
    }

    async fn counted_users(State(hits): State<Hits>) -> Json<Value> {
        hits.0.fetch_add(1, Ordering::SeqCst);
        Json(json!([{"name": "alice"}]))
    }

    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(json!({"authorization": auth, "content_type": content_type}))
    }

    async fn echo_language(State(hits): State<Hits>, headers: HeaderMap) -> Json<Value> {
        hits.0.fetch_add(1, Ordering::SeqCst);
        let lang = headers
            .get("accept-language")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(json!({"lang": lang}))
    }

    async fn echo_content_type(State(hits): State<Hits>, headers: HeaderMap) -> String {
        hits.0.fetch_add(1, Ordering::SeqCst);
        headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn failing() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "bad", "code": "X"})),
        )
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_millis(500)).await;
        "late"
    }

    async fn remote(hits: Hits) -> String {
        let router = Router::new()
            .route("/api/users", get(counted_users).post(counted_users))
            .route("/api/echo", get(echo_auth))
            .route("/api/lang", get(echo_language))
            .route("/api/upload", post(echo_content_type))
            .route("/api/avatar", get(|| async { vec![0x89_u8, b'P', b'N', b'G', 0x00] }))
            .route("/api/fail", post(failing))
            .route("/api/slow", get(slow))
            .route("/api/plain", get(|| async { "pong" }))
            .with_state(hits);
        spawn_remote(router).await
    }

    fn server_client(base_url: &str) -> ServerRequestClient {
        ServerRequestClient::new(Transport::new(&ClientConfig::new(base_url)).expect("transport"))
    }

    fn browser_client(base_url: &str) -> BrowserRequestClient {
        BrowserRequestClient::new(Transport::new(&ClientConfig::new(base_url)).expect("transport"))
    }

    #[test]
    fn resolve_url_trims_duplicate_slashes() {
        let url = resolve_url("http://remote/api/", "/users", &[]).expect("url");
        assert_eq!(url.as_str(), "http://remote/api/users");

        let url = resolve_url("http://remote/api", "users", &[]).expect("url");
        assert_eq!(url.as_str(), "http://remote/api/users");
    }

    #[test]
    fn resolve_url_encodes_query() {
        let query = vec![("q".to_string(), "a b&c".to_string())];
        let url = resolve_url("http://remote/api", "/search", &query).expect("url");
        assert_eq!(url.query(), Some("q=a+b%26c"));
    }

    #[test]
    fn resolve_url_rejects_garbage_as_internal() {
        let err = resolve_url("not a url", "/x", &[]).expect_err("invalid");
        assert_eq!(err.status, 500);
    }

    #[tokio::test]
    async fn identical_calls_in_one_scope_hit_the_network_once() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        let first = client
            .send(&scope, ApiRequest::get("/users"))
            .await
            .expect("first call");
        let second = client
            .send(&scope, ApiRequest::get("users"))
            .await
            .expect("second call");

        assert_eq!(first, second);
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_calls_share_one_network_call() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        let (a, b) = tokio::join!(
            client.send(&scope, ApiRequest::get("/users")),
            client.send(&scope, ApiRequest::get("/users")),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn separate_scopes_do_not_share_results() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);

        for _ in 0..2 {
            let scope = RequestScope::new();
            client
                .send(&scope, ApiRequest::get("/users"))
                .await
                .expect("call");
        }

        assert_eq!(hits.count(), 2);
    }

    #[tokio::test]
    async fn different_parameters_are_different_calls() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        client
            .send(&scope, ApiRequest::get("/users").query("page", 1))
            .await
            .expect("page 1");
        client
            .send(&scope, ApiRequest::get("/users").query("page", 2))
            .await
            .expect("page 2");

        assert_eq!(hits.count(), 2);
    }

    #[tokio::test]
    async fn headers_are_part_of_call_identity() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        let pt: Value = client
            .send(&scope, ApiRequest::get("/lang").header("Accept-Language", "pt-BR"))
            .await
            .expect("pt-BR")
            .json()
            .expect("json");
        let en: Value = client
            .send(&scope, ApiRequest::get("/lang").header("Accept-Language", "en-US"))
            .await
            .expect("en-US")
            .json()
            .expect("json");

        assert_eq!(pt["lang"], "pt-BR");
        assert_eq!(en["lang"], "en-US");
        assert_eq!(hits.count(), 2);

        client
            .send(&scope, ApiRequest::get("/lang").header("accept-language", "en-US"))
            .await
            .expect("memoized en-US");
        assert_eq!(hits.count(), 2);
    }

    #[tokio::test]
    async fn timed_out_call_does_not_poison_an_untimed_one() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        client
            .send(&scope, ApiRequest::get("/users").timeout_ms(5_000))
            .await
            .expect("with timeout");
        client
            .send(&scope, ApiRequest::get("/users"))
            .await
            .expect("without timeout");

        assert_eq!(hits.count(), 2);
        assert_eq!(scope.memoized_calls().await, 2);
    }

    #[tokio::test]
    async fn multipart_leaves_content_type_to_the_transport() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let form = reqwest::multipart::Form::new().text("name", "avatar.png");
        let body = client
            .send(
                &RequestScope::new(),
                ApiRequest::post("/upload")
                    .multipart(form)
                    .response_type(ResponseType::Text),
            )
            .await
            .expect("upload")
            .into_text()
            .expect("text");

        assert!(
            body.starts_with("multipart/form-data; boundary="),
            "unexpected content type: {body}"
        );
    }

    #[tokio::test]
    async fn multipart_calls_are_never_memoized() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = browser_client(&base);
        let scope = RequestScope::new();

        for _ in 0..2 {
            let form = reqwest::multipart::Form::new().text("name", "avatar.png");
            client
                .send(
                    &scope,
                    ApiRequest::post("/upload")
                        .multipart(form)
                        .response_type(ResponseType::Text),
                )
                .await
                .expect("upload");
        }

        assert_eq!(hits.count(), 2);
        assert_eq!(scope.memoized_calls().await, 0);
    }

    #[tokio::test]
    async fn blob_response_type_reads_raw_bytes() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let body = client
            .send(
                &RequestScope::new(),
                ApiRequest::get("/avatar").response_type(ResponseType::Blob),
            )
            .await
            .expect("blob");

        assert_eq!(body.into_blob(), Some(vec![0x89, b'P', b'N', b'G', 0x00]));
    }

    #[tokio::test]
    async fn non_success_response_is_normalized() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let err = client
            .send(&RequestScope::new(), ApiRequest::post("/fail").json(json!({})))
            .await
            .expect_err("422");

        assert_eq!(err, ApiError::new(422, "bad").with_code("X"));
    }

    #[tokio::test]
    async fn missing_route_falls_back_to_reason_phrase() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let err = client
            .send(&RequestScope::new(), ApiRequest::get("/missing"))
            .await
            .expect_err("404");

        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Not Found");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = server_client(&format!("http://{addr}/api"));
        let err = client
            .send(&RequestScope::new(), ApiRequest::get("/users"))
            .await
            .expect_err("refused");

        assert_eq!(err.status, 503);
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn timeout_aborts_the_call() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let err = client
            .send(&RequestScope::new(), ApiRequest::get("/slow").timeout_ms(50))
            .await
            .expect_err("timeout");

        assert_eq!(err.status, 503);
        assert_eq!(err.code.as_deref(), Some("TIMEOUT"));
    }

    #[tokio::test]
    async fn ambient_credential_is_attached_as_bearer() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);
        let scope = RequestScope::with_credentials(|| Some("cookie-token".to_string()));

        let echoed: Value = client
            .send(&scope, ApiRequest::get("/echo"))
            .await
            .expect("echo")
            .json()
            .expect("json");

        assert_eq!(echoed["authorization"], "Bearer cookie-token");
        assert_eq!(echoed["content_type"], "application/json");
    }

    #[tokio::test]
    async fn explicit_credential_overrides_ambient() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);
        let scope = RequestScope::with_credentials(|| Some("cookie-token".to_string()));

        let echoed: Value = client
            .send(&scope, ApiRequest::get("/echo").access_token("explicit"))
            .await
            .expect("echo")
            .json()
            .expect("json");

        assert_eq!(echoed["authorization"], "Bearer explicit");
    }

    #[tokio::test]
    async fn no_credential_means_no_authorization_header() {
        let base = remote(Hits::default()).await;
        let client = server_client(&base);

        let echoed: Value = client
            .send(&RequestScope::new(), ApiRequest::get("/echo"))
            .await
            .expect("echo")
            .json()
            .expect("json");

        assert!(echoed["authorization"].is_null());
    }

    #[tokio::test]
    async fn text_response_type_reads_plain_body() {
        let base = remote(Hits::default()).await;
        let client = browser_client(&base);

        let body = client
            .send(
                &RequestScope::new(),
                ApiRequest::get("/plain").response_type(ResponseType::Text),
            )
            .await
            .expect("text");

        assert_eq!(body.into_text().as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn server_client_invalidates_tags_after_writes() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client(&base);
        let scope = RequestScope::new();

        client
            .send(&scope, ApiRequest::get("/users").tag("users"))
            .await
            .expect("read");
        client
            .send(&scope, ApiRequest::get("/users").tag("users"))
            .await
            .expect("memoized read");
        assert_eq!(hits.count(), 1);

        client
            .send(
                &scope,
                ApiRequest::post("/users")
                    .json(json!({"name": "bob"}))
                    .tag("users"),
            )
            .await
            .expect("write");
        assert_eq!(hits.count(), 2);

        client
            .send(&scope, ApiRequest::get("/users").tag("users"))
            .await
            .expect("fresh read");
        assert_eq!(hits.count(), 3);
    }

    #[tokio::test]
    async fn browser_client_never_invalidates() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = browser_client(&base);
        let scope = RequestScope::new();

        client
            .send(&scope, ApiRequest::get("/users").tag("users"))
            .await
            .expect("read");
        client
            .send(
                &scope,
                ApiRequest::post("/users")
                    .json(json!({"name": "bob"}))
                    .tag("users"),
            )
            .await
            .expect("write");
        client
            .send(&scope, ApiRequest::get("/users").tag("users"))
            .await
            .expect("memoized read");

        assert_eq!(hits.count(), 2);
    }

    #[tokio::test]
    async fn base_url_can_be_overridden_per_call() {
        let hits = Hits::default();
        let base = remote(hits.clone()).await;
        let client = server_client("http://127.0.0.1:9/unused");

        client
            .send(&RequestScope::new(), ApiRequest::get("/users").base_url(base))
            .await
            .expect("override");

        assert_eq!(hits.count(), 1);
    }
}
