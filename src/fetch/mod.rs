//! GraphQL-over-HTTP transport.
//!
//! Posts queries to the start.gg GraphQL endpoint with bearer authentication
//! and unwraps the `{data, errors}` envelope. Nothing is cached or retried;
//! every failure is returned to the caller as a [`FetchError`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Broad classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or non-success HTTP status
    Transport,
    /// Successful HTTP exchange whose payload reports an error or is malformed
    Protocol,
}

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("GraphQL response returned neither data nor errors")]
    NoData,

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Http(_) | FetchError::HttpStatus { .. } | FetchError::Io(_) => {
                ErrorKind::Transport
            }
            FetchError::GraphQl(_) | FetchError::NoData | FetchError::Decode(_) => {
                ErrorKind::Protocol
            }
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_protocol(&self) -> bool {
        self.kind() == ErrorKind::Protocol
    }
}

/// Configuration for the GraphQL client.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// GraphQL endpoint
    pub api_url: Url,

    /// Bearer token; a missing token is only noticed when the service rejects a request
    pub auth_token: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            auth_token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("stage-analytics/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Default start.gg GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.start.gg/gql/alpha";

/// Request body sent to the GraphQL endpoint.
#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorMessage>>,
}

/// Unwrap a GraphQL response body into its `data`.
///
/// A non-empty `errors` list wins over any partial `data`.
pub fn parse_graphql_body<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)?;

    match (response.data, response.errors) {
        (_, Some(errors)) if !errors.is_empty() => Err(FetchError::GraphQl(
            errors.into_iter().map(|e| e.message).collect(),
        )),
        (Some(data), _) => Ok(data),
        (None, _) => Err(FetchError::NoData),
    }
}

/// Map a non-success status to a transport error.
fn status_error(status: StatusCode) -> FetchError {
    FetchError::HttpStatus {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// GraphQL client for the tournament-data service.
pub struct GraphqlClient {
    client: Client,
    config: FetcherConfig,
}

impl GraphqlClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("stage-analytics/0.1.0")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Run a query and deserialize its `data` into `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, FetchError> {
        debug!("POST {} variables={}", self.config.api_url, variables);

        let mut request = self
            .client
            .post(self.config.api_url.as_str())
            .json(&GraphqlRequest { query, variables });

        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.text().await?;
        parse_graphql_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::http::header::AUTHORIZATION;
    use axum::http::HeaderMap as AxumHeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Viewer {
        name: String,
    }

    #[test]
    fn test_parse_data() {
        let body = r#"{"data": {"name": "ok"}}"#;
        let viewer: Viewer = parse_graphql_body(body).unwrap();
        assert_eq!(viewer.name, "ok");
    }

    #[test]
    fn test_parse_errors_are_protocol_errors() {
        let body = r#"{"data": null, "errors": [{"message": "Invalid query"}, {"message": "Second"}]}"#;
        let err = parse_graphql_body::<Viewer>(body).unwrap_err();

        assert!(err.is_protocol());
        assert_eq!(err.to_string(), "GraphQL error: Invalid query; Second");
    }

    #[test]
    fn test_parse_errors_win_over_partial_data() {
        let body = r#"{"data": {"name": "partial"}, "errors": [{"message": "Rate limited"}]}"#;
        let err = parse_graphql_body::<Viewer>(body).unwrap_err();
        assert!(matches!(err, FetchError::GraphQl(ref msgs) if msgs == &["Rate limited"]));
    }

    #[test]
    fn test_parse_empty_errors_list_is_ignored() {
        let body = r#"{"data": {"name": "ok"}, "errors": []}"#;
        assert!(parse_graphql_body::<Viewer>(body).is_ok());
    }

    #[test]
    fn test_parse_no_data_no_errors() {
        let err = parse_graphql_body::<Viewer>(r#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, FetchError::NoData));
        assert!(err.is_protocol());
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_graphql_body::<Viewer>("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_status_error_is_transport() {
        let err = status_error(StatusCode::UNAUTHORIZED);
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert!(config.auth_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("stage-analytics/"));
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(GraphqlClient::new(FetcherConfig::default()).is_ok());
    }

    /// Local GraphQL stand-in. `/ok` records the Authorization header it saw.
    async fn spawn_endpoint(seen_auth: Arc<Mutex<Vec<Option<String>>>>) -> SocketAddr {
        let app = Router::new()
            .route(
                "/unauthorized",
                post(|| async { axum::http::StatusCode::UNAUTHORIZED }),
            )
            .route(
                "/errors",
                post(|| async {
                    Json(json!({"data": null, "errors": [{"message": "Invalid token"}]}))
                }),
            )
            .route(
                "/ok",
                post(move |headers: AxumHeaderMap| {
                    let seen_auth = seen_auth.clone();
                    async move {
                        let auth = headers
                            .get(AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen_auth.lock().unwrap().push(auth);
                        Json(json!({"data": {"name": "ok"}}))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr, path: &str, token: Option<&str>) -> GraphqlClient {
        GraphqlClient::new(FetcherConfig {
            api_url: Url::parse(&format!("http://{}{}", addr, path)).unwrap(),
            auth_token: token.map(str::to_string),
            timeout: Duration::from_secs(5),
            ..FetcherConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_rejected_status_is_transport_error() {
        let addr = spawn_endpoint(Arc::default()).await;

        let err = client_for(addr, "/unauthorized", Some("bad-token"))
            .query::<Viewer>("{ viewer { name } }", json!({}))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(matches!(err, FetchError::HttpStatus { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_query_graphql_errors_are_protocol_errors() {
        let addr = spawn_endpoint(Arc::default()).await;

        let err = client_for(addr, "/errors", Some("token"))
            .query::<Viewer>("{ viewer { name } }", json!({}))
            .await
            .unwrap_err();

        assert!(err.is_protocol());
        assert_eq!(err.to_string(), "GraphQL error: Invalid token");
    }

    #[tokio::test]
    async fn test_query_sends_bearer_only_with_token() {
        let seen_auth: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let addr = spawn_endpoint(seen_auth.clone()).await;

        let viewer: Viewer = client_for(addr, "/ok", Some("secret"))
            .query("{ viewer { name } }", json!({"page": 1}))
            .await
            .unwrap();
        assert_eq!(viewer.name, "ok");

        client_for(addr, "/ok", None)
            .query::<Viewer>("{ viewer { name } }", json!({}))
            .await
            .unwrap();

        assert_eq!(
            *seen_auth.lock().unwrap(),
            vec![Some("Bearer secret".to_string()), None]
        );
    }
}
