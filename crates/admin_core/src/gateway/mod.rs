//! The single HTTP access point of the console.
//!
//! Every request carries the session's bearer token and the configured
//! timeout. Non-2xx statuses and `success: false` envelopes are folded into
//! [`GatewayError`] so callers only ever see `Result<T, GatewayError>`.
use std::time::Duration;

use api_types::{ApiResponse, ErrorBody};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::Session;

mod endpoints;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid or expired token")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("Server error")]
    Server { status: u16 },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Server is not available. Please check your connection.")]
    Unavailable(#[source] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("{0}")]
    Rejected(String),
    #[error("Response did not contain any data")]
    MissingData,
    #[error("Unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid base url: {0}")]
    InvalidUrl(String),
}

/// Coarse classification used by views to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Server,
    Client,
    Unavailable,
    Timeout,
    Rejected,
    Decode,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
            Self::Status { .. } | Self::InvalidUrl(_) => ErrorKind::Client,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Timeout => ErrorKind::Timeout,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::MissingData | Self::Decode(_) => ErrorKind::Decode,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Unavailable(err)
        }
    }

    fn from_status(status: StatusCode, body: &[u8]) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            code if code >= 500 => Self::Server { status: code },
            code => {
                let message = serde_json::from_slice::<ErrorBody>(body)
                    .ok()
                    .and_then(|body| body.error.or(body.message))
                    .unwrap_or_else(|| {
                        format!(
                            "HTTP {code}: {}",
                            status.canonical_reason().unwrap_or("Unknown Status")
                        )
                    });
                Self::Status {
                    status: code,
                    message,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    base_url: Url,
    http: reqwest::Client,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| GatewayError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::Unavailable)?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/{segments..}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        session: &Session,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, GatewayError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!(%method, %url, "gateway request");
        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = session.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let res = builder
            .send()
            .await
            .map_err(GatewayError::from_transport)?;
        let status = res.status();
        let body = res.bytes().await.map_err(GatewayError::from_transport)?;

        if !status.is_success() {
            let err = GatewayError::from_status(status, &body);
            warn!(status = status.as_u16(), error = %err, "gateway request failed");
            return Err(err);
        }
        debug!(status = status.as_u16(), bytes = body.len(), "gateway response");
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends a request and unwraps the response envelope.
    async fn envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, GatewayError> {
        let envelope: ApiResponse<T> = self.execute(builder).await?;
        if !envelope.success {
            let message = envelope
                .failure_text()
                .unwrap_or("Request failed")
                .to_string();
            warn!(%message, "gateway request rejected");
            return Err(GatewayError::Rejected(message));
        }
        Ok(envelope.data)
    }

    async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, GatewayError> {
        self.envelope(builder).await?.ok_or(GatewayError::MissingData)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Vec<T>, GatewayError> {
        Ok(self.envelope(builder).await?.unwrap_or_default())
    }

    async fn unit(&self, builder: RequestBuilder) -> Result<(), GatewayError> {
        self.envelope::<serde_json::Value>(builder).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_fixed_messages() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            (StatusCode::FORBIDDEN, "Access denied"),
            (StatusCode::NOT_FOUND, "Resource not found"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
            (StatusCode::BAD_GATEWAY, "Server error"),
        ];
        for (status, expected) in cases {
            let err = GatewayError::from_status(status, br#"{"error":"ignored"}"#);
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn other_statuses_prefer_server_message() {
        let err = GatewayError::from_status(
            StatusCode::BAD_REQUEST,
            br#"{"success":false,"error":"Username already exists"}"#,
        );
        assert_eq!(err.to_string(), "Username already exists");
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn other_statuses_without_body_use_reason_phrase() {
        let err = GatewayError::from_status(StatusCode::CONFLICT, b"not json");
        assert_eq!(err.to_string(), "HTTP 409: Conflict");
    }

    #[test]
    fn url_joins_api_prefix() {
        let gateway = Gateway::new(&GatewayConfig {
            base_url: "http://localhost:5000/".to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap();
        assert_eq!(
            gateway.url(&["shops", "abc", "status"]).unwrap().as_str(),
            "http://localhost:5000/api/shops/abc/status"
        );
    }

    #[test]
    fn ids_cannot_escape_their_path_segment() {
        let gateway = Gateway::new(&GatewayConfig::default()).unwrap();
        assert_eq!(
            gateway.url(&["users", "a/b?c#d"]).unwrap().as_str(),
            "http://localhost:5000/api/users/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let gateway = Gateway::new(&GatewayConfig {
            base_url: "https://ops.example.com/bingo/".to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap();
        assert_eq!(
            gateway.url(&["auth", "login"]).unwrap().as_str(),
            "https://ops.example.com/bingo/api/auth/login"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Gateway::new(&GatewayConfig {
            base_url: "not a url".to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl(_)));
    }
}
