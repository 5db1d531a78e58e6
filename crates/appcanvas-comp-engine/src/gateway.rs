//! HTTP transport collaborator.
//!
//! The core never inspects response bodies to decide success: any status
//! >= 400 is a failure. Connection-level problems surface as
//! [`TransportError`]; HTTP error statuses are returned in-band so callers
//! can apply their own policy (the OAuth wizard stays on its current step,
//! the plugin runner rejects the action).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::TransportError;

/// A decoded HTTP response: status code plus the body parsed as JSON when
/// possible, or wrapped as a JSON string otherwise.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub data: Value,
}

impl HttpResponse {
    /// Whether the status indicates a client or server error.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Narrow async HTTP surface consumed by the core.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

/// Default gateway backed by a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestGateway {
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    async fn decode(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidBody {
                message: e.to_string(),
            })?;
        // Try JSON first; non-JSON bodies come back as a plain string.
        let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(HttpResponse { status, data })
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                message: e.to_string(),
            })?;
        Self::decode(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                message: e.to_string(),
            })?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_parses_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let gateway = ReqwestGateway::new();
        let resp = gateway.get(&format!("{}/data", server.uri())).await.unwrap();
        assert_eq!(resp.status, 200);
        assert!(!resp.is_error());
        assert_eq!(resp.data, json!({"ok": true}));
    }

    #[tokio::test]
    async fn non_json_body_becomes_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let gateway = ReqwestGateway::new();
        let resp = gateway.get(&format!("{}/text", server.uri())).await.unwrap();
        assert_eq!(resp.data, json!("hello"));
    }

    #[tokio::test]
    async fn error_status_is_returned_in_band() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gateway = ReqwestGateway::new();
        let resp = gateway
            .get(&format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
        assert!(resp.is_error());
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_json(json!({"x": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saved": true})))
            .mount(&server)
            .await;

        let gateway = ReqwestGateway::new();
        let resp = gateway
            .post(&format!("{}/submit", server.uri()), &json!({"x": 1}))
            .await
            .unwrap();
        assert_eq!(resp.data, json!({"saved": true}));
    }
}
