//! Remote Assistant Implementation
//!
//! HTTP client for the knowledge-assistant service.
//!
//! # Assistant API
//!
//! One endpoint: `POST {base}/ask` with a JSON body
//! `{"query": "...", "variables": {}}` and a bearer credential. The reply
//! is `{"answer": "...", "url": ["...", ...]}`; either field may be
//! missing and the caller decides how to degrade.
//!
//! The client deliberately sets no request timeout: a question stays
//! outstanding until the service answers or the connection drops.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::traits::{AskError, AskReply, AssistantBackend};

/// HTTP client for the assistant service
#[derive(Clone)]
pub struct RemoteAssistant {
    /// Base URL without the trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl RemoteAssistant {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client: reqwest::Client::new(),
        }
    }

    /// Get the ask endpoint URL
    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

#[async_trait]
impl AssistantBackend for RemoteAssistant {
    fn endpoint(&self) -> String {
        self.base_url.clone()
    }

    async fn ask(&self, query: &str, credential: &str) -> Result<AskReply, AskError> {
        let body = serde_json::json!({
            "query": query,
            "variables": {},
        });

        let response = self
            .http_client
            .post(self.ask_url())
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AskError::AuthRejected);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Assistant endpoint error");
            return Err(AskError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        Ok(parse_reply(&data))
    }
}

/// Extract the answer and link list from a reply document.
///
/// Missing or mistyped fields degrade to absence instead of erroring; the
/// chat flow substitutes its fallback text for an absent answer.
fn parse_reply(data: &serde_json::Value) -> AskReply {
    let answer = data
        .get("answer")
        .and_then(|a| a.as_str())
        .map(String::from);

    let links = data
        .get("url")
        .and_then(|u| u.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    AskReply { answer, links }
}
