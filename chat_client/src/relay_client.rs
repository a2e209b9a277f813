use std::fmt::Debug;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000";

#[derive(serde::Serialize, Debug)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ChatReply {
    pub message: String,
    pub timestamp: String,
}

#[derive(serde::Deserialize, Debug)]
struct ErrorReply {
    error: Option<String>,
}

/// Failure of one relay call. The `Display` text is what the transcript shows.
#[derive(Debug, thiserror::Error)]
pub enum RelayCallError {
    #[error("{0}")]
    Server(String),
    #[error("Cannot connect to server. Please ensure the backend is running.")]
    Unreachable,
    #[error("Failed to send message. Please try again.")]
    Failed(String),
}

#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    url: String,
}

impl Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("url", &self.url)
            .finish()
    }
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    pub async fn send(&self, message: &str) -> Result<ChatReply, RelayCallError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Relay call failed: {:?}", e);
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    RelayCallError::Unreachable
                } else {
                    RelayCallError::Failed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ChatReply>()
                .await
                .map_err(|e| RelayCallError::Failed(e.to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RelayCallError::Failed(e.to_string()))?;
        tracing::warn!("Relay answered {}: {}", status, body);
        match serde_json::from_str::<ErrorReply>(&body) {
            Ok(ErrorReply { error: Some(error) }) => Err(RelayCallError::Server(error)),
            _ => Err(RelayCallError::Failed(format!("HTTP {}", status))),
        }
    }
}
