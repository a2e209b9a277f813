pub mod config;
pub mod error;
pub mod routes;

pub use config::{Config, Mode};
pub use error::RelayError;
pub use routes::{build_router, AppState};

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub message: String,
    pub timestamp: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

#[derive(serde::Serialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            message: "Server is running",
        }
    }
}
