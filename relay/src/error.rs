use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid message. Please provide a non-empty message.")]
    InvalidInput,
    #[error("Invalid API key. Please check your Gemini API key configuration.")]
    Unauthorized,
    #[error("Gemini API key not configured. Please set GEMINI_API_KEY environment variable.")]
    Misconfigured,
    #[error("Failed to generate response. Please try again later.")]
    ProviderError { details: Option<String> },
    #[error("Endpoint not found")]
    NotFound,
    #[error("Internal server error")]
    InternalError { details: Option<String> },
}

impl RelayError {
    /// Classifies a provider failure by its description. `details` is only
    /// kept when `expose_details` is set.
    pub fn from_provider(err: &gemini_client::Error, expose_details: bool) -> Self {
        let description = err.to_string();
        if description.contains("API key") {
            return Self::Unauthorized;
        }
        Self::ProviderError {
            details: expose_details.then_some(description),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Misconfigured | Self::ProviderError { .. } | Self::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::ProviderError { details } | Self::InternalError { details } => details.clone(),
            _ => None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(message: &str) -> gemini_client::Error {
        gemini_client::Error::Api {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn api_key_description_is_unauthorized() {
        let err = RelayError::from_provider(&api_error("API key not valid."), true);
        assert!(matches!(err, RelayError::Unauthorized));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn other_failures_keep_details_only_when_asked() {
        let err = RelayError::from_provider(&api_error("model is overloaded"), true);
        assert_eq!(err.details().as_deref(), Some("model is overloaded"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = RelayError::from_provider(&api_error("model is overloaded"), false);
        assert_eq!(err.details(), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let err = RelayError::from_provider(&api_error("bad api key"), false);
        assert!(matches!(err, RelayError::ProviderError { .. }));
    }
}
