use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::instrument;

use crate::{ChatRequest, ChatResponse, Config, HealthResponse, RelayError};

const PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    provider: Option<gemini_client::Client>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let provider = config.api_key.as_deref().map(|key| {
            gemini_client::Client::new(key, &config.model, &config.gemini_base_url)
        });
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let expose_details = state.config.is_development();
    let app = Router::new()
        .route("/health", get(health_handler).fallback(not_found_handler))
        .route("/api/chat", post(chat_handler).fallback(not_found_handler))
        .fallback(not_found_handler)
        .with_state(state);
    with_layers(app, expose_details)
}

fn with_layers(app: Router, expose_details: bool) -> Router {
    app.layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
        panic_response(panic, expose_details)
    }))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Unhandled error: {}", message);
    RelayError::InternalError {
        details: expose_details.then_some(message),
    }
    .into_response()
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn not_found_handler() -> RelayError {
    RelayError::NotFound
}

#[instrument(skip_all, fields(message_chars, reply_chars))]
async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let span = tracing::Span::current();

    let provider = state.provider.as_ref().ok_or_else(|| {
        tracing::error!("Chat request rejected: no provider credential configured");
        RelayError::Misconfigured
    })?;
    let request = parse_request(body, state.config.is_development())?;

    span.record("message_chars", request.message.chars().count());
    tracing::info!("Received message: {}", request.message);

    let text = provider
        .generate_content(&request.message)
        .await
        .map_err(|e| {
            tracing::error!("Error generating response: {:?}", e);
            RelayError::from_provider(&e, state.config.is_development())
        })?;

    span.record("reply_chars", text.chars().count());
    tracing::info!("Generated response: {}...", preview(&text, PREVIEW_CHARS));

    Ok(Json(ChatResponse {
        message: text,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Accepts only a JSON object whose `message` is a string with visible content.
/// The message is kept untrimmed. A body that could not be read at all
/// (e.g. over the size limit) is an internal error, not invalid input.
fn parse_request(
    body: Result<Json<serde_json::Value>, JsonRejection>,
    expose_details: bool,
) -> Result<ChatRequest, RelayError> {
    let Json(value) = body.map_err(|rejection| {
        tracing::warn!("Rejected chat body: {}", rejection.body_text());
        match rejection {
            JsonRejection::JsonSyntaxError(_)
            | JsonRejection::JsonDataError(_)
            | JsonRejection::MissingJsonContentType(_) => RelayError::InvalidInput,
            other => RelayError::InternalError {
                details: expose_details.then(|| other.body_text()),
            },
        }
    })?;
    let request: ChatRequest =
        serde_json::from_value(value).map_err(|_| RelayError::InvalidInput)?;
    if request.message.trim().is_empty() {
        return Err(RelayError::InvalidInput);
    }
    Ok(request)
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
