//! Shared API state, error type and health check

use crate::books::{BookManager, InMemoryBookStore};
use crate::events::EventChannel;
use crate::users::{InMemoryUserStore, UserStore, PASSWORD_HASH_COST};
use crate::{AuthConfig, Config};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shared server state
pub struct ServerState {
    pub books: Arc<BookManager>,
    pub users: Arc<dyn UserStore>,
    /// Change events queued by `books`, drained by the event stream
    pub events: Arc<EventChannel>,
    /// None means deny-by-default
    pub auth_config: Option<AuthConfig>,
    /// Wait window of a single stream pop
    pub stream_timeout: Duration,
    /// Cancelled at shutdown; event streams run on child tokens
    pub shutdown: CancellationToken,
    /// bcrypt cost for new accounts
    pub password_hash_cost: u32,
}

/// Shared API state
pub type ApiState = Arc<ServerState>;

impl ServerState {
    /// Build state with in-memory stores and a fresh event channel
    pub fn from_config(config: &Config) -> Self {
        let events = Arc::new(EventChannel::new());
        let books = Arc::new(BookManager::new(
            Arc::new(InMemoryBookStore::new()),
            events.clone(),
        ));

        Self {
            books,
            users: Arc::new(InMemoryUserStore::new()),
            events,
            auth_config: config.auth_config.clone(),
            stream_timeout: config.stream_timeout,
            shutdown: CancellationToken::new(),
            password_hash_cost: PASSWORD_HASH_COST,
        }
    }
}

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether an event stream is currently attached
    pub streaming: bool,
}

pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        streaming: state.events.is_streaming(),
    })
}

// ============================================================================
// Error handling
// ============================================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
