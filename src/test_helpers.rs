//! Test helper factories and mock state builders
#![allow(dead_code)]

use crate::api::handlers::{ApiState, ServerState};
use crate::auth::jwt::encode_jwt;
use crate::books::{Book, BookRequest};
use crate::{AuthConfig, Config};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";

/// Short wait window so disconnects are noticed quickly in tests
pub const TEST_STREAM_TIMEOUT: Duration = Duration::from_millis(50);

// ============================================================================
// Mock state builders
// ============================================================================

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_secs: 1800,
    }
}

/// Server state with empty in-memory stores and a fresh event channel
pub fn mock_server_state(auth_config: Option<AuthConfig>) -> ApiState {
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        stream_timeout: TEST_STREAM_TIMEOUT,
        auth_config,
    };
    let mut state = ServerState::from_config(&config);
    state.password_hash_cost = 4; // fast bcrypt in tests
    Arc::new(state)
}

/// `Authorization` header value for a token signed with `TEST_SECRET`
pub fn bearer(username: &str) -> String {
    let token = encode_jwt(username, TEST_SECRET, 1800).expect("encode test token");
    format!("Bearer {}", token)
}

pub async fn response_json(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json body")
}

// ============================================================================
// Model factories
// ============================================================================

pub fn book_request(title: &str) -> BookRequest {
    BookRequest {
        title: title.to_string(),
        author: "Test Author".to_string(),
        published_date: NaiveDate::from_ymd_opt(2001, 2, 3).unwrap(),
        summary: "A test book".to_string(),
        genre: "Fiction".to_string(),
    }
}

pub fn test_book(id: u64, title: &str) -> Book {
    Book::from_request(id, book_request(title))
}

pub fn book_json(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "author": "Test Author",
        "published_date": "2001-02-03",
        "summary": "A test book",
        "genre": "Fiction",
    })
}
