//! API route definitions

use super::auth_handlers;
use super::book_handlers;
use super::handlers::{self, ApiState};
use super::stream_handlers;
use crate::auth::middleware::require_auth;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth", post(auth_handlers::create_user))
        .route("/auth/", post(auth_handlers::create_user))
        .route("/auth/token", post(auth_handlers::login_for_access_token));

    // Protected routes: bearer token required
    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::get_me))
        // ====================================================================
        // Books
        // ====================================================================
        .route(
            "/books",
            get(book_handlers::list_books).post(book_handlers::create_book),
        )
        .route(
            "/books/",
            get(book_handlers::list_books).post(book_handlers::create_book),
        )
        .route(
            "/books/{id}",
            get(book_handlers::get_book)
                .put(book_handlers::update_book)
                .delete(book_handlers::delete_book),
        )
        // ====================================================================
        // Change events (Server-Sent Events)
        // ====================================================================
        .route("/event/stream", get(stream_handlers::stream_events))
        .layer(from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
