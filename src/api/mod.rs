//! HTTP API for the books service

pub mod auth_handlers;
pub mod book_handlers;
pub mod handlers;
pub mod query;
pub mod routes;
pub mod stream_handlers;

pub use query::*;
pub use routes::create_router;
