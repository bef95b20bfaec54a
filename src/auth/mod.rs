//! Authentication: password login and JWT bearer tokens
//!
//! Provides:
//! - JWT token encoding/decoding (`jwt` submodule)
//! - Bearer token middleware for protected routes (`middleware` submodule)
//! - `AuthUser` handler extractor (`extractor` submodule)

pub mod extractor;
pub mod jwt;
pub mod middleware;
