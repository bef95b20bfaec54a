//! Query parameter structs for list endpoints

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Maximum page size for list endpoints
pub const MAX_LIMIT: usize = 100;

/// Helper to deserialize numbers from query string (which are always strings)
fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// Pagination parameters for `GET /books`
///
/// `page` is the number of records to skip, not a page index.
#[derive(Debug, Deserialize, Clone)]
pub struct PaginationParams {
    /// Items to skip (default: 0)
    #[serde(default, deserialize_with = "deserialize_from_str")]
    pub page: usize,
    /// Max items to return (default: 10, max: 100)
    #[serde(default = "default_limit", deserialize_with = "deserialize_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

fn deserialize_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map_err(D::Error::custom),
        _ => Ok(default_limit()),
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Validate pagination parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.limit > MAX_LIMIT {
            return Err(format!("limit cannot exceed {}", MAX_LIMIT));
        }
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.page
    }

    /// Limit capped at `MAX_LIMIT`
    pub fn limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}
