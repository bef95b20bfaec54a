//! Books API
//!
//! A CRUD API for book records with:
//! - JWT bearer authentication over password accounts
//! - A best-effort change event queue fed by every successful mutation
//! - A Server-Sent Events stream draining that queue

pub mod api;
pub mod auth;
pub mod books;
pub mod events;
pub mod users;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub events: EventsYamlConfig,
    /// Auth section. If absent, auth_config is None (deny-by-default)
    pub auth: Option<AuthConfig>,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// Event stream configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsYamlConfig {
    /// How long one stream pop waits before an idle tick
    pub stream_timeout_secs: u64,
}

impl Default for EventsYamlConfig {
    fn default() -> Self {
        Self {
            stream_timeout_secs: events::DEFAULT_STREAM_TIMEOUT.as_secs(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret (HS256)
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 1800 = 30 min)
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
}

/// Upper bound for `events.stream_timeout_secs` (one day)
pub const MAX_STREAM_TIMEOUT_SECS: u64 = 86_400;

fn default_jwt_expiry() -> u64 {
    1800 // 30 minutes
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub stream_timeout: Duration,
    /// None means deny-by-default (no auth section in YAML)
    pub auth_config: Option<AuthConfig>,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` in CWD
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let stream_timeout_secs = match std::env::var("BOOKS_STREAM_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .with_context(|| format!("Invalid BOOKS_STREAM_TIMEOUT_SECS: {}", s))?,
            Err(_) => yaml.events.stream_timeout_secs,
        };
        if stream_timeout_secs == 0 {
            bail!("events.stream_timeout_secs must be greater than 0");
        }
        if stream_timeout_secs > MAX_STREAM_TIMEOUT_SECS {
            bail!(
                "events.stream_timeout_secs must be at most {} (got {})",
                MAX_STREAM_TIMEOUT_SECS,
                stream_timeout_secs
            );
        }

        // BOOKS_JWT_SECRET overrides the YAML secret, or enables auth on its own
        let auth_config = match (yaml.auth, std::env::var("BOOKS_JWT_SECRET").ok()) {
            (Some(mut auth), Some(secret)) => {
                auth.jwt_secret = secret;
                Some(auth)
            }
            (None, Some(secret)) => Some(AuthConfig {
                jwt_secret: secret,
                jwt_expiry_secs: default_jwt_expiry(),
            }),
            (auth, None) => auth,
        };

        Ok(Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or(yaml.server.host),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            stream_timeout: Duration::from_secs(stream_timeout_secs),
            auth_config,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Start the HTTP server and run until Ctrl-C / SIGTERM.
///
/// On shutdown, open event streams are cancelled first so the graceful
/// shutdown does not wait on them, then the event channel is closed.
pub async fn start_server(config: Config) -> Result<()> {
    if config.auth_config.is_none() {
        tracing::warn!("No auth section configured: protected routes will answer 403");
    }

    let state = Arc::new(api::handlers::ServerState::from_config(&config));
    let app = api::create_router(state.clone());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        stream_timeout = ?config.stream_timeout,
        "Books API listening on http://{}",
        addr
    );

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    state.events.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
