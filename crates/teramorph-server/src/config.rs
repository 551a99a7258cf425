//! Server configuration for `Teramorph`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `TERAMORPH_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Where contact rows are stored.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Idle lifetime of a session in seconds.
    pub session_ttl_secs: i64,
    /// Number of sessions kept before expired ones are swept.
    pub max_sessions: usize,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Countdown target shown on the landing page (RFC 3339).
    pub launch_at: String,
    /// Site name shown above the headline.
    pub site_name: String,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// CSV file in a private directory resolved from the public root.
    Csv {
        public_root: PathBuf,
        dir_name: String,
        file_name: String,
    },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            storage_backend: StorageBackendType::Csv {
                public_root: PathBuf::from("."),
                dir_name: "private".to_owned(),
                file_name: "contacts.csv".to_owned(),
            },
            log_level: "info".to_owned(),
            session_ttl_secs: 1440,
            max_sessions: 10_000,
            cookie_secure: false,
            max_body_bytes: 64 * 1024,
            launch_at: "2025-09-25T00:00:00-06:00".to_owned(),
            site_name: "teramorphosis.com".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, binds to `0.0.0.0`
    /// - `TERAMORPH_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8080`)
    /// - `TERAMORPH_STORAGE`: `csv` or `memory` (default: `csv`)
    /// - `TERAMORPH_PUBLIC_ROOT`: public-serving root the private directory is resolved from (default: `.`)
    /// - `TERAMORPH_PRIVATE_DIR`: private directory name (default: `private`)
    /// - `TERAMORPH_CSV_FILE`: CSV file name (default: `contacts.csv`)
    /// - `TERAMORPH_LOG_LEVEL`: log filter (default: `info`)
    /// - `TERAMORPH_SESSION_TTL`: idle session lifetime in seconds (default: `1440`)
    /// - `TERAMORPH_MAX_SESSIONS`: session registry capacity (default: `10000`)
    /// - `TERAMORPH_COOKIE_SECURE`: mark the session cookie `Secure` (default: `false`)
    /// - `TERAMORPH_MAX_BODY`: request body limit in bytes (default: `65536`)
    /// - `TERAMORPH_LAUNCH_AT`: countdown target (default: `2025-09-25T00:00:00-06:00`)
    /// - `TERAMORPH_SITE_NAME`: site name on the page (default: `teramorphosis.com`)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Priority: TERAMORPH_BIND_ADDR > PORT > default 127.0.0.1:8080
        let bind_addr = if let Ok(addr) = std::env::var("TERAMORPH_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8080);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            defaults.bind_addr
        };

        let storage_backend = match std::env::var("TERAMORPH_STORAGE")
            .unwrap_or_else(|_| "csv".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendType::Memory,
            _ => StorageBackendType::Csv {
                public_root: std::env::var("TERAMORPH_PUBLIC_ROOT")
                    .map_or_else(|_| PathBuf::from("."), PathBuf::from),
                dir_name: std::env::var("TERAMORPH_PRIVATE_DIR")
                    .unwrap_or_else(|_| "private".to_owned()),
                file_name: std::env::var("TERAMORPH_CSV_FILE")
                    .unwrap_or_else(|_| "contacts.csv".to_owned()),
            },
        };

        let log_level = std::env::var("TERAMORPH_LOG_LEVEL").unwrap_or(defaults.log_level);

        let session_ttl_secs = std::env::var("TERAMORPH_SESSION_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &i64| *secs > 0)
            .unwrap_or(defaults.session_ttl_secs);

        let max_sessions = std::env::var("TERAMORPH_MAX_SESSIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_sessions);

        let cookie_secure = std::env::var("TERAMORPH_COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.cookie_secure);

        let max_body_bytes = std::env::var("TERAMORPH_MAX_BODY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let launch_at = std::env::var("TERAMORPH_LAUNCH_AT").unwrap_or(defaults.launch_at);
        let site_name = std::env::var("TERAMORPH_SITE_NAME").unwrap_or(defaults.site_name);

        Self {
            bind_addr,
            storage_backend,
            log_level,
            session_ttl_secs,
            max_sessions,
            cookie_secure,
            max_body_bytes,
            launch_at,
            site_name,
        }
    }
}
