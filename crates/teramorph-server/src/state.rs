//! Shared application state for `Teramorph` server.
//!
//! A single [`AppState`] is built at startup and shared across all Axum
//! handlers via `Arc`. It owns the contact pipeline, the session registry
//! and the settings the handlers need to shape responses.

use std::sync::Arc;

use teramorph_core::clock::Clock;
use teramorph_core::csrf::TokenSource;
use teramorph_core::service::ContactService;
use teramorph_core::session::SessionRegistry;
use teramorph_storage::ContactStore;

use crate::config::ServerConfig;
use crate::page::PageSettings;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Validates and persists submissions.
    pub contact: ContactService,
    /// Session id to CSRF token map.
    pub sessions: SessionRegistry,
    /// Values rendered into the landing page.
    pub page: PageSettings,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Session cookie `Max-Age`.
    pub session_ttl_secs: i64,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Wire the state from configuration and its collaborators.
    #[must_use]
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn ContactStore>,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let sessions = SessionRegistry::new(
            tokens,
            Arc::clone(&clock),
            chrono::Duration::seconds(config.session_ttl_secs),
            config.max_sessions,
        );
        Self {
            contact: ContactService::new(store, clock),
            sessions,
            page: PageSettings {
                site_name: config.site_name.clone(),
                launch_at: config.launch_at.clone(),
            },
            cookie_secure: config.cookie_secure,
            session_ttl_secs: config.session_ttl_secs,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("cookie_secure", &self.cookie_secure)
            .finish_non_exhaustive()
    }
}
