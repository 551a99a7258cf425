//! Session registry.
//!
//! A session is an opaque random id (carried in a cookie by the server
//! crate) mapped to one [`CsrfToken`]. Sessions expire after sitting idle
//! for the configured TTL. Expired entries are swept only when the
//! registry is full, so no background task is needed. A full registry
//! refuses new sessions rather than evicting live ones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::csrf::{CsrfToken, TokenSource};

/// A live session as seen by a request handler.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque id to hand back to the client.
    pub id: String,
    /// Token the client must echo on submission.
    pub csrf: CsrfToken,
    /// Whether this request created the session.
    pub is_new: bool,
}

struct Entry {
    csrf: CsrfToken,
    last_seen: DateTime<Utc>,
}

/// In-memory map of session id to CSRF token.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    tokens: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
}

impl SessionRegistry {
    /// Create an empty registry.
    ///
    /// `capacity` bounds the number of sessions. Reaching it triggers a
    /// sweep of expired sessions; live sessions are never evicted.
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            tokens,
            clock,
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Return the live session for `id`, or start a new one.
    ///
    /// Unknown and expired ids get a brand-new session with a new id; the
    /// client-supplied id is never adopted. Returns `None` when a new
    /// session is needed but the registry is full of live ones.
    pub async fn get_or_create(&self, id: Option<&str>) -> Option<Session> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                if !self.is_expired(entry, now) {
                    entry.last_seen = now;
                    return Some(Session {
                        id: id.to_owned(),
                        csrf: entry.csrf.clone(),
                        is_new: false,
                    });
                }
                sessions.remove(id);
            }
        }

        if sessions.len() >= self.capacity {
            self.sweep_expired(&mut sessions, now);
            if sessions.len() >= self.capacity {
                warn!(
                    capacity = self.capacity,
                    "session registry full, refusing new session"
                );
                return None;
            }
        }

        let id = self.tokens.secret();
        let csrf = CsrfToken::generate(self.tokens.as_ref());
        sessions.insert(
            id.clone(),
            Entry {
                csrf: csrf.clone(),
                last_seen: now,
            },
        );
        debug!(sessions = sessions.len(), "session created");

        Some(Session {
            id,
            csrf,
            is_new: true,
        })
    }

    /// The CSRF token of a live session, refreshing its idle timer.
    ///
    /// Returns `None` for unknown or expired ids.
    pub async fn csrf_for(&self, id: &str) -> Option<CsrfToken> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;

        let entry = sessions.get_mut(id)?;
        if self.is_expired(entry, now) {
            sessions.remove(id);
            return None;
        }
        entry.last_seen = now;
        Some(entry.csrf.clone())
    }

    /// Number of sessions currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }

    fn sweep_expired(&self, sessions: &mut HashMap<String, Entry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        debug!(
            removed = before - sessions.len(),
            "session registry swept"
        );
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
