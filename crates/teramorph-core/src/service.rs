//! Contact submission pipeline.
//!
//! [`ContactService::submit`] runs one submission end to end:
//!
//! 1. verify the CSRF token against the session's token (constant time);
//! 2. sanitize every field and blank an invalid email;
//! 3. flatten the message and defuse formula triggers;
//! 4. append `[timestamp, first, last, email, message]` to the store.
//!
//! A rejected token never reaches the store. A store failure is returned
//! once and not retried.

use std::sync::Arc;

use teramorph_storage::ContactStore;
use tracing::{error, info, warn};

use crate::clock::{Clock, format_timestamp};
use crate::csrf::CsrfToken;
use crate::error::ContactError;
use crate::submission::{ContactForm, Submission};

/// What a successful submission stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The `fecha_hora` value written.
    pub timestamp: String,
    /// Whether the email survived validation.
    pub email_accepted: bool,
}

/// Validates, sanitizes and persists contact submissions.
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    /// Create a service writing to `store` and stamping rows with `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Handle one submission.
    ///
    /// `expected` is the token bound to the caller's session, or `None` if
    /// the request carried no live session.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::InvalidCsrf`] if the token is missing or
    /// wrong; nothing is stored in that case. Returns
    /// [`ContactError::StorageUnavailable`] or
    /// [`ContactError::StorageWriteFailure`] if the row could not be
    /// appended.
    pub async fn submit(
        &self,
        expected: Option<&CsrfToken>,
        form: &ContactForm,
    ) -> Result<Receipt, ContactError> {
        let token_ok = expected.is_some_and(|token| token.verify(form.csrf.as_deref()));
        if !token_ok {
            warn!(
                has_session = expected.is_some(),
                has_token = form.csrf.is_some(),
                "contact submission rejected: invalid CSRF token"
            );
            return Err(ContactError::InvalidCsrf);
        }

        let submission = Submission::from_form(form);
        let email_accepted = submission.has_email();
        let message_chars = submission.message.chars().count();

        let timestamp = format_timestamp(self.clock.now());
        let row = submission.into_row(timestamp.clone());

        if let Err(e) = self.store.append(&row).await {
            let err = ContactError::from(e);
            error!(error = %err, "failed to store contact submission");
            return Err(err);
        }

        info!(email_accepted, message_chars, "contact submission stored");
        Ok(Receipt {
            timestamp,
            email_accepted,
        })
    }
}

impl std::fmt::Debug for ContactService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use teramorph_storage::{ContactRow, MemoryStore, StorageError};

    use super::*;
    use crate::clock::{ManualClock, SystemClock, TIMESTAMP_FORMAT};

    struct FailingStore(fn() -> StorageError);

    #[async_trait::async_trait]
    impl ContactStore for FailingStore {
        async fn append(&self, _row: &ContactRow) -> Result<(), StorageError> {
            Err((self.0)())
        }
    }

    fn service(store: &MemoryStore) -> ContactService {
        ContactService::new(Arc::new(store.clone()), Arc::new(SystemClock))
    }

    fn form(csrf: Option<&str>) -> ContactForm {
        ContactForm {
            csrf: csrf.map(str::to_owned),
            first_name: Some("Ana".to_owned()),
            last_name: Some("López".to_owned()),
            email: Some("ana@example.com".to_owned()),
            message: Some("hola".to_owned()),
        }
    }

    #[tokio::test]
    async fn valid_submission_stores_one_row() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");

        let receipt = service(&store).submit(Some(&token), &form(Some("tok"))).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields().len(), 5);
        assert!(NaiveDateTime::parse_from_str(rows[0].timestamp(), TIMESTAMP_FORMAT).is_ok());
        assert_eq!(rows[0].timestamp(), receipt.timestamp);
        assert!(receipt.email_accepted);
    }

    #[tokio::test]
    async fn timestamp_comes_from_clock() {
        let store = MemoryStore::new();
        let instant = Utc.with_ymd_and_hms(2025, 9, 25, 6, 0, 0).unwrap();
        let service = ContactService::new(
            Arc::new(store.clone()),
            Arc::new(ManualClock::new(instant)),
        );
        let token = CsrfToken::new("tok");

        service.submit(Some(&token), &form(Some("tok"))).await.unwrap();

        assert_eq!(store.rows().await[0].timestamp(), format_timestamp(instant));
    }

    #[tokio::test]
    async fn wrong_token_stores_nothing() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");

        let result = service(&store).submit(Some(&token), &form(Some("nope"))).await;

        assert!(matches!(result, Err(ContactError::InvalidCsrf)));
        assert!(store.rows().await.is_empty());
        assert_eq!(store.header_count().await, 0);
    }

    #[tokio::test]
    async fn missing_token_stores_nothing() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");

        let result = service(&store).submit(Some(&token), &form(None)).await;

        assert!(matches!(result, Err(ContactError::InvalidCsrf)));
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn missing_session_stores_nothing() {
        let store = MemoryStore::new();

        let result = service(&store).submit(None, &form(Some("tok"))).await;

        assert!(matches!(result, Err(ContactError::InvalidCsrf)));
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn bad_email_is_blanked_not_rejected() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");
        let mut form = form(Some("tok"));
        form.email = Some("ana(at)example".to_owned());

        let receipt = service(&store).submit(Some(&token), &form).await.unwrap();

        assert!(!receipt.email_accepted);
        assert_eq!(store.rows().await[0].fields()[3], "");
    }

    #[tokio::test]
    async fn formula_and_multiline_fields_are_stored_safely() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");
        let mut form = form(Some("tok"));
        form.first_name = Some("=SUM(A1)".to_owned());
        form.message = Some("line1\nline2\n\n\n\nline3".to_owned());

        service(&store).submit(Some(&token), &form).await.unwrap();

        let row = &store.rows().await[0];
        assert_eq!(row.fields()[1], "'=SUM(A1)");
        assert_eq!(row.fields()[4], "line1 | line2 |  | line3");
    }

    #[tokio::test]
    async fn token_stays_valid_for_later_submissions() {
        let store = MemoryStore::new();
        let token = CsrfToken::new("tok");
        let service = service(&store);

        for _ in 0..3 {
            service.submit(Some(&token), &form(Some("tok"))).await.unwrap();
        }

        assert_eq!(store.rows().await.len(), 3);
        assert_eq!(store.header_count().await, 1);
    }

    #[tokio::test]
    async fn unavailable_storage_maps_to_storage_unavailable() {
        let service = ContactService::new(
            Arc::new(FailingStore(|| StorageError::Unavailable {
                root: "/srv/www".to_owned(),
                reason: "missing".to_owned(),
            })),
            Arc::new(SystemClock),
        );
        let token = CsrfToken::new("tok");

        let result = service.submit(Some(&token), &form(Some("tok"))).await;
        assert!(matches!(result, Err(ContactError::StorageUnavailable { .. })));
    }

    #[tokio::test]
    async fn write_errors_map_to_write_failure() {
        let service = ContactService::new(
            Arc::new(FailingStore(|| StorageError::Lock {
                path: "/srv/private/contacts.csv".to_owned(),
                reason: "EIO".to_owned(),
            })),
            Arc::new(SystemClock),
        );
        let token = CsrfToken::new("tok");

        let result = service.submit(Some(&token), &form(Some("tok"))).await;
        assert!(matches!(result, Err(ContactError::StorageWriteFailure { .. })));
    }

    #[tokio::test]
    async fn concurrent_submissions_write_one_header() {
        let store = MemoryStore::new();
        let service = Arc::new(service(&store));
        let token = CsrfToken::new("tok");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                service.submit(Some(&token), &form(Some("tok"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.rows().await.len(), 8);
        assert_eq!(store.header_count().await, 1);
    }
}
