//! In-memory contact store for testing.
//!
//! Keeps the rows behind a `Mutex` and renders them to the same bytes the
//! CSV file store would produce. Nothing survives a restart.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::encode::{UTF8_BOM, encode_record};
use crate::{ContactRow, ContactStore, HEADER, StorageError};

/// An in-memory [`ContactStore`].
///
/// Cloning shares the underlying rows, so a test can keep one handle and
/// give the other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    headers_written: usize,
    rows: Vec<ContactRow>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended rows, oldest first.
    pub async fn rows(&self) -> Vec<ContactRow> {
        self.inner.lock().await.rows.clone()
    }

    /// How many times the header has been written. Never more than one.
    pub async fn header_count(&self) -> usize {
        self.inner.lock().await.headers_written
    }

    /// The file contents a [`CsvFileStore`](crate::CsvFileStore) would hold.
    pub async fn render(&self) -> Vec<u8> {
        let inner = self.inner.lock().await;
        let mut out = Vec::new();
        if inner.headers_written > 0 {
            out.extend_from_slice(UTF8_BOM);
            encode_record(&HEADER, &mut out);
        }
        for row in &inner.rows {
            encode_record(row.fields(), &mut out);
        }
        out
    }
}

#[async_trait::async_trait]
impl ContactStore for MemoryStore {
    async fn append(&self, row: &ContactRow) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.headers_written == 0 {
            inner.headers_written = 1;
        }
        inner.rows.push(row.clone());
        Ok(())
    }
}
