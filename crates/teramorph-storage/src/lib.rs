//! Append-only contact storage for `Teramorph`.
//!
//! This crate defines the [`ContactStore`] trait, a single `append`
//! capability that knows nothing about HTTP or request validation. The
//! request pipeline in `teramorph-core` hands it finished [`ContactRow`]s.
//!
//! Two implementations are provided:
//!
//! - [`CsvFileStore`]: production default, a BOM-prefixed CSV file in a
//!   private directory, serialized with an exclusive advisory lock
//! - [`MemoryStore`]: in-memory, for tests and throwaway dev servers

mod csv_file;
pub mod encode;
mod error;
mod memory;
pub mod private_dir;

pub use csv_file::CsvFileStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use private_dir::{Placement, PrivateDir};

/// Number of columns in every persisted row.
pub const FIELD_COUNT: usize = 5;

/// Header row written once at the top of a fresh file.
pub const HEADER: [&str; FIELD_COUNT] = [
    "fecha_hora",
    "nombre",
    "apellidos",
    "email",
    "mensaje",
];

/// One persisted contact submission: timestamp, first name, last name,
/// email, message.
///
/// Values are stored exactly as given. Sanitizing and formula defusing are
/// the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow([String; FIELD_COUNT]);

impl ContactRow {
    /// Build a row from its five fields in column order.
    #[must_use]
    pub fn new(fields: [String; FIELD_COUNT]) -> Self {
        Self(fields)
    }

    /// All fields in column order.
    #[must_use]
    pub fn fields(&self) -> &[String; FIELD_COUNT] {
        &self.0
    }

    /// The `fecha_hora` column.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.0[0]
    }
}

/// An append-only sink for contact rows.
///
/// The first append to an empty store also writes [`HEADER`]; header and
/// row land together or not at all. Implementations must be safe to share
/// across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait ContactStore: Send + Sync + 'static {
    /// Append one row, writing the header first if the store is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when no private directory can
    /// be resolved, and [`StorageError::Open`], [`StorageError::Lock`] or
    /// [`StorageError::Write`] when the file cannot be written.
    async fn append(&self, row: &ContactRow) -> Result<(), StorageError>;
}
