//! CSV file store.
//!
//! Rows are appended to `<private dir>/<file name>`. Each append opens the
//! file in append mode, takes an exclusive advisory lock (`flock`), checks
//! whether the file is empty, and writes BOM + header + row (or just the
//! row) in a single `write_all` before unlocking. The emptiness check is
//! made under the lock, so concurrent first writers cannot both emit a
//! header, and the file is never truncated or rewritten.
//!
//! The private directory is resolved once. If it disappears later, the
//! next append creates it again before opening the file.
//!
//! # Thread safety
//!
//! No in-process mutex is needed: the file lock serializes writers across
//! tasks and across processes alike. Blocking I/O runs on the tokio
//! blocking pool.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::encode::{UTF8_BOM, encode_record};
use crate::private_dir::PrivateDir;
use crate::{ContactRow, ContactStore, HEADER, StorageError};

/// Contact store backed by a locked, append-only CSV file.
pub struct CsvFileStore {
    public_root: PathBuf,
    dir_name: String,
    file_name: String,
    /// Resolved on first use, then reused for the life of the store.
    dir: OnceCell<PrivateDir>,
}

impl CsvFileStore {
    /// Create a store that keeps `file_name` in a private directory named
    /// `dir_name` next to (or, failing that, inside) `public_root`.
    ///
    /// Nothing touches the disk until the first append.
    #[must_use]
    pub fn new(
        public_root: impl AsRef<Path>,
        dir_name: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            public_root: public_root.as_ref().to_path_buf(),
            dir_name: dir_name.into(),
            file_name: file_name.into(),
            dir: OnceCell::new(),
        }
    }

    /// Resolve (once) and return the private directory.
    ///
    /// A failed resolution is not cached; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if no directory can be used.
    pub async fn private_dir(&self) -> Result<&PrivateDir, StorageError> {
        self.dir
            .get_or_try_init(|| async {
                let root = self.public_root.clone();
                let name = self.dir_name.clone();
                tokio::task::spawn_blocking(move || PrivateDir::resolve(&root, &name))
                    .await
                    .map_err(|e| StorageError::Task {
                        reason: e.to_string(),
                    })?
            })
            .await
    }

    /// Full path of the CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if no directory can be used.
    pub async fn csv_path(&self) -> Result<PathBuf, StorageError> {
        Ok(self.private_dir().await?.path().join(&self.file_name))
    }
}

#[async_trait::async_trait]
impl ContactStore for CsvFileStore {
    async fn append(&self, row: &ContactRow) -> Result<(), StorageError> {
        let path = self.csv_path().await?;
        let dir = self.private_dir().await?.clone();
        let row = row.clone();

        tokio::task::spawn_blocking(move || append_locked(&dir, &path, &row))
            .await
            .map_err(|e| StorageError::Task {
                reason: e.to_string(),
            })?
    }
}

impl std::fmt::Debug for CsvFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvFileStore")
            .field("public_root", &self.public_root)
            .field("dir_name", &self.dir_name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

fn append_locked(dir: &PrivateDir, path: &Path, row: &ContactRow) -> Result<(), StorageError> {
    let file = open_for_append(dir, path).map_err(|e| StorageError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    file.lock_exclusive().map_err(|e| StorageError::Lock {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let written = write_row(&file, path, row);
    let unlocked = FileExt::unlock(&file);

    written?;
    unlocked.map_err(|e| StorageError::Lock {
        path: path.display().to_string(),
        reason: format!("unlock failed: {e}"),
    })
}

/// Open `path` for appending, recreating its directory once if it has
/// been removed since resolution. Nothing has been written at that point.
fn open_for_append(dir: &PrivateDir, path: &Path) -> io::Result<File> {
    let open = || OpenOptions::new().create(true).append(true).open(path);
    match open() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %dir.path().display(), "private directory missing, recreating");
            dir.recreate()?;
            open()
        }
        result => result,
    }
}

/// Must be called with the exclusive lock held.
fn write_row(file: &File, path: &Path, row: &ContactRow) -> Result<(), StorageError> {
    let write_err = |e: std::io::Error| StorageError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let is_new = file.metadata().map_err(write_err)?.len() == 0;

    let mut buf = Vec::with_capacity(512);
    if is_new {
        buf.extend_from_slice(UTF8_BOM);
        encode_record(&HEADER, &mut buf);
    }
    encode_record(row.fields(), &mut buf);

    let mut writer = file;
    writer.write_all(&buf).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    debug!(is_new, bytes = buf.len(), "contact row appended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Placement;

    fn row(n: usize) -> ContactRow {
        ContactRow::new([
            "2025-01-01 10:00:00".to_owned(),
            format!("Ana {n}"),
            "López".to_owned(),
            "ana@example.com".to_owned(),
            "hola".to_owned(),
        ])
    }

    fn store_in(base: &Path) -> CsvFileStore {
        let root = base.join("public_html");
        std::fs::create_dir(&root).unwrap();
        CsvFileStore::new(root, "private", "contacts.csv")
    }

    #[tokio::test]
    async fn first_append_writes_bom_and_header() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());

        store.append(&row(1)).await.unwrap();

        let bytes = std::fs::read(base.path().join("private/contacts.csv")).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "fecha_hora,nombre,apellidos,email,mensaje\n\
             2025-01-01 10:00:00,Ana 1,López,ana@example.com,hola\n"
        );
    }

    #[tokio::test]
    async fn later_appends_only_add_rows() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());

        for n in 0..3 {
            store.append(&row(n)).await.unwrap();
        }

        let text = std::fs::read_to_string(store.csv_path().await.unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(text.matches("fecha_hora").count(), 1);
        assert_eq!(text.matches('\u{feff}').count(), 1);
        assert!(lines[3].contains("Ana 2"));
    }

    #[tokio::test]
    async fn empty_existing_file_gets_header() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());
        std::fs::create_dir(base.path().join("private")).unwrap();
        std::fs::write(base.path().join("private/contacts.csv"), b"").unwrap();

        store.append(&row(1)).await.unwrap();

        let text = std::fs::read_to_string(base.path().join("private/contacts.csv")).unwrap();
        assert!(text.starts_with("\u{feff}fecha_hora,"));
    }

    #[tokio::test]
    async fn existing_content_is_never_rewritten() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());
        std::fs::create_dir(base.path().join("private")).unwrap();
        let path = base.path().join("private/contacts.csv");
        std::fs::write(&path, "legacy,row\n").unwrap();

        store.append(&row(7)).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("legacy,row\n"));
        assert!(!text.contains("fecha_hora"));
        assert!(text.ends_with("ana@example.com,hola\n"));
    }

    #[tokio::test]
    async fn concurrent_appends_write_one_header() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("public_html");
        std::fs::create_dir(&root).unwrap();

        // Separate store instances open separate handles, like separate
        // worker processes would.
        let mut handles = Vec::new();
        for n in 0..16 {
            let store = Arc::new(CsvFileStore::new(&root, "private", "contacts.csv"));
            handles.push(tokio::spawn(async move { store.append(&row(n)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let text = std::fs::read_to_string(base.path().join("private/contacts.csv")).unwrap();
        assert_eq!(text.matches("fecha_hora").count(), 1);
        assert_eq!(text.lines().count(), 17);
        for n in 0..16 {
            assert!(text.contains(&format!("Ana {n},")), "row {n} missing");
        }
    }

    #[tokio::test]
    async fn directory_resolution_is_cached() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());

        let first = store.private_dir().await.unwrap().clone();
        let second = store.private_dir().await.unwrap();

        assert_eq!(&first, second);
        assert_eq!(first.placement(), Placement::OutsideRoot);
    }

    #[tokio::test]
    async fn missing_public_root_fails_without_writing() {
        let base = tempfile::tempdir().unwrap();
        let store = CsvFileStore::new(base.path().join("missing"), "private", "contacts.csv");

        let result = store.append(&row(1)).await;

        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
        assert!(!base.path().join("private").exists());
    }

    #[tokio::test]
    async fn unopenable_file_is_an_open_error() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());
        // A directory squatting on the file name cannot be opened for append.
        std::fs::create_dir_all(base.path().join("private/contacts.csv")).unwrap();

        let result = store.append(&row(1)).await;
        assert!(matches!(result, Err(StorageError::Open { .. })));
    }

    #[tokio::test]
    async fn removed_directory_is_recreated_on_next_append() {
        let base = tempfile::tempdir().unwrap();
        let store = store_in(base.path());
        store.append(&row(1)).await.unwrap();

        std::fs::remove_dir_all(base.path().join("private")).unwrap();
        store.append(&row(2)).await.unwrap();

        let bytes = std::fs::read(base.path().join("private/contacts.csv")).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Ana 2,"));
    }
}
