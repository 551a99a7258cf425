//! Private directory resolution.
//!
//! The CSV file must not be downloadable. Resolution tries, in order:
//!
//! 1. a sibling of the public root (`<root>/../<name>`), unreachable from
//!    the web server;
//! 2. a subdirectory of the public root (`<root>/<name>`) guarded by a
//!    deny-all `.htaccess`;
//! 3. the public root itself with directory listing disabled.
//!
//! Each step degrades instead of failing so a misconfigured host still
//! accepts submissions. Only a missing public root is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::StorageError;

/// Access rules dropped into a private directory inside the public root.
pub const DENY_ALL_RULES: &str = "Require all denied\nOrder allow,deny\nDeny from all\n";

/// Access rules dropped into the public root when nothing better exists.
pub const NO_LISTING_RULES: &str = "Options -Indexes\n";

const ACCESS_FILE: &str = ".htaccess";

/// Where the private directory ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Sibling of the public root.
    OutsideRoot,
    /// Inside the public root behind a deny-all rule file.
    InsideRootDenied,
    /// The public root itself, listing disabled.
    PublicRoot,
}

/// A resolved directory for private files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateDir {
    path: PathBuf,
    placement: Placement,
}

impl PrivateDir {
    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Which fallback tier produced this directory.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Create the directory again after it was removed, with its rule file
    /// for [`Placement::InsideRootDenied`].
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created. A vanished public root
    /// ([`Placement::PublicRoot`]) is not recreated.
    pub fn recreate(&self) -> io::Result<()> {
        if self.path.is_dir() {
            return Ok(());
        }
        if self.placement == Placement::PublicRoot {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "public root no longer exists",
            ));
        }
        create_dir(&self.path)?;
        if self.placement == Placement::InsideRootDenied {
            write_rules_if_absent(&self.path, DENY_ALL_RULES);
        }
        warn!(path = %self.path.display(), "private directory recreated");
        Ok(())
    }

    /// Resolve the private directory named `dir_name` relative to
    /// `public_root`, creating directories and rule files as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if `public_root` does not exist
    /// or is not a directory.
    pub fn resolve(public_root: &Path, dir_name: &str) -> Result<Self, StorageError> {
        let root = fs::canonicalize(public_root).map_err(|e| StorageError::Unavailable {
            root: public_root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !root.is_dir() {
            return Err(StorageError::Unavailable {
                root: root.display().to_string(),
                reason: "public root is not a directory".to_owned(),
            });
        }

        if let Some(parent) = root.parent() {
            let outside = parent.join(dir_name);
            if ensure_dir(&outside) {
                info!(path = %outside.display(), "private directory outside public root");
                return Ok(Self {
                    path: outside,
                    placement: Placement::OutsideRoot,
                });
            }
        }

        let inside = root.join(dir_name);
        if ensure_dir(&inside) {
            write_rules_if_absent(&inside, DENY_ALL_RULES);
            warn!(
                path = %inside.display(),
                "private directory falls back inside public root"
            );
            return Ok(Self {
                path: inside,
                placement: Placement::InsideRootDenied,
            });
        }

        write_rules_if_absent(&root, NO_LISTING_RULES);
        warn!(
            path = %root.display(),
            "no private directory could be created, using public root"
        );
        Ok(Self {
            path: root,
            placement: Placement::PublicRoot,
        })
    }
}

fn ensure_dir(path: &Path) -> bool {
    path.is_dir() || create_dir(path).is_ok()
}

#[cfg(unix)]
fn create_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Best effort: an existing rule file is left alone and write errors are
/// only logged.
fn write_rules_if_absent(dir: &Path, rules: &str) {
    let file = dir.join(ACCESS_FILE);
    if file.is_file() {
        return;
    }
    if let Err(e) = fs::write(&file, rules) {
        warn!(path = %file.display(), error = %e, "failed to write access rules");
    }
}
