//! Modpack store.
//!
//! Layout under the store root:
//! ```text
//! {root}/
//! └── {id}/
//!     ├── modpack.json
//!     ├── hashmap.json        (optional, written by an external indexer)
//!     ├── mods_enabled/
//!     ├── mods_disabled/
//!     └── ...                 (anything uploaded later)
//! ```
//!
//! The store holds no state besides its root path. Concurrent requests are
//! not coordinated; exclusive `create_dir` and `rename` are the only
//! arbiters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::archive::{self, ExtractSummary};
use super::path::{normalize_relative, resolve_within, validate_id};
use super::{
    HashManifest, ModpackInfo, StagedFile, HASH_MANIFEST_FILE, METADATA_FILE, MODS_DISABLED_DIR,
    MODS_ENABLED_DIR,
};
use crate::{ModhostError, Result};

/// Manages modpack directories under a root directory.
#[derive(Debug, Clone)]
pub struct ModpackStore {
    /// Directory holding one subdirectory per modpack.
    root: PathBuf,
}

impl ModpackStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether a modpack directory exists.
    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.root.join(id).is_dir()
    }

    /// Create a new modpack owned by `token`.
    ///
    /// If populating the new directory fails, the directory is removed again
    /// (best effort) so the id can be reused.
    pub fn create_modpack(&self, id: &str, token: &str) -> Result<ModpackInfo> {
        validate_id(id)?;
        if token.is_empty() {
            return Err(ModhostError::BadRequest("token must not be empty".to_string()));
        }

        let dir = self.root.join(id);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ModhostError::AlreadyExists(format!("Modpack {id}")));
            }
            Err(e) => return Err(e.into()),
        }

        let info = ModpackInfo::new(id, token);
        if let Err(e) = Self::populate(&dir, &info) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                tracing::warn!(
                    modpack = %id,
                    error = %cleanup,
                    "Failed to remove partially created modpack"
                );
            }
            return Err(e);
        }

        tracing::info!(modpack = %id, "Created modpack");
        Ok(info)
    }

    fn populate(dir: &Path, info: &ModpackInfo) -> Result<()> {
        fs::create_dir(dir.join(MODS_ENABLED_DIR))?;
        fs::create_dir(dir.join(MODS_DISABLED_DIR))?;
        info.write_new(&dir.join(METADATA_FILE))
    }

    /// Verify that `token` owns the modpack.
    pub fn authorize(&self, id: &str, token: &str) -> Result<()> {
        validate_id(id)?;
        let info = ModpackInfo::load(&self.root.join(id).join(METADATA_FILE))
            .map_err(|e| match e {
                ModhostError::NotFound(_) => ModhostError::NotFound(format!("Modpack {id}")),
                other => other,
            })?;

        if tokens_match(token, &info.token) {
            Ok(())
        } else {
            Err(ModhostError::Forbidden("invalid token".to_string()))
        }
    }

    /// Place an uploaded file at `relative` inside the modpack.
    ///
    /// Missing intermediate directories are created and an existing file is
    /// replaced. The staged upload is consumed: it ends up at the target or
    /// is removed.
    pub fn write_file(
        &self,
        id: &str,
        relative: &str,
        upload: StagedFile,
        token: &str,
    ) -> Result<PathBuf> {
        let target = match self.upload_target(id, relative, token) {
            Ok(target) => target,
            Err(e) => {
                upload.discard();
                return Err(e);
            }
        };

        let size = upload.len();
        upload.persist(&target)?;

        tracing::info!(modpack = %id, path = %relative, size, "Stored file");
        Ok(target)
    }

    fn upload_target(&self, id: &str, relative: &str, token: &str) -> Result<PathBuf> {
        validate_id(id)?;
        normalize_relative(relative)?;
        self.authorize(id, token)?;

        let dir = self.modpack_dir(id)?;
        let target = resolve_within(&dir, relative)?;
        if target.is_dir() {
            return Err(ModhostError::BadRequest(format!(
                "{relative} is a directory"
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(target)
    }

    /// Delete a single file inside the modpack.
    pub fn delete_file(&self, id: &str, relative: &str) -> Result<()> {
        validate_id(id)?;
        normalize_relative(relative)?;

        let dir = self.modpack_dir(id)?;
        let target = resolve_within(&dir, relative)?;

        let not_found = || ModhostError::NotFound(format!("File {relative}"));
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => return Err(not_found()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(&target) {
            Ok(()) => {
                tracing::info!(modpack = %id, path = %relative, "Removed file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Recursively delete a modpack.
    pub fn delete_modpack(&self, id: &str) -> Result<()> {
        let dir = self.modpack_dir(id)?;

        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!(modpack = %id, "Removed modpack");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ModhostError::NotFound(format!("Modpack {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Expand a staged ZIP archive into the modpack root.
    ///
    /// The staged archive is removed whether or not extraction succeeds.
    pub fn extract_archive(&self, id: &str, upload: StagedFile) -> Result<ExtractSummary> {
        let dir = match self.modpack_dir(id) {
            Ok(dir) => dir,
            Err(e) => {
                upload.discard();
                return Err(e);
            }
        };

        let result = archive::extract_zip(upload.path(), &dir);
        upload.discard();

        let summary = result?;
        tracing::info!(
            modpack = %id,
            files = summary.files,
            directories = summary.directories,
            "Extracted archive"
        );
        Ok(summary)
    }

    /// Read the modpack metadata with the token redacted.
    pub fn read_info(&self, id: &str) -> Result<ModpackInfo> {
        validate_id(id)?;
        let info = ModpackInfo::load(&self.root.join(id).join(METADATA_FILE))
            .map_err(|e| match e {
                ModhostError::NotFound(_) => ModhostError::NotFound(format!("Modpack {id}")),
                other => other,
            })?;
        Ok(info.redacted())
    }

    /// Read the modpack's hash manifest.
    pub fn read_hash_manifest(&self, id: &str) -> Result<HashManifest> {
        validate_id(id)?;
        HashManifest::load(&self.root.join(id).join(HASH_MANIFEST_FILE)).map_err(|e| match e {
            ModhostError::NotFound(_) => {
                ModhostError::NotFound(format!("Hash manifest for modpack {id}"))
            }
            other => other,
        })
    }

    /// Read any file inside the modpack.
    ///
    /// Reading the metadata file returns it re-encoded with the token
    /// redacted.
    pub fn read_file(&self, id: &str, relative: &str) -> Result<Vec<u8>> {
        validate_id(id)?;
        normalize_relative(relative)?;

        let dir = self.modpack_dir(id)?;
        let target = resolve_within(&dir, relative)?;

        let not_found = || ModhostError::NotFound(format!("File {relative}"));
        match fs::metadata(&target) {
            Ok(meta) if meta.is_dir() => return Err(not_found()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        let metadata_path = dir.join(METADATA_FILE);
        if target == metadata_path || same_file(&target, &metadata_path) {
            let info = ModpackInfo::load(&metadata_path)?;
            return info.redacted().to_pretty_json();
        }

        match fs::read(&target) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of an existing modpack directory.
    fn modpack_dir(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        let dir = self.root.join(id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(ModhostError::NotFound(format!("Modpack {id}")))
        }
    }
}

/// Compare a supplied token against the stored one without short-circuiting
/// on the first differing byte. An empty supplied token never matches.
fn tokens_match(supplied: &str, stored: &str) -> bool {
    if supplied.is_empty() || supplied.len() != stored.len() {
        return false;
    }
    supplied
        .bytes()
        .zip(stored.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Whether two paths name the same file on disk.
///
/// Catches aliases such as a differently cased name on a case-insensitive
/// filesystem.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}
