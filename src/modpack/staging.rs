//! Temporary storage for uploads before they are moved into a modpack.
//!
//! Uploads are streamed into an anonymous temp file in the staging
//! directory. A staged file is either persisted (renamed onto its target) or
//! removed; dropping it without persisting removes it too, which covers
//! clients that disconnect halfway through an upload.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::Result;

const UPLOAD_PREFIX: &str = "upload-";

/// Directory holding in-flight uploads.
///
/// Must be on the same filesystem as the modpack store so that persisting a
/// staged file is a rename.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    /// Create a staging area, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Get the staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start a new, empty staged file.
    pub fn create(&self) -> Result<StagedFile> {
        let inner = tempfile::Builder::new()
            .prefix(UPLOAD_PREFIX)
            .tempfile_in(&self.dir)?;
        Ok(StagedFile { inner, len: 0 })
    }

    /// Remove uploads left behind by an earlier process.
    ///
    /// Only call this before the server starts accepting requests. Returns
    /// the number of files removed.
    pub fn purge_stale(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let is_upload = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(UPLOAD_PREFIX));
            if !is_upload || !entry.file_type()?.is_file() {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "Failed to remove stale upload"
                ),
            }
        }
        Ok(removed)
    }

    /// Stage a complete buffer in one go.
    pub fn stage_bytes(&self, content: &[u8]) -> Result<StagedFile> {
        let mut staged = self.create()?;
        staged.append(content)?;
        Ok(staged)
    }
}

/// An upload sitting in the staging directory.
#[derive(Debug)]
pub struct StagedFile {
    inner: NamedTempFile,
    len: u64,
}

impl StagedFile {
    /// Append a chunk of content.
    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.inner.as_file_mut().write_all(chunk)?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the temp file.
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Flush to disk and rename onto `target`, replacing any existing file.
    ///
    /// On failure the temp file is removed before the error is returned.
    pub fn persist(self, target: &Path) -> Result<()> {
        if let Err(e) = self.inner.as_file().sync_all() {
            self.discard();
            return Err(e.into());
        }

        match self.inner.persist(target) {
            Ok(_) => Ok(()),
            Err(e) => {
                remove_temp(e.file);
                Err(e.error.into())
            }
        }
    }

    /// Remove the temp file. Failures are logged, not returned.
    pub fn discard(self) {
        remove_temp(self.inner);
    }
}

fn remove_temp(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_staging() -> (TempDir, UploadStaging) {
        let temp_dir = TempDir::new().unwrap();
        let staging = UploadStaging::new(temp_dir.path().join("tempfiles")).unwrap();
        (temp_dir, staging)
    }

    fn staged_count(staging: &UploadStaging) -> usize {
        fs::read_dir(staging.dir()).unwrap().count()
    }

    #[test]
    fn test_new_creates_directory() {
        let (temp_dir, staging) = setup_staging();
        assert!(temp_dir.path().join("tempfiles").is_dir());
        assert_eq!(staging.dir(), temp_dir.path().join("tempfiles"));
    }

    #[test]
    fn test_append_tracks_length() {
        let (_temp_dir, staging) = setup_staging();
        let mut staged = staging.create().unwrap();
        assert!(staged.is_empty());

        staged.append(b"hello ").unwrap();
        staged.append(b"world").unwrap();

        assert_eq!(staged.len(), 11);
        assert_eq!(fs::read(staged.path()).unwrap(), b"hello world");
    }

    #[test]
    fn test_persist_moves_file() {
        let (temp_dir, staging) = setup_staging();
        let target = temp_dir.path().join("out.bin");

        let staged = staging.stage_bytes(b"payload").unwrap();
        staged.persist(&target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload");
        assert_eq!(staged_count(&staging), 0);
    }

    #[test]
    fn test_persist_overwrites_existing() {
        let (temp_dir, staging) = setup_staging();
        let target = temp_dir.path().join("out.bin");
        fs::write(&target, b"old").unwrap();

        staging.stage_bytes(b"new").unwrap().persist(&target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_persist_failure_removes_temp() {
        let (temp_dir, staging) = setup_staging();
        let target = temp_dir.path().join("missing-dir").join("out.bin");

        let result = staging.stage_bytes(b"payload").unwrap().persist(&target);

        assert!(result.is_err());
        assert_eq!(staged_count(&staging), 0);
    }

    #[test]
    fn test_discard_and_drop_remove_temp() {
        let (_temp_dir, staging) = setup_staging();

        staging.stage_bytes(b"a").unwrap().discard();
        assert_eq!(staged_count(&staging), 0);

        {
            let _staged = staging.stage_bytes(b"b").unwrap();
            assert_eq!(staged_count(&staging), 1);
        }
        assert_eq!(staged_count(&staging), 0);
    }

    #[test]
    fn test_purge_stale_removes_only_uploads() {
        let (_temp_dir, staging) = setup_staging();
        fs::write(staging.dir().join("upload-abc123"), b"leftover").unwrap();
        fs::write(staging.dir().join("keep.txt"), b"not ours").unwrap();
        fs::create_dir(staging.dir().join("upload-dir")).unwrap();

        let removed = staging.purge_stale().unwrap();

        assert_eq!(removed, 1);
        assert!(!staging.dir().join("upload-abc123").exists());
        assert!(staging.dir().join("keep.txt").exists());
        assert!(staging.dir().join("upload-dir").is_dir());
    }
}
