//! Resolution of client-supplied ids and relative paths against the store.
//!
//! Every operation that touches the filesystem on behalf of a client goes
//! through this module first. Validation happens in two stages:
//!
//! 1. Lexical: the id must be a single plain segment and every segment of a
//!    relative path must be a normal component. Nothing touches the disk.
//! 2. Containment: the nearest existing ancestor of the target is
//!    canonicalized and must still live under the canonical modpack root, so
//!    a symlink inside the tree cannot redirect a write outside of it.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::{ModhostError, Result};

/// Validate a modpack id.
///
/// Ids are opaque, but they name a directory directly under the store root,
/// so they must be exactly one normal path segment.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(&['/', '\\', '\0'][..])
    {
        return Err(ModhostError::InvalidPath(format!("invalid modpack id: {id:?}")));
    }
    Ok(())
}

/// Lexically validate a `/`-separated relative path and normalize it.
///
/// Empty segments and `.` segments are dropped. `..`, rooted paths, drive
/// prefixes, backslashes and NUL bytes are rejected. A path that normalizes
/// to nothing is rejected as well, since it would name the modpack root.
pub fn normalize_relative(relative: &str) -> Result<PathBuf> {
    if relative.contains(&['\\', '\0'][..]) {
        return Err(ModhostError::InvalidPath(format!(
            "unsupported character in path: {relative:?}"
        )));
    }
    if relative.starts_with('/') {
        return Err(ModhostError::InvalidPath(format!(
            "absolute path not allowed: {relative}"
        )));
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ModhostError::InvalidPath(format!(
                    "path traversal not allowed: {relative}"
                )));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(ModhostError::InvalidPath("empty path".to_string()));
    }

    Ok(normalized)
}

/// Resolve `relative` under `root`, enforcing containment.
///
/// `root` must exist. Returns the joined (non-canonical) path on success.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let normalized = normalize_relative(relative)?;
    let path = root.join(&normalized);
    ensure_contained(root, &path, relative)?;
    Ok(path)
}

/// Check that `path`, or its nearest existing ancestor, canonicalizes to a
/// location under `root`.
fn ensure_contained(root: &Path, path: &Path, display: &str) -> Result<()> {
    let root_canonical = root.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ModhostError::NotFound(format!("modpack directory {}", root.display()))
        } else {
            ModhostError::Io(e)
        }
    })?;

    let mut current = Some(path);
    while let Some(candidate) = current {
        match std::fs::symlink_metadata(candidate) {
            Ok(meta) => {
                let canonical = candidate.canonicalize().map_err(|e| {
                    if meta.file_type().is_symlink() {
                        ModhostError::InvalidPath(format!("dangling symlink in path: {display}"))
                    } else {
                        ModhostError::Io(e)
                    }
                })?;
                if !canonical.starts_with(&root_canonical) {
                    return Err(ModhostError::InvalidPath(format!(
                        "resolved path escapes modpack root: {display}"
                    )));
                }
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                current = candidate.parent();
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Unreachable in practice: `root` itself exists and is an ancestor.
    Err(ModhostError::InvalidPath(format!(
        "no existing ancestor for path: {display}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_id_accepts_opaque_strings() {
        assert!(validate_id("p1").is_ok());
        assert!(validate_id("0b5f1b9e-9d0a-4c1f-8a7e-1234567890ab").is_ok());
        assert!(validate_id("not a uuid at all").is_ok());
        assert!(validate_id("..hidden").is_ok());
    }

    #[test]
    fn test_validate_id_rejects_path_like_values() {
        for id in ["", ".", "..", "a/b", "../p1", "a\\b", "nul\0byte"] {
            assert!(
                matches!(validate_id(id), Err(ModhostError::InvalidPath(_))),
                "id {id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(
            normalize_relative("mods_enabled/foo.jar").unwrap(),
            PathBuf::from("mods_enabled").join("foo.jar")
        );
        assert_eq!(
            normalize_relative("./a//b/./c.txt").unwrap(),
            PathBuf::from("a").join("b").join("c.txt")
        );
        assert_eq!(normalize_relative("dir/").unwrap(), PathBuf::from("dir"));
    }

    #[test]
    fn test_normalize_relative_rejects_traversal() {
        for rel in [
            "../../etc/passwd",
            "a/../../b",
            "a/..",
            "..",
            "/etc/passwd",
            "//server/share",
            "a\\..\\b",
            "a\0b",
        ] {
            assert!(
                matches!(normalize_relative(rel), Err(ModhostError::InvalidPath(_))),
                "path {rel:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_relative_rejects_empty() {
        assert!(matches!(normalize_relative(""), Err(ModhostError::InvalidPath(_))));
        assert!(matches!(normalize_relative("./"), Err(ModhostError::InvalidPath(_))));
        assert!(matches!(normalize_relative("//"), Err(ModhostError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_within_new_and_existing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("mods_enabled")).unwrap();

        let existing = resolve_within(root, "mods_enabled").unwrap();
        assert_eq!(existing, root.join("mods_enabled"));

        let fresh = resolve_within(root, "config/deep/options.txt").unwrap();
        assert_eq!(fresh, root.join("config").join("deep").join("options.txt"));
        assert!(!root.join("config").exists());
    }

    #[test]
    fn test_resolve_within_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = resolve_within(&missing, "file.txt");
        assert!(matches!(result, Err(ModhostError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_within_rejects_escaping_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp_dir.path().join("pack");
        std::fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        let result = resolve_within(&root, "link/new/file.txt");
        assert!(matches!(result, Err(ModhostError::InvalidPath(_))));

        let result = resolve_within(&root, "link");
        assert!(matches!(result, Err(ModhostError::InvalidPath(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_within_allows_internal_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("mods_enabled")).unwrap();
        std::os::unix::fs::symlink(root.join("mods_enabled"), root.join("alias")).unwrap();

        assert!(resolve_within(root, "alias/foo.jar").is_ok());
    }
}
