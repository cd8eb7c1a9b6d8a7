//! Modpack metadata (`modpack.json`) and hash manifest (`hashmap.json`).

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DEFAULT_VERSION;
use crate::{ModhostError, Result};

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Metadata record stored in each modpack's `modpack.json`.
///
/// `uuid` and `token` are required on read. Display fields fall back to their
/// defaults when absent, and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModpackInfo {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Image URL or reference.
    #[serde(default)]
    pub image: String,
    /// Ownership secret. Never leaves the server unredacted.
    pub token: String,
    /// Modpack id, identical to the directory name.
    pub uuid: String,
    /// Free-form content hash, stored as given.
    #[serde(default)]
    pub hash: String,
    /// Version string.
    #[serde(default = "default_version")]
    pub version: String,
}

impl ModpackInfo {
    /// Create the initial metadata for a freshly created modpack.
    pub fn new(uuid: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            token: token.into(),
            uuid: uuid.into(),
            hash: String::new(),
            version: default_version(),
        }
    }

    /// Return a copy with the token cleared.
    pub fn redacted(mut self) -> Self {
        self.token.clear();
        self
    }

    /// Parse metadata from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ModhostError::Metadata(format!("invalid modpack.json: {e}")))
    }

    /// Serialize as pretty-printed JSON (two-space indent).
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ModhostError::Metadata(format!("failed to encode modpack.json: {e}")))
    }

    /// Load metadata from a file.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(content) => Self::from_slice(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ModhostError::NotFound(format!("Metadata: {}", path.display())))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write metadata to a file that must not exist yet.
    pub fn write_new(&self, path: &Path) -> Result<()> {
        let content = self.to_pretty_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(&content)?;
        file.sync_all()?;
        Ok(())
    }
}

/// Mapping from relative file path to content hash.
///
/// Produced by an external process; this crate only reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashManifest(BTreeMap<String, String>);

impl HashManifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(content) => serde_json::from_slice(&content)
                .map_err(|e| ModhostError::Metadata(format!("invalid hashmap.json: {e}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ModhostError::NotFound(format!("Hash manifest: {}", path.display())))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Hash recorded for a relative path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(path, hash)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for HashManifest {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_defaults() {
        let info = ModpackInfo::new("p1", "secret");

        assert_eq!(info.name, "");
        assert_eq!(info.image, "");
        assert_eq!(info.token, "secret");
        assert_eq!(info.uuid, "p1");
        assert_eq!(info.hash, "");
        assert_eq!(info.version, "0.0.0");
    }

    #[test]
    fn test_redacted_clears_only_token() {
        let mut info = ModpackInfo::new("p1", "secret");
        info.name = "Pack".to_string();

        let redacted = info.redacted();
        assert_eq!(redacted.token, "");
        assert_eq!(redacted.name, "Pack");
        assert_eq!(redacted.uuid, "p1");
    }

    #[test]
    fn test_pretty_json_layout() {
        let info = ModpackInfo::new("p1", "secret");
        let json = String::from_utf8(info.to_pretty_json().unwrap()).unwrap();

        let expected = "{\n  \"name\": \"\",\n  \"image\": \"\",\n  \"token\": \"secret\",\n  \"uuid\": \"p1\",\n  \"hash\": \"\",\n  \"version\": \"0.0.0\"\n}";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_from_slice_defaults_missing_optional_fields() {
        let info = ModpackInfo::from_slice(br#"{"token":"t","uuid":"p1"}"#).unwrap();

        assert_eq!(info.name, "");
        assert_eq!(info.version, "0.0.0");
    }

    #[test]
    fn test_from_slice_ignores_unknown_fields() {
        let info =
            ModpackInfo::from_slice(br#"{"token":"t","uuid":"p1","loader":"forge"}"#).unwrap();
        assert_eq!(info.uuid, "p1");
    }

    #[test]
    fn test_from_slice_requires_token_and_uuid() {
        let result = ModpackInfo::from_slice(br#"{"uuid":"p1"}"#);
        assert!(matches!(result, Err(ModhostError::Metadata(_))));

        let result = ModpackInfo::from_slice(br#"{"token":"t"}"#);
        assert!(matches!(result, Err(ModhostError::Metadata(_))));

        let result = ModpackInfo::from_slice(b"not json");
        assert!(matches!(result, Err(ModhostError::Metadata(_))));
    }

    #[test]
    fn test_write_new_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modpack.json");
        let info = ModpackInfo::new("p1", "secret");

        info.write_new(&path).unwrap();
        assert_eq!(ModpackInfo::load(&path).unwrap(), info);
    }

    #[test]
    fn test_write_new_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modpack.json");
        ModpackInfo::new("p1", "first").write_new(&path).unwrap();

        let result = ModpackInfo::new("p1", "second").write_new(&path);
        assert!(matches!(result, Err(ModhostError::Io(_))));
        assert_eq!(ModpackInfo::load(&path).unwrap().token, "first");
    }

    #[test]
    fn test_load_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = ModpackInfo::load(&temp_dir.path().join("modpack.json"));
        assert!(matches!(result, Err(ModhostError::NotFound(_))));
    }

    #[test]
    fn test_hash_manifest_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashmap.json");
        fs::write(
            &path,
            r#"{"mods_enabled/a.jar":"abc123","config/b.toml":"def456"}"#,
        )
        .unwrap();

        let manifest = HashManifest::load(&path).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("mods_enabled/a.jar"), Some("abc123"));
        assert_eq!(manifest.get("missing"), None);

        let paths: Vec<&str> = manifest.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["config/b.toml", "mods_enabled/a.jar"]);
    }

    #[test]
    fn test_hash_manifest_rejects_non_string_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashmap.json");
        fs::write(&path, r#"{"a.jar":42}"#).unwrap();

        let result = HashManifest::load(&path);
        assert!(matches!(result, Err(ModhostError::Metadata(_))));
    }

    #[test]
    fn test_hash_manifest_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = HashManifest::load(&temp_dir.path().join("hashmap.json"));
        assert!(matches!(result, Err(ModhostError::NotFound(_))));
    }
}
