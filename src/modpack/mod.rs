//! Modpack directory management.
//!
//! This module provides the on-disk side of the service:
//! - One directory per modpack id under the store root
//! - Token-based ownership checks against `modpack.json`
//! - Path resolution that keeps every access inside a modpack's tree
//! - Upload staging and ZIP extraction

pub mod archive;
mod metadata;
pub mod path;
mod staging;
mod store;

pub use archive::ExtractSummary;
pub use metadata::{HashManifest, ModpackInfo};
pub use staging::{StagedFile, UploadStaging};
pub use store::ModpackStore;

/// Name of the metadata file at the root of every modpack.
pub const METADATA_FILE: &str = "modpack.json";

/// Name of the externally produced hash manifest.
pub const HASH_MANIFEST_FILE: &str = "hashmap.json";

/// Directory for enabled mods, created with every modpack.
pub const MODS_ENABLED_DIR: &str = "mods_enabled";

/// Directory for disabled mods, created with every modpack.
pub const MODS_DISABLED_DIR: &str = "mods_disabled";

/// Version written into new metadata.
pub const DEFAULT_VERSION: &str = "0.0.0";
