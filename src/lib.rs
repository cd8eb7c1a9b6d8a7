//! modhost - Modpack file host
//!
//! Serves token-owned modpack directories over HTTP: create a modpack, upload
//! or remove files, expand ZIP archives in place, and read back metadata,
//! hash manifests and files.

pub mod config;
pub mod error;
pub mod logging;
pub mod modpack;
pub mod web;

pub use config::Config;
pub use error::{ModhostError, Result};
pub use modpack::{
    ExtractSummary, HashManifest, ModpackInfo, ModpackStore, StagedFile, UploadStaging,
};
pub use web::WebServer;
