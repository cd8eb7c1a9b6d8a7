//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::modpack::{ExtractSummary, ModpackInfo};

/// Plain success message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of uploading and extracting an archive.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractResponse {
    /// Human-readable message.
    pub message: String,
    /// Number of files written.
    pub files: usize,
    /// Number of directory entries created.
    pub directories: usize,
}

impl From<ExtractSummary> for ExtractResponse {
    fn from(summary: ExtractSummary) -> Self {
        Self {
            message: "File uploaded and extracted successfully".to_string(),
            files: summary.files,
            directories: summary.directories,
        }
    }
}

/// Modpack metadata as returned to clients. `token` is always redacted.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModpackInfoResponse {
    /// Display name.
    pub name: String,
    /// Image URL or path.
    pub image: String,
    /// Owner token, always empty.
    pub token: String,
    /// Modpack id.
    pub uuid: String,
    /// Content hash as stored.
    pub hash: String,
    /// Modpack version.
    pub version: String,
}

impl From<ModpackInfo> for ModpackInfoResponse {
    fn from(info: ModpackInfo) -> Self {
        let info = info.redacted();
        Self {
            name: info.name,
            image: info.image,
            token: info.token,
            uuid: info.uuid,
            hash: info.hash,
            version: info.version,
        }
    }
}

/// Ownership check result.
///
/// `code` is 0 for the owner, -1 when the modpack does not exist and -2 for
/// a wrong token or a failed check.
#[derive(Debug, Serialize, ToSchema)]
pub struct OwnershipResponse {
    /// Success message, set only for the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Result code.
    pub code: i32,
}

impl OwnershipResponse {
    /// The token owns the modpack.
    pub fn owner() -> Self {
        Self {
            message: Some("Token is valid and matches modpack owner".to_string()),
            error: None,
            code: 0,
        }
    }

    /// No such modpack.
    pub fn not_found() -> Self {
        Self::failure("Modpack not found", -1)
    }

    /// The token does not own the modpack.
    pub fn not_owner() -> Self {
        Self::failure("Invalid token or not the modpack owner", -2)
    }

    /// The check itself failed.
    pub fn internal() -> Self {
        Self::failure("An error occurred", -2)
    }

    fn failure(error: &str, code: i32) -> Self {
        Self {
            message: None,
            error: Some(error.to_string()),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_json() {
        let json = serde_json::to_value(MessageResponse::new("done")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "done" }));
    }

    #[test]
    fn test_ownership_response_json() {
        let owner = serde_json::to_value(OwnershipResponse::owner()).unwrap();
        assert_eq!(owner["code"], 0);
        assert!(owner.get("error").is_none());

        let not_owner = serde_json::to_value(OwnershipResponse::not_owner()).unwrap();
        assert_eq!(not_owner["code"], -2);
        assert!(not_owner.get("message").is_none());

        let missing = serde_json::to_value(OwnershipResponse::not_found()).unwrap();
        assert_eq!(missing["code"], -1);
        assert_eq!(missing["error"], "Modpack not found");
    }

    #[test]
    fn test_modpack_info_response_redacts_token() {
        let response = ModpackInfoResponse::from(ModpackInfo::new("p1", "s3cret"));
        assert_eq!(response.uuid, "p1");
        assert_eq!(response.token, "");
        assert_eq!(response.version, "0.0.0");
    }
}
