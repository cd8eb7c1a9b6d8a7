//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Ownership check request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OwnerRequest {
    /// Token to check against the modpack's owner token.
    #[serde(default)]
    pub token: String,
}
