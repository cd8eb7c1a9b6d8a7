//! Modpack lifecycle and metadata handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::modpack::HashManifest;
use crate::web::dto::{MessageResponse, ModpackInfoResponse, OwnerRequest, OwnershipResponse};
use crate::web::error::ApiError;
use crate::ModhostError;

use super::AppState;

/// POST /createModpackDirectory/:uuid/:token - Create a modpack owned by `token`.
#[utoipa::path(
    post,
    path = "/createModpackDirectory/{uuid}/{token}",
    tag = "modpacks",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("token" = String, Path, description = "Owner token")
    ),
    responses(
        (status = 200, description = "Modpack created", body = MessageResponse),
        (status = 400, description = "Modpack already exists or invalid id"),
        (status = 500, description = "Storage error")
    )
)]
pub async fn create_modpack(
    State(state): State<Arc<AppState>>,
    Path((uuid, token)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.create_modpack(&uuid, &token)?;
    Ok(Json(MessageResponse::new(
        "Modpack directory created successfully",
    )))
}

/// DELETE /removeModpack/:uuid - Remove a modpack and everything in it.
#[utoipa::path(
    delete,
    path = "/removeModpack/{uuid}",
    tag = "modpacks",
    params(
        ("uuid" = String, Path, description = "Modpack id"),
        ("token" = Option<String>, Header, description = "Owner token, checked only in strict mode")
    ),
    responses(
        (status = 200, description = "Modpack removed", body = MessageResponse),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Modpack not found")
    )
)]
pub async fn remove_modpack(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    state.check_optional_owner(&uuid, &headers)?;
    state.store.delete_modpack(&uuid)?;
    Ok(Json(MessageResponse::new("Modpack deleted successfully")))
}

/// GET /getModpackInfo/:uuid - Modpack metadata with the token redacted.
#[utoipa::path(
    get,
    path = "/getModpackInfo/{uuid}",
    tag = "modpacks",
    params(
        ("uuid" = String, Path, description = "Modpack id")
    ),
    responses(
        (status = 200, description = "Modpack metadata", body = ModpackInfoResponse),
        (status = 404, description = "Modpack not found"),
        (status = 500, description = "Unreadable metadata")
    )
)]
pub async fn get_modpack_info(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> Result<Json<ModpackInfoResponse>, ApiError> {
    let info = state.store.read_info(&uuid)?;
    Ok(Json(info.into()))
}

/// GET /getModpackHashMap/:uuid - Relative path to content hash.
#[utoipa::path(
    get,
    path = "/getModpackHashMap/{uuid}",
    tag = "modpacks",
    params(
        ("uuid" = String, Path, description = "Modpack id")
    ),
    responses(
        (status = 200, description = "Hash manifest", body = std::collections::HashMap<String, String>),
        (status = 404, description = "Modpack or manifest not found"),
        (status = 500, description = "Unreadable manifest")
    )
)]
pub async fn get_modpack_hash_map(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> Result<Json<HashManifest>, ApiError> {
    let manifest = state.store.read_hash_manifest(&uuid)?;
    Ok(Json(manifest))
}

/// POST /isOwner/:uuid - Check whether a token owns a modpack.
///
/// A missing or malformed body is treated as an empty token.
#[utoipa::path(
    post,
    path = "/isOwner/{uuid}",
    tag = "modpacks",
    params(
        ("uuid" = String, Path, description = "Modpack id")
    ),
    request_body = OwnerRequest,
    responses(
        (status = 200, description = "Token owns the modpack", body = OwnershipResponse),
        (status = 403, description = "Token does not own the modpack", body = OwnershipResponse),
        (status = 404, description = "Modpack not found", body = OwnershipResponse),
        (status = 500, description = "Unreadable metadata", body = OwnershipResponse)
    )
)]
pub async fn is_owner(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
    body: Result<Json<OwnerRequest>, JsonRejection>,
) -> (StatusCode, Json<OwnershipResponse>) {
    let token = match body {
        Ok(Json(req)) => req.token,
        Err(e) => {
            tracing::debug!("Ignoring unreadable isOwner body: {}", e);
            String::new()
        }
    };

    match state.store.authorize(&uuid, &token) {
        Ok(()) => (StatusCode::OK, Json(OwnershipResponse::owner())),
        Err(ModhostError::Forbidden(_)) => {
            (StatusCode::FORBIDDEN, Json(OwnershipResponse::not_owner()))
        }
        Err(ModhostError::NotFound(_)) | Err(ModhostError::InvalidPath(_)) => {
            (StatusCode::NOT_FOUND, Json(OwnershipResponse::not_found()))
        }
        Err(e) => {
            tracing::error!(modpack = %uuid, "Ownership check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OwnershipResponse::internal()),
            )
        }
    }
}
