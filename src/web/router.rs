//! Router configuration for the modpack API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    ExtractResponse, MessageResponse, ModpackInfoResponse, OwnerRequest, OwnershipResponse,
};
use super::handlers::{
    self, create_modpack, get_modpack_file, get_modpack_hash_map, get_modpack_info, is_owner,
    remove_modpack, remove_modpack_file, upload_and_unzip, upload_file, AppState,
};
use super::middleware::create_cors_layer;

/// OpenAPI document for the modpack API.
#[derive(OpenApi)]
#[openapi(
    info(title = "modhost", description = "Modpack directory host"),
    paths(
        handlers::modpack::create_modpack,
        handlers::modpack::remove_modpack,
        handlers::modpack::get_modpack_info,
        handlers::modpack::get_modpack_hash_map,
        handlers::modpack::is_owner,
        handlers::file::upload_file,
        handlers::file::remove_modpack_file,
        handlers::file::upload_and_unzip,
        handlers::file::get_modpack_file,
    ),
    components(schemas(
        MessageResponse,
        ExtractResponse,
        ModpackInfoResponse,
        OwnerRequest,
        OwnershipResponse,
    )),
    tags(
        (name = "modpacks", description = "Modpack lifecycle and metadata"),
        (name = "files", description = "Files inside a modpack")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_bytes: usize,
) -> Router {
    let modpack_routes = Router::new()
        .route("/createModpackDirectory/:uuid/:token", post(create_modpack))
        .route("/removeModpack/:uuid", delete(remove_modpack))
        .route("/getModpackInfo/:uuid", get(get_modpack_info))
        .route("/getModpackHashMap/:uuid", get(get_modpack_hash_map))
        .route("/isOwner/:uuid", post(is_owner));

    let file_routes = Router::new()
        .route("/uploadFile/:uuid/*path", post(upload_file))
        .route("/removeModpackFile/:uuid/*path", delete(remove_modpack_file))
        .route("/uploadAndUnzip/:uuid", post(upload_and_unzip))
        .route("/getModpackFile/:uuid/*path", get(get_modpack_file));

    Router::new()
        .merge(modpack_routes)
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
