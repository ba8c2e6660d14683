//! OpenAPI documentation, served at `/api/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tourmedia_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tourmedia API",
        version = "0.1.0",
        description = "Media asset pipeline: validated multipart intake, image and video compression, content-domain partitioned storage and batch deletion. JSON routes are versioned under /api/v1/."
    ),
    paths(
        handlers::media_upload::upload_media,
        handlers::media_delete::delete_media,
        handlers::health::health,
        handlers::health::readiness,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::media_upload::UploadedFileResponse,
        handlers::media_upload::UploadData,
        handlers::media_delete::DeleteMediaRequest,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        tourmedia_processing::CompressionSummary,
        models::CompressionResult,
        models::CompressionFailureKind,
        models::BatchDeletionReport,
        models::DeletionOutcome,
        models::UploadErrorCode,
        models::UploadMode,
    )),
    tags(
        (name = "media", description = "Upload and delete media files"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
