use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tourmedia_core::{AppError, BatchDeletionReport, ContentDomain};
use utoipa::ToSchema;

use super::ApiResponse;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaRequest {
    /// Bare filenames, relative paths or public URLs.
    pub identifiers: Vec<String>,
    /// Partition to look in first; anchored identifiers carry their own.
    #[serde(default)]
    pub content_domain: Option<String>,
}

#[utoipa::path(
    delete,
    path = "/api/v1/media",
    tag = "media",
    request_body = DeleteMediaRequest,
    responses(
        (status = 200, description = "Per-identifier results", body = BatchDeletionReport),
        (status = 400, description = "Empty or oversized batch", body = ErrorResponse)
    )
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<DeleteMediaRequest>,
) -> Result<Json<ApiResponse<BatchDeletionReport>>, HttpAppError> {
    if body.identifiers.is_empty() {
        return Err(AppError::BadRequest("No identifiers provided".to_string()).into());
    }
    let max = state.config.max_batch_delete();
    if body.identifiers.len() > max {
        return Err(AppError::BadRequest(format!(
            "Batch size exceeds maximum of {}",
            max
        ))
        .into());
    }

    let domain = body
        .content_domain
        .as_deref()
        .map(ContentDomain::parse)
        .transpose()
        .map_err(AppError::from)?;

    let report = state
        .media
        .executor
        .delete_all(&body.identifiers, domain.as_ref())
        .await;

    let message = format!(
        "Deleted {} of {} file(s)",
        report.deleted_count, report.total_files
    );
    Ok(Json(ApiResponse::new(
        report.failed_count == 0,
        message,
        report,
    )))
}
