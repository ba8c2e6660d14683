use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tourmedia_core::{AppError, CompressionResult, ContentDomain, UploadMode};
use tourmedia_processing::{CompressionSummary, FinalizedFile, UploadIntake};
use tourmedia_storage::public_url;
use utoipa::{IntoParams, ToSchema};

use super::ApiResponse;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::receive_upload;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Re-encode images and transcode videos (default `true`).
    pub compress: Option<bool>,
}

/// One stored file, as a controller would persist and render it.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFileResponse {
    pub fieldname: String,
    /// Bare filename; the only value to persist.
    pub filename: String,
    pub originalname: String,
    pub mimetype: String,
    pub size: u64,
    pub path: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadData {
    pub files: Vec<UploadedFileResponse>,
    /// Field name to bare filenames, in receive order.
    pub fields: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionSummary>,
}

#[utoipa::path(
    post,
    path = "/api/v1/media/{content_domain}/{mode}",
    tag = "media",
    params(
        ("content_domain" = String, Path, description = "Storage partition, e.g. `posts`"),
        ("mode" = String, Path, description = "single-image | single-video | multi-image | multi-video | mixed"),
        UploadQuery
    ),
    responses(
        (status = 200, description = "Files stored", body = UploadData),
        (status = 400, description = "Invalid type, unexpected field or no file", body = ErrorResponse),
        (status = 413, description = "File too large or too many files", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path((content_domain, mode)): Path<(String, String)>,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadData>>, HttpAppError> {
    let domain = ContentDomain::parse(&content_domain).map_err(AppError::from)?;
    let mode: UploadMode = mode
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
    let multipart = multipart?;

    let intake = UploadIntake::new(
        mode,
        state.media.limits,
        state.media.store.clone(),
        domain.clone(),
    );
    let shape = receive_upload(multipart, intake).await?;

    let compress = query.compress.unwrap_or(true);
    let outcome = state.media.pipeline.process(shape, compress).await;

    let fields = outcome.fields();
    let files: Vec<UploadedFileResponse> = outcome
        .files
        .into_iter()
        .map(|file| to_response(&state, &domain, file))
        .collect();

    let message = match outcome.compression {
        Some(summary) => format!(
            "{} file(s) uploaded, {} of {} compressed",
            files.len(),
            summary.succeeded,
            summary.attempted
        ),
        None => format!("{} file(s) uploaded", files.len()),
    };

    tracing::info!(
        content_domain = %domain,
        mode = %mode,
        files = files.len(),
        "Upload complete"
    );

    Ok(Json(ApiResponse::new(
        true,
        message,
        UploadData {
            files,
            fields,
            compression: outcome.compression,
        },
    )))
}

fn to_response(
    state: &AppState,
    domain: &ContentDomain,
    file: FinalizedFile,
) -> UploadedFileResponse {
    let kind = file.asset.kind;
    UploadedFileResponse {
        path: state
            .media
            .store
            .layout()
            .display_path(kind, domain, &file.filename),
        url: public_url(state.config.public_base_url(), kind, domain, &file.filename),
        fieldname: file.field_name,
        filename: file.filename,
        originalname: file.asset.original_name,
        mimetype: file.asset.mime_type,
        size: file.asset.size_bytes,
        compression: file.compression,
    }
}
