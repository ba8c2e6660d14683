//! Multipart intake for the upload handler

use axum::extract::Multipart;
use bytes::BytesMut;
use tourmedia_core::AppError;
use tourmedia_processing::{UploadIntake, UploadShape};

use crate::error::multipart_error;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Drain `multipart` through `intake`.
///
/// Each file part is checked before its bytes are buffered and re-checked
/// against its size limit chunk by chunk. On any rejection the files already
/// stored for this request are removed.
pub async fn receive_upload(
    mut multipart: Multipart,
    mut intake: UploadIntake,
) -> Result<UploadShape, AppError> {
    match read_parts(&mut multipart, &mut intake).await {
        Ok(()) => intake.finish(),
        Err(e) => {
            intake.abort().await;
            Err(e)
        }
    }
}

async fn read_parts(multipart: &mut Multipart, intake: &mut UploadIntake) -> Result<(), AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        // Text fields ride along with entity forms; only file parts are media.
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(normalize_mime_type)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let part = intake.accept_part(&field_name, &content_type)?;

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            part.check_size((data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }

        let stored = intake
            .store_part(&part, &original_name, data.freeze())
            .await?;
        tracing::debug!(
            field = %field_name,
            media_kind = %stored.kind,
            path = %stored.stored_path.display(),
            size_bytes = stored.size_bytes,
            "Received upload part"
        );
    }
    Ok(())
}

/// Strip MIME parameters (`image/jpeg; charset=utf-8` -> `image/jpeg`).
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}
