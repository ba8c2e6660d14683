pub mod health;
pub mod media_delete;
pub mod media_upload;

use serde::Serialize;

/// Success envelope shared by the media routes.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(success: bool, message: impl Into<String>, data: T) -> Self {
        Self {
            success,
            message: message.into(),
            data,
        }
    }
}
