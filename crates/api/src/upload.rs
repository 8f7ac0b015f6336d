//! Multipart upload extraction for contact files.

use axum::body::Bytes;
use axum::extract::Multipart;
use contacthub_core::import::{FileFormat, ImportError};

use crate::error::{AppError, AppResult};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// A file received in a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Read the `file` field from `multipart`, ignoring any other fields.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            return Ok(Self {
                file_name,
                content_type,
                bytes,
            });
        }

        Err(AppError::BadRequest(
            "No file received in multipart upload".to_string(),
        ))
    }

    /// Resolve the file format from its content type and name.
    pub fn format(&self) -> Result<FileFormat, ImportError> {
        FileFormat::detect(&self.file_name, self.content_type.as_deref())
            .ok_or(ImportError::UnsupportedFormat)
    }
}
