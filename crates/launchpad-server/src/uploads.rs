use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use http::StatusCode;
use launchpad_config::UploadsConfig;
use launchpad_core::{SchemaError, UploadError};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::reply::Success;

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    /// Form field the file was sent under
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub files: Vec<UploadedFile>,
}

/// Receive a multipart upload, enforcing the per-file size and file count limits
///
/// Parts without a file name are ordinary form fields and are skipped. File
/// contents are measured as they stream in and are not retained.
pub async fn receive(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Success<UploadReceipt>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| SchemaError::new().with("body", rejection.body_text()))?;
    let limits = &state.uploads;
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| upload_error(&e, limits))? {
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };

        if files.len() == limits.max_files {
            return Err(UploadError::TooManyFiles {
                limit: limits.max_files,
            }
            .into());
        }

        let name = field.name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(ToOwned::to_owned);

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| upload_error(&e, limits))? {
            size = size.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
            if size > limits.max_file_size {
                return Err(UploadError::FileTooLarge {
                    limit: limits.max_file_size,
                }
                .into());
            }
        }

        files.push(UploadedFile {
            name,
            file_name,
            content_type,
            size,
        });
    }

    tracing::debug!(count = files.len(), "upload received");
    Ok(Success(UploadReceipt { files }))
}

/// Stream failures, with body-limit hits reported as an oversized file
fn upload_error(err: &MultipartError, limits: &UploadsConfig) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge {
            limit: limits.max_file_size,
        }
    } else {
        UploadError::Other { message: err.body_text() }
    }
}
