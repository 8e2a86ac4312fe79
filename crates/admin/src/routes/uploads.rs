//! Image upload endpoint.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::images::is_heic;
use crate::state::AppState;

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// `POST /api/uploads` - multipart image upload.
///
/// HEIC/HEIF uploads (detected by content type, extension, or magic bytes)
/// are transcoded to JPEG before hitting the bucket; everything else is
/// stored as-is under a fresh UUID name.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;

    let filename = field.file_name().map(ToString::to_string);
    let content_type = field.content_type().map(ToString::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?
        .to_vec();

    if bytes.is_empty() {
        return Err(AppError::BadRequest("empty upload".to_string()));
    }

    let heic = is_heic(content_type.as_deref(), filename.as_deref(), &bytes);
    let (bytes, content_type, extension) = if heic {
        info!(?filename, "transcoding HEIC upload to JPEG");
        let jpeg = state.transcoder().to_jpeg(&bytes).await?;
        (jpeg, "image/jpeg".to_string(), "jpg".to_string())
    } else {
        let extension = file_extension(filename.as_deref(), content_type.as_deref());
        (
            bytes,
            content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            extension,
        )
    };

    let path = format!("products/{}.{extension}", Uuid::new_v4());
    let url = state
        .backend()
        .upload_object(&path, bytes, &content_type)
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

/// Pick a storage extension: filename extension first, then the content
/// type subtype, then a generic fallback.
fn file_extension(filename: Option<&str>, content_type: Option<&str>) -> String {
    let from_name = filename
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .map(str::to_ascii_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    content_type
        .and_then(|ct| ct.split(';').next())
        .and_then(|ct| ct.rsplit_once('/').map(|(_, sub)| sub))
        .map(str::to_ascii_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_filename() {
        assert_eq!(file_extension(Some("photo.PNG"), Some("image/jpeg")), "png");
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        assert_eq!(file_extension(None, Some("image/webp")), "webp");
        assert_eq!(file_extension(Some("noext"), Some("image/png")), "png");
    }

    #[test]
    fn extension_defaults_to_bin() {
        assert_eq!(file_extension(None, None), "bin");
        assert_eq!(file_extension(Some("weird."), None), "bin");
    }
}
