//! HEIC/HEIF upload handling.
//!
//! Browsers cannot render HEIC, so uploads in that format are transcoded to
//! JPEG before they reach the storage bucket. Detection checks the declared
//! content type, the file extension, and the ISO-BMFF brand bytes; any one
//! hit counts.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::instrument;
use uuid::Uuid;

/// Content types that declare HEIC/HEIF.
const HEIC_CONTENT_TYPES: &[&str] = &[
    "image/heic",
    "image/heif",
    "image/heic-sequence",
    "image/heif-sequence",
];

/// ISO-BMFF major brands used by HEIC/HEIF files.
const HEIC_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Whether an upload is HEIC/HEIF, by content type, extension, or magic
/// bytes.
#[must_use]
pub fn is_heic(content_type: Option<&str>, filename: Option<&str>, bytes: &[u8]) -> bool {
    if let Some(content_type) = content_type {
        let declared = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        if HEIC_CONTENT_TYPES.contains(&declared.as_str()) {
            return true;
        }
    }

    if let Some(filename) = filename {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".heic") || lower.ends_with(".heif") {
            return true;
        }
    }

    has_heic_brand(bytes)
}

/// Check the `ftyp` box at offset 4 and its major brand at offset 8.
fn has_heic_brand(bytes: &[u8]) -> bool {
    let Some(ftyp) = bytes.get(4..8) else {
        return false;
    };
    if ftyp != b"ftyp" {
        return false;
    }
    let Some(brand) = bytes.get(8..12) else {
        return false;
    };
    HEIC_BRANDS.iter().any(|b| brand == *b)
}

/// Transcoding failures.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("transcode I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("converter exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

/// Converts image bytes to JPEG. Seam so tests never shell out.
#[async_trait]
pub trait ImageTranscoder: Send + Sync {
    async fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError>;
}

/// Transcoder that shells out to an external converter (`heif-convert` by
/// default) through temp files.
pub struct CommandTranscoder {
    command: String,
}

impl CommandTranscoder {
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl ImageTranscoder for CommandTranscoder {
    #[instrument(skip(self, bytes), fields(command = %self.command, size = bytes.len()))]
    async fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let work_id = Uuid::new_v4();
        let input = std::env::temp_dir().join(format!("{work_id}.heic"));
        let output = std::env::temp_dir().join(format!("{work_id}.jpg"));

        tokio::fs::write(&input, bytes).await?;

        let result = Command::new(&self.command)
            .arg(&input)
            .arg(&output)
            .output()
            .await;

        let jpeg = match result {
            Ok(out) if out.status.success() => tokio::fs::read(&output).await.map_err(Into::into),
            Ok(out) => Err(TranscodeError::CommandFailed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }),
            Err(e) => Err(TranscodeError::Io(e)),
        };

        // Temp files are best-effort cleanup
        let _ = tokio::fs::remove_file(&input).await;
        let _ = tokio::fs::remove_file(&output).await;

        jpeg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heic_header(brand: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 0x18];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(brand);
        bytes.extend_from_slice(&[0; 8]);
        bytes
    }

    #[test]
    fn detects_by_content_type() {
        assert!(is_heic(Some("image/heic"), None, &[]));
        assert!(is_heic(Some("IMAGE/HEIF; charset=binary"), None, &[]));
        assert!(!is_heic(Some("image/jpeg"), None, &[]));
    }

    #[test]
    fn detects_by_extension() {
        assert!(is_heic(None, Some("IMG_0001.HEIC"), &[]));
        assert!(is_heic(None, Some("photo.heif"), &[]));
        assert!(!is_heic(None, Some("photo.jpg"), &[]));
    }

    #[test]
    fn detects_by_magic_bytes() {
        assert!(is_heic(None, None, &heic_header(b"heic")));
        assert!(is_heic(None, None, &heic_header(b"mif1")));
        // JPEG magic is not an ftyp box
        assert!(!is_heic(None, None, &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]));
    }

    #[test]
    fn short_payload_is_not_heic() {
        assert!(!is_heic(None, None, b"ftyp"));
        assert!(!is_heic(None, None, &[]));
    }

    #[test]
    fn non_heic_brand_is_not_heic() {
        assert!(!is_heic(None, None, &heic_header(b"isom")));
    }
}
