//! Board photos attached to a draft.
//!
//! Images are kept as `data:` URIs so the whole draft, pictures included,
//! can be written to browser storage as one JSON document and survive an
//! OAuth redirect. They are decoded back to bytes only when the multipart
//! submission is built.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most images a draft may hold.
pub const MAX_IMAGES: usize = 3;

/// Per-image ceiling, enforced on ingestion and again at submission.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

/// A photo as stored in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftImage {
    pub data_uri: String,
}

/// A decoded image ready to become a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A file or fetched URL body offered to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("{0} is not an image")]
    NotAnImage(String),
    #[error("Image exceeds maximum size of {}kB", MAX_IMAGE_BYTES / 1024)]
    TooLarge { size: usize },
    #[error("You can add at most {MAX_IMAGES} images")]
    LimitReached,
    #[error("Stored image could not be decoded: {0}")]
    Undecodable(String),
}

impl ImageCandidate {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }
}

/// Checks the type and size of an image before its bytes are read, so an
/// oversized file never has to be loaded.
pub fn check_image_metadata(mime: &str, size: usize) -> Result<(), ImageRejection> {
    if !mime.starts_with("image/") {
        let shown = if mime.is_empty() { "File" } else { mime };
        return Err(ImageRejection::NotAnImage(shown.to_string()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ImageRejection::TooLarge { size });
    }
    Ok(())
}

impl DraftImage {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            data_uri: format!(
                "data:{};base64,{}",
                mime,
                general_purpose::STANDARD.encode(bytes)
            ),
        }
    }

    /// Splits the data URI back into its MIME type and raw bytes.
    pub fn decode(&self) -> Result<ImageBytes, ImageRejection> {
        let rest = self
            .data_uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageRejection::Undecodable("missing data: prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageRejection::Undecodable("missing payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageRejection::Undecodable("payload is not base64".to_string()))?;
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ImageRejection::Undecodable(e.to_string()))?;
        Ok(ImageBytes {
            mime: mime.to_string(),
            bytes,
        })
    }
}

/// File extension derived from a MIME subtype: `image/svg+xml` gives `svg`.
pub fn extension_for(mime: &str) -> &str {
    mime.split('/')
        .nth(1)
        .and_then(|sub| sub.split('+').next())
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_keeps_mime_and_bytes() {
        let image = DraftImage::from_bytes("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(image.data_uri.starts_with("data:image/png;base64,"));
        let decoded = image.decode().unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn decode_rejects_non_base64_uris() {
        let image = DraftImage {
            data_uri: "data:image/svg+xml,<svg/>".to_string(),
        };
        assert!(matches!(image.decode(), Err(ImageRejection::Undecodable(_))));
    }

    #[test]
    fn metadata_check_enforces_type_then_size() {
        assert!(check_image_metadata("image/jpeg", MAX_IMAGE_BYTES).is_ok());
        assert_eq!(
            check_image_metadata("image/jpeg", MAX_IMAGE_BYTES + 1),
            Err(ImageRejection::TooLarge {
                size: MAX_IMAGE_BYTES + 1
            })
        );
        assert!(matches!(
            check_image_metadata("application/pdf", 10),
            Err(ImageRejection::NotAnImage(_))
        ));
    }

    #[test]
    fn extension_uses_subtype() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/svg+xml"), "svg");
        assert_eq!(extension_for("image"), "bin");
    }
}
