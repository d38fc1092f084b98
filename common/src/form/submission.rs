//! Turning a draft into the multipart body of `POST /submit`, and reading
//! the response back.

use thiserror::Error;

use crate::model::draft::Draft;
use crate::model::image::{extension_for, ImageRejection, MAX_IMAGE_BYTES};
use crate::model::standard::join_codes;
use crate::requests::{fields, ErrorResponse, SubmitResponse};

/// Message fragment the backend uses when the session has no token.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please fill in all required fields")]
    Invalid,
    #[error("Image {index} exceeds maximum size of {}kB", MAX_IMAGE_BYTES / 1024)]
    ImageTooLarge { index: usize },
    #[error("Image {index}: {source}")]
    Image {
        index: usize,
        #[source]
        source: ImageRejection,
    },
    #[error("Could not encode GPIO pins: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub field_name: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Ordered text fields plus binary image parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub fields: Vec<(&'static str, String)>,
    pub images: Vec<ImagePart>,
}

impl SubmissionPayload {
    /// Builds the payload. Images are re-checked against the size ceiling
    /// because a restored draft never went through ingestion.
    pub fn from_draft(draft: &Draft) -> Result<Self, SubmitError> {
        let pins = serde_json::to_string(&draft.populated_pins())
            .map_err(|e| SubmitError::Encode(e.to_string()))?;
        let tags = draft.tags.iter().cloned().collect::<Vec<_>>().join(",");

        let mut payload = SubmissionPayload::default();
        payload.push(fields::SLUG, draft.slug.trim());
        payload.push(fields::BOARD_NAME, draft.board_name.trim());
        payload.push(fields::DESCRIPTION, draft.description.trim());
        payload.push(
            fields::CHIP_TYPE,
            draft.chip_type.map(|c| c.name()).unwrap_or_default(),
        );
        let link = draft.product_link.trim();
        if !link.is_empty() {
            payload.push(fields::PRODUCT_LINK, link);
        }
        payload.push(fields::DIFFICULTY_RATING, &draft.difficulty_rating);
        payload.push(fields::MADE_FOR_ESPHOME, &draft.made_for_esphome);
        payload.push(
            fields::ELECTRICAL_STANDARDS,
            &join_codes(&draft.electrical_standards),
        );
        payload.push(fields::GPIO_PINS, &pins);
        payload.push(fields::TAGS, &tags);
        payload.push(fields::YAML_CONFIG, &draft.yaml_text);

        for (i, image) in draft.images.iter().enumerate() {
            let decoded = image.decode().map_err(|source| SubmitError::Image {
                index: i + 1,
                source,
            })?;
            if decoded.bytes.len() > MAX_IMAGE_BYTES {
                return Err(SubmitError::ImageTooLarge { index: i + 1 });
            }
            payload.images.push(ImagePart {
                field_name: format!("{}{}", fields::IMAGE_PREFIX, i),
                file_name: format!("image{}.{}", i, extension_for(&decoded.mime)),
                mime: decoded.mime,
                bytes: decoded.bytes,
            });
        }

        Ok(payload)
    }

    fn push(&mut self, name: &'static str, value: &str) {
        self.fields.push((name, value.to_string()));
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success { review_url: Option<String> },
    AuthenticationRequired,
    Failed(String),
}

impl SubmitOutcome {
    /// Classifies a response from its status code and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if (200..300).contains(&status) {
            return match serde_json::from_str::<SubmitResponse>(body) {
                Ok(resp) if resp.success => SubmitOutcome::Success {
                    review_url: resp.pr_url,
                },
                Ok(_) => SubmitOutcome::Failed("Submission failed".into()),
                Err(e) => SubmitOutcome::Failed(format!("Unexpected response: {e}")),
            };
        }
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| "Submission failed".to_string());
        Self::from_error_message(message)
    }

    /// Classifies a failure known only by its message, e.g. a network error.
    pub fn from_error_message(message: String) -> Self {
        if message.contains(AUTH_REQUIRED_MESSAGE) {
            SubmitOutcome::AuthenticationRequired
        } else {
            SubmitOutcome::Failed(message)
        }
    }
}
