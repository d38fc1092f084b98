//! JSON bodies exchanged between the form and the backend.

use serde::{Deserialize, Serialize};

/// `GET /auth/check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AuthStatus {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Query of `GET /checkSlug`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

/// Answer of `GET /checkSlug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugAvailability {
    pub available: bool,
}

/// Successful `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `POST /auth/logout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Multipart field names shared by the form and the submit handler.
pub mod fields {
    pub const SLUG: &str = "slug";
    pub const BOARD_NAME: &str = "boardName";
    pub const DESCRIPTION: &str = "description";
    pub const CHIP_TYPE: &str = "chipType";
    pub const PRODUCT_LINK: &str = "productLink";
    pub const DIFFICULTY_RATING: &str = "difficultyRating";
    pub const MADE_FOR_ESPHOME: &str = "madeForESPHome";
    pub const ELECTRICAL_STANDARDS: &str = "electricalStandards";
    pub const GPIO_PINS: &str = "gpioPins";
    pub const TAGS: &str = "tags";
    pub const YAML_CONFIG: &str = "yamlConfig";
    /// Prefix of image parts: `image0`, `image1`, ...
    pub const IMAGE_PREFIX: &str = "image";
}
