//! Error types for lumaplan

use thiserror::Error;

/// The main error type for lumaplan operations
#[derive(Debug, Error)]
pub enum LumaplanError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Level not found: {0}")]
    LevelNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Geometry error: {0}")]
    GeometryError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Render interrupted")]
    Interrupted,
}

impl LumaplanError {
    /// True for the cancellation signal raised by an interrupted render pass.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, LumaplanError::Interrupted)
    }
}

/// Result type alias for lumaplan operations
pub type Result<T> = std::result::Result<T, LumaplanError>;

impl From<toml::de::Error> for LumaplanError {
    fn from(err: toml::de::Error) -> Self {
        LumaplanError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for LumaplanError {
    fn from(err: toml::ser::Error) -> Self {
        LumaplanError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for LumaplanError {
    fn from(err: serde_json::Error) -> Self {
        LumaplanError::JsonError(err.to_string())
    }
}

impl From<image::ImageError> for LumaplanError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => LumaplanError::IoError(e),
            other => LumaplanError::ImageError(other.to_string()),
        }
    }
}
