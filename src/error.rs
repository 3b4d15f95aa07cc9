//! Error types for the fireworks engine.
//!
//! Only the outer layers can fail: loading the shared particle texture and
//! reading a [`FireworksConfig`](crate::FireworksConfig). The simulation core
//! itself is total. Unknown pattern tags fall back to zero velocity and
//! precondition violations (advancing a disposed effect, releasing a drawable
//! twice) panic.

use std::fmt;

/// Errors that can occur while building the shared particle texture.
#[derive(Debug)]
pub enum TextureError {
    /// Failed to decode the image file.
    ImageLoad(image::ImageError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// Raw RGBA data does not match `width * height * 4`.
    SizeMismatch {
        /// Bytes expected from the dimensions.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::ImageLoad(e) => write!(f, "Failed to decode particle texture: {}", e),
            TextureError::Io(e) => write!(f, "Failed to read particle texture: {}", e),
            TextureError::SizeMismatch { expected, actual } => write!(
                f,
                "RGBA data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::ImageLoad(e) => Some(e),
            TextureError::Io(e) => Some(e),
            TextureError::SizeMismatch { .. } => None,
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::ImageLoad(e)
    }
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::Io(e)
    }
}

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    Io(std::io::Error),
    /// The file is not valid JSON for [`FireworksConfig`](crate::FireworksConfig).
    Parse(serde_json::Error),
    /// A value is out of range.
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
