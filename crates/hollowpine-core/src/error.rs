//! Error types at the crate boundary
//!
//! The simulation itself never fails: anomalies degrade to "no movement" or
//! "no flicker". These errors cover the two places where the host hands data
//! to the core: configuration and asset loading.

use thiserror::Error;

/// Configuration could not be parsed or failed validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse RON configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] ron::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Reported by the host when an asynchronous asset load fails
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to decode asset `{path}`: {reason}")]
    Decode { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_names_field() {
        let err = ConfigError::invalid("world.cell_size", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid value for `world.cell_size`: must be positive"
        );
    }

    #[test]
    fn test_asset_error_display() {
        let err = AssetError::NotFound("ghost.png".to_string());
        assert_eq!(err.to_string(), "asset not found: ghost.png");
    }
}
