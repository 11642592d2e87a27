//! Error types for Plumb

use thiserror::Error;

/// The main error type for Plumb operations
#[derive(Debug, Error)]
pub enum PlumbError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("Invalid attribute type on {plug}: expected {expected}")]
    InvalidAttributeType { plug: String, expected: String },

    #[error("Not an animation curve: {0}")]
    NotAnAnimCurve(String),

    #[error("Key index {index} out of range for {curve} ({count} key(s))")]
    KeyIndexOutOfRange {
        curve: String,
        index: usize,
        count: usize,
    },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Scene load error: {0}")]
    SceneLoadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Check '{check}' failed: {reason}")]
    CheckFailed { check: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl PlumbError {
    /// True when the error means an earlier edit already removed the node or
    /// connection being referenced.
    ///
    /// Remediation treats these as already resolved. A missing attribute on a
    /// node that still exists is not stale: nothing was changed.
    pub fn is_stale_reference(&self) -> bool {
        matches!(
            self,
            PlumbError::NodeNotFound(_) | PlumbError::ConnectionNotFound(_)
        )
    }
}

/// Result type alias for Plumb operations
pub type Result<T> = std::result::Result<T, PlumbError>;

impl From<toml::de::Error> for PlumbError {
    fn from(err: toml::de::Error) -> Self {
        PlumbError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for PlumbError {
    fn from(err: toml::ser::Error) -> Self {
        PlumbError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_reference_classification() {
        assert!(PlumbError::NodeNotFound("curve1".into()).is_stale_reference());
        assert!(PlumbError::ConnectionNotFound("a.output -> b.input".into()).is_stale_reference());
        assert!(!PlumbError::AttributeNotFound("joint1.visibility".into()).is_stale_reference());
        assert!(!PlumbError::UnknownCollection("XYZ".into()).is_stale_reference());
    }

    #[test]
    fn test_display_messages() {
        let err = PlumbError::KeyIndexOutOfRange {
            curve: "curve1".into(),
            index: 4,
            count: 2,
        };
        assert_eq!(err.to_string(), "Key index 4 out of range for curve1 (2 key(s))");
    }
}
