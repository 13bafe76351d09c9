//! Core Error Types
//!
//! Defines the foundational error taxonomy used across the Segflow workspace.
//! These error types are dependency-free (only thiserror + serde_json + std)
//! so every member crate can share them.
//!
//! `InvalidGrid`, `UnknownTool`, and `OracleParse` carry the refinement
//! loop's failure semantics; the remaining variants cover ambient concerns
//! (I/O, serialization, validation).

use thiserror::Error;

/// Core error type for the Segflow workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Requested patch grid exceeds the image dimensions (a patch would be
    /// empty). Fatal to the split call.
    #[error("Invalid patch grid: {rows}x{cols} grid on {height}x{width} image")]
    InvalidGrid {
        rows: u32,
        cols: u32,
        height: u32,
        width: u32,
    },

    /// The oracle named a tool that is not part of the closed vocabulary or
    /// not registered. Never silently ignored or treated as a verdict.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The oracle decision response is not well-formed. Fails the round;
    /// the oracle call is not retried within the same round.
    #[error("Oracle parse error: {0}")]
    OracleParse(String),

    /// Parameter or state validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid-grid error
    pub fn invalid_grid(rows: u32, cols: u32, height: u32, width: u32) -> Self {
        Self::InvalidGrid {
            rows,
            cols,
            height,
            width,
        }
    }

    /// Create an unknown-tool error
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create an oracle parse error
    pub fn oracle_parse(msg: impl Into<String>) -> Self {
        Self::OracleParse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_grid_display() {
        let err = CoreError::invalid_grid(300, 4, 256, 256);
        assert_eq!(
            err.to_string(),
            "Invalid patch grid: 300x4 grid on 256x256 image"
        );
    }

    #[test]
    fn test_unknown_tool_display() {
        let err = CoreError::unknown_tool("RepaintSky");
        assert_eq!(err.to_string(), "Unknown tool: RepaintSky");
    }

    #[test]
    fn test_oracle_parse_display() {
        let err = CoreError::oracle_parse("missing `tool` field");
        assert!(err.to_string().contains("Oracle parse error"));
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = CoreError::validation("overlap must be non-negative");
        let msg: String = err.into();
        assert!(msg.contains("Validation error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let core_err: CoreError = serde_err.into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }
}
