use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading cases or driving the translator page
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Input failed: {0}")]
    InputFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse page snapshot: {0}")]
    SnapshotParseFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Failed to read test data {path}: {reason}")]
    DataFile { path: PathBuf, reason: String },

    #[error("Invalid test case at position {position}: {reason}")]
    InvalidCase { position: usize, reason: String },

    #[error("Duplicate test case id: {0}")]
    DuplicateCase(String),

    #[error("Timed out after {elapsed_ms}ms (limit {limit_ms}ms) during {step}")]
    Timeout { step: String, elapsed_ms: u128, limit_ms: u128 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, SuiteError>;
