//! Error types for Stackview

use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum StackViewError {
    #[error("Failed to reach backend: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {code} {text}")]
    Status { code: u16, text: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),
}

impl StackViewError {
    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            StackViewError::Network(_) => "NETWORK_ERROR",
            StackViewError::Status { .. } => "HTTP_STATUS",
            StackViewError::Io(_) => "IO_ERROR",
            StackViewError::Serialization(_) => "SERIALIZATION_ERROR",
            StackViewError::InvalidUrl(_) => "INVALID_URL",
            StackViewError::Config(_) => "CONFIG_ERROR",
            StackViewError::BranchNotFound(_) => "BRANCH_NOT_FOUND",
            StackViewError::StackNotFound(_) => "STACK_NOT_FOUND",
        }
    }
}

/// Serializable error response handed to the view
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<&StackViewError> for ErrorResponse {
    fn from(error: &StackViewError) -> Self {
        let details = match error {
            StackViewError::Status { code, .. } => Some(format!("status {}", code)),
            _ => None,
        };

        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl From<StackViewError> for ErrorResponse {
    fn from(error: StackViewError) -> Self {
        ErrorResponse::from(&error)
    }
}

impl serde::Serialize for StackViewError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ErrorResponse::from(self).serialize(serializer)
    }
}

/// Result type alias for Stackview operations
pub type Result<T> = std::result::Result<T, StackViewError>;
