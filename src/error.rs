//! Error handling for FastCV

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FastCvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("AI service error (HTTP {status}): {message}")]
    AiService { status: u16, message: String },

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("AI request blocked: {0}")]
    Blocked(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    #[error("Index {index} out of range for {list} (length {len})")]
    IndexOutOfRange {
        list: String,
        index: usize,
        len: usize,
    },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("No base profile saved yet. Run `fastcv profile extract` first")]
    NoProfile,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FastCvError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for FastCvError {
    fn from(err: anyhow::Error) -> Self {
        FastCvError::Other(format!("{:#}", err))
    }
}

impl FastCvError {
    /// Whether a failed AI request is worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            FastCvError::AiService { status, .. } => *status == 429 || *status >= 500,
            FastCvError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        let rate_limited = FastCvError::AiService { status: 429, message: "slow down".into() };
        let unavailable = FastCvError::AiService { status: 503, message: "busy".into() };
        let bad_request = FastCvError::AiService { status: 400, message: "bad schema".into() };

        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!FastCvError::EmptyResponse.is_transient());
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err = anyhow::anyhow!("inner").context("outer");
        let converted: FastCvError = err.into();
        assert_eq!(converted.to_string(), "outer: inner");
    }
}
