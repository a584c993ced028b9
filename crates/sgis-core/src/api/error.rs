use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// SGIS answered with a nonzero `errCd` in its response envelope.
    #[error("SGIS error [{code}]: {message}")]
    Remote { code: i64, message: String },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data in errors
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a decode error for a body that could not be parsed as JSON.
    pub fn undecodable(status: reqwest::StatusCode, body: &str, cause: impl std::fmt::Display) -> Self {
        ApiError::Decode(format!(
            "status {}: {} ({})",
            status,
            cause,
            Self::truncate_body(body)
        ))
    }

    /// The upstream error code, if this error came from the SGIS envelope.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            ApiError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
