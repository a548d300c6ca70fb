/// Client error type shared by the gateway, session and controllers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Remote errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Client-side checks
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A submission is already in flight")]
    Busy,

    #[error("{0} not found")]
    NotFound(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Build a rejection from a status code and an optional backend message
    pub fn rejected(status: u16, detail: Option<String>) -> Self {
        AppError::Rejected { status, detail }
    }

    /// One-line text suitable for a failure notification
    pub fn notice_detail(&self) -> String {
        match self {
            AppError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            AppError::Rejected {
                status,
                detail: None,
            } => format!("request rejected ({})", status),
            AppError::Network(_) => "could not reach the server".to_string(),
            other => other.to_string(),
        }
    }

    /// Status code of a rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Convenient conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;
