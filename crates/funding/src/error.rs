//! Funding error types

use thiserror::Error;

/// Funding-related errors
#[derive(Debug, Error)]
pub enum FundingError {
    /// The funding service could not be reached
    #[error("Funding service unreachable: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("Funding service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be understood
    #[error("Malformed funding response: {0}")]
    Malformed(String),

    /// The account was already created, by an earlier request or externally
    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    /// The service understood the request and refused it
    #[error("Funding rejected: {0}")]
    Rejected(String),
}

/// Result type for funding operations
pub type FundingResult<T> = Result<T, FundingError>;

impl FundingError {
    /// True when the failure was a transport problem or a server-side error
    pub fn is_retryable(&self) -> bool {
        match self {
            FundingError::Transport { .. } => true,
            FundingError::Status { status, .. } => *status >= 500,
            FundingError::Malformed(_)
            | FundingError::AlreadyExists(_)
            | FundingError::Rejected(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_retryable() {
        let server = FundingError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        let client = FundingError::Status {
            status: 400,
            body: "bad address".into(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!FundingError::Rejected("faucet empty".into()).is_retryable());
        assert!(!FundingError::AlreadyExists("op_already_exists".into()).is_retryable());
    }

    #[test]
    fn test_status_message() {
        let err = FundingError::Status {
            status: 400,
            body: "op_already_exists".into(),
        };
        assert_eq!(
            err.to_string(),
            "Funding service returned 400: op_already_exists"
        );
    }
}
