//! Hiring backend boundary: REST client and wire types.

mod client;
mod types;

pub use client::BackendClient;
pub use types::{
    Ack, Analysis, AttemptRecord, AuthResponse, InterviewResults, LoginRequest, QuizAnswer,
    QuizStatus, QuizSubmission, QuizSubmitResponse, RoundReport, SignupRequest, UserInfo, WhoAmI,
};

use thiserror::Error;

/// Errors from backend communication.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from the backend
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response from backend: {0}")]
    InvalidResponse(String),

    /// Operation requires a logged-in session
    #[error("Not authenticated: log in first")]
    MissingAuth,
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
