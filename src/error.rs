// src/error.rs
use rocket::http::Status;
use thiserror::Error;

/// Failures that abort the email parser pipeline.
///
/// Each variant maps to exactly one HTTP status and one public message.
/// Extraction failures never appear here: they degrade to an empty result.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("OpenAI API key not configured")]
    Config,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Too many requests")]
    RateLimited,

    /// Persistence or any other unexpected failure. The wrapped error is
    /// logged but never sent to the caller.
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ParserError {
    pub fn status(&self) -> Status {
        match self {
            ParserError::Config => Status::InternalServerError,
            ParserError::Unauthorized => Status::Unauthorized,
            ParserError::InvalidInput(_) => Status::BadRequest,
            ParserError::RateLimited => Status::TooManyRequests,
            ParserError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Message returned in the response envelope.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<anyhow::Error> for ParserError {
    fn from(err: anyhow::Error) -> Self {
        ParserError::Internal(err)
    }
}
