use taas_api::{ApiError, StreamError};
use taas_types::ValidationError;
use taas_util::PromptError;
use thiserror::Error;

/// Failure of a single command.
///
/// Every variant is reported on the terminal. Only
/// [`CommandError::RetryCeilingExceeded`] changes the process exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Log stream restarted {restarts} times, giving up")]
    RetryCeilingExceeded { restarts: u32 },

    #[error("{0}")]
    Message(String),
}

impl CommandError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RetryCeilingExceeded { .. } => 1,
            _ => 0,
        }
    }
}
