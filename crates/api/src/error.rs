//! Error types for the TaaS API client.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`crate::Transport`] implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    ///
    /// Displaying this error shows the most useful part of the body: the
    /// `response` field of a JSON body, the full JSON body, or the raw text.
    #[error("{}", describe_body(.body))]
    Remote { status: u16, body: String },

    /// No response was received.
    #[error("{message}")]
    Network { message: String },

    #[error("Unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn network(error: impl std::fmt::Display) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }

    pub fn decode(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Render an error body for the terminal.
pub fn describe_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("response") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => json.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

/// Errors raised by [`crate::LogStreamer`] implementations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The peer reset the connection. Treated as transient by the tail loop.
    #[error("connection reset by peer")]
    ConnectionReset,

    #[error(transparent)]
    Request(ApiError),

    #[error("failed writing log output: {0}")]
    Output(#[from] io::Error),
}

impl StreamError {
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if is_connection_reset(&error) {
            Self::ConnectionReset
        } else {
            Self::Request(ApiError::network(error))
        }
    }
}

/// Walk the source chain looking for an `ECONNRESET`.
fn is_connection_reset(error: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(error) = current {
        if let Some(io_error) = error.downcast_ref::<io::Error>()
            && io_error.kind() == io::ErrorKind::ConnectionReset
        {
            return true;
        }
        current = error.source();
    }
    false
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid config file {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Invalid {setting} URL '{value}': {reason}")]
    InvalidUrl {
        setting: &'static str,
        value: String,
        reason: String,
    },
}
