use crate::lifecycle::ClientState;
use thiserror::Error;

/// Caller arguments that were rejected before any request was built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name or id must be specified, but neither was given")]
    NameOrIdRequired,
    #[error("Name or id must be specified, but not both")]
    NameAndIdConflict,
    #[error("Batch field [{field}] has length {length}, expected {expected} to match ids")]
    BatchLengthMismatch {
        field: &'static str,
        length: usize,
        expected: usize,
    },
    #[error("Cannot submit more than {max_batch_size} records at once, attempted {attempted}")]
    BatchSizeExceeded {
        max_batch_size: i64,
        attempted: usize,
    },
}

/// Broad class of a [`ClientError`], for callers that only need to branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lifecycle,
    Validation,
    Transport,
    Remote,
    Decode,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Cannot run {operation}: client is {state}")]
    NotRunning {
        operation: &'static str,
        state: ClientState,
    },
    #[error("Invalid arguments: {0}")]
    Validation(#[from] ValidationError),
    #[error("Transport issues with http client {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Connection was closed by client shutdown")]
    ConnectionClosed,
    #[error("Server responded with status {status}: {message}")]
    Remote {
        status: u16,
        /// error class name reported by the server, when it sent one
        error: Option<String>,
        message: String,
    },
    #[error("Could not decode server response {0}")]
    Decode(serde_json::Error),
    #[error("Could not encode request body {0}")]
    Encode(serde_json::Error),
    #[error("Invalid URL {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotRunning { .. } => ErrorKind::Lifecycle,
            ClientError::Validation(_) | ClientError::InvalidUrl(_) => ErrorKind::Validation,
            ClientError::Transport(_) | ClientError::ConnectionClosed => ErrorKind::Transport,
            ClientError::Remote { .. } => ErrorKind::Remote,
            ClientError::Decode(_) | ClientError::Encode(_) => ErrorKind::Decode,
        }
    }

    /// status code for errors the server answered with
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
