use thiserror::Error;

/// Problems converting a wire payload into the in-memory model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Activity is missing an id")]
    MissingId,
}

/// Failures reported by a remote service client.
///
/// The store treats every variant the same way: the operation is abandoned,
/// nothing is written locally and observers get one notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connection refused, timeout...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<WireError> for RemoteError {
    fn from(e: WireError) -> Self {
        RemoteError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}
