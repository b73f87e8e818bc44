use thiserror::Error;
use tramo_core::CoreError;

#[derive(Debug, Error)]
pub enum VendorError {
    /// Connection, timeout or TLS failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// The vendor answered with its `{error, message}` envelope
    #[error("{0}")]
    Envelope(String),

    #[error("Vendor error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for VendorError {
    fn from(err: reqwest::Error) -> Self {
        VendorError::Transport(err.to_string())
    }
}

impl From<VendorError> for CoreError {
    fn from(err: VendorError) -> Self {
        match err {
            VendorError::Envelope(message) => CoreError::VendorRequest(message),
            other => CoreError::VendorRequest(other.to_string()),
        }
    }
}
