pub mod booking;
pub mod fare;
pub mod params;
pub mod repository;
pub mod seat;
pub mod secret;
pub mod token;
pub mod trip;
pub mod vendor;

use booking::{PartialBlock, PartialConfirm, PartialUnblock};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The vendor answered with an error envelope; the message is kept verbatim.
    #[error("Vendor request failed: {0}")]
    VendorRequest(String),
    /// A single trip or leg could not be parsed and should be dropped by the caller.
    #[error("Skipping unparseable item: {0}")]
    Skippable(String),
    #[error("Seats could not be blocked: {0}")]
    PartialBlock(PartialBlock),
    #[error("Seats could not be confirmed: {0}")]
    PartialConfirm(PartialConfirm),
    #[error("Seats could not be released: {0}")]
    PartialUnblock(PartialUnblock),
    #[error("Booking state missing: {0}")]
    StateMissing(String),
    #[error("Operation not supported: {0}")]
    Unsupported(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Token pool {pool} exhausted after {timeout_ms}ms")]
    PoolExhausted { pool: String, timeout_ms: u128 },
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
