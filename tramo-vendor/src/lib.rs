//! HTTP client for the vendor's booking API.

pub mod client;
pub mod error;
pub mod models;

pub use client::HttpVendorClient;
pub use error::VendorError;
