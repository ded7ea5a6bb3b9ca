//! Error types for storefront-types

use thiserror::Error;

/// Errors that can occur while decoding storefront payloads
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid encoding of a wrapped value
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Notification envelope carries more than one identity-bearing sub-object
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),
}

/// Result type for storefront-types operations
pub type Result<T> = std::result::Result<T, Error>;
