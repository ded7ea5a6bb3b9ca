//! Error types for storefront

use thiserror::Error;

/// Errors from any storefront component
#[derive(Error, Debug)]
pub enum Error {
    /// Payload model error
    #[error("Types error: {0}")]
    Types(#[from] storefront_types::Error),

    /// Signed data failed verification
    #[error("Verification error: {0}")]
    Verification(#[from] storefront_verify::VerificationError),

    /// Certificate chain rejected
    #[error("Chain error: {0}")]
    Chain(#[from] storefront_verify::ChainError),

    /// Verifier could not be constructed
    #[error("Configuration error: {0}")]
    Config(#[from] storefront_verify::ConfigError),

    /// OCSP error
    #[error("OCSP error: {0}")]
    Ocsp(#[from] storefront_ocsp::Error),
}

/// Result type for storefront operations
pub type Result<T> = std::result::Result<T, Error>;
