//! Error types for storefront-ocsp

use crate::CertStatus;
use thiserror::Error;

/// Errors that can occur while checking revocation status over OCSP
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error (including timeouts and non-success statuses)
    #[error("HTTP error: {0}")]
    Http(String),

    /// ASN.1 encoding/decoding error
    #[error("ASN.1 error: {0}")]
    Asn1(String),

    /// Response is well-formed but unusable (wrong status, type, certificate or time)
    #[error("Invalid OCSP response: {0}")]
    InvalidResponse(String),

    /// Response signature or responder authorization failed
    #[error("OCSP signature verification failed: {0}")]
    Signature(String),

    /// Responder reported a status other than good
    #[error("Certificate status is {0}")]
    Status(CertStatus),

    /// Certificate names no OCSP responder in its Authority Information Access
    #[error("Certificate has no OCSP responder URL")]
    NoResponderUrl,
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::Asn1(err.to_string())
    }
}

/// Result type for OCSP operations
pub type Result<T> = std::result::Result<T, Error>;
