//! Error types for storefront-verify
//!
//! Three layers of errors live here:
//! - [`ChainError`]: why a certificate chain was rejected
//! - [`VerificationError`]: the public outcome of verifying a signed payload
//! - [`ConfigError`]: problems detected while building a verifier

use thiserror::Error;

/// Reasons a certificate chain is rejected
#[derive(Error, Debug)]
pub enum ChainError {
    /// The `x5c` header does not carry exactly leaf, intermediate and root
    #[error("Certificate chain must contain 3 certificates, found {0}")]
    InvalidChainLength(usize),

    /// A chain entry is not a decodable certificate
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// A trust policy rejected the chain
    #[error("{policy} policy rejected the chain: {reason}")]
    Policy {
        policy: &'static str,
        reason: String,
    },

    /// The leaf's revocation status could not be confirmed as good
    #[error("Revocation check failed: {0}")]
    Revocation(#[from] storefront_ocsp::Error),
}

/// Numeric verification status codes
///
/// These mirror the storefront's published status taxonomy so callers can
/// report outcomes in the same terms as other client libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VerificationStatus {
    Ok = 0,
    VerificationFailure = 1,
    InvalidAppIdentifier = 2,
    InvalidCertificate = 3,
    InvalidChainLength = 4,
    InvalidChain = 5,
    InvalidEnvironment = 6,
}

impl VerificationStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Errors returned when a signed payload fails verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Token is not a well-formed JWS or its payload does not decode
    #[error("Invalid JWT format: {0}")]
    InvalidJwtFormat(String),

    /// An `x5c` entry could not be decoded as a certificate
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Chain validation, revocation or signature verification failed
    #[error("Verification failure: {0}")]
    VerificationFailure(String),

    /// Payload bundle id or app id does not match the verifier's configuration
    #[error("Invalid app identifier: {0}")]
    InvalidAppIdentifier(String),

    /// Payload environment does not match the verifier's configuration
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
}

impl VerificationError {
    /// The status code reported for this error
    pub fn status(&self) -> VerificationStatus {
        match self {
            VerificationError::InvalidJwtFormat(_) => VerificationStatus::VerificationFailure,
            VerificationError::InvalidCertificate(_) => VerificationStatus::InvalidCertificate,
            VerificationError::VerificationFailure(_) => VerificationStatus::VerificationFailure,
            VerificationError::InvalidAppIdentifier(_) => VerificationStatus::InvalidAppIdentifier,
            VerificationError::InvalidEnvironment(_) => VerificationStatus::InvalidEnvironment,
        }
    }
}

impl From<ChainError> for VerificationError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidChainLength(_) => VerificationError::InvalidJwtFormat(err.to_string()),
            ChainError::InvalidCertificate(reason) => VerificationError::InvalidCertificate(reason),
            ChainError::Policy { .. } | ChainError::Revocation(_) => {
                VerificationError::VerificationFailure(err.to_string())
            }
        }
    }
}

/// Errors detected while constructing a verifier
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Production verifiers must know the app's numeric id
    #[error("App Apple ID is required when the environment is Production")]
    MissingAppAppleId,

    /// No trusted root certificates were supplied
    #[error("At least one trusted root certificate is required")]
    NoRootCertificates,

    /// A configured root certificate cannot be used as a trust anchor
    #[error("Invalid root certificate: {0}")]
    InvalidRootCertificate(String),

    /// The default OCSP transport could not be created
    #[error("Failed to create OCSP transport: {0}")]
    Transport(#[from] storefront_ocsp::Error),
}

/// Result type for chain verification
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ChainError::InvalidChainLength(2), VerificationStatus::VerificationFailure)]
    #[case(
        ChainError::InvalidCertificate("bad".into()),
        VerificationStatus::InvalidCertificate
    )]
    #[case(
        ChainError::Policy { policy: "storefront OID", reason: "missing".into() },
        VerificationStatus::VerificationFailure
    )]
    #[case(
        ChainError::Revocation(storefront_ocsp::Error::NoResponderUrl),
        VerificationStatus::VerificationFailure
    )]
    fn test_chain_error_mapping(#[case] err: ChainError, #[case] status: VerificationStatus) {
        let err = VerificationError::from(err);
        assert_eq!(err.status(), status);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(VerificationStatus::Ok.code(), 0);
        assert_eq!(VerificationStatus::InvalidAppIdentifier.code(), 2);
        assert_eq!(VerificationStatus::InvalidEnvironment.code(), 6);
    }
}
