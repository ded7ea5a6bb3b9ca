//! Verification of storefront-signed data
//!
//! Signed transactions, renewal info, notifications, app transactions and
//! realtime requests arrive as compact JWS tokens whose `x5c` header carries
//! the signing chain. A [`SignedDataVerifier`]:
//!
//! 1. decodes the token and its payload
//! 2. validates the chain against the configured roots, the storefront
//!    marker extensions and (when online checks are enabled) OCSP
//! 3. checks the ES256 signature with the leaf key
//! 4. reconciles the payload's bundle id, app id and environment with the
//!    configuration
//!
//! # Example
//!
//! ```no_run
//! use storefront_types::Environment;
//! use storefront_verify::{SignedDataVerifier, VerifierConfig};
//!
//! # async fn example(root_der: Vec<u8>, token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = VerifierConfig::new(vec![root_der], "com.example.app", Environment::Production)
//!     .with_app_apple_id(1234)
//!     .with_online_checks(true);
//! let verifier = SignedDataVerifier::new(config)?;
//!
//! let transaction = verifier.verify_and_decode_transaction(token).await?;
//! println!("verified transaction {:?}", transaction.transaction_id);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod chain_verifier;
pub mod error;
pub mod identity;
pub mod jws;
pub mod policy;
pub mod verifier;

pub use chain::{CertificateChain, ChainCertificate, ChainKey};
pub use chain_verifier::{ChainVerifier, ChainVerifierOptions, VerifiedChain};
pub use error::{ChainError, ConfigError, VerificationError, VerificationStatus};
pub use identity::{ExpectedIdentity, SignedPayload};
pub use jws::{CompactJws, JwsHeader};
pub use policy::{
    OcspRevocationPolicy, PathValidationPolicy, PolicySet, StorefrontOidPolicy, TrustPolicy,
    INTERMEDIATE_MARKER_OID, LEAF_MARKER_OID,
};
pub use verifier::{SignedDataVerifier, VerifierConfig};
