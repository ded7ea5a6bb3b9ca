//! Storefront signed-data verification
//!
//! This is the main entry point for the workspace. It re-exports the
//! component crates and their most used types:
//!
//! - [`SignedDataVerifier`] verifies signed transactions, renewal info,
//!   notifications, app transactions and realtime requests
//! - [`receipt`] extracts transaction ids from legacy receipts
//! - [`ocsp`] and [`cache`] are the revocation and caching building blocks

pub mod error;

// Re-export core crates
pub use storefront_cache as cache;
pub use storefront_ocsp as ocsp;
pub use storefront_receipt as receipt;
pub use storefront_types as types;
pub use storefront_verify as verify;

pub use error::{Error, Result};
pub use storefront_receipt::{
    extract_transaction_id_from_app_receipt, extract_transaction_id_from_transaction_receipt,
};
pub use storefront_types::{DecodedPayload, Environment, PayloadKind};
pub use storefront_verify::{
    SignedDataVerifier, VerificationError, VerificationStatus, VerifierConfig,
};
