//! Core payload types for storefront signed data
//!
//! This crate provides the decoded models for every kind of signed payload the
//! storefront issues (transactions, renewal info, notifications, app
//! transactions and realtime requests), the [`Environment`] they come from, and
//! the certificate newtype shared by the other crates in the workspace.

pub mod app_transaction;
pub mod encoding;
pub mod environment;
pub mod error;
pub mod notification;
pub mod payload;
pub mod realtime;
pub mod renewal;
pub mod timestamp;
pub mod transaction;

pub use app_transaction::AppTransaction;
pub use encoding::DerCertificate;
pub use environment::Environment;
pub use error::{Error, Result};
pub use notification::{
    ExternalPurchaseToken, NotificationContent, NotificationData, NotificationIdentity,
    NotificationSummary, ResponseBodyV2DecodedPayload,
};
pub use payload::{DecodedPayload, PayloadKind};
pub use realtime::DecodedRealtimeRequestBody;
pub use renewal::JwsRenewalInfoDecodedPayload;
pub use timestamp::Millis;
pub use transaction::JwsTransactionDecodedPayload;
