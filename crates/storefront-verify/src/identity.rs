//! Reconciling a payload's self-reported identity with the configured one
//!
//! Bundle id and app id mismatches are reported before environment
//! mismatches. The numeric app id is only compared in production.

use crate::error::VerificationError;
use serde::de::DeserializeOwned;
use storefront_types::{
    AppTransaction, DecodedRealtimeRequestBody, Environment, JwsRenewalInfoDecodedPayload,
    JwsTransactionDecodedPayload, Millis, PayloadKind, ResponseBodyV2DecodedPayload,
};

/// The identity a verifier expects payloads to carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedIdentity {
    pub bundle_id: String,
    pub app_apple_id: Option<i64>,
    pub environment: Environment,
}

impl ExpectedIdentity {
    fn check_bundle_id(&self, actual: Option<&str>) -> Result<(), VerificationError> {
        if actual == Some(self.bundle_id.as_str()) {
            return Ok(());
        }
        tracing::warn!(
            "Bundle id mismatch: expected {}, found {:?}",
            self.bundle_id,
            actual
        );
        Err(VerificationError::InvalidAppIdentifier(format!(
            "expected bundle id {}, found {}",
            self.bundle_id,
            actual.unwrap_or("none")
        )))
    }

    fn check_app_apple_id(&self, actual: Option<i64>) -> Result<(), VerificationError> {
        if self.environment != Environment::Production || actual == self.app_apple_id {
            return Ok(());
        }
        tracing::warn!(
            "App Apple ID mismatch: expected {:?}, found {:?}",
            self.app_apple_id,
            actual
        );
        Err(VerificationError::InvalidAppIdentifier(format!(
            "expected app apple id {}, found {}",
            describe(self.app_apple_id),
            describe(actual)
        )))
    }

    fn check_environment(&self, actual: Option<Environment>) -> Result<(), VerificationError> {
        if self.environment != Environment::Unknown && actual == Some(self.environment) {
            return Ok(());
        }
        tracing::warn!(
            "Environment mismatch: expected {}, found {:?}",
            self.environment,
            actual
        );
        Err(VerificationError::InvalidEnvironment(format!(
            "expected {}, found {}",
            self.environment,
            actual.map_or("none", |env| env.as_str())
        )))
    }
}

fn describe(id: Option<i64>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

/// A payload model that can come out of a signed token
pub trait SignedPayload: DeserializeOwned + Send {
    const KIND: PayloadKind;

    /// The payload's self-reported signing time
    fn signed_date(&self) -> Option<Millis>;

    /// Check the payload belongs to the expected app and environment
    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError>;
}

impl SignedPayload for JwsTransactionDecodedPayload {
    const KIND: PayloadKind = PayloadKind::Transaction;

    fn signed_date(&self) -> Option<Millis> {
        self.signed_date
    }

    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError> {
        expected.check_bundle_id(self.bundle_id.as_deref())?;
        expected.check_environment(self.environment)
    }
}

impl SignedPayload for JwsRenewalInfoDecodedPayload {
    const KIND: PayloadKind = PayloadKind::RenewalInfo;

    fn signed_date(&self) -> Option<Millis> {
        self.signed_date
    }

    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError> {
        expected.check_environment(self.environment)
    }
}

impl SignedPayload for ResponseBodyV2DecodedPayload {
    const KIND: PayloadKind = PayloadKind::Notification;

    fn signed_date(&self) -> Option<Millis> {
        self.signed_date
    }

    /// A notification without data, summary or external purchase token has
    /// nothing to reconcile and is accepted.
    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError> {
        let Some(identity) = self.content.identity() else {
            tracing::debug!("Notification carries no identity fields");
            return Ok(());
        };
        expected.check_bundle_id(identity.bundle_id)?;
        expected.check_app_apple_id(identity.app_apple_id)?;
        expected.check_environment(identity.environment)
    }
}

impl SignedPayload for AppTransaction {
    const KIND: PayloadKind = PayloadKind::AppTransaction;

    /// App transactions carry no `signedDate`; the receipt creation date
    /// stands in for it.
    fn signed_date(&self) -> Option<Millis> {
        self.receipt_creation_date
    }

    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError> {
        expected.check_bundle_id(self.bundle_id.as_deref())?;
        expected.check_app_apple_id(self.app_apple_id)?;
        expected.check_environment(self.receipt_type)
    }
}

impl SignedPayload for DecodedRealtimeRequestBody {
    const KIND: PayloadKind = PayloadKind::RealtimeRequest;

    fn signed_date(&self) -> Option<Millis> {
        self.signed_date
    }

    fn reconcile(&self, expected: &ExpectedIdentity) -> Result<(), VerificationError> {
        expected.check_app_apple_id(self.app_apple_id)?;
        expected.check_environment(self.environment)
    }
}
