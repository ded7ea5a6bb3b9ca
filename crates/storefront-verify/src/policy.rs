//! Trust policies evaluated against a certificate chain
//!
//! A [`PolicySet`] runs its policies in order and stops at the first
//! rejection. The standard set is path validation, then the storefront
//! extension markers, then (for online verification) OCSP revocation.

use crate::chain::CertificateChain;
use crate::error::{ChainError, Result};
use chrono::{DateTime, Utc};
use const_oid::db::rfc5280::ID_KP_CODE_SIGNING;
use const_oid::ObjectIdentifier;
use rustls_pki_types::{CertificateDer, TrustAnchor, UnixTime};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use storefront_ocsp::OcspTransport;
use webpki::{EndEntityCert, KeyUsage, ALL_VERIFICATION_ALGS};
use x509_cert::Certificate;

/// Extension that marks a storefront intermediate CA
pub const INTERMEDIATE_MARKER_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113635.100.6.2.1");

/// Extension that marks a storefront signing leaf
pub const LEAF_MARKER_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113635.100.6.11.1");

/// One pass/fail check on a chain
pub trait TrustPolicy: Send + Sync {
    /// Short name used in rejection messages
    fn name(&self) -> &'static str;

    fn evaluate<'a>(
        &'a self,
        chain: &'a CertificateChain,
        validation_time: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Standard path validation against the configured roots
///
/// Checks signatures, validity periods and basic constraints from leaf through
/// the intermediate to one of the anchors. The root carried in the token is
/// not consulted.
pub struct PathValidationPolicy {
    anchors: Arc<[TrustAnchor<'static>]>,
}

impl PathValidationPolicy {
    pub fn new(anchors: Arc<[TrustAnchor<'static>]>) -> Self {
        Self { anchors }
    }

    fn validate(&self, chain: &CertificateChain, validation_time: DateTime<Utc>) -> Result<()> {
        let reject = |reason: String| ChainError::Policy {
            policy: "path validation",
            reason,
        };

        let secs = u64::try_from(validation_time.timestamp())
            .map_err(|_| reject(format!("validation time {} is before 1970", validation_time)))?;
        let time = UnixTime::since_unix_epoch(std::time::Duration::from_secs(secs));

        let leaf = EndEntityCert::try_from(chain.leaf().der())
            .map_err(|e| reject(format!("failed to parse leaf certificate: {}", e)))?;
        let intermediates: [CertificateDer<'static>; 1] = [chain.intermediate().der().clone()];

        leaf.verify_for_usage(
            ALL_VERIFICATION_ALGS,
            &self.anchors,
            &intermediates,
            time,
            KeyUsage::required_if_present(ID_KP_CODE_SIGNING.as_bytes()),
            None,
            None,
        )
        .map_err(|e| reject(format!("{:?}", e)))?;

        Ok(())
    }
}

impl TrustPolicy for PathValidationPolicy {
    fn name(&self) -> &'static str {
        "path validation"
    }

    fn evaluate<'a>(
        &'a self,
        chain: &'a CertificateChain,
        validation_time: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.validate(chain, validation_time) })
    }
}

/// Requires the storefront marker extensions on the intermediate and leaf
#[derive(Debug, Clone, Copy, Default)]
pub struct StorefrontOidPolicy;

impl StorefrontOidPolicy {
    fn check(chain: &CertificateChain) -> Result<()> {
        let reject = |reason: String| ChainError::Policy {
            policy: "storefront OID",
            reason,
        };

        if !has_extension(chain.intermediate().certificate(), &INTERMEDIATE_MARKER_OID) {
            return Err(reject(format!(
                "intermediate certificate lacks extension {}",
                INTERMEDIATE_MARKER_OID
            )));
        }
        if !has_extension(chain.leaf().certificate(), &LEAF_MARKER_OID) {
            return Err(reject(format!(
                "leaf certificate lacks extension {}",
                LEAF_MARKER_OID
            )));
        }
        Ok(())
    }
}

impl TrustPolicy for StorefrontOidPolicy {
    fn name(&self) -> &'static str {
        "storefront OID"
    }

    fn evaluate<'a>(
        &'a self,
        chain: &'a CertificateChain,
        _validation_time: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { Self::check(chain) })
    }
}

fn has_extension(cert: &Certificate, oid: &ObjectIdentifier) -> bool {
    cert.tbs_certificate
        .extensions
        .as_ref()
        .is_some_and(|extensions| extensions.iter().any(|ext| &ext.extn_id == oid))
}

/// Live OCSP check of the leaf, with the intermediate as issuer
pub struct OcspRevocationPolicy {
    transport: Arc<dyn OcspTransport>,
}

impl OcspRevocationPolicy {
    pub fn new(transport: Arc<dyn OcspTransport>) -> Self {
        Self { transport }
    }
}

impl TrustPolicy for OcspRevocationPolicy {
    fn name(&self) -> &'static str {
        "OCSP revocation"
    }

    fn evaluate<'a>(
        &'a self,
        chain: &'a CertificateChain,
        validation_time: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            storefront_ocsp::check_revocation(
                self.transport.as_ref(),
                chain.leaf().certificate(),
                chain.intermediate().certificate(),
                validation_time,
            )
            .await?;
            Ok(())
        })
    }
}

/// Ordered, short-circuiting list of policies
#[derive(Default)]
pub struct PolicySet {
    policies: Vec<Box<dyn TrustPolicy>>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The policies applied to every storefront chain
    ///
    /// Revocation is only checked when a transport is given.
    pub fn standard(
        anchors: Arc<[TrustAnchor<'static>]>,
        revocation: Option<Arc<dyn OcspTransport>>,
    ) -> Self {
        let mut set = Self::new()
            .with(PathValidationPolicy::new(anchors))
            .with(StorefrontOidPolicy);
        if let Some(transport) = revocation {
            set = set.with(OcspRevocationPolicy::new(transport));
        }
        set
    }

    pub fn with(mut self, policy: impl TrustPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run every policy in order, returning the first rejection
    pub async fn evaluate(
        &self,
        chain: &CertificateChain,
        validation_time: DateTime<Utc>,
    ) -> Result<()> {
        for policy in &self.policies {
            if let Err(e) = policy.evaluate(chain, validation_time).await {
                tracing::warn!("Chain rejected by {} policy: {}", policy.name(), e);
                return Err(e);
            }
            tracing::debug!("Chain passed {} policy", policy.name());
        }
        Ok(())
    }
}
