//! Verifying and decoding storefront-signed payloads

use crate::chain_verifier::{ChainVerifier, ChainVerifierOptions};
use crate::error::{ConfigError, VerificationError};
use crate::identity::{ExpectedIdentity, SignedPayload};
use crate::jws::CompactJws;
use std::sync::Arc;
use std::time::Duration;
use storefront_cache::CacheOptions;
use storefront_ocsp::OcspTransport;
use storefront_types::{
    AppTransaction, DecodedPayload, DecodedRealtimeRequestBody, Environment,
    JwsRenewalInfoDecodedPayload, JwsTransactionDecodedPayload, PayloadKind,
    ResponseBodyV2DecodedPayload,
};

/// Configuration for a [`SignedDataVerifier`]
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// DER-encoded roots that chains must lead to
    pub root_certificates: Vec<Vec<u8>>,
    pub bundle_id: String,
    /// Required when `environment` is [`Environment::Production`]
    pub app_apple_id: Option<i64>,
    pub environment: Environment,
    /// Check leaf revocation over OCSP and judge validity at the current time
    pub enable_online_checks: bool,
    pub chain: ChainVerifierOptions,
}

impl VerifierConfig {
    /// Offline configuration with default cache and OCSP settings
    pub fn new(
        root_certificates: Vec<Vec<u8>>,
        bundle_id: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            root_certificates,
            bundle_id: bundle_id.into(),
            app_apple_id: None,
            environment,
            enable_online_checks: false,
            chain: ChainVerifierOptions::default(),
        }
    }

    pub fn with_app_apple_id(mut self, app_apple_id: i64) -> Self {
        self.app_apple_id = Some(app_apple_id);
        self
    }

    pub fn with_online_checks(mut self, enabled: bool) -> Self {
        self.enable_online_checks = enabled;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.chain.cache = self.chain.cache.with_capacity(capacity);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.chain.cache = self.chain.cache.with_ttl(ttl);
        self
    }

    pub fn with_cache_options(mut self, cache: CacheOptions) -> Self {
        self.chain.cache = cache;
        self
    }

    pub fn with_ocsp_timeout(mut self, timeout: Duration) -> Self {
        self.chain = self.chain.with_ocsp_timeout(timeout);
        self
    }

    /// Send OCSP requests through `transport` instead of the HTTP default
    pub fn with_transport(mut self, transport: Arc<dyn OcspTransport>) -> Self {
        self.chain = self.chain.with_transport(transport);
        self
    }
}

/// Verifies signed tokens and decodes their payloads
///
/// Clones share the same chain cache.
#[derive(Debug, Clone)]
pub struct SignedDataVerifier {
    expected: Arc<ExpectedIdentity>,
    enable_online_checks: bool,
    chains: Arc<ChainVerifier>,
}

impl SignedDataVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self, ConfigError> {
        if config.environment == Environment::Production && config.app_apple_id.is_none() {
            return Err(ConfigError::MissingAppAppleId);
        }

        let chains = ChainVerifier::new(&config.root_certificates, config.chain)?;

        Ok(Self {
            expected: Arc::new(ExpectedIdentity {
                bundle_id: config.bundle_id,
                app_apple_id: config.app_apple_id,
                environment: config.environment,
            }),
            enable_online_checks: config.enable_online_checks,
            chains: Arc::new(chains),
        })
    }

    pub fn environment(&self) -> Environment {
        self.expected.environment
    }

    /// The chain verifier shared by this verifier and its clones
    pub fn chain_verifier(&self) -> &ChainVerifier {
        &self.chains
    }

    /// Verify `token` and decode its payload as `P`
    ///
    /// Verifiers configured for an unsigned local environment only decode.
    pub async fn verify_and_decode<P: SignedPayload>(
        &self,
        token: &str,
    ) -> Result<P, VerificationError> {
        let jws = CompactJws::parse(token)?;
        let payload: P = jws.decode_payload()?;

        if self.expected.environment.skips_signature_verification() {
            tracing::debug!(
                "Skipping signature verification of {} in {}",
                P::KIND,
                self.expected.environment
            );
            return Ok(payload);
        }

        jws.check_header()?;

        let signed_date = payload.signed_date().and_then(|date| date.to_datetime());
        let chain = self
            .chains
            .verify(&jws, signed_date, self.enable_online_checks)
            .await?;

        jws.verify_signature(chain.leaf_public_key())?;
        payload.reconcile(&self.expected)?;

        tracing::debug!("Verified signed {}", P::KIND);
        Ok(payload)
    }

    pub async fn verify_and_decode_transaction(
        &self,
        token: &str,
    ) -> Result<JwsTransactionDecodedPayload, VerificationError> {
        self.verify_and_decode(token).await
    }

    pub async fn verify_and_decode_renewal_info(
        &self,
        token: &str,
    ) -> Result<JwsRenewalInfoDecodedPayload, VerificationError> {
        self.verify_and_decode(token).await
    }

    pub async fn verify_and_decode_notification(
        &self,
        token: &str,
    ) -> Result<ResponseBodyV2DecodedPayload, VerificationError> {
        self.verify_and_decode(token).await
    }

    pub async fn verify_and_decode_app_transaction(
        &self,
        token: &str,
    ) -> Result<AppTransaction, VerificationError> {
        self.verify_and_decode(token).await
    }

    pub async fn verify_and_decode_realtime_request(
        &self,
        token: &str,
    ) -> Result<DecodedRealtimeRequestBody, VerificationError> {
        self.verify_and_decode(token).await
    }

    /// Verify `token` as a payload of the given kind
    pub async fn verify_and_decode_any(
        &self,
        kind: PayloadKind,
        token: &str,
    ) -> Result<DecodedPayload, VerificationError> {
        Ok(match kind {
            PayloadKind::Transaction => self.verify_and_decode_transaction(token).await?.into(),
            PayloadKind::RenewalInfo => self.verify_and_decode_renewal_info(token).await?.into(),
            PayloadKind::Notification => self.verify_and_decode_notification(token).await?.into(),
            PayloadKind::AppTransaction => {
                self.verify_and_decode_app_transaction(token).await?.into()
            }
            PayloadKind::RealtimeRequest => {
                self.verify_and_decode_realtime_request(token).await?.into()
            }
        })
    }
}
