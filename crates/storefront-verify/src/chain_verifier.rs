//! Certificate chain verification with a cache of online results
//!
//! Online verifications (those that include an OCSP round trip) are cached
//! by the exact leaf and intermediate encodings. Concurrent verifications of
//! the same uncached pair wait on a per-pair gate so that only one OCSP
//! request is in flight for it; the others then read the cached result.

use crate::chain::{CertificateChain, ChainKey};
use crate::error::{ConfigError, Result};
use crate::jws::CompactJws;
use crate::policy::PolicySet;
use chrono::{DateTime, Utc};
use rustls_pki_types::{CertificateDer, TrustAnchor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex};
use std::time::Duration;
use storefront_cache::{BoundedTtlCache, CacheOptions};
use storefront_ocsp::{HttpOcspTransport, OcspTransport};
use tokio::sync::Mutex;
use webpki::anchor_from_trusted_cert;

/// A chain that passed every policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedChain {
    leaf_public_key: Arc<[u8]>,
}

impl VerifiedChain {
    /// The leaf's public key, used to check the token signature
    pub fn leaf_public_key(&self) -> &[u8] {
        &self.leaf_public_key
    }
}

/// Options for a [`ChainVerifier`]
#[derive(Clone)]
pub struct ChainVerifierOptions {
    pub cache: CacheOptions,
    pub ocsp_timeout: Duration,
    pub transport: Option<Arc<dyn OcspTransport>>,
}

impl Default for ChainVerifierOptions {
    fn default() -> Self {
        Self {
            cache: CacheOptions::default(),
            ocsp_timeout: storefront_ocsp::DEFAULT_TIMEOUT,
            transport: None,
        }
    }
}

impl ChainVerifierOptions {
    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }

    /// Timeout for the default HTTP transport (ignored with a custom transport)
    pub fn with_ocsp_timeout(mut self, timeout: Duration) -> Self {
        self.ocsp_timeout = timeout;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn OcspTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl std::fmt::Debug for ChainVerifierOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainVerifierOptions")
            .field("cache", &self.cache)
            .field("ocsp_timeout", &self.ocsp_timeout)
            .field("transport", &self.transport.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Verifies `x5c` chains against the configured roots
pub struct ChainVerifier {
    anchors: Arc<[TrustAnchor<'static>]>,
    transport: Arc<dyn OcspTransport>,
    cache: BoundedTtlCache<ChainKey, VerifiedChain>,
    in_flight: SyncMutex<HashMap<ChainKey, Arc<Mutex<()>>>>,
}

impl ChainVerifier {
    /// Create a verifier trusting the given DER root certificates
    pub fn new(
        root_certificates: &[Vec<u8>],
        options: ChainVerifierOptions,
    ) -> std::result::Result<Self, ConfigError> {
        if root_certificates.is_empty() {
            return Err(ConfigError::NoRootCertificates);
        }

        let anchors = root_certificates
            .iter()
            .map(|der| {
                anchor_from_trusted_cert(&CertificateDer::from(der.as_slice()))
                    .map(|anchor| anchor.to_owned())
                    .map_err(|e| ConfigError::InvalidRootCertificate(format!("{:?}", e)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let transport: Arc<dyn OcspTransport> = match options.transport {
            Some(transport) => transport,
            None => Arc::new(HttpOcspTransport::with_timeout(options.ocsp_timeout)?),
        };

        Ok(Self {
            anchors: Arc::from(anchors),
            transport,
            cache: BoundedTtlCache::new(options.cache),
            in_flight: SyncMutex::new(HashMap::new()),
        })
    }

    /// Verify the chain carried in a token's header
    ///
    /// Online verification is judged at the current time. Offline
    /// verification uses the payload's `signed_date`, or the current time when
    /// the payload has none.
    pub async fn verify(
        &self,
        jws: &CompactJws<'_>,
        signed_date: Option<DateTime<Utc>>,
        online: bool,
    ) -> Result<VerifiedChain> {
        let chain = jws.certificate_chain()?;
        let validation_time = if online {
            Utc::now()
        } else {
            signed_date.unwrap_or_else(Utc::now)
        };
        self.verify_chain(&chain, online, validation_time).await
    }

    /// Verify a chain, consulting the cache for online verifications
    pub async fn verify_chain(
        &self,
        chain: &CertificateChain,
        online: bool,
        validation_time: DateTime<Utc>,
    ) -> Result<VerifiedChain> {
        if !online {
            return self.validate(chain, false, validation_time).await;
        }

        let key = chain.key();
        if let Some(verified) = self.cache.get(&key).await {
            tracing::debug!("Chain cache hit");
            return Ok(verified);
        }

        let gate = self.gate(&key);
        let _held = gate.gate.lock().await;

        // Another caller may have finished while we waited
        if let Some(verified) = self.cache.get(&key).await {
            tracing::debug!("Chain cache hit after waiting for in-flight verification");
            return Ok(verified);
        }

        tracing::debug!("Chain cache miss, verifying online");
        let verified = self.validate(chain, true, validation_time).await?;
        self.cache.insert(key, verified.clone()).await;
        Ok(verified)
    }

    /// Number of cached online verifications
    pub async fn cached_chains(&self) -> usize {
        self.cache.len().await
    }

    async fn validate(
        &self,
        chain: &CertificateChain,
        online: bool,
        validation_time: DateTime<Utc>,
    ) -> Result<VerifiedChain> {
        let revocation = online.then(|| self.transport.clone());
        PolicySet::standard(self.anchors.clone(), revocation)
            .evaluate(chain, validation_time)
            .await?;

        tracing::debug!(
            "Certificate chain validated at {} (online: {})",
            validation_time,
            online
        );

        Ok(VerifiedChain {
            leaf_public_key: Arc::from(chain.leaf_public_key()?),
        })
    }

    fn gate(&self, key: &ChainKey) -> InFlight<'_> {
        let gate = match self.in_flight.lock() {
            Ok(mut in_flight) => in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
            // Poisoned: verify without coalescing
            Err(_) => Arc::new(Mutex::new(())),
        };
        InFlight {
            in_flight: &self.in_flight,
            key: key.clone(),
            gate,
        }
    }
}

/// A caller's handle on the per-pair gate
///
/// Dropping it (including when the verification future is cancelled) removes
/// the gate from the map once no other caller is waiting on it.
struct InFlight<'a> {
    in_flight: &'a SyncMutex<HashMap<ChainKey, Arc<Mutex<()>>>>,
    key: ChainKey,
    gate: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            // One reference in the map, one held here
            if Arc::strong_count(&self.gate) <= 2 {
                in_flight.remove(&self.key);
            }
        }
    }
}

impl std::fmt::Debug for ChainVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainVerifier")
            .field("anchors", &self.anchors.len())
            .field("cache", &self.cache.options())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_roots() {
        let err = ChainVerifier::new(&[], ChainVerifierOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoRootCertificates));
    }

    #[test]
    fn test_rejects_undecodable_root() {
        let err =
            ChainVerifier::new(&[vec![0x30, 0x00]], ChainVerifierOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootCertificate(_)));
    }

    #[test]
    fn test_options_builders() {
        let options = ChainVerifierOptions::default()
            .with_cache(CacheOptions::default().with_capacity(4))
            .with_ocsp_timeout(Duration::from_secs(5));
        assert_eq!(options.cache.capacity, 4);
        assert_eq!(options.ocsp_timeout, Duration::from_secs(5));
        assert!(options.transport.is_none());
    }
}
