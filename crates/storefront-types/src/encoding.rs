//! Type-safe encoding wrappers

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// A DER-encoded X.509 certificate
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DerCertificate(Vec<u8>);

impl DerCertificate {
    /// Decode a certificate from its standard base64 form (as carried in `x5c`)
    ///
    /// The bytes are not parsed as a certificate here.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded)
            .map(DerCertificate)
            .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))
    }

    /// Get the raw DER bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the raw DER bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Debug for DerCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerCertificate({} bytes)", self.0.len())
    }
}
