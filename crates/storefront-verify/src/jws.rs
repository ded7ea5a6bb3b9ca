//! Compact JWS handling
//!
//! Tokens are `header.payload.signature`, each segment base64url without
//! padding. Only the header's `alg` and `x5c` members are interpreted.

use crate::chain::CertificateChain;
use crate::error::{ChainError, VerificationError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// The only signature algorithm the storefront uses
pub const ES256: &str = "ES256";

/// Number of certificates a storefront `x5c` header carries
pub const CHAIN_LENGTH: usize = 3;

/// Protected header members we care about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwsHeader {
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub x5c: Option<Vec<String>>,
}

/// A parsed compact JWS
#[derive(Debug, Clone)]
pub struct CompactJws<'a> {
    signing_input: &'a str,
    header: JwsHeader,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl<'a> CompactJws<'a> {
    /// Split and decode a compact token
    ///
    /// The payload is only base64-decoded here; use
    /// [`decode_payload`](Self::decode_payload) to deserialize it.
    pub fn parse(token: &'a str) -> Result<Self, VerificationError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(VerificationError::InvalidJwtFormat(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        }

        let header_bytes = decode_segment(parts[0], "header")?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes).map_err(|e| {
            VerificationError::InvalidJwtFormat(format!("failed to parse header: {}", e))
        })?;
        let payload = decode_segment(parts[1], "payload")?;
        let signature = decode_segment(parts[2], "signature")?;

        let signing_input_len = parts[0].len() + 1 + parts[1].len();

        Ok(Self {
            signing_input: &token[..signing_input_len],
            header,
            payload,
            signature,
        })
    }

    pub fn header(&self) -> &JwsHeader {
        &self.header
    }

    /// The raw decoded payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The bytes the signature covers (`header.payload` as transmitted)
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }

    /// Deserialize the payload JSON, which must be an object
    pub fn decode_payload<P: DeserializeOwned>(&self) -> Result<P, VerificationError> {
        let value: serde_json::Value = serde_json::from_slice(&self.payload).map_err(|e| {
            VerificationError::InvalidJwtFormat(format!("payload is not JSON: {}", e))
        })?;
        if !value.is_object() {
            return Err(VerificationError::InvalidJwtFormat(
                "payload is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| {
            VerificationError::InvalidJwtFormat(format!("failed to decode payload: {}", e))
        })
    }

    /// Reject tokens whose header is not an ES256 header with a 3-entry `x5c`
    pub fn check_header(&self) -> Result<(), VerificationError> {
        match self.header.alg.as_deref() {
            Some(ES256) => {}
            Some(other) => {
                return Err(VerificationError::InvalidJwtFormat(format!(
                    "unsupported algorithm: {}",
                    other
                )))
            }
            None => {
                return Err(VerificationError::InvalidJwtFormat(
                    "header has no alg".to_string(),
                ))
            }
        }

        match &self.header.x5c {
            Some(x5c) if x5c.len() == CHAIN_LENGTH => Ok(()),
            Some(x5c) => Err(ChainError::InvalidChainLength(x5c.len()).into()),
            None => Err(VerificationError::InvalidJwtFormat(
                "header has no x5c".to_string(),
            )),
        }
    }

    /// Decode the `x5c` certificates
    pub fn certificate_chain(&self) -> Result<CertificateChain, ChainError> {
        let x5c = self.header.x5c.as_deref().unwrap_or_default();
        CertificateChain::from_x5c(x5c)
    }

    /// Verify the ES256 signature (raw `r || s`) with an uncompressed P-256 point
    pub fn verify_signature(&self, public_key: &[u8]) -> Result<(), VerificationError> {
        use aws_lc_rs::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_FIXED};

        UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public_key)
            .verify(self.signing_input(), &self.signature)
            .map_err(|_| {
                VerificationError::VerificationFailure(
                    "token signature does not verify with the leaf key".to_string(),
                )
            })
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, VerificationError> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        VerificationError::InvalidJwtFormat(format!("failed to decode {}: {}", what, e))
    })
}
