//! Building OCSP requests for a certificate and its issuer

use crate::asn1::{CertId, OcspRequest, OID_AD_OCSP};
use crate::error::{Error, Result};
use aws_lc_rs::digest::{digest, Algorithm, SHA1_FOR_LEGACY_USE_ONLY, SHA256};
use const_oid::db::rfc5912::{ID_SHA_1, ID_SHA_256};
use const_oid::ObjectIdentifier;
use der::asn1::{AnyRef, OctetString};
use der::Encode;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::AuthorityInfoAccessSyntax;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::Certificate;

fn digest_algorithm(oid: &ObjectIdentifier) -> Option<&'static Algorithm> {
    match *oid {
        ID_SHA_1 => Some(&SHA1_FOR_LEGACY_USE_ONLY),
        ID_SHA_256 => Some(&SHA256),
        _ => None,
    }
}

impl CertId {
    /// Build the CertID of `cert` as issued by `issuer`, hashed with SHA-1
    ///
    /// SHA-1 is what responders are required to understand.
    pub fn for_certificate(cert: &Certificate, issuer: &Certificate) -> Result<Self> {
        Self::with_hash(cert, issuer, ID_SHA_1)
    }

    /// Build the CertID of `cert` with a specific hash algorithm (SHA-1 or SHA-256)
    pub fn with_hash(
        cert: &Certificate,
        issuer: &Certificate,
        hash_oid: ObjectIdentifier,
    ) -> Result<Self> {
        let algorithm = digest_algorithm(&hash_oid).ok_or_else(|| {
            Error::InvalidResponse(format!("unsupported CertID hash algorithm: {}", hash_oid))
        })?;

        let issuer_name = issuer.tbs_certificate.subject.to_der()?;
        let issuer_key = issuer
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes();

        Ok(CertId {
            hash_algorithm: AlgorithmIdentifierOwned {
                oid: hash_oid,
                parameters: Some(AnyRef::NULL.into()),
            },
            issuer_name_hash: OctetString::new(digest(algorithm, &issuer_name).as_ref())?,
            issuer_key_hash: OctetString::new(digest(algorithm, issuer_key).as_ref())?,
            serial_number: cert.tbs_certificate.serial_number.clone(),
        })
    }

    /// Whether this CertID names `cert` as issued by `issuer`
    ///
    /// The hashes are recomputed with this CertID's own algorithm, so responses
    /// that answer with SHA-256 CertIDs still match. Hash parameters are ignored
    /// because responders disagree on absent versus NULL.
    pub fn matches(&self, cert: &Certificate, issuer: &Certificate) -> bool {
        match Self::with_hash(cert, issuer, self.hash_algorithm.oid) {
            Ok(expected) => {
                self.issuer_name_hash == expected.issuer_name_hash
                    && self.issuer_key_hash == expected.issuer_key_hash
                    && self.serial_number == expected.serial_number
            }
            Err(_) => false,
        }
    }
}

/// Build a DER-encoded request asking about `cert`
pub fn build_request(cert: &Certificate, issuer: &Certificate) -> Result<Vec<u8>> {
    let cert_id = CertId::for_certificate(cert, issuer)?;
    OcspRequest::single(cert_id)
        .to_der()
        .map_err(|e| Error::Asn1(format!("failed to encode request: {}", e)))
}

/// Extract the OCSP responder URL from the certificate's Authority Information Access
pub fn responder_url(cert: &Certificate) -> Result<String> {
    let aia: Option<(bool, AuthorityInfoAccessSyntax)> = cert
        .tbs_certificate
        .get()
        .map_err(|e| Error::Asn1(format!("failed to decode AIA extension: {}", e)))?;

    let Some((_critical, aia)) = aia else {
        return Err(Error::NoResponderUrl);
    };

    aia.0
        .iter()
        .filter(|desc| desc.access_method == OID_AD_OCSP)
        .find_map(|desc| match &desc.access_location {
            GeneralName::UniformResourceIdentifier(uri) => Some(uri.to_string()),
            _ => None,
        })
        .ok_or(Error::NoResponderUrl)
}
