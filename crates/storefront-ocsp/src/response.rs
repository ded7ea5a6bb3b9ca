//! Validating OCSP responses
//!
//! A response is only trusted when all of these hold:
//! - the outer status is `successful` and the body is a basic response
//! - it is signed by the issuer itself, or by a responder certificate the
//!   issuer signed for `id-kp-OCSPSigning`
//! - one of its single responses names the certificate being checked
//! - that single response is current (`thisUpdate` / `nextUpdate`, allowing
//!   for clock skew)

use crate::asn1::{
    Asn1CertStatus, BasicOcspResponse, OcspResponse, OcspResponseStatus, ResponseData,
    SingleResponse, OID_KP_OCSP_SIGNING, OID_OCSP_BASIC,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1,
    SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION, SHA_512_WITH_RSA_ENCRYPTION,
};
use const_oid::ObjectIdentifier;
use der::asn1::GeneralizedTime;
use der::{Decode, Encode};
use x509_cert::ext::pkix::ExtendedKeyUsage;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::Certificate;

/// Tolerated difference between our clock and the responder's, in seconds
pub const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Revocation status of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    Good,
    Revoked { revoked_at: Option<DateTime<Utc>> },
    Unknown,
}

impl std::fmt::Display for CertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertStatus::Good => f.write_str("good"),
            CertStatus::Revoked {
                revoked_at: Some(at),
            } => write!(f, "revoked (at {})", at),
            CertStatus::Revoked { revoked_at: None } => f.write_str("revoked"),
            CertStatus::Unknown => f.write_str("unknown"),
        }
    }
}

/// Validate a DER-encoded OCSP response about `cert` and return its status
///
/// `now` is the time freshness is judged against.
pub fn verify_response(
    response_der: &[u8],
    cert: &Certificate,
    issuer: &Certificate,
    now: DateTime<Utc>,
) -> Result<CertStatus> {
    let response = OcspResponse::from_der_bytes(response_der)
        .map_err(|e| Error::Asn1(format!("failed to decode OCSP response: {}", e)))?;

    if response.response_status != OcspResponseStatus::Successful {
        return Err(Error::InvalidResponse(format!(
            "responder returned status {:?}",
            response.response_status
        )));
    }

    let bytes = response
        .response_bytes
        .ok_or_else(|| Error::InvalidResponse("successful response has no body".to_string()))?;
    if bytes.response_type != OID_OCSP_BASIC {
        return Err(Error::InvalidResponse(format!(
            "unsupported response type: {}",
            bytes.response_type
        )));
    }

    let basic = BasicOcspResponse::from_der(bytes.response.as_bytes())
        .map_err(|e| Error::Asn1(format!("failed to decode basic response: {}", e)))?;
    let tbs_der = basic.tbs_response_data.to_der()?;
    let data = ResponseData::from_der(&tbs_der)
        .map_err(|e| Error::Asn1(format!("failed to decode response data: {}", e)))?;

    verify_responder_signature(&basic, &tbs_der, issuer, now)?;

    let single = data
        .responses
        .iter()
        .find(|single| single.cert_id.matches(cert, issuer))
        .ok_or_else(|| {
            Error::InvalidResponse("response does not cover the requested certificate".to_string())
        })?;

    check_freshness(single, now)?;

    let status = match &single.cert_status {
        Asn1CertStatus::Good(_) => CertStatus::Good,
        Asn1CertStatus::Revoked(info) => CertStatus::Revoked {
            revoked_at: to_datetime(&info.revocation_time),
        },
        Asn1CertStatus::Unknown(_) => CertStatus::Unknown,
    };

    tracing::debug!("OCSP response validated, status {}", status);
    Ok(status)
}

/// Check the response was signed by the issuer or a responder it delegated to
fn verify_responder_signature(
    basic: &BasicOcspResponse,
    tbs_der: &[u8],
    issuer: &Certificate,
    now: DateTime<Utc>,
) -> Result<()> {
    let signature = basic
        .signature
        .as_bytes()
        .ok_or_else(|| Error::Signature("signature has unused bits".to_string()))?;

    if verify_signature(issuer, &basic.signature_algorithm, tbs_der, signature).is_ok() {
        tracing::debug!("OCSP response signed by the issuing CA");
        return Ok(());
    }

    for responder in basic.certs.iter().flatten() {
        match check_delegated_responder(responder, issuer, now) {
            Ok(()) => {
                verify_signature(responder, &basic.signature_algorithm, tbs_der, signature)?;
                tracing::debug!("OCSP response signed by a delegated responder");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!("Skipping embedded responder certificate: {}", e);
            }
        }
    }

    Err(Error::Signature(
        "response is not signed by the issuer or an authorized responder".to_string(),
    ))
}

/// A delegated responder must be issued by the CA, be valid now and carry
/// `id-kp-OCSPSigning`
fn check_delegated_responder(
    responder: &Certificate,
    issuer: &Certificate,
    now: DateTime<Utc>,
) -> Result<()> {
    if responder.tbs_certificate.issuer != issuer.tbs_certificate.subject {
        return Err(Error::Signature("responder not issued by the CA".to_string()));
    }

    let responder_tbs = responder.tbs_certificate.to_der()?;
    let responder_signature = responder.signature.as_bytes().ok_or_else(|| {
        Error::Signature("responder certificate signature has unused bits".to_string())
    })?;
    verify_signature(
        issuer,
        &responder.signature_algorithm,
        &responder_tbs,
        responder_signature,
    )?;

    let validity = &responder.tbs_certificate.validity;
    let not_before = validity.not_before.to_unix_duration().as_secs() as i64;
    let not_after = validity.not_after.to_unix_duration().as_secs() as i64;
    let now_secs = now.timestamp();
    if now_secs < not_before || now_secs > not_after {
        return Err(Error::Signature(
            "responder certificate is outside its validity period".to_string(),
        ));
    }

    let eku: Option<(bool, ExtendedKeyUsage)> = responder
        .tbs_certificate
        .get()
        .map_err(|e| Error::Asn1(format!("failed to decode responder EKU: {}", e)))?;
    match eku {
        Some((_, eku)) if eku.0.contains(&OID_KP_OCSP_SIGNING) => Ok(()),
        _ => Err(Error::Signature(
            "responder certificate lacks id-kp-OCSPSigning".to_string(),
        )),
    }
}

fn check_freshness(single: &SingleResponse, now: DateTime<Utc>) -> Result<()> {
    let skew = Duration::seconds(MAX_CLOCK_SKEW_SECS);
    let this_update = to_datetime(&single.this_update)
        .ok_or_else(|| Error::InvalidResponse("thisUpdate out of range".to_string()))?;
    if this_update > now + skew {
        return Err(Error::InvalidResponse(format!(
            "response thisUpdate {} is in the future",
            this_update
        )));
    }

    if let Some(next_update) = single.next_update.as_ref().and_then(to_datetime) {
        if next_update < now - skew {
            return Err(Error::InvalidResponse(format!(
                "response expired at {}",
                next_update
            )));
        }
    }

    Ok(())
}

fn to_datetime(time: &GeneralizedTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.to_unix_duration().as_secs() as i64, 0)
}

/// Verify `signature` over `message` with the certificate's public key
fn verify_signature(
    signer: &Certificate,
    algorithm: &AlgorithmIdentifierOwned,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    use aws_lc_rs::signature::{
        UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1,
        ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1, RSA_PKCS1_2048_8192_SHA256,
        RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
    };

    let spki = &signer.tbs_certificate.subject_public_key_info;
    let public_key = spki
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| Error::Signature("invalid public key encoding".to_string()))?;

    let verification: &'static dyn VerificationAlgorithm = if spki.algorithm.oid
        == ID_EC_PUBLIC_KEY
    {
        let curve = spki
            .algorithm
            .parameters
            .as_ref()
            .ok_or_else(|| Error::Signature("missing EC curve parameters".to_string()))?
            .decode_as::<ObjectIdentifier>()
            .map_err(|e| Error::Signature(format!("failed to decode curve OID: {}", e)))?;

        match (curve, algorithm.oid) {
            (SECP_256_R_1, ECDSA_WITH_SHA_256) => &ECDSA_P256_SHA256_ASN1,
            (SECP_256_R_1, ECDSA_WITH_SHA_384) => &ECDSA_P256_SHA384_ASN1,
            (SECP_384_R_1, ECDSA_WITH_SHA_256) => &ECDSA_P384_SHA256_ASN1,
            (SECP_384_R_1, ECDSA_WITH_SHA_384) => &ECDSA_P384_SHA384_ASN1,
            (curve, alg) => {
                return Err(Error::Signature(format!(
                    "unsupported curve/signature combination: {} / {}",
                    curve, alg
                )))
            }
        }
    } else {
        match algorithm.oid {
            SHA_256_WITH_RSA_ENCRYPTION => &RSA_PKCS1_2048_8192_SHA256,
            SHA_384_WITH_RSA_ENCRYPTION => &RSA_PKCS1_2048_8192_SHA384,
            SHA_512_WITH_RSA_ENCRYPTION => &RSA_PKCS1_2048_8192_SHA512,
            alg => {
                return Err(Error::Signature(format!(
                    "unsupported signature algorithm: {}",
                    alg
                )))
            }
        }
    };

    UnparsedPublicKey::new(verification, public_key)
        .verify(message, signature)
        .map_err(|_| Error::Signature("signature verification failed".to_string()))
}
