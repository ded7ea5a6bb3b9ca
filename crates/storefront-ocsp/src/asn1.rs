//! ASN.1 types for the Online Certificate Status Protocol
//!
//! This module defines the subset of RFC 6960 structures needed to ask about a
//! single certificate and to read a basic response. Request signing, nonces
//! and the requestor name are not supported.

use const_oid::ObjectIdentifier;
use der::{
    asn1::{BitString, GeneralizedTime, Null, OctetString},
    Any, Choice, Decode, Encode, Enumerated, Sequence,
};
use x509_cert::{
    ext::{pkix::CrlReason, Extensions},
    name::Name,
    serial_number::SerialNumber,
    spki::AlgorithmIdentifierOwned,
    Certificate,
};

/// OID for id-pkix-ocsp-basic: 1.3.6.1.5.5.7.48.1.1
pub const OID_OCSP_BASIC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.1");

/// OID for id-ad-ocsp: 1.3.6.1.5.5.7.48.1
pub const OID_AD_OCSP: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1");

/// OID for id-kp-OCSPSigning: 1.3.6.1.5.5.7.3.9
pub const OID_KP_OCSP_SIGNING: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9");

/// Identifies one certificate by its issuer and serial number
/// RFC 6960 Section 4.1.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct CertId {
    /// Hash algorithm used for the two issuer hashes
    pub hash_algorithm: AlgorithmIdentifierOwned,
    /// Hash of the issuer's DER-encoded subject name
    pub issuer_name_hash: OctetString,
    /// Hash of the issuer's public key bits
    pub issuer_key_hash: OctetString,
    /// Serial number of the certificate being asked about
    pub serial_number: SerialNumber,
}

/// A single certificate status request
/// RFC 6960 Section 4.1.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Request {
    pub req_cert: CertId,
    #[asn1(context_specific = "0", optional = "true")]
    pub single_request_extensions: Option<Extensions>,
}

/// RFC 6960 Section 4.1.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct TbsRequest {
    /// Version (v1 = 0)
    #[asn1(context_specific = "0", default = "Default::default")]
    pub version: u8,
    pub request_list: Vec<Request>,
    #[asn1(context_specific = "2", optional = "true")]
    pub request_extensions: Option<Extensions>,
}

/// Unsigned OCSP request
/// RFC 6960 Section 4.1.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct OcspRequest {
    pub tbs_request: TbsRequest,
}

impl OcspRequest {
    /// Create a request for a single certificate
    pub fn single(cert_id: CertId) -> Self {
        Self {
            tbs_request: TbsRequest {
                version: 0,
                request_list: vec![Request {
                    req_cert: cert_id,
                    single_request_extensions: None,
                }],
                request_extensions: None,
            },
        }
    }

    /// Encode to DER
    pub fn to_der(&self) -> Result<Vec<u8>, der::Error> {
        Encode::to_der(self)
    }
}

/// OCSP response status
/// RFC 6960 Section 4.2.1
#[derive(Clone, Copy, Debug, Eq, PartialEq, Enumerated)]
#[repr(u32)]
pub enum OcspResponseStatus {
    /// Response has valid confirmations
    Successful = 0,
    /// Illegal confirmation request
    MalformedRequest = 1,
    /// Internal error in issuer
    InternalError = 2,
    /// Try again later
    TryLater = 3,
    /// Must sign the request
    SigRequired = 5,
    /// Request unauthorized
    Unauthorized = 6,
}

/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ResponseBytes {
    pub response_type: ObjectIdentifier,
    pub response: OctetString,
}

/// Outer OCSP response envelope
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct OcspResponse {
    pub response_status: OcspResponseStatus,
    #[asn1(context_specific = "0", optional = "true")]
    pub response_bytes: Option<ResponseBytes>,
}

impl OcspResponse {
    /// Decode from DER bytes
    pub fn from_der_bytes(bytes: &[u8]) -> Result<Self, der::Error> {
        Self::from_der(bytes)
    }
}

/// Basic OCSP response
///
/// `tbs_response_data` is kept as an undecoded element so the exact signed
/// bytes are available for signature verification.
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct BasicOcspResponse {
    pub tbs_response_data: Any,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub signature: BitString,
    #[asn1(context_specific = "0", optional = "true")]
    pub certs: Option<Vec<Certificate>>,
}

/// Identifies the responder by name or by key hash
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Choice)]
pub enum ResponderId {
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", constructed = "true")]
    ByName(Name),
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", constructed = "true")]
    ByKey(OctetString),
}

/// Signed portion of a basic response
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ResponseData {
    #[asn1(context_specific = "0", default = "Default::default")]
    pub version: u8,
    pub responder_id: ResponderId,
    pub produced_at: GeneralizedTime,
    pub responses: Vec<SingleResponse>,
    #[asn1(context_specific = "1", optional = "true")]
    pub response_extensions: Option<Extensions>,
}

/// Revocation details
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RevokedInfo {
    pub revocation_time: GeneralizedTime,
    #[asn1(context_specific = "0", optional = "true")]
    pub revocation_reason: Option<CrlReason>,
}

/// Status of one certificate as reported by the responder
/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Choice)]
pub enum Asn1CertStatus {
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT")]
    Good(Null),
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", constructed = "true")]
    Revoked(RevokedInfo),
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT")]
    Unknown(Null),
}

/// RFC 6960 Section 4.2.1
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SingleResponse {
    pub cert_id: CertId,
    pub cert_status: Asn1CertStatus,
    pub this_update: GeneralizedTime,
    #[asn1(context_specific = "0", optional = "true")]
    pub next_update: Option<GeneralizedTime>,
    #[asn1(context_specific = "1", optional = "true")]
    pub single_extensions: Option<Extensions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::AnyRef;

    fn sample_cert_id() -> CertId {
        CertId {
            hash_algorithm: AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ID_SHA_1,
                parameters: Some(AnyRef::NULL.into()),
            },
            issuer_name_hash: OctetString::new(vec![0x11; 20]).unwrap(),
            issuer_key_hash: OctetString::new(vec![0x22; 20]).unwrap(),
            serial_number: SerialNumber::new(&[0x01, 0x02]).unwrap(),
        }
    }

    #[test]
    fn test_request_encode_decode() {
        let request = OcspRequest::single(sample_cert_id());
        let der = request.to_der().unwrap();

        // Default version is omitted from the encoding
        assert_eq!(der[0], 0x30);
        let decoded = OcspRequest::from_der(&der).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.tbs_request.request_list.len(), 1);
    }

    #[test]
    fn test_unsuccessful_response_decodes_without_bytes() {
        // OCSPResponse { responseStatus tryLater }
        let der = [0x30, 0x03, 0x0a, 0x01, 0x03];
        let response = OcspResponse::from_der_bytes(&der).unwrap();
        assert_eq!(response.response_status, OcspResponseStatus::TryLater);
        assert!(response.response_bytes.is_none());
    }

    #[test]
    fn test_cert_status_choice_encoding() {
        let good = Asn1CertStatus::Good(Null);
        assert_eq!(good.to_der().unwrap(), vec![0x80, 0x00]);

        let unknown = Asn1CertStatus::Unknown(Null);
        assert_eq!(unknown.to_der().unwrap(), vec![0x82, 0x00]);
    }
}
