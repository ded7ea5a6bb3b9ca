//! Test PKI and token helpers shared by the integration tests

#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{
    EcdsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING, ECDSA_P256_SHA256_FIXED_SIGNING,
};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{Duration as ChronoDuration, Utc};
use der::asn1::{BitString, GeneralizedTime, Null, OctetString};
use der::{Any, Decode, Encode};
use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DnType, IsCa, KeyPair,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storefront_ocsp::asn1::{
    Asn1CertStatus, BasicOcspResponse, ResponderId, ResponseBytes, ResponseData, RevokedInfo,
    SingleResponse, OID_OCSP_BASIC,
};
use storefront_ocsp::{CertId, OcspResponse, OcspResponseStatus, OcspTransport};
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::Certificate;

pub const RESPONDER_URL: &str = "http://ocsp.example.com/ocsp";
pub const BUNDLE_ID: &str = "com.example.app";
pub const APP_APPLE_ID: i64 = 1234;

const INTERMEDIATE_MARKER: &[u64] = &[1, 2, 840, 113635, 100, 6, 2, 1];
const LEAF_MARKER: &[u64] = &[1, 2, 840, 113635, 100, 6, 11, 1];

pub struct Issued {
    pub cert: Certificate,
    pub key: KeyPair,
    pub rcgen: rcgen::Certificate,
}

impl Issued {
    pub fn der(&self) -> &[u8] {
        self.rcgen.der()
    }
}

/// Which parts of a generated chain deviate from a well-formed one
#[derive(Default)]
pub struct PkiOptions {
    pub omit_intermediate_marker: bool,
    pub omit_leaf_marker: bool,
    /// Leaf validity as (not before, not after) years
    pub leaf_validity_years: Option<(i32, i32)>,
}

/// Root, intermediate and leaf shaped like a storefront signing chain
pub struct TestPki {
    pub root: Issued,
    pub intermediate: Issued,
    pub leaf: Issued,
}

impl TestPki {
    pub fn new() -> Self {
        Self::with_options(PkiOptions::default())
    }

    pub fn with_options(options: PkiOptions) -> Self {
        let root_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, "Test Storefront Root CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let root_cert = params.self_signed(&root_key).unwrap();
        let root = issued(root_cert, root_key);

        let int_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, "Test Storefront Intermediate CA");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        if !options.omit_intermediate_marker {
            params.custom_extensions =
                vec![CustomExtension::from_oid_content(INTERMEDIATE_MARKER, vec![0x05, 0x00])];
        }
        let int_cert = params.signed_by(&int_key, &root.rcgen, &root.key).unwrap();
        let intermediate = issued(int_cert, int_key);

        let leaf_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, "Test Storefront Signing");
        params.custom_extensions = vec![aia_extension(RESPONDER_URL)];
        if !options.omit_leaf_marker {
            params
                .custom_extensions
                .push(CustomExtension::from_oid_content(LEAF_MARKER, vec![0x05, 0x00]));
        }
        if let Some((from, to)) = options.leaf_validity_years {
            params.not_before = rcgen::date_time_ymd(from, 1, 1);
            params.not_after = rcgen::date_time_ymd(to, 1, 1);
        }
        let leaf_cert = params
            .signed_by(&leaf_key, &intermediate.rcgen, &intermediate.key)
            .unwrap();
        let leaf = issued(leaf_cert, leaf_key);

        Self {
            root,
            intermediate,
            leaf,
        }
    }

    pub fn root_der(&self) -> Vec<u8> {
        self.root.der().to_vec()
    }

    pub fn x5c(&self) -> Vec<String> {
        [&self.leaf, &self.intermediate, &self.root]
            .iter()
            .map(|issued| STANDARD.encode(issued.der()))
            .collect()
    }

    /// Sign `payload` as an ES256 token carrying this chain
    pub fn sign(&self, payload: &serde_json::Value) -> String {
        let header = serde_json::json!({"alg": "ES256", "x5c": self.x5c()});
        self.sign_with_header(&header, payload)
    }

    pub fn sign_with_header(
        &self,
        header: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        );
        let key = EcdsaKeyPair::from_pkcs8(
            &ECDSA_P256_SHA256_FIXED_SIGNING,
            &self.leaf.key.serialize_der(),
        )
        .unwrap();
        let signature = key
            .sign(&SystemRandom::new(), signing_input.as_bytes())
            .unwrap();
        format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature.as_ref()))
    }

    /// A current OCSP response about the leaf, signed by the intermediate
    pub fn ocsp_response(&self, status: Asn1CertStatus) -> Vec<u8> {
        let now = Utc::now();
        let data = ResponseData {
            version: 0,
            responder_id: ResponderId::ByKey(OctetString::new(vec![0x42; 20]).unwrap()),
            produced_at: time(now),
            responses: vec![SingleResponse {
                cert_id: CertId::for_certificate(&self.leaf.cert, &self.intermediate.cert)
                    .unwrap(),
                cert_status: status,
                this_update: time(now - ChronoDuration::hours(1)),
                next_update: Some(time(now + ChronoDuration::hours(12))),
                single_extensions: None,
            }],
            response_extensions: None,
        };
        let tbs_der = data.to_der().unwrap();

        let key = EcdsaKeyPair::from_pkcs8(
            &ECDSA_P256_SHA256_ASN1_SIGNING,
            &self.intermediate.key.serialize_der(),
        )
        .unwrap();
        let signature = key.sign(&SystemRandom::new(), &tbs_der).unwrap();

        let basic = BasicOcspResponse {
            tbs_response_data: Any::from_der(&tbs_der).unwrap(),
            signature_algorithm: AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
            signature: BitString::from_bytes(signature.as_ref()).unwrap(),
            certs: None,
        };

        OcspResponse {
            response_status: OcspResponseStatus::Successful,
            response_bytes: Some(ResponseBytes {
                response_type: OID_OCSP_BASIC,
                response: OctetString::new(basic.to_der().unwrap()).unwrap(),
            }),
        }
        .to_der()
        .unwrap()
    }

    pub fn good_ocsp_response(&self) -> Vec<u8> {
        self.ocsp_response(Asn1CertStatus::Good(Null))
    }

    pub fn revoked_ocsp_response(&self) -> Vec<u8> {
        self.ocsp_response(Asn1CertStatus::Revoked(RevokedInfo {
            revocation_time: time(Utc::now() - ChronoDuration::days(1)),
            revocation_reason: None,
        }))
    }
}

fn issued(rcgen: rcgen::Certificate, key: KeyPair) -> Issued {
    Issued {
        cert: Certificate::from_der(rcgen.der()).unwrap(),
        key,
        rcgen,
    }
}

fn aia_extension(url: &str) -> CustomExtension {
    let mut access = vec![0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01];
    access.push(0x86);
    access.push(url.len() as u8);
    access.extend_from_slice(url.as_bytes());
    let mut desc = vec![0x30, access.len() as u8];
    desc.extend(access);
    let mut value = vec![0x30, desc.len() as u8];
    value.extend(desc);
    CustomExtension::from_oid_content(&[1, 3, 6, 1, 5, 5, 7, 1, 1], value)
}

fn time(dt: chrono::DateTime<Utc>) -> GeneralizedTime {
    GeneralizedTime::from_unix_duration(Duration::from_secs(dt.timestamp() as u64)).unwrap()
}

/// OCSP transport answering with a fixed response and counting round trips
pub struct MockTransport {
    response: Option<Vec<u8>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(response: Vec<u8>) -> Self {
        Self {
            response: Some(response),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// A transport whose every request fails
    pub fn failing() -> Self {
        Self {
            response: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcspTransport for MockTransport {
    fn query<'a>(
        &'a self,
        _request: &'a [u8],
        responder_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = storefront_ocsp::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            assert_eq!(responder_url, RESPONDER_URL);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.response
                .clone()
                .ok_or_else(|| storefront_ocsp::Error::Http("connection refused".to_string()))
        })
    }
}

/// A transaction payload for the test app
pub fn transaction_payload(environment: &str) -> serde_json::Value {
    serde_json::json!({
        "originalTransactionId": "1000000000000001",
        "transactionId": "1000000000000002",
        "webOrderLineItemId": "2000000000000001",
        "bundleId": BUNDLE_ID,
        "productId": "com.example.monthly",
        "subscriptionGroupIdentifier": "21000001",
        "purchaseDate": 1698148800000_i64,
        "originalPurchaseDate": 1698148700000_i64,
        "expiresDate": 1700827200000_i64,
        "quantity": 1,
        "type": "Auto-Renewable Subscription",
        "inAppOwnershipType": "PURCHASED",
        "signedDate": 1698148900000_i64,
        "environment": environment,
        "storefront": "USA",
        "storefrontId": "143441",
        "transactionReason": "PURCHASE",
        "currency": "USD",
        "price": 10990,
        "offerDiscountType": "PAY_AS_YOU_GO"
    })
}
