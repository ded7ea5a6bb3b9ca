//! Transaction ids from binary app receipts
//!
//! An app receipt is a PKCS #7 SignedData whose encapsulated content is a SET
//! of receipt attributes:
//!
//! ```text
//! ReceiptAttribute ::= SEQUENCE {
//!     type    INTEGER,
//!     version INTEGER,
//!     value   OCTET STRING }
//! ```
//!
//! In-app purchase attributes (type 17) hold a nested SET of the same shape.

use crate::ber::{Reader, Tag, Tlv};
use base64::{engine::general_purpose::STANDARD, Engine};
use der::asn1::{ObjectIdentifier, Utf8StringRef};
use der::Decode;
use std::borrow::Cow;

/// `id-signedData` content type
pub const PKCS7_SIGNED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

pub const IN_APP_PURCHASE_TYPE: i64 = 17;
pub const TRANSACTION_ID_TYPE: i64 = 1703;
pub const ORIGINAL_TRANSACTION_ID_TYPE: i64 = 1705;

/// Find a transaction id in a base64 app receipt
///
/// Returns the first transaction id or original transaction id of the first
/// in-app purchase that has one, or `None` when the receipt has no in-app
/// purchases or cannot be parsed. The receipt's signature is not checked.
pub fn extract_transaction_id_from_app_receipt(app_receipt: &str) -> Option<String> {
    let Ok(ber) = STANDARD.decode(app_receipt.trim()) else {
        tracing::debug!("App receipt is not valid base64");
        return None;
    };

    let Some(payload) = receipt_payload(&ber) else {
        tracing::debug!("App receipt is not a PKCS #7 SignedData container");
        return None;
    };

    let transaction_id = attributes(&payload)?
        .filter(|attribute| attribute.kind == IN_APP_PURCHASE_TYPE)
        .find_map(|in_app| {
            attributes(&in_app.value)?
                .filter(|attribute| {
                    attribute.kind == TRANSACTION_ID_TYPE
                        || attribute.kind == ORIGINAL_TRANSACTION_ID_TYPE
                })
                .find_map(|attribute| utf8_string(&attribute.value))
        });

    if transaction_id.is_none() {
        tracing::debug!("App receipt has no in-app purchase with a transaction id");
    }
    transaction_id
}

/// Walk ContentInfo -> SignedData -> EncapsulatedContentInfo to the payload
fn receipt_payload(ber: &[u8]) -> Option<Cow<'_, [u8]>> {
    let content_info = tagged(Reader::new(ber).read()?, Tag::SEQUENCE)?;
    let mut fields = content_info.children()?;

    let content_type = tagged(fields.read()?, Tag::OBJECT_IDENTIFIER)?;
    if ObjectIdentifier::from_bytes(content_type.value).ok()? != PKCS7_SIGNED_DATA {
        return None;
    }

    let content = tagged(fields.read()?, Tag::context(0))?;
    let signed_data = tagged(content.children()?.read()?, Tag::SEQUENCE)?;
    let mut signed_data = signed_data.children()?;
    signed_data.read()?; // version
    signed_data.read()?; // digestAlgorithms

    let encap = tagged(signed_data.read()?, Tag::SEQUENCE)?;
    let mut encap = encap.children()?;
    encap.read()?; // eContentType
    let econtent = tagged(encap.read()?, Tag::context(0))?;

    econtent.children()?.read()?.octets()
}

fn tagged(tlv: Tlv<'_>, tag: Tag) -> Option<Tlv<'_>> {
    (tlv.tag == tag).then_some(tlv)
}

struct Attribute<'a> {
    kind: i64,
    value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    fn from_tlv(tlv: Tlv<'a>) -> Option<Self> {
        let mut fields = tagged(tlv, Tag::SEQUENCE)?.children()?;
        let kind = fields.read()?.integer()?;
        fields.read()?.integer()?; // version
        let value = fields.read()?.octets()?;
        Some(Attribute { kind, value })
    }
}

/// The attributes of an encoded attribute SET, skipping malformed entries
fn attributes(encoded: &[u8]) -> Option<impl Iterator<Item = Attribute<'_>>> {
    let set = Reader::new(encoded).read()?;
    if !set.tag.constructed {
        return None;
    }
    Some(set.children()?.filter_map(Attribute::from_tlv))
}

fn utf8_string(encoded: &[u8]) -> Option<String> {
    Utf8StringRef::from_der(encoded)
        .ok()
        .map(|value| value.as_str().to_string())
}
