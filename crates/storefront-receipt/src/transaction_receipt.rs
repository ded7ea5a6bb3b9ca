//! Transaction ids from legacy text transaction receipts
//!
//! These receipts are base64 property-list text whose `purchase-info` entry is
//! itself base64 text containing a `transaction-id` entry.

use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use std::sync::LazyLock;

static PURCHASE_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""purchase-info"\s+=\s+"([a-zA-Z0-9+/=]+)";"#).expect("valid pattern")
});

static TRANSACTION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""transaction-id"\s+=\s+"([a-zA-Z0-9+/=]+)";"#).expect("valid pattern")
});

/// Find the transaction id in a base64 text transaction receipt
///
/// Returns `None` when either level is not base64 UTF-8 text or the expected
/// entry is missing.
pub fn extract_transaction_id_from_transaction_receipt(transaction_receipt: &str) -> Option<String> {
    let top_level = decode_text(transaction_receipt)?;
    let Some(purchase_info) = capture(&PURCHASE_INFO, &top_level) else {
        tracing::debug!("Transaction receipt has no purchase-info entry");
        return None;
    };

    let purchase_info = decode_text(purchase_info)?;
    let transaction_id = capture(&TRANSACTION_ID, &purchase_info);
    if transaction_id.is_none() {
        tracing::debug!("Transaction receipt purchase-info has no transaction-id entry");
    }
    transaction_id.map(str::to_string)
}

fn decode_text(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"transaction-id\" = \"42\";", Some("42"))]
    #[case("\"transaction-id\"\t=\t\"42\";", Some("42"))]
    #[case("\"transaction-id\"=\"42\";", None)]
    #[case("\"transaction-id\" = \"4 2\";", None)]
    #[case("\"original-transaction-id\" = \"7\";", None)]
    fn test_transaction_id_pattern(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(capture(&TRANSACTION_ID, text), expected);
    }

    #[test]
    fn test_not_base64() {
        assert_eq!(
            extract_transaction_id_from_transaction_receipt("%%%"),
            None
        );
    }

    #[test]
    fn test_missing_purchase_info() {
        let receipt = STANDARD.encode("{\n\t\"signature\" = \"AAAA\";\n}");
        assert_eq!(extract_transaction_id_from_transaction_receipt(&receipt), None);
    }
}
