//! Signed app transaction payload

use crate::environment::Environment;
use crate::timestamp::Millis;
use serde::{Deserialize, Serialize};

/// Decoded payload of a signed app transaction (`AppTransaction`)
///
/// The environment is reported as `receiptType`, and the payload has no
/// `signedDate`: `receiptCreationDate` plays that role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_external_identifier: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_creation_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_purchase_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_application_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_verification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_verification_nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preorder_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_platform: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_app_transaction() {
        let json = r#"{
            "receiptType": "LocalTesting",
            "appAppleId": 531412,
            "bundleId": "com.example",
            "applicationVersion": "1.2.3",
            "versionExternalIdentifier": 512,
            "receiptCreationDate": 1698148900000,
            "originalPurchaseDate": 1698148800000,
            "originalApplicationVersion": "1.1.2",
            "deviceVerification": "device_verification_value",
            "deviceVerificationNonce": "48ccfa42-7431-4f22-9908-7e88983e105a",
            "preorderDate": 1698148700000,
            "appTransactionId": "71134",
            "originalPlatform": "iOS"
        }"#;
        let tx: AppTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.receipt_type, Some(Environment::LocalTesting));
        assert_eq!(tx.app_apple_id, Some(531412));
        assert_eq!(tx.receipt_creation_date, Some(Millis(1698148900000)));
        assert_eq!(tx.original_platform.as_deref(), Some("iOS"));
    }
}
