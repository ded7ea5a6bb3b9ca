//! Server notification (version 2) envelope
//!
//! A notification carries its identity fields in exactly one of three
//! sub-objects: `data`, `summary` or `externalPurchaseToken`. Which one is
//! present is modelled by [`NotificationContent`]; an envelope with more than
//! one of them is rejected during deserialization.

use crate::environment::Environment;
use crate::error::Error;
use crate::timestamp::Millis;
use serde::{Deserialize, Serialize};

/// Prefix of external purchase ids issued by the sandbox
pub const SANDBOX_EXTERNAL_PURCHASE_PREFIX: &str = "SANDBOX";

/// Decoded payload of a signed notification (`ResponseBodyV2DecodedPayload`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNotification", into = "RawNotification")]
pub struct ResponseBodyV2DecodedPayload {
    pub notification_type: Option<String>,
    pub subtype: Option<String>,
    pub notification_uuid: Option<String>,
    pub version: Option<String>,
    pub signed_date: Option<Millis>,
    pub content: NotificationContent,
}

/// The identity-bearing part of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationContent {
    Data(NotificationData),
    Summary(NotificationSummary),
    ExternalPurchaseToken(ExternalPurchaseToken),
    /// None of the sub-objects is present
    None,
}

/// Identity fields shared by every notification sub-object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationIdentity<'a> {
    pub bundle_id: Option<&'a str>,
    pub app_apple_id: Option<i64>,
    pub environment: Option<Environment>,
}

impl NotificationContent {
    /// Identity fields of whichever sub-object is present
    pub fn identity(&self) -> Option<NotificationIdentity<'_>> {
        match self {
            NotificationContent::Data(data) => Some(NotificationIdentity {
                bundle_id: data.bundle_id.as_deref(),
                app_apple_id: data.app_apple_id,
                environment: data.environment,
            }),
            NotificationContent::Summary(summary) => Some(NotificationIdentity {
                bundle_id: summary.bundle_id.as_deref(),
                app_apple_id: summary.app_apple_id,
                environment: summary.environment,
            }),
            NotificationContent::ExternalPurchaseToken(token) => Some(NotificationIdentity {
                bundle_id: token.bundle_id.as_deref(),
                app_apple_id: token.app_apple_id,
                environment: token.environment(),
            }),
            NotificationContent::None => None,
        }
    }
}

/// `data` sub-object of a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_version: Option<String>,
    /// Nested signed transaction, verified separately by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_transaction_info: Option<String>,
    /// Nested signed renewal info, verified separately by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_renewal_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption_request_reason: Option<String>,
}

/// `summary` sub-object of a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storefront_country_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<i64>,
}

/// `externalPurchaseToken` sub-object of a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPurchaseToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_purchase_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_creation_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

impl ExternalPurchaseToken {
    /// Environment the token was issued in
    ///
    /// Tokens carry no environment field; sandbox ids start with `SANDBOX`.
    /// A token without an id yields `None`.
    pub fn environment(&self) -> Option<Environment> {
        self.external_purchase_id.as_deref().map(|id| {
            if id.starts_with(SANDBOX_EXTERNAL_PURCHASE_PREFIX) {
                Environment::Sandbox
            } else {
                Environment::Production
            }
        })
    }
}

/// Wire shape of the envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtype: Option<String>,
    #[serde(
        default,
        rename = "notificationUUID",
        skip_serializing_if = "Option::is_none"
    )]
    notification_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signed_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<NotificationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<NotificationSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_purchase_token: Option<ExternalPurchaseToken>,
}

impl TryFrom<RawNotification> for ResponseBodyV2DecodedPayload {
    type Error = Error;

    fn try_from(raw: RawNotification) -> Result<Self, Self::Error> {
        let content = match (raw.data, raw.summary, raw.external_purchase_token) {
            (Some(data), None, None) => NotificationContent::Data(data),
            (None, Some(summary), None) => NotificationContent::Summary(summary),
            (None, None, Some(token)) => NotificationContent::ExternalPurchaseToken(token),
            (None, None, None) => NotificationContent::None,
            _ => {
                return Err(Error::InvalidNotification(
                    "more than one of data, summary and externalPurchaseToken is present"
                        .to_string(),
                ))
            }
        };

        Ok(ResponseBodyV2DecodedPayload {
            notification_type: raw.notification_type,
            subtype: raw.subtype,
            notification_uuid: raw.notification_uuid,
            version: raw.version,
            signed_date: raw.signed_date,
            content,
        })
    }
}

impl From<ResponseBodyV2DecodedPayload> for RawNotification {
    fn from(payload: ResponseBodyV2DecodedPayload) -> Self {
        let mut raw = RawNotification {
            notification_type: payload.notification_type,
            subtype: payload.subtype,
            notification_uuid: payload.notification_uuid,
            version: payload.version,
            signed_date: payload.signed_date,
            ..Default::default()
        };
        match payload.content {
            NotificationContent::Data(data) => raw.data = Some(data),
            NotificationContent::Summary(summary) => raw.summary = Some(summary),
            NotificationContent::ExternalPurchaseToken(token) => {
                raw.external_purchase_token = Some(token)
            }
            NotificationContent::None => {}
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_data_notification() {
        let json = r#"{
            "notificationType": "SUBSCRIBED",
            "subtype": "INITIAL_BUY",
            "notificationUUID": "002e14d5-51f5-4503-b5a8-c3a1af68eb20",
            "version": "2.0",
            "signedDate": 1698148900000,
            "data": {
                "environment": "Sandbox",
                "appAppleId": 41234,
                "bundleId": "com.example",
                "bundleVersion": "1.2.3",
                "signedTransactionInfo": "signed_transaction_info_value",
                "status": 1
            }
        }"#;
        let payload: ResponseBodyV2DecodedPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.notification_type.as_deref(), Some("SUBSCRIBED"));
        assert_eq!(
            payload.notification_uuid.as_deref(),
            Some("002e14d5-51f5-4503-b5a8-c3a1af68eb20")
        );
        let identity = payload.content.identity().unwrap();
        assert_eq!(identity.bundle_id, Some("com.example"));
        assert_eq!(identity.app_apple_id, Some(41234));
        assert_eq!(identity.environment, Some(Environment::Sandbox));
    }

    #[test]
    fn test_decode_summary_notification() {
        let json = r#"{
            "notificationType": "RENEWAL_EXTENSION",
            "subtype": "SUMMARY",
            "summary": {
                "environment": "LocalTesting",
                "appAppleId": 41234,
                "bundleId": "com.example",
                "productId": "com.example.product",
                "requestIdentifier": "efb27071-45a4-4aca-9854-2a1e9146f265",
                "storefrontCountryCodes": ["CAN", "USA", "MEX"],
                "succeededCount": 5,
                "failedCount": 2
            }
        }"#;
        let payload: ResponseBodyV2DecodedPayload = serde_json::from_str(json).unwrap();
        match &payload.content {
            NotificationContent::Summary(summary) => {
                assert_eq!(summary.succeeded_count, Some(5));
                assert_eq!(summary.storefront_country_codes.as_ref().unwrap().len(), 3);
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[rstest]
    #[case("SANDBOX_b2158121-7af9-49d4-9561-1f588205523e", Environment::Sandbox)]
    #[case("b2158121-7af9-49d4-9561-1f588205523e", Environment::Production)]
    fn test_external_purchase_token_environment(#[case] id: &str, #[case] expected: Environment) {
        let json = format!(
            r#"{{"notificationType": "EXTERNAL_PURCHASE_TOKEN",
                "externalPurchaseToken": {{
                    "externalPurchaseId": "{}",
                    "tokenCreationDate": 1698148900000,
                    "appAppleId": 55555,
                    "bundleId": "com.example"
                }}}}"#,
            id
        );
        let payload: ResponseBodyV2DecodedPayload = serde_json::from_str(&json).unwrap();
        let identity = payload.content.identity().unwrap();
        assert_eq!(identity.environment, Some(expected));
        assert_eq!(identity.app_apple_id, Some(55555));
    }

    #[test]
    fn test_notification_without_content() {
        let json = r#"{"notificationType": "TEST", "signedDate": 1698148900000}"#;
        let payload: ResponseBodyV2DecodedPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.content, NotificationContent::None);
        assert!(payload.content.identity().is_none());
    }

    #[test]
    fn test_notification_with_two_sub_objects_rejected() {
        let json = r#"{
            "notificationType": "SUBSCRIBED",
            "data": {"bundleId": "com.example"},
            "summary": {"bundleId": "com.example"}
        }"#;
        let err = serde_json::from_str::<ResponseBodyV2DecodedPayload>(json).unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_notification_serializes_wire_shape() {
        let payload = ResponseBodyV2DecodedPayload {
            notification_type: Some("TEST".to_string()),
            subtype: None,
            notification_uuid: Some("uuid".to_string()),
            version: None,
            signed_date: None,
            content: NotificationContent::Data(NotificationData {
                bundle_id: Some("com.example".to_string()),
                ..Default::default()
            }),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["notificationUUID"], "uuid");
        assert_eq!(value["data"]["bundleId"], "com.example");
        assert!(value.get("summary").is_none());
    }
}
