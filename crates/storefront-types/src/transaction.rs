//! Signed transaction payload

use crate::environment::Environment;
use crate::timestamp::Millis;
use serde::{Deserialize, Serialize};

/// Decoded payload of a signed transaction (`JWSTransactionDecodedPayload`)
///
/// Enumerated string fields (`type`, `inAppOwnershipType`, ...) are kept as
/// strings so payloads carrying values newer than this crate still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwsTransactionDecodedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_order_line_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_group_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_purchase_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_account_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_app_ownership_type: Option<String>,
    /// When the storefront signed this payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_upgraded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storefront: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storefront_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Price in milli-units of `currency`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_discount_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_period: Option<String>,
}
