//! Signed subscription renewal info payload

use crate::environment::Environment;
use crate::timestamp::Millis;
use serde::{Deserialize, Serialize};

/// Decoded payload of signed renewal info (`JWSRenewalInfoDecodedPayload`)
///
/// Renewal info carries no bundle id, so only its environment is reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwsRenewalInfoDecodedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_intent: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_renew_product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// 0 when auto-renew is off, 1 when on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_renew_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_in_billing_retry_period: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_increase_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_expires_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_subscription_start_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_discount_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligible_win_back_offer_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_account_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_period: Option<String>,
}
