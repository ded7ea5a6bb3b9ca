//! Tagged union over every signed payload kind

use crate::app_transaction::AppTransaction;
use crate::notification::ResponseBodyV2DecodedPayload;
use crate::realtime::DecodedRealtimeRequestBody;
use crate::renewal::JwsRenewalInfoDecodedPayload;
use crate::timestamp::Millis;
use crate::transaction::JwsTransactionDecodedPayload;

/// Which model a signed token's payload should be decoded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Transaction,
    RenewalInfo,
    Notification,
    AppTransaction,
    RealtimeRequest,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Transaction => "transaction",
            PayloadKind::RenewalInfo => "renewal info",
            PayloadKind::Notification => "notification",
            PayloadKind::AppTransaction => "app transaction",
            PayloadKind::RealtimeRequest => "realtime request",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded payload of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPayload {
    Transaction(JwsTransactionDecodedPayload),
    RenewalInfo(JwsRenewalInfoDecodedPayload),
    Notification(ResponseBodyV2DecodedPayload),
    AppTransaction(AppTransaction),
    RealtimeRequest(DecodedRealtimeRequestBody),
}

impl DecodedPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            DecodedPayload::Transaction(_) => PayloadKind::Transaction,
            DecodedPayload::RenewalInfo(_) => PayloadKind::RenewalInfo,
            DecodedPayload::Notification(_) => PayloadKind::Notification,
            DecodedPayload::AppTransaction(_) => PayloadKind::AppTransaction,
            DecodedPayload::RealtimeRequest(_) => PayloadKind::RealtimeRequest,
        }
    }

    /// The self-reported signing timestamp of the payload
    pub fn signed_date(&self) -> Option<Millis> {
        match self {
            DecodedPayload::Transaction(p) => p.signed_date,
            DecodedPayload::RenewalInfo(p) => p.signed_date,
            DecodedPayload::Notification(p) => p.signed_date,
            DecodedPayload::AppTransaction(p) => p.receipt_creation_date,
            DecodedPayload::RealtimeRequest(p) => p.signed_date,
        }
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DecodedPayload {
                fn from(payload: $ty) -> Self {
                    DecodedPayload::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload! {
    Transaction => JwsTransactionDecodedPayload,
    RenewalInfo => JwsRenewalInfoDecodedPayload,
    Notification => ResponseBodyV2DecodedPayload,
    AppTransaction => AppTransaction,
    RealtimeRequest => DecodedRealtimeRequestBody,
}
