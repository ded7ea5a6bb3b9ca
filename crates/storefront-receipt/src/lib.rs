//! Transaction id extraction from legacy storefront receipts
//!
//! Two unrelated formats are supported: binary app receipts (PKCS #7 with a
//! BER-encoded attribute set) and older text transaction receipts. Both
//! extractors are best effort and return `None` rather than an error. Neither
//! verifies the receipt; the ids they return are only useful as lookup keys.

pub mod app_receipt;
pub mod ber;
pub mod transaction_receipt;

pub use app_receipt::extract_transaction_id_from_app_receipt;
pub use transaction_receipt::extract_transaction_id_from_transaction_receipt;
