//! Ledger identifiers and serde helpers shared by the views

use serde::Serializer;

pub use alloy_primitives::{Address, B256};

/// Transaction identifier. Ordering matches lexicographic order of the lowercase hex form.
pub type TxHash = B256;
pub type BlockHash = B256;

/// Serialize u128 as a decimal string so JavaScript clients keep full precision
pub fn serialize_u128_as_string<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Serialize Option<u128> as a decimal string
pub fn serialize_option_u128_as_string<S>(
    value: &Option<u128>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_some(&v.to_string()),
        None => serializer.serialize_none(),
    }
}
