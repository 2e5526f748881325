use serde::{Deserialize, Serialize};

use crate::types::{serialize_option_u128_as_string, Address, BlockHash};

/// Header fields of one ledger block, immutable once fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: BlockHash,
    /// Unix seconds
    pub timestamp: u64,
    /// Block producer
    pub miner: Address,
    /// Number of transactions included in the block
    pub tx_count: u64,
    /// Base fee per gas in wei. Absent on pre-London ledgers.
    #[serde(
        serialize_with = "serialize_option_u128_as_string",
        deserialize_with = "deserialize_option_u128_from_string",
        default
    )]
    pub base_fee: Option<u128>,
}

fn deserialize_option_u128_from_string<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse::<u128>().map_err(serde::de::Error::custom))
        .transpose()
}
