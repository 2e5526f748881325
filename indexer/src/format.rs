//! Display helpers for hashes, addresses, ages and block-explorer links

use std::fmt;

const PLACEHOLDER: &str = "—";

/// Keep the first `start` and last `end` characters, joined by an ellipsis.
pub fn short_hash(hash: &str, start: usize, end: usize) -> String {
    if hash.is_empty() {
        return PLACEHOLDER.to_string();
    }
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= start + end {
        return hash.to_string();
    }
    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}…{}", head, tail)
}

pub fn short_tx_hash(hash: &impl fmt::Display) -> String {
    short_hash(&hash.to_string(), 10, 8)
}

pub fn short_address(address: &impl fmt::Display) -> String {
    short_hash(&address.to_string(), 6, 4)
}

/// Relative age of `timestamp` seen from `now`, e.g. `"12m ago"`.
pub fn time_ago(timestamp: Option<u64>, now: u64) -> String {
    let Some(timestamp) = timestamp.filter(|t| *t > 0) else {
        return PLACEHOLDER.to_string();
    };
    let diff = now.saturating_sub(timestamp);
    if diff < 10 {
        return "a few seconds ago".to_string();
    }
    if diff < 60 {
        return format!("{}s ago", diff);
    }
    let minutes = diff / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Tx,
    Block,
    Address,
}

impl LinkKind {
    fn path(&self) -> &'static str {
        match self {
            LinkKind::Tx => "tx",
            LinkKind::Block => "block",
            LinkKind::Address => "address",
        }
    }
}

/// Block-explorer URL for a value, or None when no explorer is configured.
pub fn explorer_link(base: Option<&str>, kind: LinkKind, value: &impl fmt::Display) -> Option<String> {
    let base = base.map(str::trim).filter(|b| !b.is_empty())?;
    let base = base.strip_suffix('/').unwrap_or(base);
    Some(format!("{}/{}/{}", base, kind.path(), value))
}
