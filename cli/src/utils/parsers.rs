use ballot_indexer::{
    intent::DurationUnit, ActivityKind, Address, SortOrder, StatusFilter,
};
use std::str::FromStr;

pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|e| format!("invalid address: {e}"))
}

pub fn parse_activity_kind(s: &str) -> Result<ActivityKind, String> {
    ActivityKind::from_str(s)
}

pub fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    SortOrder::from_str(s)
}

pub fn parse_status_filter(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::from_str(s)
}

pub fn parse_duration_unit(s: &str) -> Result<DurationUnit, String> {
    DurationUnit::from_str(s)
}

/// Comma-separated option labels, e.g. `"Yes,No,Abstain"`.
pub fn parse_option_list(s: &str) -> Result<Vec<String>, String> {
    let options: Vec<String> = s.split(',').map(|o| o.trim().to_string()).collect();
    if options.iter().all(|o| o.is_empty()) {
        return Err("no options given".to_string());
    }
    Ok(options)
}
