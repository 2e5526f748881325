//! Collapses activity into one row per transaction

use std::collections::HashMap;

use crate::state::{ActivityKind, ActivityRecord, SortOrder, TransactionView};

/// Group records by tx hash. `Created` beats `VoteCast`; within one kind the first seen wins.
pub fn derive_transactions(records: &[ActivityRecord], order: SortOrder) -> Vec<TransactionView> {
    let mut by_hash: HashMap<_, TransactionView> = HashMap::with_capacity(records.len());

    for record in records {
        by_hash
            .entry(record.tx_hash)
            .and_modify(|view| {
                view.event_count += 1;
                if view.kind != ActivityKind::Created && record.kind() == ActivityKind::Created {
                    let event_count = view.event_count;
                    *view = TransactionView::from_record(record);
                    view.event_count = event_count;
                }
            })
            .or_insert_with(|| TransactionView::from_record(record));
    }

    let mut views: Vec<TransactionView> = by_hash.into_values().collect();
    views.sort_by(|a, b| {
        let by_block = match order {
            SortOrder::Newest => b.block_number.cmp(&a.block_number),
            SortOrder::Oldest => a.block_number.cmp(&b.block_number),
        };
        by_block.then_with(|| a.tx_hash.cmp(&b.tx_hash))
    });
    views
}
