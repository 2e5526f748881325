use serde::Serialize;

/// Inclusive block range scanned by one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockWindow {
    pub from_block: u64,
    pub to_block: u64,
}

impl BlockWindow {
    pub fn span(&self) -> u64 {
        self.to_block - self.from_block
    }
}

/// Window ending at `latest_block` and reaching back at most `window_size` blocks.
///
/// `floor_block` can only narrow the window. A floor above the head is clamped to the head.
pub fn compute_window(latest_block: u64, window_size: u64, floor_block: Option<u64>) -> BlockWindow {
    let mut from_block = latest_block.saturating_sub(window_size);
    if let Some(floor) = floor_block {
        if floor > from_block {
            from_block = floor.min(latest_block);
        }
    }
    BlockWindow {
        from_block,
        to_block: latest_block,
    }
}
