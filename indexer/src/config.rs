//! Indexer tuning knobs

pub const DEFAULT_WINDOW_BLOCKS: u64 = 5_000;
pub const DEFAULT_MAX_DISPLAY: usize = 10;
pub const DEFAULT_RECENT_BLOCKS: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Number of blocks behind the head scanned for events
    pub window_blocks: u64,
    /// Cap on merged records kept and enriched per refresh
    pub max_display: usize,
    /// Number of most recent block headers kept per refresh
    pub recent_blocks: usize,
    pub page_size: usize,
    /// Width of the nearby-page window in list views
    pub page_window: usize,
    /// Lowest block ever scanned, usually the contract deployment block
    pub floor_block: Option<u64>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            window_blocks: DEFAULT_WINDOW_BLOCKS,
            max_display: DEFAULT_MAX_DISPLAY,
            recent_blocks: DEFAULT_RECENT_BLOCKS,
            page_size: DEFAULT_PAGE_SIZE,
            page_window: DEFAULT_PAGE_WINDOW,
            floor_block: None,
        }
    }
}

impl IndexerConfig {
    pub fn with_floor_block(mut self, floor_block: Option<u64>) -> Self {
        self.floor_block = floor_block;
        self
    }
}
