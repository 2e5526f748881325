//! Remaining-time arithmetic for voting deadlines

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds of a voting's nominal lifetime used by the progress heuristic
pub const PROGRESS_HORIZON_SECS: u64 = 3_600;

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn remaining_secs(end_time: u64, now: u64) -> u64 {
    end_time.saturating_sub(now)
}

/// `"{h}h {m}m"` above an hour, `"{m}m {s}s"` above a minute, otherwise `"{s}s"`.
pub fn format_remaining(remaining: u64) -> String {
    let hours = remaining / 3_600;
    let minutes = (remaining % 3_600) / 60;
    let seconds = remaining % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Percentage of the progress bar to fill. 100 once ended, otherwise kept within 5..=95.
pub fn time_progress(remaining: u64) -> u32 {
    if remaining == 0 {
        return 100;
    }
    let fraction = 1.0 - remaining as f64 / PROGRESS_HORIZON_SECS as f64;
    (fraction * 100.0).round().clamp(5.0, 95.0) as u32
}
