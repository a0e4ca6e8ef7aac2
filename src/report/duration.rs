use chrono::{DateTime, Utc};

use super::NOT_AVAILABLE;

/// Formats the time between two instants as `1h 2m 3s`, `2m 3s` or `3s`,
/// truncating partial seconds.
///
/// Returns `"N/A"` when either instant is missing or `later` precedes `earlier`.
pub fn elapsed(earlier: Option<DateTime<Utc>>, later: Option<DateTime<Utc>>) -> String {
    let (Some(earlier), Some(later)) = (earlier, later) else {
        return NOT_AVAILABLE.to_string();
    };
    if later < earlier {
        return NOT_AVAILABLE.to_string();
    }

    let total = (later - earlier).num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
