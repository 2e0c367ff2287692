//! Time-related operations: sleep, interval, timeout, instants.

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

/// Milliseconds since the Unix epoch, for cursors and audit timestamps that
/// need to be compared as plain integers.
pub fn now_unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_unix_millis_is_monotonic_enough() {
        let a = now_unix_millis();
        let b = now_unix_millis();
        assert!(b >= a);
    }
}
