//! Time sources for session expiry.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A wall-clock anchor that advances with `tokio::time::Instant`.
///
/// When tokio time is paused (`#[tokio::test(start_paused = true)]`),
/// `tokio::time::advance` moves this clock and every pending expiry timer
/// together, which keeps stored expiries and timers in agreement.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    wall: DateTime<Utc>,
    instant: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Anchor the clock so that "now" is `wall` at the current tokio instant.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            instant: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now().duration_since(self.instant);
        chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|elapsed| self.wall.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let clock = TokioClock::starting_at(start);
        assert_eq!(clock.now(), start);

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(clock.now().timestamp_millis(), 1_700_000_001_500);
    }

    #[test]
    fn test_system_clock_is_close_to_now() {
        let diff = Utc::now() - SystemClock.now();
        assert!(diff.num_seconds().abs() < 5);
    }
}
