//! Per-command, per-invoker cooldown ledger.
//!
//! A [`CooldownTracker`] remembers the instant of the last admitted
//! invocation for each `(command key, invoker)` pair and answers whether a
//! new invocation is currently throttled. Entries are never explicitly
//! deleted; the map is bounded by invoker cardinality, which is acceptable
//! for this domain.
//!
//! The time source is injectable so tests can drive the clock by hand.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Injectable monotonic time source.
pub type TimeSource = Arc<dyn Fn() -> Instant + Send + Sync>;

/// Timestamp ledger deciding whether a command invocation is throttled.
pub struct CooldownTracker {
    entries: Mutex<HashMap<(String, String), Instant>>,
    now: TimeSource,
}

impl CooldownTracker {
    /// Creates a tracker backed by the real clock.
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(Instant::now))
    }

    /// Creates a tracker with a custom time source.
    pub fn with_time_source(now: TimeSource) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            now,
        }
    }

    /// Returns whether `(command_key, invoker)` is inside its cooldown window.
    ///
    /// A zero cooldown never throttles, and neither does a pair with no
    /// recorded invocation yet.
    pub fn is_throttled(&self, command_key: &str, invoker: &str, cooldown: Duration) -> bool {
        if cooldown.is_zero() {
            return false;
        }
        let entries = self.entries.lock();
        match entries.get(&(command_key.to_owned(), invoker.to_owned())) {
            Some(last) => (self.now)().duration_since(*last) < cooldown,
            None => false,
        }
    }

    /// Upserts the last-invocation instant for `(command_key, invoker)`.
    pub fn record(&self, command_key: &str, invoker: &str) {
        let now = (self.now)();
        self.entries
            .lock()
            .insert((command_key.to_owned(), invoker.to_owned()), now);
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CooldownTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownTracker")
            .field("entries", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    /// Manual clock: tests advance it explicitly.
    fn manual_clock() -> (Arc<PlMutex<Instant>>, TimeSource) {
        let now = Arc::new(PlMutex::new(Instant::now()));
        let source = Arc::clone(&now);
        (now, Arc::new(move || *source.lock()))
    }

    #[test]
    fn zero_cooldown_never_throttles() {
        let tracker = CooldownTracker::new();
        tracker.record("ping", "u1");
        assert!(!tracker.is_throttled("ping", "u1", Duration::ZERO));
    }

    #[test]
    fn unknown_pair_is_not_throttled() {
        let tracker = CooldownTracker::new();
        assert!(!tracker.is_throttled("ping", "u1", Duration::from_secs(5)));
    }

    #[test]
    fn throttles_inside_window_and_releases_after() {
        let (clock, source) = manual_clock();
        let tracker = CooldownTracker::with_time_source(source);

        tracker.record("ping", "u1");
        *clock.lock() += Duration::from_secs(3);
        assert!(tracker.is_throttled("ping", "u1", Duration::from_secs(5)));

        *clock.lock() += Duration::from_secs(3);
        assert!(!tracker.is_throttled("ping", "u1", Duration::from_secs(5)));
    }

    #[test]
    fn cooldowns_are_keyed_per_invoker() {
        let (_, source) = manual_clock();
        let tracker = CooldownTracker::with_time_source(source);

        tracker.record("ping", "u1");
        assert!(tracker.is_throttled("ping", "u1", Duration::from_secs(5)));
        assert!(!tracker.is_throttled("ping", "u2", Duration::from_secs(5)));
    }

    #[test]
    fn record_upserts_the_window() {
        let (clock, source) = manual_clock();
        let tracker = CooldownTracker::with_time_source(source);

        tracker.record("ping", "u1");
        *clock.lock() += Duration::from_secs(6);
        assert!(!tracker.is_throttled("ping", "u1", Duration::from_secs(5)));

        tracker.record("ping", "u1");
        assert!(tracker.is_throttled("ping", "u1", Duration::from_secs(5)));
    }
}
