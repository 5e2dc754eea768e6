//! Monthly calendar cache.
//!
//! Resolved calendar data for a month is computed at most once and shared
//! across concurrent calculation runs. Population happens under the cache
//! lock (single flight): concurrent callers for the same month all receive
//! the one populated value instead of issuing duplicate external calls.
//! Entries expire after a bounded TTL and can be invalidated explicitly
//! when the underlying holiday data changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

/// Cache key: calendar month plus the fast-mode flag.
///
/// Fast-mode contexts carry estimated Sabbath windows and must not be
/// served to precise runs, so the flag is part of the key.
type Key = (i32, u32, bool);

struct Entry<T> {
    populated_at: Instant,
    value: Arc<T>,
}

/// A TTL-bounded, single-flight cache of per-month calendar data.
///
/// Shared read-mostly state: many concurrent runs for the same month hit
/// one populated entry.
pub struct MonthCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<Key, Entry<T>>>,
}

impl<T> MonthCache<T> {
    /// Default entry lifetime: one week.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Creates a cache with the default one-week TTL.
    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for the month, populating it if absent or
    /// expired.
    ///
    /// `populate` runs while the cache lock is held, so concurrent callers
    /// for the same month block until the first caller finishes and then
    /// receive the same `Arc` rather than populating again.
    pub fn get_or_populate<F>(&self, year: i32, month: u32, fast_mode: bool, populate: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let key = (year, month, fast_mode);
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        if let Some(entry) = entries.get(&key) {
            if entry.populated_at.elapsed() < self.ttl {
                return Arc::clone(&entry.value);
            }
            debug!(year, month, "calendar cache entry expired");
        }

        let value = Arc::new(populate());
        entries.insert(
            key,
            Entry {
                populated_at: Instant::now(),
                value: Arc::clone(&value),
            },
        );
        debug!(year, month, fast_mode, "calendar cache entry populated");
        value
    }

    /// Removes the entries for a month (both precise and fast variants).
    ///
    /// Called when the underlying holiday data changes or a forced
    /// recalculation is requested.
    pub fn invalidate(&self, year: i32, month: u32) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.remove(&(year, month, false));
        entries.remove(&(year, month, true));
    }
}

impl<T> Default for MonthCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
