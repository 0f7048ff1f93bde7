//! Locally generated identifiers
//!
//! Used only when no remote backend is configured. The `item_` prefix is
//! what lets the write path recognize purely local entries and skip the
//! remote call for them.

use std::sync::{Arc, Mutex};

use bridge_traits::time::{Clock, SystemClock};

pub const LOCAL_ID_PREFIX: &str = "item_";

pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// `item_<millis>` generator. Suffixes strictly increase, even when two
/// calls land in the same millisecond or the clock steps backwards.
pub struct LocalIdGenerator {
    clock: Arc<dyn Clock>,
    last: Mutex<i64>,
}

impl LocalIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(i64::MIN),
        }
    }

    pub fn next_id(&self) -> String {
        let now = self.clock.unix_timestamp_millis();
        let mut last = self.last.lock().unwrap_or_else(|p| p.into_inner());
        let next = if now > *last { now } else { *last + 1 };
        *last = next;
        format!("{}{}", LOCAL_ID_PREFIX, next)
    }
}

impl Default for LocalIdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for LocalIdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdGenerator").finish_non_exhaustive()
    }
}
