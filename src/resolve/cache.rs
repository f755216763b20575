// src/resolve/cache.rs
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;

use super::types::MenuRecord;

/// Default freshness window for resolved menus.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// In-memory cache of the most recent record per source name.
///
/// Freshness is absolute (no sliding refresh): a record is fresh iff
/// `now - timestamp < ttl`. Lookups never delete; a stale record sits in its
/// slot until the next `store` replaces it. There is no capacity bound; the
/// key space is the registry, which is small and fixed.
pub struct MenuCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, MenuRecord>>,
}

impl MenuCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The fresh record for `name`, if any. Stale entries behave as absent.
    pub fn lookup(&self, name: &str) -> Option<MenuRecord> {
        let entries = self.entries.read().expect("rwlock poisoned");
        let record = entries.get(name)?;
        if self.is_fresh(record) {
            Some(record.clone())
        } else {
            None
        }
    }

    /// Unconditionally replace whatever is stored under the record's name.
    pub fn store(&self, record: &MenuRecord) {
        let mut entries = self.entries.write().expect("rwlock poisoned");
        entries.insert(record.name.clone(), record.clone());
    }

    fn is_fresh(&self, record: &MenuRecord) -> bool {
        Utc::now()
            .signed_duration_since(record.timestamp)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true)
    }
}

impl Default for MenuCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
