// * Health Cache
// * Injectable per-URL record store backing the monitoring diff. The trait
// * keeps storage pluggable; the in-memory implementation is bounded and
// * last-writer-wins.

use crate::config::constants::DEFAULT_HEALTH_CACHE_CAPACITY;
use crate::health::checker::LinkHealthRecord;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait HealthCache: Send + Sync {
    fn get(&self, url: &str) -> Option<LinkHealthRecord>;
    fn put(&self, url: &str, record: LinkHealthRecord);
}

pub struct InMemoryHealthCache {
    capacity: usize,
    records: Mutex<HashMap<String, LinkHealthRecord>>,
}

impl InMemoryHealthCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("health cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryHealthCache {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH_CACHE_CAPACITY)
    }
}

impl HealthCache for InMemoryHealthCache {
    fn get(&self, url: &str) -> Option<LinkHealthRecord> {
        self.records
            .lock()
            .expect("health cache mutex poisoned")
            .get(url)
            .cloned()
    }

    fn put(&self, url: &str, record: LinkHealthRecord) {
        let mut records = self.records.lock().expect("health cache mutex poisoned");
        records.insert(url.to_string(), record);

        // * Bounded: evict the stalest record once over capacity
        while records.len() > self.capacity {
            let oldest = records
                .iter()
                .min_by_key(|(_, r)| r.last_checked_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => records.remove(&key),
                None => break,
            };
        }
    }
}
