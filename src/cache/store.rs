//! Memory-bounded store of range queries with least-recently-used eviction.
//!
//! Entries live in a slab; a doubly linked list threaded through the slab
//! by index keeps them in recency order (head = most recent). The map goes
//! from key to slab slot, so lookup, promotion and unlinking are all O(1).

use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::range_loader::DepthRange;
use crate::config::CacheConfig;
use crate::data::model::LogTable;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// `(min, max, columns)`. Bounds compare by exact bit pattern; `columns`
/// of `None` means every curve.
#[derive(Debug, Clone)]
pub struct CacheKey {
    pub min_depth: f64,
    pub max_depth: f64,
    pub columns: Option<BTreeSet<String>>,
}

impl CacheKey {
    pub fn new(range: DepthRange, columns: Option<BTreeSet<String>>) -> Self {
        Self {
            min_depth: range.min,
            max_depth: range.max,
            columns,
        }
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.min_depth.to_bits() == other.min_depth.to_bits()
            && self.max_depth.to_bits() == other.max_depth.to_bits()
            && self.columns == other.columns
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.min_depth.to_bits().hash(state);
        self.max_depth.to_bits().hash(state);
        self.columns.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Counters only grow; [`RangeCache::clear`] is the one reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub disk_reads: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / (self.hits + self.misses).max(1) as f64
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Node {
    key: CacheKey,
    table: LogTable,
    size: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct RangeCache {
    map: HashMap<CacheKey, usize>,
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    current_size: usize,
    config: CacheConfig,
    stats: CacheStats,
}

impl Default for RangeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl RangeCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            current_size: 0,
            config,
            stats: CacheStats::default(),
        }
    }

    pub fn size_limit(&self) -> usize {
        self.config.size_limit_bytes
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.map.contains_key(key)
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        let mut keys = Vec::with_capacity(self.map.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = self.slots[slot].as_ref() else {
                break;
            };
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    /// Look up `key`, loading and inserting on a miss.
    ///
    /// Hits hand back a copy so the cached table can never be mutated by the
    /// caller. A failed load counts as a miss and a disk read but caches
    /// nothing.
    pub fn get_or_load<E>(
        &mut self,
        key: CacheKey,
        load: impl FnOnce() -> Result<LogTable, E>,
    ) -> Result<LogTable, E> {
        if let Some(&slot) = self.map.get(&key) {
            self.stats.hits += 1;
            self.promote(slot);
            log::debug!("cache hit [{}, {}]", key.min_depth, key.max_depth);
            return Ok(self.node(slot).table.clone());
        }

        self.stats.misses += 1;
        self.stats.disk_reads += 1;
        log::debug!("cache miss [{}, {}]", key.min_depth, key.max_depth);
        let table = load()?;
        self.insert(key, table.clone());
        Ok(table)
    }

    /// Insert unconditionally. If the new entry would push the store past
    /// its limit, one eviction pass runs first; the entry is stored even if
    /// the store is still over budget afterwards.
    pub fn insert(&mut self, key: CacheKey, table: LogTable) {
        if let Some(slot) = self.map.remove(&key) {
            self.remove_slot(slot);
        }

        let size = table.estimated_bytes();
        if self.current_size + size > self.config.size_limit_bytes {
            self.evict();
        }

        let node = Node {
            key: key.clone(),
            table,
            size,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.push_front(slot);
        self.map.insert(key, slot);
        self.current_size += size;
    }

    /// Drop the least recently used `floor(len * eviction_fraction)` entries.
    fn evict(&mut self) {
        let count = (self.map.len() as f64 * self.config.eviction_fraction).floor() as usize;
        if count == 0 {
            log::debug!("over budget with {} entries, nothing to evict", self.map.len());
            return;
        }
        let before = self.current_size;
        for _ in 0..count {
            let Some(slot) = self.tail else {
                break;
            };
            let key = self.node(slot).key.clone();
            self.map.remove(&key);
            self.remove_slot(slot);
            self.stats.evictions += 1;
        }
        log::info!(
            "evicted {count} cache entries, {before} -> {} bytes (limit {})",
            self.current_size,
            self.config.size_limit_bytes
        );
    }

    /// Empty the store and reset every counter.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.current_size = 0;
        self.stats = CacheStats::default();
    }

    // -- linked list plumbing --

    fn node(&self, slot: usize) -> &Node {
        self.slots[slot].as_ref().expect("linked slot is occupied")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        self.slots[slot].as_mut().expect("linked slot is occupied")
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn promote(&mut self, slot: usize) {
        if self.head != Some(slot) {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn remove_slot(&mut self, slot: usize) {
        self.unlink(slot);
        if let Some(node) = self.slots[slot].take() {
            self.current_size -= node.size;
        }
        self.free.push(slot);
    }
}
