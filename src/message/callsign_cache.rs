//! Hash-keyed callsign cache used to resolve `<...>` compound/non-standard
//! callsigns across a decode session.
//!
//! A standard callsign that doesn't fit pack-28 is transmitted once in full
//! and thereafter referenced by its 22/12/10-bit hash (§4.2); this cache is
//! the receiver-side half of that protocol. The 22-bit table is the only
//! one that needs bounding (10/12-bit hashes collide too often to be worth
//! evicting individually, and WSJT-X leaves them unbounded); it's kept as a
//! ring buffer so both insertion and eviction are O(1) rather than the
//! shift-and-rebuild a `Vec::insert(0, ..)` would cost per call.

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use ahash::AHasher;
use core::hash::BuildHasherDefault;
use hashbrown::HashMap;

type AHashMap<K, V> = HashMap<K, V, BuildHasherDefault<AHasher>>;

/// WSJT-X's `MAXHASH`: how many 22-bit entries are retained before the
/// oldest is pushed out.
pub const MAX_22BIT_CAPACITY: usize = 1000;
pub const MAX_10BIT_CAPACITY: usize = 1024;
pub const MAX_12BIT_CAPACITY: usize = 4096;

/// Maps 22/12/10-bit callsign hashes to the callsign text they were hashed
/// from. Safe to hold across an entire receive session: [`insert`](Self::insert)
/// on every standard callsign seen, [`lookup_22bit`](Self::lookup_22bit) (or
/// the narrower widths) whenever a message carries a hash reference instead
/// of text.
#[derive(Debug, Clone)]
pub struct CallsignHashCache {
    by_10bit: AHashMap<u16, String>,
    by_12bit: AHashMap<u16, String>,
    ring_22bit: VecDeque<(u32, String)>,
    index_22bit: AHashMap<u32, usize>,
    capacity_22bit: usize,
}

impl CallsignHashCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_22BIT_CAPACITY)
    }

    /// Exposed beyond tests so a caller running a long unattended session
    /// with tight memory budgets can shrink the 22-bit ring below WSJT-X's
    /// default.
    pub fn with_capacity(capacity_22bit: usize) -> Self {
        Self {
            by_10bit: AHashMap::default(),
            by_12bit: AHashMap::default(),
            ring_22bit: VecDeque::with_capacity(capacity_22bit),
            index_22bit: AHashMap::default(),
            capacity_22bit,
        }
    }

    /// Hash `callsign` at all three widths and cache it under each.
    pub fn insert(&mut self, callsign: &str) {
        use crate::message::callsign::{hash10, hash12, hash22};
        self.by_10bit.insert(hash10(callsign) as u16, callsign.to_string());
        self.by_12bit.insert(hash12(callsign), callsign.to_string());
        self.push_22bit(hash22(callsign), callsign);
    }

    /// Front-insert `hash`/`callsign`, updating in place on a repeat hash
    /// rather than moving it to the front — WSJT-X doesn't treat a re-seen
    /// callsign as freshly used, so the ring's eviction order tracks first-
    /// seen order, not last-seen.
    fn push_22bit(&mut self, hash: u32, callsign: &str) {
        if let Some(&pos) = self.index_22bit.get(&hash) {
            self.ring_22bit[pos].1 = callsign.to_string();
            return;
        }

        self.ring_22bit.push_front((hash, callsign.to_string()));
        for pos in self.index_22bit.values_mut() {
            *pos += 1;
        }
        self.index_22bit.insert(hash, 0);

        if self.ring_22bit.len() > self.capacity_22bit {
            if let Some((evicted, _)) = self.ring_22bit.pop_back() {
                self.index_22bit.remove(&evicted);
            }
        }
    }

    pub fn lookup_10bit(&self, hash: u16) -> Option<&str> {
        self.by_10bit.get(&hash).map(String::as_str)
    }

    pub fn lookup_12bit(&self, hash: u16) -> Option<&str> {
        self.by_12bit.get(&hash).map(String::as_str)
    }

    pub fn lookup_22bit(&self, hash: u32) -> Option<&str> {
        let pos = *self.index_22bit.get(&hash)?;
        self.ring_22bit.get(pos).map(|(_, call)| call.as_str())
    }

    pub fn clear(&mut self) {
        self.by_10bit.clear();
        self.by_12bit.clear();
        self.ring_22bit.clear();
        self.index_22bit.clear();
    }

    /// `(10-bit count, 12-bit count, 22-bit count)`.
    pub fn len(&self) -> (usize, usize, usize) {
        (self.by_10bit.len(), self.by_12bit.len(), self.ring_22bit.len())
    }

    pub fn is_empty(&self) -> bool {
        self.by_10bit.is_empty() && self.by_12bit.is_empty() && self.ring_22bit.is_empty()
    }

    pub fn max_22bit_capacity(&self) -> usize {
        self.capacity_22bit
    }
}

impl Default for CallsignHashCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::callsign::{hash10, hash12, hash22};

    #[test]
    fn insert_then_lookup_all_widths() {
        let mut cache = CallsignHashCache::new();
        cache.insert("PJ4/K1ABC");
        assert_eq!(cache.lookup_10bit(hash10("PJ4/K1ABC") as u16), Some("PJ4/K1ABC"));
        assert_eq!(cache.lookup_12bit(hash12("PJ4/K1ABC")), Some("PJ4/K1ABC"));
        assert_eq!(cache.lookup_22bit(hash22("PJ4/K1ABC")), Some("PJ4/K1ABC"));
        assert_eq!(cache.lookup_12bit(9999), None);
    }

    #[test]
    fn multiple_entries_all_resolve() {
        let mut cache = CallsignHashCache::new();
        for call in ["PJ4/K1ABC", "KH1/KH7Z", "W9XYZ/7"] {
            cache.insert(call);
        }
        for call in ["PJ4/K1ABC", "KH1/KH7Z", "W9XYZ/7"] {
            assert_eq!(cache.lookup_22bit(hash22(call)), Some(call));
        }
    }

    #[test]
    fn clear_empties_every_table() {
        let mut cache = CallsignHashCache::new();
        cache.insert("PJ4/K1ABC");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup_22bit(hash22("PJ4/K1ABC")), None);
    }

    #[test]
    fn ring_evicts_oldest_first() {
        let mut cache = CallsignHashCache::with_capacity(3);
        let calls = ["AA1A", "AB1B", "AC1C", "AD1D"];
        for call in &calls[0..3] {
            cache.insert(call);
        }
        assert_eq!(cache.len().2, 3);

        cache.insert(calls[3]);
        assert_eq!(cache.len().2, 3, "ring should stay at capacity");
        assert_eq!(cache.lookup_22bit(hash22(calls[0])), None, "oldest entry evicted");
        assert_eq!(cache.lookup_22bit(hash22(calls[3])), Some(calls[3]));
    }

    #[test]
    fn ring_evicts_in_fifo_order_across_many_inserts() {
        let mut cache = CallsignHashCache::with_capacity(5);
        let calls: alloc::vec::Vec<String> = (1..=8).map(|i| alloc::format!("W{i}ABC")).collect();
        for call in &calls[0..5] {
            cache.insert(call);
        }
        for call in &calls[5..8] {
            cache.insert(call);
        }
        for call in &calls[0..3] {
            assert_eq!(cache.lookup_22bit(hash22(call)), None);
        }
        for call in &calls[3..8] {
            assert_eq!(cache.lookup_22bit(hash22(call)), Some(call.as_str()));
        }
    }

    #[test]
    fn update_on_repeat_hash_does_not_refresh_age() {
        let mut cache = CallsignHashCache::with_capacity(3);
        let calls = ["K1AA", "K2BB", "K3CC", "K4DD"];
        for call in &calls[0..3] {
            cache.insert(call);
        }

        cache.insert(calls[0]);
        assert_eq!(cache.len().2, 3, "re-inserting a known hash must not grow the ring");

        cache.insert(calls[3]);
        assert_eq!(
            cache.lookup_22bit(hash22(calls[0])),
            None,
            "repeat insert shouldn't have protected the oldest entry from eviction"
        );
        assert_eq!(cache.lookup_22bit(hash22(calls[1])), Some(calls[1]));
        assert_eq!(cache.lookup_22bit(hash22(calls[3])), Some(calls[3]));
    }

    #[test]
    fn default_capacity_matches_wsjtx_maxhash() {
        assert_eq!(CallsignHashCache::new().max_22bit_capacity(), 1000);
        assert_eq!(MAX_10BIT_CAPACITY, 1024);
        assert_eq!(MAX_12BIT_CAPACITY, 4096);
    }
}
