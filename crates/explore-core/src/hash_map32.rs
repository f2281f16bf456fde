//! Open-addressing map keyed by 32-bit hashes
//!
//! Keys are non-zero `u32` values; zero marks an empty slot and can never be
//! stored. Capacity is a power of two, probing is linear, and the table doubles
//! once it is half full. The map does not keep the hashed text, so two strings
//! with the same hash are the same key.

use crate::constants::hashing::{FNV_OFFSET_BASIS, FNV_PRIME, MIN_MAP_CAPACITY};
use crate::error::{ExploreError, ExploreResult};

/// Hash a byte string
///
/// Uses the FNV 32-bit offset basis and prime. A zero result is remapped to 1
/// so every hash is a usable key.
pub fn hash32(bytes: &[u8]) -> u32 {
    let hash = bytes
        .iter()
        .fold(FNV_OFFSET_BASIS, |hash, &c| hash.wrapping_mul(FNV_PRIME) ^ u32::from(c));
    if hash == 0 { 1 } else { hash }
}

/// Hash a byte string case-insensitively, skipping bytes outside `first..=last`
///
/// Skipped bytes stay part of whatever string the caller stores; they just do
/// not distinguish one key from another.
pub fn hash32_nocase_filtered(bytes: &[u8], first: u8, last: u8) -> u32 {
    let hash = bytes
        .iter()
        .filter(|&&c| c >= first && c <= last)
        .fold(FNV_OFFSET_BASIS, |hash, &c| {
            hash.wrapping_mul(FNV_PRIME) ^ u32::from(c.to_ascii_lowercase())
        });
    if hash == 0 { 1 } else { hash }
}

/// Linear-probing map from non-zero `u32` keys to small `Copy` values
#[derive(Debug, Clone)]
pub struct HashMap32<V> {
    len: usize,
    keys: Vec<u32>,
    vals: Vec<V>,
}

impl<V: Copy + Default> Default for HashMap32<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Default> HashMap32<V> {
    /// Create an empty map; nothing is allocated until the first insert
    pub fn new() -> Self {
        Self { len: 0, keys: Vec::new(), vals: Vec::new() }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no keys are stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Look up a key
    pub fn get(&self, key: u32) -> Option<V> {
        if self.len == 0 || key == 0 {
            return None;
        }
        let mask = self.keys.len() - 1;
        let mut i = key as usize;
        loop {
            i &= mask;
            if self.keys[i] == key {
                return Some(self.vals[i]);
            }
            if self.keys[i] == 0 {
                return None;
            }
            i += 1;
        }
    }

    /// Look up a key, falling back to `V::default()`
    pub fn get_or_default(&self, key: u32) -> V {
        self.get(key).unwrap_or_default()
    }

    /// Whether a key is stored
    pub fn contains_key(&self, key: u32) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value; a zero key is ignored
    pub fn insert(&mut self, key: u32, val: V) -> ExploreResult<()> {
        if key == 0 {
            return Ok(());
        }
        if 2 * self.len >= self.keys.len() {
            self.grow(2 * self.keys.len())?;
        }

        let mask = self.keys.len() - 1;
        let mut i = key as usize;
        loop {
            i &= mask;
            if self.keys[i] == 0 {
                self.len += 1;
                self.keys[i] = key;
                self.vals[i] = val;
                return Ok(());
            }
            if self.keys[i] == key {
                self.vals[i] = val;
                return Ok(());
            }
            i += 1;
        }
    }

    /// Look up a string by its [`hash32`]
    pub fn get_str(&self, s: &str) -> Option<V> {
        self.get(hash32(s.as_bytes()))
    }

    /// Insert under a string's [`hash32`]
    pub fn insert_str(&mut self, s: &str, val: V) -> ExploreResult<()> {
        self.insert(hash32(s.as_bytes()), val)
    }

    /// Remove every key, keeping the slots
    pub fn clear(&mut self) {
        self.keys.fill(0);
        self.len = 0;
    }

    fn grow(&mut self, new_cap: usize) -> ExploreResult<()> {
        let cap = new_cap.max(MIN_MAP_CAPACITY);

        let mut keys = Vec::new();
        keys.try_reserve_exact(cap).map_err(|_| ExploreError::memory("hash map", cap))?;
        keys.resize(cap, 0u32);
        let mut vals = Vec::new();
        vals.try_reserve_exact(cap).map_err(|_| ExploreError::memory("hash map", cap))?;
        vals.resize(cap, V::default());

        let old_keys = std::mem::replace(&mut self.keys, keys);
        let old_vals = std::mem::replace(&mut self.vals, vals);
        let mask = cap - 1;

        for (&key, &val) in old_keys.iter().zip(old_vals.iter()) {
            if key == 0 {
                continue;
            }
            let mut j = key as usize;
            loop {
                j &= mask;
                if self.keys[j] == 0 {
                    self.keys[j] = key;
                    self.vals[j] = val;
                    break;
                }
                j += 1;
            }
        }
        Ok(())
    }
}
