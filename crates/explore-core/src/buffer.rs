//! Growable buffer with an explicit doubling policy
//!
//! Used for facet tables, the record list and the scratch lists reused across
//! records during a build. Growth is fallible so an allocation failure reaches
//! the builder as an [`ExploreError::Memory`] instead of aborting.

use crate::constants::buffer::MIN_CAPACITY;
use crate::error::{ExploreError, ExploreResult};
use std::ops::{Deref, DerefMut};

/// Amortized-doubling dynamic array
#[derive(Debug, Clone)]
pub struct GrowBuf<T> {
    items: Vec<T>,
    component: &'static str,
}

impl<T> Default for GrowBuf<T> {
    fn default() -> Self {
        Self::new("buffer")
    }
}

impl<T> GrowBuf<T> {
    /// Create an empty buffer; `component` names it in memory errors
    pub fn new(component: &'static str) -> Self {
        Self { items: Vec::new(), component }
    }

    /// Create a buffer with room for `capacity` elements
    pub fn with_capacity(component: &'static str, capacity: usize) -> ExploreResult<Self> {
        let mut buf = Self::new(component);
        if capacity > 0 {
            buf.fit(capacity)?;
        }
        Ok(buf)
    }

    /// Make sure the buffer can hold `len` elements without reallocating
    ///
    /// New capacity is `max(2 * capacity, max(len, 16))`.
    pub fn fit(&mut self, len: usize) -> ExploreResult<()> {
        let cap = self.items.capacity();
        if len <= cap {
            return Ok(());
        }
        let new_cap = (2 * cap).max(len.max(MIN_CAPACITY));
        let additional = new_cap - self.items.len();
        self.items
            .try_reserve_exact(additional)
            .map_err(|_| ExploreError::memory(self.component, additional))
    }

    /// Append an element
    pub fn push(&mut self, value: T) -> ExploreResult<()> {
        self.fit(self.items.len() + 1)?;
        self.items.push(value);
        Ok(())
    }

    /// Reset the length to zero, keeping capacity
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Release all capacity
    pub fn free(&mut self) {
        self.items = Vec::new();
    }

    /// Current capacity
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Consume the buffer, returning the elements
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Copy> GrowBuf<T> {
    /// Append every element of a slice
    pub fn extend_from_slice(&mut self, values: &[T]) -> ExploreResult<()> {
        self.fit(self.items.len() + values.len())?;
        self.items.extend_from_slice(values);
        Ok(())
    }
}

impl<T> Deref for GrowBuf<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for GrowBuf<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_growth_is_sixteen() {
        let mut buf = GrowBuf::new("test");
        buf.push(1u32).unwrap();
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_capacity_doubles() {
        let mut buf = GrowBuf::new("test");
        for i in 0..17u32 {
            buf.push(i).unwrap();
        }
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf[16], 16);
    }

    #[test]
    fn test_large_fit_jumps_past_doubling() {
        let mut buf: GrowBuf<u8> = GrowBuf::new("test");
        buf.fit(100).unwrap();
        assert_eq!(buf.capacity(), 100);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = GrowBuf::new("test");
        buf.extend_from_slice(&[1u8, 2, 3]).unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 16);

        buf.free();
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_slice_access() {
        let mut buf = GrowBuf::new("test");
        buf.extend_from_slice(&[3, 1, 2]).unwrap();
        buf.sort_unstable();
        assert_eq!(&*buf, &[1, 2, 3]);
        assert_eq!(buf.iter().sum::<i32>(), 6);
    }
}
