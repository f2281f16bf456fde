//! Bump arena for index-lifetime storage
//!
//! The arena hands out [`Span`] handles into large blocks and never frees an
//! individual allocation. Everything is released together by [`Arena::free_all`]
//! or when the arena is dropped. Blocks are never reallocated once created, so
//! a span stays valid until the arena is freed.

use crate::constants::arena::{ALIGNMENT, BLOCK_SIZE};
use crate::error::{ExploreError, ExploreResult};

/// Handle to a run of elements inside an [`Arena`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    block: u32,
    start: u32,
    len: u32,
}

impl Span {
    /// Number of elements covered
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the span covers nothing
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Handle to a string stored in an `Arena<u8>`
///
/// Only [`Arena::alloc_str`] creates these, so the bytes behind one are always
/// valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StrSpan(Span);

impl StrSpan {
    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Block-based bump allocator over `Copy` elements
#[derive(Debug)]
pub struct Arena<T> {
    blocks: Vec<Vec<T>>,
    /// Minimum elements per block, derived from the byte block size
    block_elems: usize,
    /// Elements per alignment unit, so allocations end on `ALIGNMENT` bytes
    align_elems: usize,
}

impl<T: Copy + Default> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Arena<T> {
    /// Create an arena with the default 64 KiB block size
    pub fn new() -> Self {
        Self::with_block_size(BLOCK_SIZE)
    }

    /// Create an arena whose blocks are at least `block_bytes` large
    pub fn with_block_size(block_bytes: usize) -> Self {
        let elem_size = std::mem::size_of::<T>().max(1);
        Self {
            blocks: Vec::new(),
            block_elems: (block_bytes / elem_size).max(1),
            align_elems: (ALIGNMENT / elem_size).max(1),
        }
    }

    /// Copy `items` into the arena and return a handle to the copy
    pub fn alloc(&mut self, items: &[T]) -> ExploreResult<Span> {
        if items.is_empty() {
            return Ok(Span::default());
        }

        let fits = self
            .blocks
            .last()
            .is_some_and(|block| block.capacity() - block.len() >= items.len());
        if !fits {
            self.grow(items.len())?;
        }

        let block_idx = self.blocks.len() - 1;
        let align = self.align_elems;
        let block = &mut self.blocks[block_idx];
        let start = block.len();
        block.extend_from_slice(items);

        // Pad up to the alignment boundary, capped at what the block holds
        let aligned = align_up(block.len(), align).min(block.capacity());
        block.resize(aligned, T::default());

        Ok(Span { block: block_idx as u32, start: start as u32, len: items.len() as u32 })
    }

    fn grow(&mut self, min_elems: usize) -> ExploreResult<()> {
        let size = align_up(min_elems.max(self.block_elems), self.align_elems);
        let mut block = Vec::new();
        block.try_reserve_exact(size).map_err(|_| ExploreError::memory("arena", size))?;
        self.blocks.try_reserve(1).map_err(|_| ExploreError::memory("arena", 1))?;
        self.blocks.push(block);
        Ok(())
    }

    /// Borrow the elements behind a span
    pub fn get(&self, span: Span) -> &[T] {
        let start = span.start as usize;
        self.blocks
            .get(span.block as usize)
            .and_then(|block| block.get(start..start + span.len()))
            .unwrap_or(&[])
    }

    /// Mutably borrow the elements behind a span
    pub fn get_mut(&mut self, span: Span) -> &mut [T] {
        let start = span.start as usize;
        self.blocks
            .get_mut(span.block as usize)
            .and_then(|block| block.get_mut(start..start + span.len()))
            .unwrap_or(&mut [])
    }

    /// Release every block; all outstanding spans become dangling
    pub fn free_all(&mut self) {
        self.blocks = Vec::new();
    }

    /// Number of blocks currently held
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total bytes reserved across all blocks
    pub fn reserved_bytes(&self) -> usize {
        self.blocks.iter().map(Vec::capacity).sum::<usize>() * std::mem::size_of::<T>()
    }

    /// Bytes handed out so far, including alignment padding
    pub fn used_bytes(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum::<usize>() * std::mem::size_of::<T>()
    }
}

impl Arena<u8> {
    /// Copy a string into the arena
    pub fn alloc_str(&mut self, s: &str) -> ExploreResult<StrSpan> {
        self.alloc(s.as_bytes()).map(StrSpan)
    }

    /// Borrow a string previously stored with [`Arena::alloc_str`]
    pub fn get_str(&self, span: StrSpan) -> &str {
        // spans are only created from &str input
        std::str::from_utf8(self.get(span.0)).unwrap_or_default()
    }
}

fn align_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}
