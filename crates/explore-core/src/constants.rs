/// Core constants used throughout the explore index
///
/// This module centralizes the sizing and hashing constants shared by the
/// arena, buffer, map and normalizer.
/// Arena allocator sizing
pub mod arena {
    /// Minimum size of a freshly allocated arena block (64 KiB)
    pub const BLOCK_SIZE: usize = 64 * 1024;

    /// Smallest block size a configuration may request
    pub const MIN_BLOCK_SIZE: usize = 4 * 1024;

    /// Byte alignment applied after every bump allocation
    pub const ALIGNMENT: usize = 8;
}

/// Growable buffer sizing
pub mod buffer {
    /// Capacity of a buffer after its first growth
    pub const MIN_CAPACITY: usize = 16;
}

/// Open-addressing map and hashing constants
pub mod hashing {
    /// FNV 32-bit offset basis
    pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

    /// FNV 32-bit prime
    pub const FNV_PRIME: u32 = 0x0100_0193;

    /// Smallest capacity of a non-empty map
    pub const MIN_MAP_CAPACITY: usize = 16;

    /// Lowest byte value that takes part in facet value hashing
    pub const VALUE_HASH_FIRST: u8 = b'0';

    /// Highest byte value that takes part in facet value hashing
    pub const VALUE_HASH_LAST: u8 = 255;
}

/// Keyed-database field names with special meaning
pub mod fields {
    /// Content hash field (4-byte big-endian binary)
    pub const CRC: &str = "crc";

    /// Optional override for the displayed title
    pub const ORIGINAL_TITLE: &str = "original_title";
}

/// Query limits
pub mod search {
    /// Default cap on the free-text search length, in bytes
    pub const DEFAULT_MAX_SEARCH_LEN: usize = 1023;
}
