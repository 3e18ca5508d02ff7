//! Error types returned by the [`crate::Arena`] and [`crate::Pool`].
//!
//! Running out of room in a single region is not an error: the arena
//! handles it internally by moving on to the next region or growing the chain.
//! Everything here is either a caller contract violation or a refusal from the
//! platform to hand out more memory.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AllocError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// A single request does not fit in one region. With alignments above the
    /// page size, `requested` includes the worst-case padding.
    #[error("requested {requested} bytes but regions only hold {region_size} bytes")]
    OversizedRequest {
        /// Size of the rejected request in bytes.
        requested: usize,
        /// Capacity of every region of the arena.
        region_size: usize,
    },

    /// `count * size_of::<T>()` does not fit in a `usize`.
    #[error("allocation of {count} elements of {elem_size} bytes overflows usize")]
    SizeOverflow {
        /// Number of requested elements.
        count: usize,
        /// Size of one element in bytes.
        elem_size: usize,
    },

    /// Alignment is not a power of two.
    #[error("alignment {align} is not a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },

    /// Arenas need regions of at least one byte.
    #[error("region size must be greater than zero")]
    InvalidRegionSize,

    /// The platform refused to map a new region.
    #[error("platform could not map {len} bytes")]
    OutOfMemory {
        /// Length of the failed mapping in bytes.
        len: usize,
    },

    /// The handle does not refer to a node in the used list.
    #[error("pool node {index} is not currently allocated")]
    InvalidRelease {
        /// Node index carried by the rejected handle.
        index: usize,
    },
}
