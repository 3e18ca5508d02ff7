use std::ptr::{self, NonNull};

use crate::{
    error::{AllocError, Result},
    kernel,
    utils::{align, padding_for},
};

/// One fixed-capacity block of memory with a bump cursor.
///
/// The buffer is a private mapping obtained from [`kernel::request_memory`],
/// rounded up to whole pages. Only the first `capacity` bytes are ever handed
/// out. The cursor only moves forward, so a byte is given away at most once
/// and nothing is freed until the region itself is dropped.
///
/// ```text
///  buffer                      buffer + cursor           buffer + capacity
///    |                               |                           |
///    v                               v                           v
///    +-------+---+-------+--+--------+---------------------------+.........+
///    | alloc |pad| alloc |  | alloc  |       free                | (page   |
///    +-------+---+-------+--+--------+---------------------------+ tail)...+
/// ```
///
/// Regions are created and owned by [`crate::Arena`]; their position in the
/// arena's chain is their index in its region vector.
pub(crate) struct Region {
    /// Start of the mapping, page aligned.
    buffer: NonNull<u8>,
    /// Bytes that may be handed out.
    capacity: usize,
    /// Length of the whole mapping.
    mapped: usize,
    /// Offset of the first byte not yet handed out.
    cursor: usize,
}

// SAFETY: the mapping is exclusively owned by the region and only reachable
// through it, so moving the region to another thread moves the ownership.
unsafe impl Send for Region {}

impl Region {
    /// Maps a new empty region able to hold `capacity` bytes.
    pub(crate) fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AllocError::InvalidRegionSize);
        }

        let mapped = align(capacity, kernel::page_size())
            .ok_or(AllocError::OutOfMemory { len: capacity })?;
        let buffer = kernel::request_memory(mapped)
            .ok_or(AllocError::OutOfMemory { len: mapped })?;

        Ok(Self { buffer, capacity, mapped, cursor: 0 })
    }

    /// Bytes this region can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, alignment padding included.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tells whether `[addr, addr + len)` lies inside `[buffer, buffer + capacity)`.
    pub fn contains(&self, addr: *const u8, len: usize) -> bool {
        let start = self.buffer.as_ptr() as usize;
        let addr = addr as usize;

        addr >= start
            && addr
                .checked_add(len)
                .is_some_and(|end| end <= start + self.capacity)
    }

    /// Bumps the cursor to carve out `size` zeroed bytes aligned to `align`.
    ///
    /// Returns `None` when the region is exhausted for this request, in which
    /// case nothing changes. `align` must be a power of two.
    pub(crate) fn alloc(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align.is_power_of_two());

        let base = self.buffer.as_ptr() as usize;
        let pos = self
            .cursor
            .checked_add(padding_for(base.wrapping_add(self.cursor), align))?;
        let end = pos.checked_add(size)?;

        if end > self.capacity {
            return None;
        }

        self.cursor = end;

        unsafe {
            // SAFETY: `pos + size <= capacity <= mapped`, so the range is inside
            // the mapping, and the cursor never hands it out again.
            let addr = self.buffer.as_ptr().add(pos);
            ptr::write_bytes(addr, 0, size);

            Some(NonNull::new_unchecked(addr))
        }
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        unsafe { kernel::return_memory(self.buffer, self.mapped) }
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("buffer", &self.buffer)
            .field("capacity", &self.capacity)
            .field("cursor", &self.cursor)
            .finish()
    }
}
