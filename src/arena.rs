use std::{cell::RefCell, mem, ptr::NonNull, slice};

use bytemuck::Zeroable;
use tracing::{debug, trace};

use crate::{
    error::{AllocError, Result},
    kernel,
    region::Region,
};

/// Alignment used by [`Arena::alloc_slice`] and [`Arena::alloc`] unless a
/// stronger one is required by the element type.
pub const DEFAULT_ALIGN: usize = 2 * mem::size_of::<*const u8>();

/// Growable bump allocator built from a chain of fixed-size regions.
///
/// Requests are served by the first region in the chain that still has room.
/// When none has, a new region of `region_size` bytes is appended to the tail.
/// Memory is only given back when the arena is dropped, all at once.
///
/// ```text
///   head                                           tail
/// +--------------+      +--------------+      +--------------+
/// |    Region    | ---> |    Region    | ---> |    Region    |
/// | (full)       |      | (full)       |      | cursor ->    |
/// +--------------+      +--------------+      +--------------+
/// ```
///
/// Allocations borrow the arena immutably, so any number of them can be alive
/// at the same time. Every allocation is zero-filled, which is why typed
/// allocations require [`Zeroable`].
///
/// The arena is not thread-safe. It can be moved to another thread but not
/// shared: use one arena per worker.
pub struct Arena {
    /// Chain of regions, head first. Only ever grows.
    regions: RefCell<Vec<Region>>,
    /// Capacity of every region in the chain.
    region_size: usize,
}

impl Arena {
    /// Creates an arena whose regions hold `region_size` bytes each. The first
    /// region is mapped right away.
    pub fn new(region_size: usize) -> Result<Self> {
        let head = Region::new(region_size)?;

        debug!(region_size, "arena created");

        Ok(Self {
            regions: RefCell::new(vec![head]),
            region_size,
        })
    }

    /// Largest request, in bytes, the arena can satisfy.
    #[inline]
    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Number of regions in the chain.
    pub fn region_count(&self) -> usize {
        self.regions.borrow().len()
    }

    /// Bytes handed out across all regions, alignment padding included.
    pub fn allocated_bytes(&self) -> usize {
        self.regions.borrow().iter().map(Region::cursor).sum()
    }

    /// Bytes reserved across all regions.
    pub fn reserved_bytes(&self) -> usize {
        self.regions.borrow().iter().map(Region::capacity).sum()
    }

    /// Index in the chain of the region holding `[addr, addr + len)`, if the
    /// whole range belongs to one region of this arena.
    pub fn region_of(&self, addr: *const u8, len: usize) -> Option<usize> {
        self.regions
            .borrow()
            .iter()
            .position(|region| region.contains(addr, len))
    }

    /// Allocates `size` zeroed bytes aligned to `align`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, size: usize, align: usize) -> Result<&mut [u8]> {
        let addr = self.alloc_raw(size, align)?;

        // SAFETY: `alloc_raw` hands out `size` zeroed bytes that no other
        // allocation overlaps and that live as long as the arena.
        unsafe { Ok(slice::from_raw_parts_mut(addr.as_ptr(), size)) }
    }

    /// Allocates `count` contiguous zeroed `T`s aligned to [`DEFAULT_ALIGN`].
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice<T: Zeroable>(&self, count: usize) -> Result<&mut [T]> {
        self.alloc_slice_aligned(count, DEFAULT_ALIGN)
    }

    /// Allocates `count` contiguous zeroed `T`s aligned to `align`, or to the
    /// alignment of `T` if that is stronger.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_aligned<T: Zeroable>(&self, count: usize, align: usize) -> Result<&mut [T]> {
        let elem_size = mem::size_of::<T>();
        let size = count
            .checked_mul(elem_size)
            .ok_or(AllocError::SizeOverflow { count, elem_size })?;

        let addr = self.alloc_raw(size, align.max(mem::align_of::<T>()))?;

        // SAFETY: the range is aligned for `T`, zeroed, which is a valid `T`
        // by the `Zeroable` bound, and exclusively owned by the caller.
        unsafe { Ok(slice::from_raw_parts_mut(addr.as_ptr().cast::<T>(), count)) }
    }

    /// Allocates a single zeroed `T` aligned to [`DEFAULT_ALIGN`].
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T: Zeroable>(&self) -> Result<&mut T> {
        let addr = self.alloc_raw(mem::size_of::<T>(), DEFAULT_ALIGN.max(mem::align_of::<T>()))?;

        // SAFETY: same as `alloc_slice_aligned` with a count of one.
        unsafe { Ok(&mut *addr.as_ptr().cast::<T>()) }
    }

    /// Validates the request, then scans the chain from the head and grows it
    /// if no region has room.
    fn alloc_raw(&self, size: usize, align: usize) -> Result<NonNull<u8>> {
        if !align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { align });
        }

        if size > self.region_size {
            return Err(AllocError::OversizedRequest {
                requested: size,
                region_size: self.region_size,
            });
        }

        let mut regions = self.regions.borrow_mut();

        for (index, region) in regions.iter_mut().enumerate() {
            if let Some(addr) = region.alloc(size, align) {
                trace!(region = index, size, align, "arena allocation");
                return Ok(addr);
            }
        }

        // A fresh region is page aligned, so alignments up to the page size
        // always fit. Stronger ones may need up to `align - page_size` bytes of
        // padding on top of the request.
        let mut region = Region::new(self.region_size)?;
        let Some(addr) = region.alloc(size, align) else {
            let padding = align.saturating_sub(kernel::page_size());
            return Err(AllocError::OversizedRequest {
                requested: size.saturating_add(padding),
                region_size: self.region_size,
            });
        };
        regions.push(region);

        debug!(region = regions.len() - 1, region_size = self.region_size, "arena grew");
        trace!(region = regions.len() - 1, size, align, "arena allocation");

        Ok(addr)
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("region_size", &self.region_size)
            .field("regions", &self.regions.borrow())
            .finish()
    }
}
