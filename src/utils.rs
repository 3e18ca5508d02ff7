//! Alignment helpers shared by the region and the platform layer.


/// Rounds `to_be_aligned` up to the next multiple of `alignment`.
///
/// Used to round region mappings up to [`crate::kernel::page_size`] and to
/// move the bump cursor of a region forward. `alignment` must be a
/// power of two. Returns `None` if rounding overflows.
#[inline]
pub fn align(to_be_aligned: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    Some(to_be_aligned.checked_add(alignment - 1)? & !(alignment - 1))
}

/// Number of padding bytes needed to move `addr` up to a multiple of `alignment`.
#[inline]
pub fn padding_for(addr: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    addr.wrapping_neg() & (alignment - 1)
}
