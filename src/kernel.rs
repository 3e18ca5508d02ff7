use std::{ptr::NonNull, sync::OnceLock};

use tracing::warn;

/// Virtual memory page size of the computer. This is usually 4096.
/// We can't know the value at compile time, so it is queried once
/// and cached.
static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// Backing store for region buffers. Regions never go through the
/// global allocator: each one is a private anonymous mapping requested
/// straight from the operating system.
pub(crate) enum Kernel {}

/// This trait provides an abstraction to handle low level memory operations
/// and syscalls. The allocators have nothing to do with the concrete
/// implementations / APIs offered by each kernel.
trait PlatformMemory {
    /// Request a memory region of size `len`. It returns a pointer to the
    /// given location or None if the underlying syscall fails.
    ///
    /// Both platforms hand back zeroed, page aligned memory.
    unsafe fn request_memory(len: usize) -> Option<NonNull<u8>>;

    /// Returns the memory of size `len` starting from `addr` back to the kernel.
    unsafe fn return_memory(addr: NonNull<u8>, len: usize);

    /// Returns the virtual memory page size of the computer in bytes.
    unsafe fn page_size() -> usize;
}

/// Wrapper to calculate the computer's page size.
#[inline]
pub(crate) fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| unsafe { Kernel::page_size() })
}

/// Wrapper to use [`PlatformMemory::request_memory`]. `len` must be a
/// non-zero multiple of [`page_size`].
#[inline]
pub(crate) fn request_memory(len: usize) -> Option<NonNull<u8>> {
    debug_assert!(len > 0 && len % page_size() == 0);

    let addr = unsafe { Kernel::request_memory(len) };
    if addr.is_none() {
        warn!(len, "platform refused to map memory");
    }
    addr
}

/// Wrapper to use [`PlatformMemory::return_memory`].
///
/// **SAFETY**: `addr` and `len` must describe a mapping obtained from
/// [`request_memory`] that has not been returned yet.
#[inline]
pub(crate) unsafe fn return_memory(addr: NonNull<u8>, len: usize) {
    unsafe { Kernel::return_memory(addr, len) }
}

#[cfg(unix)]
mod unix {
    use super::{Kernel, PlatformMemory};

    use libc::{mmap, munmap, off_t, size_t};

    use std::{os::raw::{c_int, c_void}, ptr::NonNull};

    impl PlatformMemory for Kernel {
        unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
            // mmap parameters.
            const ADDR: *mut c_void = std::ptr::null_mut::<c_void>();
            // Read-Write only memory.
            const PROT: c_int = libc::PROT_READ | libc::PROT_WRITE;
            const FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;
            const FD: c_int = -1;
            const OFFSET: off_t = 0;

            unsafe {
                let addr = mmap(ADDR, len as size_t, PROT, FLAGS, FD, OFFSET);

                if addr == libc::MAP_FAILED {
                    return None;
                }
                NonNull::new(addr.cast::<u8>())
            }
        }

        unsafe fn return_memory(addr: NonNull<u8>, len: usize) {
            unsafe { munmap(addr.as_ptr().cast::<c_void>(), len as size_t); }
        }

        unsafe fn page_size() -> usize {
            unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) as usize }
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::{mem::MaybeUninit, os::raw::c_void, ptr::NonNull};

    use super::{Kernel, PlatformMemory};

    use windows::Win32::System::{Memory, SystemInformation};

    impl PlatformMemory for Kernel {
        unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
            // Read-Write only.
            let protection = Memory::PAGE_READWRITE;

            let flags = Memory::MEM_RESERVE | Memory::MEM_COMMIT;

            unsafe {
                let addr = Memory::VirtualAlloc(None, len, flags, protection);

                NonNull::new(addr.cast())
            }
        }

        unsafe fn return_memory(addr: NonNull<u8>, _len: usize) {
            // MEM_RELEASE frees the whole reservation, size must be 0.
            unsafe {
                let _ = Memory::VirtualFree(addr.as_ptr().cast::<c_void>(), 0, Memory::MEM_RELEASE);
            }
        }

        unsafe fn page_size() -> usize {
            unsafe {
                let mut system_info = MaybeUninit::uninit();
                SystemInformation::GetSystemInfo(system_info.as_mut_ptr());

                system_info.assume_init().dwPageSize as usize
            }
        }
    }
}
