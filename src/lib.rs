//! Two bulk-owning allocators that keep the global allocator out of the hot
//! path:
//!
//! - [`Arena`]: bump allocation of zeroed, aligned memory of any size out of a
//!   growing chain of fixed-size regions, each one a private mapping
//!   requested from the operating system. Nothing is freed until the arena is
//!   dropped.
//! - [`Pool`]: allocation and release of slots of a single type in O(1), backed
//!   by a free list and a used list threaded through the pool's nodes. Slots
//!   are recycled, never freed, until the pool is dropped.
//!
//! Neither allocator is thread-safe; give each worker its own.
//!
//! ```
//! use memalloc::{Arena, Pool};
//!
//! let arena = Arena::new(64).unwrap();
//! let a = arena.alloc_slice::<u8>(40).unwrap();
//! let b = arena.alloc_slice::<u8>(40).unwrap();
//! assert!(a.iter().chain(b.iter()).all(|&byte| byte == 0));
//! assert_eq!(arena.region_count(), 2);
//!
//! let mut pool: Pool<i32> = Pool::new(2);
//! let first = pool.alloc_with(1);
//! let _second = pool.alloc_with(2);
//! pool.release(first).unwrap();
//! let reused = pool.alloc();
//! assert_eq!(reused.index(), first.index());
//! assert!(pool.release(first).is_err());
//! ```

mod arena;
mod error;
mod kernel;
mod list;
mod pool;
mod region;
mod utils;

pub use arena::{Arena, DEFAULT_ALIGN};
pub use error::{AllocError, Result};
pub use pool::{Pool, PoolHandle};
