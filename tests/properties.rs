use memalloc::{AllocError, Arena, Pool, PoolHandle};
use proptest::prelude::*;

/// Large enough that a fresh region fits any request of the arena property
/// even with the worst padding an alignment of `1 << 14` can need.
const REGION_SIZE: usize = 1 << 16;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
enum PoolOp {
    Alloc(u32),
    Release(usize),
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        any::<u32>().prop_map(PoolOp::Alloc),
        any::<usize>().prop_map(PoolOp::Release),
    ]
}

proptest! {
    #[test]
    fn arena_allocations_are_aligned_zeroed_and_disjoint(
        requests in proptest::collection::vec((0_usize..=128, 0_u32..15), 1..64)
    ) {
        init_tracing();
        let arena = Arena::new(REGION_SIZE).unwrap();
        let mut ranges: Vec<(usize, usize)> = Vec::new();

        for (size, shift) in requests {
            let align = 1_usize << shift;
            let bytes = arena.alloc_bytes(size, align).unwrap();
            let start = bytes.as_ptr() as usize;

            prop_assert_eq!(start % align, 0);
            prop_assert!(bytes.iter().all(|&b| b == 0));
            prop_assert!(arena.region_of(bytes.as_ptr(), size).is_some());

            for &(other, other_len) in &ranges {
                prop_assert!(start + size <= other || other + other_len <= start);
            }

            // Dirty the range so a later overlap would show up as non-zero bytes.
            bytes.fill(0x5A);
            ranges.push((start, size));
        }

        prop_assert!(arena.allocated_bytes() >= ranges.iter().map(|&(_, len)| len).sum::<usize>());
        prop_assert!(arena.allocated_bytes() <= arena.reserved_bytes());
        prop_assert_eq!(arena.reserved_bytes(), arena.region_count() * REGION_SIZE);
    }

    #[test]
    fn arena_rejects_what_does_not_fit(region_size in 1_usize..512, extra in 1_usize..512) {
        let arena = Arena::new(region_size).unwrap();
        let requested = region_size + extra;

        prop_assert_eq!(
            arena.alloc_bytes(requested, 1).unwrap_err(),
            AllocError::OversizedRequest { requested, region_size }
        );
        prop_assert_eq!(arena.region_count(), 1);
        prop_assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    fn pool_lists_stay_partitioned(ops in proptest::collection::vec(pool_op(), 1..128)) {
        init_tracing();
        let mut pool: Pool<u32> = Pool::new(4);
        let mut live: Vec<(PoolHandle, u32)> = Vec::new();
        let mut last_released: Option<PoolHandle> = None;

        for op in ops {
            match op {
                PoolOp::Alloc(value) => {
                    let handle = pool.alloc_with(value);
                    if let Some(released) = last_released.take() {
                        prop_assert_eq!(handle.index(), released.index());
                        prop_assert!(!pool.is_used(released));
                    }
                    prop_assert!(live.iter().all(|(other, _)| *other != handle));
                    live.push((handle, value));
                }
                PoolOp::Release(pick) if !live.is_empty() => {
                    let (handle, _) = live.swap_remove(pick % live.len());
                    pool.release(handle).unwrap();
                    prop_assert!(pool.release(handle).is_err());
                    last_released = Some(handle);
                }
                PoolOp::Release(_) => {}
            }

            prop_assert_eq!(pool.used_len(), live.len());
            prop_assert_eq!(pool.used_len() + pool.free_len(), pool.node_count());
        }

        for (handle, value) in &live {
            prop_assert_eq!(pool.get(*handle), Some(value));
        }
        prop_assert_eq!(pool.iter().count(), live.len());
    }
}

#[test]
fn pool_addresses_are_stable_until_release() {
    init_tracing();
    let mut pool: Pool<u64> = Pool::new(0);

    let handles: Vec<PoolHandle> = (0..32).map(|value| pool.alloc_with(value)).collect();
    let addrs: Vec<*const u64> = handles
        .iter()
        .map(|&handle| pool.get(handle).unwrap() as *const u64)
        .collect();

    for _ in 0..256 {
        pool.alloc();
    }

    for (value, (&handle, &addr)) in handles.iter().zip(&addrs).enumerate() {
        assert_eq!(pool.get(handle).unwrap() as *const u64, addr);
        assert_eq!(pool.get(handle), Some(&(value as u64)));
    }
}

#[test]
fn arena_moves_between_threads() {
    let arena = Arena::new(256).unwrap();
    arena.alloc_bytes(16, 8).unwrap().fill(1);

    let regions = std::thread::spawn(move || {
        arena.alloc_bytes(256, 8).unwrap();
        arena.region_count()
    })
    .join()
    .unwrap();

    assert_eq!(regions, 2);
}
