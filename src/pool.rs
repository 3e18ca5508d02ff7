//! Fixed-type slot allocator with O(1) allocation and release.

use tracing::{debug, trace, warn};

use crate::{
    error::{AllocError, Result},
    list::{Link, Linked, List},
};

/// Which of the pool's two lists currently holds a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Free,
    Used,
}

/// A value slot together with the links placing it in the free or the used
/// list of its [`Pool`].
#[derive(Debug)]
struct PoolNode<T> {
    value: T,
    state: NodeState,
    /// Bumped on every release, so handles from earlier allocations of this
    /// node stop matching.
    generation: u64,
    prev: Link,
    next: Link,
}

impl<T: Default> PoolNode<T> {
    fn new() -> Self {
        Self {
            value: T::default(),
            state: NodeState::Free,
            generation: 0,
            prev: None,
            next: None,
        }
    }
}

impl<T> PoolNode<T> {
    #[inline]
    fn owned_by(&self, handle: PoolHandle) -> bool {
        self.state == NodeState::Used && self.generation == handle.generation
    }
}

impl<T> Linked for PoolNode<T> {
    fn prev(&self) -> Link {
        self.prev
    }

    fn next(&self) -> Link {
        self.next
    }

    fn set_prev(&mut self, prev: Link) {
        self.prev = prev;
    }

    fn set_next(&mut self, next: Link) {
        self.next = next;
    }
}

/// Handle to a slot handed out by [`Pool::alloc`].
///
/// A handle is only valid until its slot is released. Once the slot is
/// handed out again, the new allocation gets a handle with the same index
/// but a different generation, and the old handle is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    generation: u64,
}

impl PoolHandle {
    /// Position of the node in the pool, stable for the pool's lifetime.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

/// Allocator for values of a single type `T`.
///
/// Every node the pool ever creates stays alive until the pool is dropped.
/// Nodes are partitioned into a *free* list and a *used* list:
///
/// ```text
///        nodes: [ 0 ][ 1 ][ 2 ][ 3 ][ 4 ]
///
///  free: head -> 3 <-> 0
///  used: head -> 4 <-> 1 <-> 2
/// ```
///
/// [`Pool::alloc`] moves the free head to the used list, creating a node first
/// when the free list is empty. [`Pool::release`] moves a node back. Both lists
/// are LIFO, so the most recently released slot is the next one handed out.
///
/// Each node is boxed on its own, so the address of a value never changes
/// while the pool lives, even when the pool grows.
///
/// A reused slot keeps whatever value it held when it was released. Use
/// [`Pool::alloc_with`] to overwrite it.
#[derive(Debug)]
pub struct Pool<T> {
    nodes: Vec<Box<PoolNode<T>>>,
    free: List,
    used: List,
}

impl<T: Default> Pool<T> {
    /// Creates a pool with `capacity` nodes already on the free list.
    pub fn new(capacity: usize) -> Self {
        let mut pool = Self {
            nodes: Vec::with_capacity(capacity),
            free: List::new(),
            used: List::new(),
        };

        for _ in 0..capacity {
            pool.grow();
        }

        pool
    }

    /// Takes a slot off the free list, creating one if the list is empty.
    pub fn alloc(&mut self) -> PoolHandle {
        let index = match self.free.pop_front(&mut self.nodes) {
            Some(index) => index,
            None => {
                let index = self.grow();
                debug!(nodes = self.nodes.len(), "pool grew");

                self.free.remove(&mut self.nodes, index);
                index
            }
        };
        self.nodes[index].state = NodeState::Used;
        self.used.push_front(&mut self.nodes, index);

        trace!(index, used = self.used.len(), "pool allocation");

        PoolHandle {
            index,
            generation: self.nodes[index].generation,
        }
    }

    /// Same as [`Pool::alloc`], then stores `value` in the slot.
    pub fn alloc_with(&mut self, value: T) -> PoolHandle {
        let handle = self.alloc();
        self.nodes[handle.index].value = value;

        handle
    }

    /// Creates a new node, pushes it on the free list and returns its index.
    fn grow(&mut self) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Box::new(PoolNode::new()));
        self.free.push_front(&mut self.nodes, index);

        index
    }
}

impl<T> Pool<T> {
    /// Gives the slot behind `handle` back to the free list.
    ///
    /// Fails with [`AllocError::InvalidRelease`] when the handle is not
    /// currently allocated, for example on a double release or when the slot
    /// already belongs to a newer allocation. The pool is left untouched in
    /// that case.
    pub fn release(&mut self, handle: PoolHandle) -> Result<()> {
        let index = handle.index;

        if !self.is_used(handle) {
            warn!(index, "rejected release of a node that is not allocated");
            return Err(AllocError::InvalidRelease { index });
        }

        self.used.remove(&mut self.nodes, index);
        let node = &mut self.nodes[index];
        node.state = NodeState::Free;
        node.generation = node.generation.wrapping_add(1);
        self.free.push_front(&mut self.nodes, index);

        trace!(index, free = self.free.len(), "pool release");

        Ok(())
    }

    /// Tells whether `handle` is currently allocated.
    pub fn is_used(&self, handle: PoolHandle) -> bool {
        self.nodes
            .get(handle.index)
            .is_some_and(|node| node.owned_by(handle))
    }

    /// Value behind `handle`, or `None` if the handle is not currently
    /// allocated.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.nodes
            .get(handle.index)
            .filter(|node| node.owned_by(handle))
            .map(|node| &node.value)
    }

    /// Mutable access to the value behind `handle`, or `None` if the handle is
    /// not currently allocated.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.nodes
            .get_mut(handle.index)
            .filter(|node| node.owned_by(handle))
            .map(|node| &mut node.value)
    }

    /// Number of slots currently handed out.
    #[inline]
    pub fn used_len(&self) -> usize {
        self.used.len()
    }

    /// Number of slots ready to be handed out without growing.
    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of nodes the pool has created so far.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over allocated values, most recently allocated first.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.used
            .iter(&self.nodes)
            .map(move |index| {
                let node = &self.nodes[index];
                (PoolHandle { index, generation: node.generation }, &node.value)
            })
    }
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new(0)
    }
}
