use std::ops::{Index, IndexMut};


/// Index of the neighbouring node, if any.
pub(crate) type Link = Option<usize>;

/// Anything that can sit in a [`List`]: it only needs to carry its own links.
pub(crate) trait Linked {
    fn prev(&self) -> Link;
    fn next(&self) -> Link;
    fn set_prev(&mut self, prev: Link);
    fn set_next(&mut self, next: Link);
}

impl<N: Linked + ?Sized> Linked for Box<N> {
    fn prev(&self) -> Link {
        (**self).prev()
    }

    fn next(&self) -> Link {
        (**self).next()
    }

    fn set_prev(&mut self, prev: Link) {
        (**self).set_prev(prev)
    }

    fn set_next(&mut self, next: Link) {
        (**self).set_next(next)
    }
}

/// Doubly linked list threaded through nodes stored elsewhere.
///
/// The list doesn't own its nodes, it just remembers where the chain
/// starts. Nodes live in some indexable storage (a `Vec` for the pool) and
/// point at each other by index, so several lists can partition the same
/// storage as long as every node belongs to at most one of them.
///
/// ```text
///            storage: [ n0 ][ n1 ][ n2 ][ n3 ][ n4 ]
///
///  free: head -> n3 <-> n0
///  used: head -> n4 <-> n1 <-> n2
/// ```
///
/// Every operation takes the storage explicitly. Callers must always pass the
/// same storage to the same list.
#[derive(Debug, Default)]
pub(crate) struct List {
    head: Link,
    len: usize,
}

pub(crate) struct Iter<'a, S: ?Sized> {
    nodes: &'a S,
    current: Link,
    remaining: usize,
}

impl List {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Makes `index` the new head of the list. The node must not be linked
    /// into any list.
    pub fn push_front<S, N>(&mut self, nodes: &mut S, index: usize)
    where
        S: IndexMut<usize, Output = N> + ?Sized,
        N: Linked,
    {
        nodes[index].set_prev(None);
        nodes[index].set_next(self.head);

        if let Some(head) = self.head {
            nodes[head].set_prev(Some(index));
        }

        self.head = Some(index);
        self.len += 1;
    }

    /// Detaches the head of the list and returns its index.
    pub fn pop_front<S, N>(&mut self, nodes: &mut S) -> Option<usize>
    where
        S: IndexMut<usize, Output = N> + ?Sized,
        N: Linked,
    {
        let index = self.head?;
        self.remove(nodes, index);

        Some(index)
    }

    /// Unlinks `index` from the list. The node must belong to this list.
    pub fn remove<S, N>(&mut self, nodes: &mut S, index: usize)
    where
        S: IndexMut<usize, Output = N> + ?Sized,
        N: Linked,
    {
        let prev = nodes[index].prev();
        let next = nodes[index].next();

        match prev {
            Some(prev) => nodes[prev].set_next(next),
            None => {
                // Only the head has no predecessor.
                debug_assert_eq!(self.head, Some(index));
                self.head = next;
            }
        }

        if let Some(next) = next {
            nodes[next].set_prev(prev);
        }

        nodes[index].set_prev(None);
        nodes[index].set_next(None);
        self.len -= 1;
    }

    pub fn iter<'a, S, N>(&self, nodes: &'a S) -> Iter<'a, S>
    where
        S: Index<usize, Output = N> + ?Sized,
        N: Linked,
    {
        Iter {
            nodes,
            current: self.head,
            remaining: self.len,
        }
    }
}

impl<'a, S, N> Iterator for Iter<'a, S>
where
    S: Index<usize, Output = N> + ?Sized,
    N: Linked + 'a,
{
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;

        self.current = self.nodes[index].next();
        self.remaining -= 1;

        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Node {
        prev: Link,
        next: Link,
    }

    impl Linked for Node {
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

    fn storage(len: usize) -> Vec<Node> {
        (0..len).map(|_| Node::default()).collect()
    }

    fn collect(list: &List, nodes: &[Node]) -> Vec<usize> {
        list.iter(nodes).collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list = List::new();
        let nodes = storage(0);

        assert_eq!(list.len(), 0);
        assert!(list.iter(&nodes[..]).next().is_none());
    }

    #[test]
    fn push_and_pop_are_lifo() {
        let mut list = List::new();
        let mut nodes = storage(3);

        for index in 0..3 {
            list.push_front(&mut nodes[..], index);
        }
        assert_eq!(collect(&list, &nodes), vec![2, 1, 0]);
        assert_eq!(nodes[1].prev, Some(2));
        assert_eq!(nodes[1].next, Some(0));

        assert_eq!(list.pop_front(&mut nodes[..]), Some(2));
        assert_eq!(nodes[1].prev, None);
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_front(&mut nodes[..]), Some(1));
        assert_eq!(list.pop_front(&mut nodes[..]), Some(0));
        assert_eq!(list.pop_front(&mut nodes[..]), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut list = List::new();
        let mut nodes = storage(4);
        for index in 0..4 {
            list.push_front(&mut nodes[..], index);
        }
        // 3 <-> 2 <-> 1 <-> 0

        list.remove(&mut nodes[..], 2);
        assert_eq!(collect(&list, &nodes), vec![3, 1, 0]);
        assert_eq!(nodes[1].prev, Some(3));
        assert_eq!(nodes[3].next, Some(1));

        list.remove(&mut nodes[..], 0);
        assert_eq!(collect(&list, &nodes), vec![3, 1]);
        assert_eq!(nodes[1].next, None);

        list.remove(&mut nodes[..], 3);
        assert_eq!(collect(&list, &nodes), vec![1]);
        assert_eq!(nodes[1].prev, None);
    }

    #[test]
    fn two_lists_share_storage() {
        let mut free = List::new();
        let mut used = List::new();
        let mut nodes = storage(3);
        for index in 0..3 {
            free.push_front(&mut nodes[..], index);
        }

        let taken = free.pop_front(&mut nodes[..]).unwrap();
        used.push_front(&mut nodes[..], taken);

        assert_eq!(collect(&free, &nodes), vec![1, 0]);
        assert_eq!(collect(&used, &nodes), vec![2]);
        assert_eq!(free.len() + used.len(), 3);
    }
}
