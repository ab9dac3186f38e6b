#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::as_conversions)]

//! A circular doubly-linked list that gets every node, its sentinel
//! included, from a pluggable [`Allocator`].
//!
//! The sentinel carries no value and closes the ring: its `next` is the
//! first element and its `prev` the last, so both ends are handled by the
//! same splice code and a cursor walking off either end lands on it.
//!
//! ```
//! use alloc_list::List;
//! use stack_allocator::StackArena;
//!
//! let arena = StackArena::<1024>::new();
//! let mut list = List::new_in(arena.allocator::<i32>()).unwrap();
//! list.push_back(1).unwrap();
//! list.push_back(2).unwrap();
//! list.push_front(0).unwrap();
//! assert!(list.iter().eq(&[0, 1, 2]));
//! ```

use core::{fmt, marker::PhantomData, mem, ptr::NonNull};

use stack_allocator::{AllocError, Allocator, Heap};
use tracing::trace;

mod clone;
mod cursor;
mod iter;
mod node;

pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut};
pub use node::Node;

use node::Links;

/// The allocator a `List<T, A>` actually allocates its nodes with.
pub type NodeAllocator<T, A> = <A as Allocator>::Rebind<Node<T>>;

pub struct List<T, A: Allocator<Value = T> = Heap<T>> {
    len: usize,
    alloc: NodeAllocator<T, A>,
    sentinel: NonNull<Links>,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send, A: Allocator<Value = T>> Send for List<T, A>
where
    NodeAllocator<T, A>: Send,
{
}
unsafe impl<T: Sync, A: Allocator<Value = T>> Sync for List<T, A>
where
    NodeAllocator<T, A>: Sync,
{
}

impl<T, A: Allocator<Value = T> + Default> List<T, A> {
    /// Creates an empty list using a default-constructed allocator.
    pub fn new() -> Result<Self, AllocError> {
        List::new_in(A::default())
    }

    pub fn with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        List::with_len_in(len, A::default())
    }

    pub fn from_elem(len: usize, value: &T) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        List::from_elem_in(len, value, A::default())
    }
}

impl<T, A: Allocator<Value = T>> List<T, A> {
    /// Creates an empty list whose nodes come from `alloc`.
    ///
    /// The sentinel is allocated right away, so this fails if the allocator
    /// cannot spare a single node.
    pub fn new_in(alloc: A) -> Result<Self, AllocError> {
        List::with_node_allocator(alloc.select_on_copy().rebind::<Node<T>>())
    }

    /// Creates a list of `len` default values.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let mut list = List::new_in(alloc)?;
        for _ in 0..len {
            list.push_back_with(T::default)?;
        }
        Ok(list)
    }

    /// Creates a list of `len` clones of `value`.
    pub fn from_elem_in(len: usize, value: &T, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut list = List::new_in(alloc)?;
        for _ in 0..len {
            list.push_back_with(|| value.clone())?;
        }
        Ok(list)
    }

    pub(crate) fn with_node_allocator(alloc: NodeAllocator<T, A>) -> Result<Self, AllocError> {
        let node = alloc.allocate(1)?;
        // SAFETY: `node` is a fresh allocation sized for a `Node<T>`.
        let sentinel = unsafe { Node::links(node) };
        unsafe { Links::init(sentinel) };
        Ok(List {
            len: 0,
            alloc,
            sentinel,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> &NodeAllocator<T, A> {
        &self.alloc
    }

    pub fn front(&self) -> Option<&T> {
        self.first().map(|node| unsafe { Node::value(node) })
    }

    pub fn back(&self) -> Option<&T> {
        self.last().map(|node| unsafe { Node::value(node) })
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.first().map(|node| unsafe { Node::value_mut(node) })
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.last().map(|node| unsafe { Node::value_mut(node) })
    }

    pub fn push_front(&mut self, value: T) -> Result<(), AllocError> {
        let first = unsafe { Links::next(self.sentinel) };
        unsafe { self.insert_before(first, || value) }.map(drop)
    }

    pub fn push_back(&mut self, value: T) -> Result<(), AllocError> {
        self.push_back_with(|| value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let first = self.first()?;
        Some(unsafe { self.take(first) })
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.last()?;
        Some(unsafe { self.take(last) })
    }

    /// Drops every element. The sentinel stays, so the list remains usable.
    pub fn clear(&mut self) {
        while let Some(first) = self.first() {
            unsafe { self.erase(first) };
        }
    }

    /// Appends every item of `iter`.
    ///
    /// If an allocation fails, the elements appended by this call are erased
    /// again before the error is returned.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), AllocError> {
        let rollback = Rollback::new(self);
        for value in iter {
            rollback.list.push_back(value)?;
        }
        rollback.commit();
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        unsafe { Iter::new(self.sentinel, self.len) }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        unsafe { IterMut::new(self.sentinel, self.len) }
    }

    /// Cursor on the first element, or on the end if the list is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, A> {
        let first = unsafe { Links::next(self.sentinel) };
        Cursor::new(self, first, 0)
    }

    /// Cursor on the last element, or on the end if the list is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, A> {
        let last = unsafe { Links::prev(self.sentinel) };
        Cursor::new(self, last, self.len.saturating_sub(1))
    }

    /// Cursor on the sentinel, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, self.sentinel, self.len)
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, A> {
        let first = unsafe { Links::next(self.sentinel) };
        CursorMut::new(self, first, 0)
    }

    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, T, A> {
        let last = unsafe { Links::prev(self.sentinel) };
        let index = self.len.saturating_sub(1);
        CursorMut::new(self, last, index)
    }

    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, A> {
        let (sentinel, len) = (self.sentinel, self.len);
        CursorMut::new(self, sentinel, len)
    }

    pub(crate) fn sentinel(&self) -> NonNull<Links> {
        self.sentinel
    }

    fn first(&self) -> Option<NonNull<Links>> {
        (self.len > 0).then(|| unsafe { Links::next(self.sentinel) })
    }

    fn last(&self) -> Option<NonNull<Links>> {
        (self.len > 0).then(|| unsafe { Links::prev(self.sentinel) })
    }

    pub(crate) fn push_back_with(&mut self, f: impl FnOnce() -> T) -> Result<(), AllocError> {
        unsafe { self.insert_before(self.sentinel, f) }.map(drop)
    }

    /// Builds a node from `f` and splices it in before `next`.
    ///
    /// The node is fully constructed before it touches the ring, so a
    /// failed allocation or a panicking `f` leaves the list as it was.
    ///
    /// # Safety
    ///
    /// `next` must be a node of this list, the sentinel included.
    pub(crate) unsafe fn insert_before(
        &mut self,
        next: NonNull<Links>,
        f: impl FnOnce() -> T,
    ) -> Result<NonNull<Links>, AllocError> {
        let node = self.create_node(f)?;
        unsafe { Links::link_before(node, next) };
        self.len += 1;
        Ok(node)
    }

    fn create_node(&self, f: impl FnOnce() -> T) -> Result<NonNull<Links>, AllocError> {
        let node = self.alloc.allocate(1)?;
        let guard = FreeNode {
            alloc: &self.alloc,
            node,
        };
        let value = f();
        mem::forget(guard);
        unsafe {
            let links = Node::links(node);
            self.alloc.construct(Node::value_ptr(links), value);
            Ok(links)
        }
    }

    /// Unlinks an element node and moves its value out.
    ///
    /// # Safety
    ///
    /// `node` must be an element node of this list.
    pub(crate) unsafe fn take(&mut self, node: NonNull<Links>) -> T {
        unsafe {
            self.unlink(node);
            let value = Node::<T>::value_ptr(node).as_ptr().read();
            self.alloc.deallocate(node.cast(), 1);
            value
        }
    }

    /// Unlinks an element node, destroys its value and frees it. The storage
    /// is released even if the destructor panics.
    ///
    /// # Safety
    ///
    /// `node` must be an element node of this list.
    pub(crate) unsafe fn erase(&mut self, node: NonNull<Links>) {
        unsafe {
            self.unlink(node);
            let _free = FreeNode {
                alloc: &self.alloc,
                node: node.cast(),
            };
            self.alloc.destroy(Node::<T>::value_ptr(node));
        }
    }

    unsafe fn unlink(&mut self, node: NonNull<Links>) {
        debug_assert!(node != self.sentinel, "erasing the end position");
        unsafe { Links::unlink(node) };
        self.len -= 1;
    }

    unsafe fn free_sentinel(&mut self) {
        unsafe { self.alloc.deallocate(self.sentinel.cast(), 1) }
    }
}

impl<T, A: Allocator<Value = T>> Drop for List<T, A> {
    fn drop(&mut self) {
        struct DropGuard<'a, T, A: Allocator<Value = T>>(&'a mut List<T, A>);

        impl<T, A: Allocator<Value = T>> Drop for DropGuard<'_, T, A> {
            fn drop(&mut self) {
                // An element destructor panicked; release what is left.
                self.0.clear();
                unsafe { self.0.free_sentinel() };
            }
        }

        while let Some(first) = self.first() {
            let guard = DropGuard(self);
            unsafe { guard.0.erase(first) };
            mem::forget(guard);
        }
        unsafe { self.free_sentinel() };
    }
}

/// Releases a node's storage when dropped, for the window where the node
/// exists but is not owned by the ring.
struct FreeNode<'a, A: Allocator> {
    alloc: &'a A,
    node: NonNull<A::Value>,
}

impl<A: Allocator> Drop for FreeNode<'_, A> {
    fn drop(&mut self) {
        unsafe { self.alloc.deallocate(self.node, 1) }
    }
}

/// Erases whatever gets appended to `list` while this is alive, unless
/// committed.
pub(crate) struct Rollback<'a, T, A: Allocator<Value = T>> {
    pub(crate) list: &'a mut List<T, A>,
    len: usize,
}

impl<'a, T, A: Allocator<Value = T>> Rollback<'a, T, A> {
    pub(crate) fn new(list: &'a mut List<T, A>) -> Self {
        let len = list.len;
        Rollback { list, len }
    }

    /// The length the list had when the rollback point was taken.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn commit(self) {
        mem::forget(self);
    }
}

impl<T, A: Allocator<Value = T>> Drop for Rollback<'_, T, A> {
    fn drop(&mut self) {
        if self.list.len > self.len {
            trace!(
                appended = self.list.len - self.len,
                kept = self.len,
                "rolling back appended elements"
            );
        }
        while self.list.len > self.len {
            if let Some(last) = self.list.last() {
                unsafe { self.list.erase(last) };
            }
        }
    }
}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for List<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A, B> PartialEq<List<T, B>> for List<T, A>
where
    T: PartialEq,
    A: Allocator<Value = T>,
    B: Allocator<Value = T>,
{
    fn eq(&self, other: &List<T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator<Value = T>> Eq for List<T, A> {}

#[cfg(test)]
impl<T, A: Allocator<Value = T>> List<T, A> {
    /// Walks the whole ring checking `n.next.prev == n`, `n.prev.next == n`
    /// and that the element count matches `len`.
    pub(crate) fn assert_links(&self) {
        let mut node = self.sentinel;
        let mut count = 0;
        loop {
            unsafe {
                assert!(Links::prev(Links::next(node)) == node);
                assert!(Links::next(Links::prev(node)) == node);
                node = Links::next(node);
            }
            if node == self.sentinel {
                break;
            }
            count += 1;
            assert!(count <= self.len, "ring longer than len");
        }
        assert_eq!(count, self.len);
    }
}
