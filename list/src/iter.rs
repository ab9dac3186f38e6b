use core::{fmt, iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use stack_allocator::Allocator;

use crate::{
    node::{Links, Node},
    List,
};

/// Borrowing iterator over a [`List`], front to back. Use `.rev()` for the
/// other direction.
pub struct Iter<'a, T> {
    head: NonNull<Links>,
    tail: NonNull<Links>,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    /// # Safety
    ///
    /// `sentinel` must anchor a consistent ring of `len` element nodes that
    /// stays borrowed for `'a`.
    pub(crate) unsafe fn new(sentinel: NonNull<Links>, len: usize) -> Self {
        unsafe {
            Iter {
                head: Links::next(sentinel),
                tail: Links::prev(sentinel),
                len,
                _marker: PhantomData,
            }
        }
    }
}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.len).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = self.head;
        unsafe {
            self.head = Links::next(node);
            Some(Node::value(node))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = self.tail;
        unsafe {
            self.tail = Links::prev(node);
            Some(Node::value(node))
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable counterpart of [`Iter`].
pub struct IterMut<'a, T> {
    head: NonNull<Links>,
    tail: NonNull<Links>,
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    /// # Safety
    ///
    /// As for [`Iter::new`], with the ring borrowed exclusively.
    pub(crate) unsafe fn new(sentinel: NonNull<Links>, len: usize) -> Self {
        unsafe {
            IterMut {
                head: Links::next(sentinel),
                tail: Links::prev(sentinel),
                len,
                _marker: PhantomData,
            }
        }
    }
}

unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.len).finish()
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = self.head;
        unsafe {
            self.head = Links::next(node);
            Some(Node::value_mut(node))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = self.tail;
        unsafe {
            self.tail = Links::prev(node);
            Some(Node::value_mut(node))
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator, popping elements off the list it consumed.
pub struct IntoIter<T, A: Allocator<Value = T>> {
    list: List<T, A>,
}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T, A: Allocator<Value = T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T, A: Allocator<Value = T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T, A: Allocator<Value = T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator<Value = T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator<Value = T>> IntoIterator for List<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter { list: self }
    }
}

impl<'a, T, A: Allocator<Value = T>> IntoIterator for &'a List<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator<Value = T>> IntoIterator for &'a mut List<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use stack_allocator::{Heap, StackArena};

    use crate::List;

    #[test]
    fn test() {
        let mut list = List::<u32>::new().unwrap();
        list.try_extend(1..=5).unwrap();
        assert_eq!(list.iter().len(), 5);
        assert!(list.iter().copied().eq(1..=5));
        assert!(list.iter().rev().copied().eq((1..=5).rev()));

        let mut both = list.iter();
        assert_eq!(both.next(), Some(&1));
        assert_eq!(both.next_back(), Some(&5));
        assert_eq!(both.len(), 3);
        assert!(both.clone().eq(&[2, 3, 4]));
        assert_eq!(both.next_back(), Some(&4));
        assert_eq!(both.next(), Some(&2));
        assert_eq!(both.next(), Some(&3));
        assert_eq!(both.next(), None);
        assert_eq!(both.next_back(), None);
    }

    #[test]
    fn mutate_in_place() {
        let arena = StackArena::<512>::new();
        let mut list = List::new_in(arena.allocator::<i64>()).unwrap();
        list.try_extend([1, 2, 3]).unwrap();
        for v in &mut list {
            *v *= 10;
        }
        if let Some(v) = list.iter_mut().next_back() {
            *v += 1;
        }
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [10, 20, 31]);
        list.assert_links();
    }

    #[test]
    fn into_iter_drains() {
        let list = List::<String, Heap<String>>::from_elem(3, &"x".to_string()).unwrap();
        let mut it = list.into_iter();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next_back().as_deref(), Some("x"));
        assert_eq!(it.collect::<Vec<_>>(), ["x", "x"]);
    }
}
