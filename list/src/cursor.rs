use core::{fmt, ptr::NonNull};

use stack_allocator::{AllocError, Allocator};

use crate::{
    node::{Links, Node},
    List,
};

/// A position in a [`List`]: either an element or the end.
///
/// The end position is the sentinel, which sits between the last and the
/// first element, so moving past either end lands on it and moving once more
/// wraps around.
pub struct Cursor<'a, T, A: Allocator<Value = T>> {
    current: NonNull<Links>,
    index: usize,
    list: &'a List<T, A>,
}

impl<T, A: Allocator<Value = T>> Clone for Cursor<'_, T, A> {
    fn clone(&self) -> Self {
        Cursor { ..*self }
    }
}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for Cursor<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.list).field(&self.index()).finish()
    }
}

impl<'a, T, A: Allocator<Value = T>> Cursor<'a, T, A> {
    pub(crate) fn new(list: &'a List<T, A>, current: NonNull<Links>, index: usize) -> Self {
        Cursor {
            current,
            index,
            list,
        }
    }

    /// Index of the current element, `None` at the end.
    pub fn index(&self) -> Option<usize> {
        (!self.is_end()).then_some(self.index)
    }

    pub fn is_end(&self) -> bool {
        self.current == self.list.sentinel()
    }

    pub fn current(&self) -> Option<&'a T> {
        (!self.is_end()).then(|| unsafe { Node::value(self.current) })
    }

    pub fn move_next(&mut self) {
        let sentinel = self.list.sentinel();
        let from_end = self.current == sentinel;
        self.current = unsafe { Links::next(self.current) };
        self.index = step_next(self.current == sentinel, from_end, self.index, self.list.len());
    }

    pub fn move_prev(&mut self) {
        let sentinel = self.list.sentinel();
        let from_end = self.current == sentinel;
        self.current = unsafe { Links::prev(self.current) };
        self.index = step_prev(self.current == sentinel, from_end, self.index, self.list.len());
    }

    /// The element after the current position, `None` if that is the end.
    pub fn peek_next(&self) -> Option<&'a T> {
        let next = unsafe { Links::next(self.current) };
        (next != self.list.sentinel()).then(|| unsafe { Node::value(next) })
    }

    pub fn peek_prev(&self) -> Option<&'a T> {
        let prev = unsafe { Links::prev(self.current) };
        (prev != self.list.sentinel()).then(|| unsafe { Node::value(prev) })
    }
}

/// A position in a [`List`] that can insert and remove around itself.
///
/// Inserting never moves the cursor off the element (or end) it is on.
/// Removing the current element moves the cursor to the one that followed.
pub struct CursorMut<'a, T, A: Allocator<Value = T>> {
    current: NonNull<Links>,
    index: usize,
    list: &'a mut List<T, A>,
}

impl<T: fmt::Debug, A: Allocator<Value = T>> fmt::Debug for CursorMut<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.list).field(&self.index()).finish()
    }
}

impl<'a, T, A: Allocator<Value = T>> CursorMut<'a, T, A> {
    pub(crate) fn new(list: &'a mut List<T, A>, current: NonNull<Links>, index: usize) -> Self {
        CursorMut {
            current,
            index,
            list,
        }
    }

    pub fn index(&self) -> Option<usize> {
        (!self.is_end()).then_some(self.index)
    }

    pub fn is_end(&self) -> bool {
        self.current == self.list.sentinel()
    }

    pub fn current(&mut self) -> Option<&mut T> {
        (!self.is_end()).then(|| unsafe { Node::value_mut(self.current) })
    }

    pub fn move_next(&mut self) {
        let sentinel = self.list.sentinel();
        let from_end = self.current == sentinel;
        self.current = unsafe { Links::next(self.current) };
        self.index = step_next(self.current == sentinel, from_end, self.index, self.list.len());
    }

    pub fn move_prev(&mut self) {
        let sentinel = self.list.sentinel();
        let from_end = self.current == sentinel;
        self.current = unsafe { Links::prev(self.current) };
        self.index = step_prev(self.current == sentinel, from_end, self.index, self.list.len());
    }

    pub fn peek_next(&mut self) -> Option<&mut T> {
        let next = unsafe { Links::next(self.current) };
        (next != self.list.sentinel()).then(|| unsafe { Node::value_mut(next) })
    }

    pub fn peek_prev(&mut self) -> Option<&mut T> {
        let prev = unsafe { Links::prev(self.current) };
        (prev != self.list.sentinel()).then(|| unsafe { Node::value_mut(prev) })
    }

    /// Read-only view of the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, A> {
        Cursor::new(self.list, self.current, self.index)
    }

    /// Inserts `value` right before the current position. At the end this
    /// appends to the list.
    pub fn insert_before(&mut self, value: T) -> Result<(), AllocError> {
        self.insert_with(|| value)
    }

    /// Like [`insert_before`](CursorMut::insert_before), but builds the value
    /// only once the node's storage is secured. If `f` panics the storage is
    /// released and the list is untouched.
    pub fn insert_with(&mut self, f: impl FnOnce() -> T) -> Result<(), AllocError> {
        unsafe { self.list.insert_before(self.current, f) }?;
        self.index += 1;
        Ok(())
    }

    /// Inserts `value` right after the current position. At the end this
    /// prepends to the list.
    pub fn insert_after(&mut self, value: T) -> Result<(), AllocError> {
        let next = unsafe { Links::next(self.current) };
        unsafe { self.list.insert_before(next, || value) }?;
        if self.is_end() {
            self.index += 1;
        }
        Ok(())
    }

    /// Unlinks the current element and returns it, moving to the next
    /// position. Does nothing at the end.
    pub fn remove_current(&mut self) -> Option<T> {
        if self.is_end() {
            return None;
        }
        let node = self.current;
        self.current = unsafe { Links::next(node) };
        Some(unsafe { self.list.take(node) })
    }
}

fn step_next(at_end: bool, from_end: bool, index: usize, len: usize) -> usize {
    if at_end {
        len
    } else if from_end {
        0
    } else {
        index + 1
    }
}

fn step_prev(at_end: bool, from_end: bool, index: usize, len: usize) -> usize {
    if at_end {
        len
    } else if from_end {
        len - 1
    } else {
        index - 1
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, panic};

    use stack_allocator::{AllocError, StackArena};

    use crate::List;

    #[test]
    fn test() {
        let mut list = List::<i32>::new().unwrap();
        list.try_extend([1, 2, 3]).unwrap();

        let mut cursor = list.cursor_front();
        assert_eq!(cursor.current(), Some(&1));
        assert_eq!(cursor.index(), Some(0));
        assert_eq!(cursor.peek_prev(), None);
        cursor.move_next();
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&3));
        assert_eq!(cursor.peek_next(), None);
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.index(), None);
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&1));

        let mut back = list.cursor_end();
        back.move_prev();
        assert_eq!(back.current(), Some(&3));
        assert_eq!(back.index(), Some(2));
        back.move_prev();
        assert_eq!(back.clone().current(), Some(&2));
        assert_eq!(list.cursor_back().current(), Some(&3));
    }

    #[test]
    fn empty_list_cursors_sit_at_end() {
        let list = List::<u8>::new().unwrap();
        for mut cursor in [list.cursor_front(), list.cursor_back(), list.cursor_end()] {
            assert!(cursor.is_end());
            cursor.move_prev();
            assert!(cursor.is_end());
            cursor.move_next();
            assert!(cursor.is_end());
        }
    }

    #[test]
    fn insert_keeps_position() {
        let mut list = List::<i32>::new().unwrap();
        list.try_extend([1, 3]).unwrap();
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        cursor.insert_before(2).unwrap();
        assert_eq!(cursor.current(), Some(&mut 3));
        assert_eq!(cursor.index(), Some(2));
        cursor.insert_after(4).unwrap();
        assert_eq!(cursor.peek_next(), Some(&mut 4));

        let mut end = list.cursor_end_mut();
        end.insert_before(5).unwrap();
        end.insert_after(0).unwrap();
        assert!(end.is_end());
        assert_eq!(end.as_cursor().index(), None);
        end.move_prev();
        assert_eq!(end.index(), Some(5));
        assert!(list.iter().copied().eq(0..=5));
        list.assert_links();
    }

    #[test]
    fn remove_moves_to_next() {
        let mut list = List::<i32>::new().unwrap();
        list.try_extend(0..4).unwrap();
        let mut cursor = list.cursor_front_mut();
        cursor.move_next();
        assert_eq!(cursor.remove_current(), Some(1));
        assert_eq!(cursor.current(), Some(&mut 2));
        assert_eq!(cursor.index(), Some(1));
        cursor.move_next();
        assert_eq!(cursor.remove_current(), Some(3));
        assert!(cursor.is_end());
        assert_eq!(cursor.remove_current(), None);
        assert_eq!(list.len(), 2);
        assert!(list.iter().copied().eq([0, 2]));
        list.assert_links();
    }

    #[test]
    fn insert_reports_exhaustion() {
        let arena = StackArena::<64>::new();
        let mut list = List::new_in(arena.allocator::<u64>()).unwrap();
        let mut cursor = list.cursor_end_mut();
        let mut inserted = 0;
        let err = loop {
            match cursor.insert_before(inserted) {
                Ok(()) => inserted += 1,
                Err(err) => break err,
            }
        };
        assert!(matches!(err, AllocError::OutOfMemory { .. }));
        assert_eq!(list.len(), 1);
        assert!(list.iter().copied().eq(0..inserted));
        list.assert_links();
    }

    #[test]
    fn panicking_constructor_leaves_list_intact() {
        let mut list = List::<String>::new().unwrap();
        list.push_back("a".to_string()).unwrap();
        let called = Cell::new(false);
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let mut cursor = list.cursor_front_mut();
            let _ = cursor.insert_with(|| {
                called.set(true);
                panic!("constructor failed")
            });
        }));
        assert!(result.is_err());
        assert!(called.get());
        assert_eq!(list.len(), 1);
        assert_eq!(list.front().map(String::as_str), Some("a"));
        list.assert_links();
    }
}
