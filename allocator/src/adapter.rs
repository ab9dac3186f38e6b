use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};

use crate::{AllocError, Allocator, StackArena};

/// A copyable [`Allocator`] handle for `T` that carves storage out of a
/// [`StackArena`].
///
/// Deallocation is a no-op: memory comes back only when the arena does.
/// Handles are equal iff they borrow the same arena, whatever their element
/// types.
pub struct ArenaAllocator<'a, T, const N: usize> {
    arena: &'a StackArena<N>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T, const N: usize> ArenaAllocator<'a, T, N> {
    pub fn new(arena: &'a StackArena<N>) -> Self {
        ArenaAllocator {
            arena,
            _marker: PhantomData,
        }
    }

    pub fn arena(&self) -> &'a StackArena<N> {
        self.arena
    }
}

impl<T, const N: usize> Clone for ArenaAllocator<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for ArenaAllocator<'_, T, N> {}

impl<'a, T, U, const N: usize> PartialEq<ArenaAllocator<'a, U, N>> for ArenaAllocator<'a, T, N> {
    fn eq(&self, other: &ArenaAllocator<'a, U, N>) -> bool {
        ptr::eq(self.arena, other.arena)
    }
}

impl<T, const N: usize> Eq for ArenaAllocator<'_, T, N> {}

impl<T, const N: usize> fmt::Debug for ArenaAllocator<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("arena", &ptr::from_ref(self.arena))
            .field("capacity", &N)
            .finish()
    }
}

unsafe impl<'a, T, const N: usize> Allocator for ArenaAllocator<'a, T, N> {
    type Value = T;
    type Rebind<U> = ArenaAllocator<'a, U, N>;

    fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Layout::array::<T>(count).map_err(|_| AllocError::CapacityOverflow {
            count,
            elem_size: mem::size_of::<T>(),
        })?;
        Ok(self.arena.alloc_layout(layout)?.cast())
    }

    unsafe fn deallocate(&self, _ptr: NonNull<T>, _count: usize) {}

    fn rebind<U>(&self) -> ArenaAllocator<'a, U, N> {
        ArenaAllocator::new(self.arena)
    }
}
