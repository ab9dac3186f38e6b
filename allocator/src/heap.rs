use alloc::alloc::{alloc, dealloc};
use core::{alloc::Layout, fmt, marker::PhantomData, mem, ptr::NonNull};

use tracing::warn;

use crate::{AllocError, Allocator};

/// [`Allocator`] backed by the global heap. Stateless, so every instance is
/// equal to every other.
pub struct Heap<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Heap<T> {
    pub const fn new() -> Self {
        Heap {
            _marker: PhantomData,
        }
    }

    fn layout(count: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(count).map_err(|_| AllocError::CapacityOverflow {
            count,
            elem_size: mem::size_of::<T>(),
        })
    }
}

impl<T> Default for Heap<T> {
    fn default() -> Self {
        Heap::new()
    }
}

impl<T> Clone for Heap<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Heap<T> {}

impl<T, U> PartialEq<Heap<U>> for Heap<T> {
    fn eq(&self, _other: &Heap<U>) -> bool {
        true
    }
}

impl<T> Eq for Heap<T> {}

impl<T> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Heap")
    }
}

unsafe impl<T> Allocator for Heap<T> {
    type Value = T;
    type Rebind<U> = Heap<U>;

    fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Self::layout(count)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).map(NonNull::cast).ok_or_else(|| {
            warn!(size = layout.size(), align = layout.align(), "heap allocation failed");
            AllocError::HeapExhausted {
                size: layout.size(),
                align: layout.align(),
            }
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        // `allocate` already validated this layout.
        let Ok(layout) = Self::layout(count) else {
            return;
        };
        if layout.size() != 0 {
            unsafe { dealloc(ptr.as_ptr().cast(), layout) }
        }
    }

    fn rebind<U>(&self) -> Heap<U> {
        Heap::new()
    }
}
