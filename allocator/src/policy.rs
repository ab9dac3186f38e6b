use core::ptr::NonNull;

use crate::{AllocError, Allocator};

/// Wraps an allocator so that copy assignment moves it along with the
/// elements: a container assigned from another ends up using the source's
/// allocator instead of keeping its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Propagate<A>(pub A);

impl<A> Propagate<A> {
    pub fn into_inner(self) -> A {
        self.0
    }
}

unsafe impl<A: Allocator> Allocator for Propagate<A> {
    type Value = A::Value;
    type Rebind<U> = Propagate<A::Rebind<U>>;

    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = true;

    fn allocate(&self, count: usize) -> Result<NonNull<A::Value>, AllocError> {
        self.0.allocate(count)
    }

    unsafe fn deallocate(&self, ptr: NonNull<A::Value>, count: usize) {
        unsafe { self.0.deallocate(ptr, count) }
    }

    fn rebind<U>(&self) -> Self::Rebind<U> {
        Propagate(self.0.rebind())
    }

    fn select_on_copy(&self) -> Self {
        Propagate(self.0.select_on_copy())
    }

    unsafe fn construct<U>(&self, ptr: NonNull<U>, value: U) {
        unsafe { self.0.construct(ptr, value) }
    }

    unsafe fn destroy<U>(&self, ptr: NonNull<U>) {
        unsafe { self.0.destroy(ptr) }
    }
}
