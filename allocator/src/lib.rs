#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::as_conversions)]

//! A fixed-capacity bump arena and the allocator handles containers use to
//! get typed storage from it or from the global heap.

extern crate alloc;

use core::ptr::{self, NonNull};

pub mod adapter;
pub mod arena;
mod error;
pub mod heap;
pub mod policy;

pub use adapter::ArenaAllocator;
pub use arena::StackArena;
pub use error::AllocError;
pub use heap::Heap;
pub use policy::Propagate;

/// Typed storage provider for containers.
///
/// An allocator serves `count` contiguous slots of [`Value`](Allocator::Value)
/// and can be rebound to any other element type while keeping the same
/// backing storage, so a container of `T` can allocate its own node type.
///
/// Two allocators compare equal exactly when storage obtained from one may
/// be released through the other. Clones and rebinds of an allocator are
/// equal to it.
///
/// # Safety
///
/// Implementors must hand out properly aligned memory, valid for `count`
/// values, that does not overlap any other live allocation, and it must stay
/// valid until passed to [`deallocate`](Allocator::deallocate) on an equal
/// allocator.
pub unsafe trait Allocator: Clone + PartialEq {
    type Value;
    type Rebind<U>: Allocator<Value = U>;

    /// Whether copy-assigning a container also hands it the source's
    /// allocator. When `false` the destination keeps its own.
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = false;

    fn allocate(&self, count: usize) -> Result<NonNull<Self::Value>, AllocError>;

    /// # Safety
    ///
    /// `ptr` must come from `allocate(count)` on an allocator equal to `self`
    /// and must not have been deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<Self::Value>, count: usize);

    fn rebind<U>(&self) -> Self::Rebind<U>;

    /// Allocator for a container copy-constructed from one using `self`.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }

    /// Moves `value` into the uninitialized slot at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned.
    unsafe fn construct<U>(&self, ptr: NonNull<U>, value: U) {
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Drops the value at `ptr` in place, leaving the slot uninitialized.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized value that is not used afterwards.
    unsafe fn destroy<U>(&self, ptr: NonNull<U>) {
        unsafe { ptr::drop_in_place(ptr.as_ptr()) }
    }
}
