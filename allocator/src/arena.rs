use core::{
    alloc::Layout,
    cell::{Cell, UnsafeCell},
    fmt,
    mem::MaybeUninit,
    ptr::NonNull,
};

use ptr_ext::PtrExt;
use tracing::{debug, warn};

use crate::{adapter::ArenaAllocator, AllocError};

/// A fixed-capacity bump arena that lives wherever its owner puts it,
/// typically on the stack.
///
/// Allocations only ever move the cursor forward. Individual blocks are never
/// reclaimed: everything handed out stays valid until the arena is dropped or
/// [`reset`](StackArena::reset), both of which need the arena exclusively and
/// therefore cannot happen while an [`ArenaAllocator`] still borrows it.
///
/// The buffer starts 16-byte aligned, so requests with smaller alignment only
/// pay for padding caused by earlier allocations.
#[repr(C, align(16))]
pub struct StackArena<const N: usize> {
    buffer: UnsafeCell<[MaybeUninit<u8>; N]>,
    cursor: Cell<usize>,
}

impl<const N: usize> StackArena<N> {
    pub const fn new() -> Self {
        StackArena {
            buffer: UnsafeCell::new([MaybeUninit::uninit(); N]),
            cursor: Cell::new(0),
        }
    }

    /// Reserves `size` bytes at the next offset aligned to `align`.
    ///
    /// The cursor is left untouched when the request fails.
    pub fn alloc(&self, align: usize, size: usize) -> Result<NonNull<[u8]>, AllocError> {
        if !align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { align });
        }
        let base = self.base();
        let tip = base.addr().get() + self.cursor.get();
        let offset = tip
            .try_align_up(align)
            .map(|start| start - base.addr().get())
            .filter(|&offset| offset <= N)
            .ok_or_else(|| self.exhausted(align, size))?;
        let end = offset
            .checked_add(size)
            .filter(|&end| end <= N)
            .ok_or_else(|| self.exhausted(align, size))?;
        self.cursor.set(end);
        // SAFETY: `offset <= N`, so the result stays inside the buffer or one
        // past its end, which is only reachable for zero-sized requests.
        let start = unsafe { base.add(offset) };
        Ok(NonNull::slice_from_raw_parts(start, size))
    }

    pub fn alloc_layout(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.alloc(layout.align(), layout.size())
    }

    /// Hands out an allocator handle for `T` backed by this arena.
    pub fn allocator<T>(&self) -> ArenaAllocator<'_, T, N> {
        ArenaAllocator::new(self)
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes consumed so far, padding included.
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    pub fn remaining(&self) -> usize {
        N - self.cursor.get()
    }

    /// Whether `ptr` points into this arena's buffer.
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.base().addr().get();
        (start..start + N).contains(&ptr.addr().get())
    }

    /// Rewinds the cursor, making the whole buffer available again.
    pub fn reset(&mut self) {
        debug!(used = self.used(), capacity = N, "arena reset");
        self.cursor.set(0);
    }

    fn base(&self) -> NonNull<u8> {
        // SAFETY: `UnsafeCell::get` never returns null.
        unsafe { NonNull::new_unchecked(self.buffer.get().cast()) }
    }

    fn exhausted(&self, align: usize, requested: usize) -> AllocError {
        let remaining = self.remaining();
        warn!(requested, align, remaining, capacity = N, "arena exhausted");
        AllocError::OutOfMemory {
            requested,
            align,
            remaining,
            capacity: N,
        }
    }
}

impl<const N: usize> Default for StackArena<N> {
    fn default() -> Self {
        StackArena::new()
    }
}

impl<const N: usize> fmt::Debug for StackArena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackArena")
            .field("capacity", &N)
            .field("used", &self.used())
            .finish()
    }
}
