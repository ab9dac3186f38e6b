#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::as_conversions)]

//! Alignment helpers shared by the allocators.
//!
//! Addresses are manipulated with the strict-provenance API, so a pointer
//! moved with [`PtrExt::try_align_up`] keeps the provenance of the original.

use core::ptr::NonNull;

pub trait PtrExt: Sized {
    /// Rounds `self` up to the next multiple of `align`.
    ///
    /// Returns `None` if `align` is not a power of two or the rounded value
    /// does not fit in the address space.
    fn try_align_up(self, align: usize) -> Option<Self>;

    /// Whether `self` is a multiple of `align`. Always false for an `align`
    /// that is not a power of two.
    fn is_aligned_at(self, align: usize) -> bool;
}

impl PtrExt for usize {
    fn try_align_up(self, align: usize) -> Option<Self> {
        if !align.is_power_of_two() {
            return None;
        }
        if self & (align - 1) == 0 {
            Some(self)
        } else {
            (self | (align - 1)).checked_add(1)
        }
    }

    fn is_aligned_at(self, align: usize) -> bool {
        align.is_power_of_two() && self & (align - 1) == 0
    }
}

impl PtrExt for *mut u8 {
    fn try_align_up(self, align: usize) -> Option<Self> {
        let addr = self.addr().try_align_up(align)?;
        Some(self.with_addr(addr))
    }

    fn is_aligned_at(self, align: usize) -> bool {
        self.addr().is_aligned_at(align)
    }
}

impl PtrExt for NonNull<u8> {
    fn try_align_up(self, align: usize) -> Option<Self> {
        NonNull::new(self.as_ptr().try_align_up(align)?)
    }

    fn is_aligned_at(self, align: usize) -> bool {
        self.as_ptr().is_aligned_at(align)
    }
}

#[cfg(test)]
mod tests {
    use core::ptr::{self, NonNull};

    use super::PtrExt;

    #[test]
    fn align_addresses() {
        assert_eq!(0usize.try_align_up(8), Some(0));
        assert_eq!(1usize.try_align_up(8), Some(8));
        assert_eq!(8usize.try_align_up(8), Some(8));
        assert_eq!(9usize.try_align_up(4), Some(12));
        assert_eq!(13usize.try_align_up(1), Some(13));
        assert_eq!(5usize.try_align_up(3), None);
        assert_eq!(5usize.try_align_up(0), None);
        assert_eq!(usize::MAX.try_align_up(2), None);
    }

    #[test]
    fn aligned_at() {
        assert!(16usize.is_aligned_at(8));
        assert!(!12usize.is_aligned_at(8));
        assert!(!12usize.is_aligned_at(6));
        assert!(7usize.is_aligned_at(1));
    }

    #[test]
    fn pointers_keep_provenance() {
        let mut buf = [0u8; 32];
        let base: *mut u8 = ptr::addr_of_mut!(buf).cast();
        let aligned = base.wrapping_add(1).try_align_up(16).unwrap();
        assert!(aligned.is_aligned_at(16));
        assert!(aligned.addr() > base.addr());
        assert!(aligned.addr() - base.addr() <= 16);
        unsafe { aligned.write(7) };
        let offset = aligned.addr() - base.addr();
        assert_eq!(buf[offset], 7);

        let nn = NonNull::new(base).unwrap();
        assert_eq!(nn.try_align_up(1), Some(nn));
    }
}
