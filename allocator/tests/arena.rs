use std::ops::Range;

use proptest::prelude::*;
use ptr_ext::PtrExt;
use stack_allocator::{AllocError, Allocator, StackArena};

const CAPACITY: usize = 1024;

fn request() -> impl Strategy<Value = (usize, usize)> {
    (0u32..7, 0usize..96).prop_map(|(shift, size)| (1usize << shift, size))
}

fn span(region: std::ptr::NonNull<[u8]>) -> Range<usize> {
    let start = region.cast::<u8>().addr().get();
    start..start + region.len()
}

proptest! {
    #[test]
    fn regions_are_aligned_and_disjoint(requests in proptest::collection::vec(request(), 1..64)) {
        let arena = StackArena::<CAPACITY>::new();
        let base = std::ptr::from_ref(&arena).addr();
        let mut taken: Vec<Range<usize>> = Vec::new();
        for (align, size) in requests {
            let used = arena.used();
            match arena.alloc(align, size) {
                Ok(region) => {
                    let span = span(region);
                    prop_assert!(span.start.is_aligned_at(align));
                    prop_assert!(span.start >= base + used);
                    prop_assert!(span.end <= base + CAPACITY);
                    for other in &taken {
                        prop_assert!(span.is_empty() || other.is_empty()
                            || span.end <= other.start || other.end <= span.start);
                    }
                    prop_assert_eq!(arena.used(), span.end - base);
                    taken.push(span);
                }
                Err(AllocError::OutOfMemory { requested, align: a, remaining, capacity }) => {
                    prop_assert_eq!((requested, a, capacity), (size, align, CAPACITY));
                    prop_assert_eq!(remaining, CAPACITY - used);
                    prop_assert!((base + used).try_align_up(align).unwrap() + size > base + CAPACITY);
                    prop_assert_eq!(arena.used(), used);
                }
                Err(err) => prop_assert!(false, "unexpected error {err}"),
            }
        }
    }

    #[test]
    fn cursor_never_moves_back(requests in proptest::collection::vec(request(), 1..64)) {
        let arena = StackArena::<CAPACITY>::new();
        let mut last = 0;
        for (align, size) in requests {
            let _ = arena.alloc(align, size);
            prop_assert!(arena.used() >= last);
            prop_assert_eq!(arena.used() + arena.remaining(), arena.capacity());
            last = arena.used();
        }
    }

    #[test]
    fn typed_requests_fill_exactly(count in 1usize..64) {
        let arena = StackArena::<CAPACITY>::new();
        let alloc = arena.allocator::<u64>();
        let fits = CAPACITY / 8;
        let mut served = 0;
        while served + count <= fits {
            let p = alloc.allocate(count).unwrap();
            prop_assert!(p.cast::<u8>().is_aligned_at(8));
            served += count;
        }
        let is_out_of_memory = matches!(alloc.allocate(count), Err(AllocError::OutOfMemory { .. }));
        prop_assert!(is_out_of_memory);
        prop_assert_eq!(arena.used(), served * 8);
    }
}

#[test]
fn exhaustion_is_reported_not_overrun() {
    let arena = StackArena::<32>::new();
    let alloc = arena.allocator::<[u8; 12]>();
    let a = alloc.allocate(1).unwrap();
    let b = alloc.allocate(1).unwrap();
    assert_eq!(
        alloc.allocate(1),
        Err(AllocError::OutOfMemory {
            requested: 12,
            align: 1,
            remaining: 8,
            capacity: 32,
        })
    );
    assert_ne!(a, b);
    let message = alloc.allocate(1).unwrap_err().to_string();
    assert_eq!(
        message,
        "arena exhausted: requested 12 bytes aligned to 1, 8 of 32 bytes remaining"
    );
}
