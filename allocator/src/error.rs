use thiserror::Error;

/// Why an allocator refused a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The arena cannot fit the request behind its cursor.
    #[error(
        "arena exhausted: requested {requested} bytes aligned to {align}, \
         {remaining} of {capacity} bytes remaining"
    )]
    OutOfMemory {
        requested: usize,
        align: usize,
        remaining: usize,
        capacity: usize,
    },
    #[error("alignment {align} is not a power of two")]
    InvalidAlignment { align: usize },
    /// `count * elem_size` does not form a valid layout.
    #[error("allocation of {count} elements of {elem_size} bytes overflows")]
    CapacityOverflow { count: usize, elem_size: usize },
    #[error("global allocator failed to provide {size} bytes aligned to {align}")]
    HeapExhausted { size: usize, align: usize },
}
