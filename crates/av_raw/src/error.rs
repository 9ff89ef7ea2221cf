use core::alloc::Layout;

use thiserror::Error;

// -----------------------------------------------------------------------------
// AllocError

/// The error type for buffer allocation.
///
/// Fallible constructors such as [`RawBuffer::try_with_capacity`] return it
/// unchanged, so the caller can keep its current storage and give up.
///
/// [`RawBuffer::try_with_capacity`]: crate::RawBuffer::try_with_capacity
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocError {
    /// The requested slot count does not fit in `isize::MAX` bytes.
    #[error("capacity overflow: {capacity} slots exceed the maximum allocation size")]
    CapacityOverflow { capacity: usize },

    /// The allocator returned null for a valid layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    OutOfMemory { layout: Layout },
}

impl AllocError {
    /// Diverges in the same way as the infallible std collections.
    ///
    /// Capacity overflow panics, out-of-memory goes through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    #[cold]
    #[inline(never)]
    #[track_caller]
    pub fn handle_error(self) -> ! {
        match self {
            AllocError::CapacityOverflow { .. } => panic!("{self}"),
            AllocError::OutOfMemory { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
