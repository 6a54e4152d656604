use thiserror::Error;

/// Errors that can occur when a container operation needs to allocate memory or initialize
/// new elements.
///
/// Misuse of the API (out-of-range indexes, stale node handles, popping an empty stack and
/// similar) is not reported through this type - such contract violations panic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of element slots does not fit into the address space.
    #[error("capacity of {capacity} elements exceeds the maximum allocation size")]
    CapacityOverflow {
        /// The number of element slots that was requested.
        capacity: usize,
    },

    /// The memory allocator was unable to satisfy the request.
    #[error("out of memory while allocating {bytes} bytes")]
    OutOfMemory {
        /// The size of the allocation request that failed.
        bytes: usize,
    },

    /// One or more new elements could not be initialized during a resize.
    ///
    /// The container was still resized; the affected elements hold their default value.
    #[error("{failed_slots} new elements failed to initialize, first failure: {first_failure}")]
    PartialInit {
        /// How many of the new elements reported an initialization failure.
        failed_slots: usize,

        /// A human-readable description of the first failure.
        first_failure: String,
    },
}

impl Error {
    /// Returns `true` if this error means that memory could not be allocated.
    #[must_use]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::CapacityOverflow { .. } | Self::OutOfMemory { .. })
    }
}

/// A specialized `Result` type for container operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
