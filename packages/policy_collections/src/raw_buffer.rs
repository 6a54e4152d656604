use std::alloc::{Layout, alloc, dealloc, realloc};
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::{Error, Result};

/// Heap storage for exactly `capacity` slots of `T`, with no knowledge of which slots are
/// initialized.
///
/// The owner is responsible for initializing, reading and dropping slot contents. Dropping the
/// buffer only releases the memory.
///
/// Unlike `Vec`, the allocation always has exactly the requested number of slots and allocation
/// failure is reported to the caller instead of aborting the process.
pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    capacity: usize,

    // We own values of `T` in the sense that our owner stores them in our memory.
    _owns: PhantomData<T>,
}

// SAFETY: The buffer is an exclusively owned allocation, same as `Box<[T]>`.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: The buffer only hands out shared access to slots via `&self`, same as `Box<[T]>`.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    /// Creates a buffer with zero capacity. Does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub(crate) fn new() -> Self {
        assert!(
            size_of::<T>() > 0,
            "containers must have non-zero element size"
        );

        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[must_use]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns a pointer to the slot at `index`. The slot may or may not be initialized.
    #[must_use]
    pub(crate) fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(
            index < self.capacity,
            "slot {index} out of bounds in buffer of capacity {}",
            self.capacity
        );

        // SAFETY: The index is within the allocation, which cannot extend beyond `isize::MAX`
        // bytes because `Layout::array()` validated it when we allocated.
        unsafe { self.ptr.add(index) }
    }

    /// Changes the capacity of the buffer to exactly `new_capacity` slots.
    ///
    /// The contents of the first `min(capacity, new_capacity)` slots are preserved. If this
    /// returns an error, the buffer is left exactly as it was.
    pub(crate) fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity == self.capacity {
            return Ok(());
        }

        let new_layout =
            Layout::array::<T>(new_capacity).map_err(|_overflow| Error::CapacityOverflow {
                capacity: new_capacity,
            })?;

        let old_capacity = self.capacity;

        let new_ptr = if new_capacity == 0 {
            self.release();
            NonNull::dangling()
        } else if old_capacity == 0 {
            // SAFETY: The layout has non-zero size because `T` is not zero-sized
            // (checked in `new()`) and the capacity is non-zero.
            NonNull::new(unsafe { alloc(new_layout) })
                .ok_or_else(|| allocation_failed(new_capacity, new_layout))?
                .cast::<T>()
        } else {
            // SAFETY: The pointer was allocated by us with `current_layout()` and the new size is
            // non-zero and valid per `Layout::array()`. On failure the old allocation is untouched.
            NonNull::new(unsafe {
                realloc(
                    self.ptr.as_ptr().cast::<u8>(),
                    self.current_layout(),
                    new_layout.size(),
                )
            })
            .ok_or_else(|| allocation_failed(new_capacity, new_layout))?
            .cast::<T>()
        };

        trace!(
            old_capacity,
            new_capacity,
            element_size = size_of::<T>(),
            "reallocated element buffer"
        );

        self.ptr = new_ptr;
        self.capacity = new_capacity;

        Ok(())
    }

    fn current_layout(&self) -> Layout {
        Layout::array::<T>(self.capacity)
            .expect("layout was already validated when the current allocation was made")
    }

    /// Frees the allocation, if any. The buffer must be reset by the caller afterwards.
    fn release(&mut self) {
        if self.capacity == 0 {
            return;
        }

        // SAFETY: We allocated this pointer with exactly this layout.
        unsafe {
            dealloc(self.ptr.as_ptr().cast::<u8>(), self.current_layout());
        }

        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }
}

fn allocation_failed(capacity: usize, layout: Layout) -> Error {
    debug!(
        capacity,
        bytes = layout.size(),
        "element buffer allocation failed"
    );

    Error::OutOfMemory {
        bytes: layout.size(),
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}
