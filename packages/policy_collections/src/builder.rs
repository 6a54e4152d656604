use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{CloneElements, DynArray, ElementPolicy, Result};

/// Builder for creating an instance of [`DynArray`].
///
/// All settings are optional. By default the array copies elements with [`Clone`], has no free
/// hook and starts with zero capacity, which is the same as [`DynArray::new()`].
///
/// # Examples
///
/// Pre-allocating capacity:
///
/// ```
/// use policy_collections::DynArray;
///
/// let array = DynArray::<u32>::builder().capacity(16).build().unwrap();
///
/// assert_eq!(array.len(), 0);
/// assert_eq!(array.capacity(), 16);
/// ```
///
/// Attaching a free hook:
///
/// ```
/// use std::cell::Cell;
///
/// use policy_collections::{DynArray, FreeWith};
///
/// let released = Cell::new(0);
///
/// let mut array = DynArray::builder()
///     .policy(FreeWith::new(|_: Vec<u8>| released.set(released.get() + 1)))
///     .capacity(2)
///     .build()
///     .unwrap();
///
/// array.append(&vec![1, 2, 3]).unwrap();
/// drop(array);
///
/// assert_eq!(released.get(), 1);
/// ```
#[must_use]
pub struct DynArrayBuilder<T, P = CloneElements> {
    policy: P,
    capacity: usize,

    _element: PhantomData<fn() -> T>,
}

impl<T> DynArrayBuilder<T, CloneElements> {
    /// Creates a builder with default settings.
    ///
    /// [`DynArray::builder()`] is the usual way to get a builder. Starting from here is needed
    /// when the element type does not implement [`Clone`], since the builder can then only
    /// produce an array once a [policy][Self::policy] that knows how to copy it is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_collections::{CopyWith, DynArrayBuilder};
    ///
    /// struct Token(u32);
    ///
    /// let mut array = DynArrayBuilder::new()
    ///     .policy(CopyWith::new(|token: &Token| Token(token.0)))
    ///     .capacity(4)
    ///     .build()
    ///     .unwrap();
    ///
    /// array.append(&Token(7)).unwrap();
    ///
    /// assert_eq!(array[0].0, 7);
    /// assert_eq!(array.capacity(), 4);
    /// ```
    pub fn new() -> Self {
        Self {
            policy: CloneElements,
            capacity: 0,
            _element: PhantomData,
        }
    }
}

impl<T> Default for DynArrayBuilder<T, CloneElements> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> DynArrayBuilder<T, P> {
    /// Sets the [element policy][ElementPolicy] that decides how values are copied into the
    /// array and how they are released when they leave it.
    pub fn policy<Q>(self, policy: Q) -> DynArrayBuilder<T, Q>
    where
        Q: ElementPolicy<T>,
    {
        DynArrayBuilder {
            policy,
            capacity: self.capacity,
            _element: PhantomData,
        }
    }

    /// Sets the number of element slots to allocate up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the array with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial capacity cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    pub fn build(self) -> Result<DynArray<T, P>>
    where
        P: ElementPolicy<T>,
    {
        let mut array = DynArray::with_policy(self.policy);
        array.reserve_capacity(self.capacity)?;
        Ok(array)
    }
}

impl<T, P> fmt::Debug for DynArrayBuilder<T, P> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
