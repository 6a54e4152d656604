use std::any::type_name;
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};
use std::{mem, ptr, slice};

use tracing::debug;

use crate::{CloneElements, DynArrayBuilder, ElementPolicy, Error, RawBuffer, Result};

/// Capacity is multiplied by this when an append finds the array full.
const GROWTH_FACTOR: usize = 2;

/// Capacity shrinks once the length drops below `capacity / SHRINK_THRESHOLD_DIVISOR`.
const SHRINK_THRESHOLD_DIVISOR: usize = 4;

/// A contiguous, growable array whose elements enter through an [`ElementPolicy`].
///
/// Values given to the array by reference are duplicated into array-owned storage by the policy
/// and released through the policy when they are overwritten, removed or when the array is
/// dropped.
///
/// # Capacity management
///
/// The capacity is always exactly what the array decided it to be, never rounded up:
///
/// * [`append()`](Self::append) doubles the capacity when the array is full (starting from 1),
///   which makes appending amortized O(1).
/// * [`pop_back()`](Self::pop_back) halves the capacity once the array is less than a quarter
///   full. The gap between the grow and shrink thresholds prevents repeated reallocation when
///   the length oscillates around a single boundary.
/// * [`reserve_capacity()`](Self::reserve_capacity) sets the capacity explicitly.
///
/// Allocation failure is reported as an [`Error`] and leaves the array in its previous state.
///
/// # Examples
///
/// ```
/// use policy_collections::DynArray;
///
/// let mut array = DynArray::new();
///
/// array.append(&1).unwrap();
/// array.append(&2).unwrap();
/// array.append(&3).unwrap();
///
/// assert_eq!(array.len(), 3);
/// assert_eq!(array.capacity(), 4);
/// assert_eq!(array.as_slice(), [1, 2, 3]);
///
/// assert_eq!(array.pop_back().unwrap(), Some(3));
/// ```
///
/// # Thread safety
///
/// The array is thread-mobile ([`Send`]) if the elements and the policy are. It performs no
/// internal synchronization.
pub struct DynArray<T, P = CloneElements>
where
    P: ElementPolicy<T>,
{
    buffer: RawBuffer<T>,

    /// Slots `[0, len)` of the buffer are initialized, the rest are not.
    len: usize,

    policy: P,
}

impl<T: Clone> DynArray<T> {
    /// Creates an empty array that copies elements with [`Clone`]. Does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CloneElements)
    }

    /// Creates an empty array with exactly `capacity` pre-allocated slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::builder().capacity(capacity).build()
    }

    /// Creates a builder for configuring the policy and initial capacity of a new array.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_collections::{CopyWith, DynArray};
    ///
    /// let mut array = DynArray::builder()
    ///     .policy(CopyWith::new(|value: &String| value.to_uppercase()))
    ///     .capacity(8)
    ///     .build()
    ///     .unwrap();
    ///
    /// array.append(&"shout".to_string()).unwrap();
    /// assert_eq!(array[0], "SHOUT");
    /// ```
    pub fn builder() -> DynArrayBuilder<T> {
        DynArrayBuilder::new()
    }
}

impl<T, P> DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    /// Creates an empty array that uses the given policy. Does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self {
            buffer: RawBuffer::new(),
            len: 0,
            policy,
        }
    }

    /// Returns the number of elements in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of element slots currently allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the size of one element slot in bytes.
    #[must_use]
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Returns the policy attached to the array.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns a reference to the element at `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns an exclusive reference to the element at `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots are initialized and the pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buffer.as_ptr(), self.len) }
    }

    /// Returns the elements as an exclusive slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: The first `len` slots are initialized and we hold `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len) }
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates over exclusive references to the elements in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Replaces the element at `index` with a policy-made copy of `value`.
    ///
    /// The previous element is released through the policy first, then `value` is copied into
    /// the slot, so every call performs exactly one release followed by one copy.
    ///
    /// If either policy hook panics, the elements from `index` onwards are leaked and the array
    /// is truncated to `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: &T) {
        assert!(
            index < self.len,
            "index {index} out of bounds in array of length {}",
            self.len
        );

        let len = self.len;
        let slot = self.buffer.slot(index);

        // While the slot is vacant, only the prefix before it is considered initialized.
        self.len = index;

        // SAFETY: The index is in bounds, so the slot is initialized. It is now outside `len`,
        // so nothing else will read or drop it until we write the replacement.
        let previous = unsafe { slot.read() };
        self.policy.dispose(previous);

        let copy = self.policy.duplicate(value);

        // SAFETY: The slot is allocated and vacant since we moved its element out above.
        unsafe {
            slot.write(copy);
        }

        self.len = len;
    }

    /// Appends a policy-made copy of `value` to the end of the array.
    ///
    /// If the array is full, the capacity is doubled first (or set to 1 if it was 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the array needed to grow and the memory could not be allocated. The
    /// array is not modified in that case.
    pub fn append(&mut self, value: &T) -> Result<()> {
        let capacity = self.buffer.capacity();

        if self.len == capacity {
            let new_capacity = capacity
                .checked_mul(GROWTH_FACTOR)
                .ok_or(Error::CapacityOverflow {
                    capacity: usize::MAX,
                })?
                .max(1);

            self.buffer.reallocate(new_capacity)?;
        }

        let copy = self.policy.duplicate(value);

        // SAFETY: We just ensured `len < capacity`, so the slot is allocated and uninitialized.
        unsafe {
            self.buffer.slot(self.len).write(copy);
        }

        // Cannot overflow because len < capacity.
        self.len = self.len.wrapping_add(1);

        Ok(())
    }

    /// Removes the last element and returns it. The caller takes ownership, so the element is
    /// not released through the policy.
    ///
    /// Returns `Ok(None)` if the array is empty.
    ///
    /// If the remaining length is less than a quarter of the capacity, the capacity is halved.
    ///
    /// # Errors
    ///
    /// Returns an error if shrinking the capacity fails. The element is not removed in that case.
    #[expect(
        clippy::integer_division,
        reason = "capacity thresholds are meant to round down"
    )]
    pub fn pop_back(&mut self) -> Result<Option<T>> {
        let Some(new_len) = self.len.checked_sub(1) else {
            return Ok(None);
        };

        let capacity = self.buffer.capacity();

        if new_len < capacity / SHRINK_THRESHOLD_DIVISOR {
            // The current length is at most a quarter of the capacity,
            // so half the capacity still holds every element.
            self.buffer.reallocate(capacity / GROWTH_FACTOR)?;
        }

        self.len = new_len;

        // SAFETY: The slot at `new_len` was the last initialized one. It is now outside `len`,
        // so nothing else will read or drop it.
        Ok(Some(unsafe { self.buffer.slot(new_len).read() }))
    }

    /// Sets the capacity of the array to exactly `new_capacity` element slots.
    ///
    /// Reserving the current capacity does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be allocated. The array is not modified in that case.
    ///
    /// # Panics
    ///
    /// Panics if `new_capacity` is less than the current length.
    pub fn reserve_capacity(&mut self, new_capacity: usize) -> Result<()> {
        assert!(
            new_capacity >= self.len,
            "cannot reserve capacity {new_capacity} for an array of length {}",
            self.len
        );

        self.buffer.reallocate(new_capacity)
    }

    /// Resizes the array to `new_size` elements, filling new slots with `T::default()`.
    ///
    /// See [`resize_with()`](Self::resize_with) for the capacity rules.
    ///
    /// # Errors
    ///
    /// Returns an error if growing the capacity fails. The array is not modified in that case.
    pub fn resize(&mut self, new_size: usize) -> Result<()>
    where
        T: Default,
    {
        self.resize_with(new_size, |_| Ok::<(), Infallible>(()))
    }

    /// Resizes the array to `new_size` elements.
    ///
    /// When growing, the capacity is first raised to `new_size` if needed. Every new slot is filled
    /// with `T::default()` and then handed to `init`. A failing `init` does not stop the resize:
    /// every new slot is still visited and kept, and the failures are reported in the result.
    ///
    /// When shrinking, the removed elements are released through the policy, highest index first.
    ///
    /// Afterwards, if `new_size` is less than a quarter of the capacity, the capacity is reduced
    /// to `new_size`. If that reduction fails, the array simply keeps its larger capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if growing the capacity fails, in which case the array is not modified.
    ///
    /// Returns [`Error::PartialInit`] if `init` failed for any slot. The array has still been
    /// resized to `new_size` in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_collections::{DynArray, Error};
    ///
    /// let mut array = DynArray::<u32>::new();
    /// let mut next = 0;
    ///
    /// let result = array.resize_with(4, |slot| {
    ///     next += 1;
    ///     if next == 3 {
    ///         return Err("three is unlucky");
    ///     }
    ///     *slot = next;
    ///     Ok(())
    /// });
    ///
    /// assert!(matches!(result, Err(Error::PartialInit { failed_slots: 1, .. })));
    /// assert_eq!(array.as_slice(), [1, 2, 0, 4]);
    /// ```
    #[expect(
        clippy::integer_division,
        reason = "capacity thresholds are meant to round down"
    )]
    pub fn resize_with<F, E>(&mut self, new_size: usize, mut init: F) -> Result<()>
    where
        T: Default,
        F: FnMut(&mut T) -> std::result::Result<(), E>,
        E: Display,
    {
        if new_size > self.buffer.capacity() {
            self.buffer.reallocate(new_size)?;
        }

        let mut failed_slots: usize = 0;
        let mut first_failure: Option<String> = None;

        while self.len < new_size {
            let mut element = T::default();

            if let Err(e) = init(&mut element) {
                failed_slots = failed_slots.wrapping_add(1);
                first_failure.get_or_insert_with(|| e.to_string());
            }

            // SAFETY: `len < new_size <= capacity`, so the slot is allocated and uninitialized.
            unsafe {
                self.buffer.slot(self.len).write(element);
            }

            // Cannot overflow because len < new_size.
            self.len = self.len.wrapping_add(1);
        }

        while self.len > new_size {
            // Cannot underflow because len > new_size.
            self.len = self.len.wrapping_sub(1);

            // SAFETY: The slot was initialized and is now outside `len`.
            let element = unsafe { self.buffer.slot(self.len).read() };
            self.policy.dispose(element);
        }

        let capacity = self.buffer.capacity();

        if new_size < capacity / SHRINK_THRESHOLD_DIVISOR {
            if let Err(e) = self.buffer.reallocate(new_size) {
                debug!(
                    capacity,
                    new_size,
                    error = %e,
                    "keeping excess capacity after resize"
                );
            }
        }

        match first_failure {
            None => Ok(()),
            Some(first_failure) => {
                debug!(
                    failed_slots,
                    first_failure = first_failure.as_str(),
                    "resize initializer failed"
                );

                Err(Error::PartialInit {
                    failed_slots,
                    first_failure,
                })
            }
        }
    }

    /// Inserts `elements` before the element at `index`, shifting that element and everything
    /// after it towards the end.
    ///
    /// The elements are moved into the array as they are - the policy is not asked to copy them.
    /// The shifted elements are relocated in memory, not copied.
    ///
    /// If the array is too small to hold the result, the capacity is raised to exactly the new
    /// length first.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity needed to grow and the memory could not be allocated. The
    /// array is not modified in that case.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the iterator yields a different number of elements than
    /// it reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_collections::DynArray;
    ///
    /// let mut array = DynArray::new();
    /// for value in [1, 2, 5, 6] {
    ///     array.append(&value).unwrap();
    /// }
    ///
    /// array.insert(2, [3, 4]).unwrap();
    ///
    /// assert_eq!(array.as_slice(), [1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn insert<I>(&mut self, index: usize, elements: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds in array of length {}",
            self.len
        );

        let mut elements = elements.into_iter();
        let count = elements.len();

        if count == 0 {
            return Ok(());
        }

        let new_len = self
            .len
            .checked_add(count)
            .ok_or(Error::CapacityOverflow {
                capacity: usize::MAX,
            })?;

        if new_len > self.buffer.capacity() {
            self.buffer.reallocate(new_len)?;
        }

        // Cannot underflow because index <= len.
        let tail_len = self.len.wrapping_sub(index);
        let gap_ptr = self.buffer.slot(index).as_ptr();

        // SAFETY: Both ranges are within the allocation because `index + count + tail_len`
        // equals `new_len <= capacity`. `ptr::copy` permits overlap.
        unsafe {
            ptr::copy(gap_ptr, gap_ptr.add(count), tail_len);
        }

        // While the gap is open, only the prefix is considered initialized. If the iterator
        // panics we leak the tail instead of dropping uninitialized memory.
        self.len = index;

        let mut written: usize = 0;

        for element in elements.by_ref().take(count) {
            // SAFETY: `written < count`, so the slot lies inside the gap we opened above.
            unsafe {
                gap_ptr.add(written).write(element);
            }

            // Cannot overflow because written < count.
            written = written.wrapping_add(1);
        }

        if written < count {
            // Close the remainder of the gap so the array stays contiguous.
            // SAFETY: Same ranges as above, shortened by the unwritten part of the gap.
            unsafe {
                ptr::copy(gap_ptr.add(count), gap_ptr.add(written), tail_len);
            }

            // Cannot overflow because the sum is less than new_len.
            self.len = index.wrapping_add(written).wrapping_add(tail_len);

            panic!("iterator reported {count} elements but yielded only {written}");
        }

        self.len = new_len;

        assert!(
            elements.next().is_none(),
            "iterator reported {count} elements but yielded more"
        );

        Ok(())
    }
}

impl<T, P> Drop for DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);

        for index in 0..len {
            // SAFETY: The slot was initialized and `len` is already zero, so nothing else will
            // read or drop it.
            let element = unsafe { self.buffer.slot(index).read() };
            self.policy.dispose(element);
        }
    }
}

impl<T: Clone> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> Index<usize> for DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        let len = self.len;
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in array of length {len}"))
    }
}

impl<T, P> IndexMut<usize> for DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len;
        self.get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in array of length {len}"))
    }
}

impl<'a, T, P> IntoIterator for &'a DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, P> IntoIterator for &'a mut DynArray<T, P>
where
    P: ElementPolicy<T>,
{
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, P> fmt::Debug for DynArray<T, P>
where
    T: fmt::Debug,
    P: ElementPolicy<T> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len)
            .field("capacity", &self.buffer.capacity())
            .field("policy", &self.policy)
            .field("elements", &self.as_slice())
            .finish()
    }
}
