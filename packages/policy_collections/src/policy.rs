use std::any::type_name;
use std::fmt;

/// Decides how elements enter a container and how they leave it.
///
/// Every container in this crate holds exactly one policy, attached at creation and fixed for the
/// lifetime of the container. The policy is consulted:
///
/// * [`duplicate()`](Self::duplicate) whenever the caller hands the container a reference to a
///   value that must be stored (append, set, prepend, push and similar). The container stores the
///   duplicate, never the caller's value.
/// * [`dispose()`](Self::dispose) whenever a stored element is overwritten, removed without being
///   handed back to the caller, or when the container itself is dropped.
///
/// The crate provides one policy type for each combination of "custom copy or not" and
/// "custom free or not":
///
/// | Policy              | Copy                 | Free           |
/// |---------------------|----------------------|----------------|
/// | [`CloneElements`]   | [`Clone::clone`]     | plain drop     |
/// | [`CopyWith`]        | caller closure       | plain drop     |
/// | [`FreeWith`]        | [`Clone::clone`]     | caller closure |
/// | [`FnPolicy`]        | caller closure       | caller closure |
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
///
/// use policy_collections::{DynArray, FreeWith};
///
/// let freed = Cell::new(0);
/// let mut array = DynArray::with_policy(FreeWith::new(|_: String| freed.set(freed.get() + 1)));
///
/// array.append(&"first".to_string()).unwrap();
/// array.set(0, &"second".to_string());
///
/// // Overwriting released the previous element through the policy.
/// assert_eq!(freed.get(), 1);
/// ```
pub trait ElementPolicy<T> {
    /// Creates the container-owned copy of `source`.
    fn duplicate(&self, source: &T) -> T;

    /// Releases an element that is leaving the container.
    ///
    /// The default implementation simply drops the element.
    #[cfg_attr(test, mutants::skip)] // Removing the drop changes nothing observable.
    fn dispose(&self, element: T) {
        drop(element);
    }
}

/// The default policy: elements are copied with [`Clone`] and dropped normally on removal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct CloneElements;

impl<T: Clone> ElementPolicy<T> for CloneElements {
    #[inline]
    fn duplicate(&self, source: &T) -> T {
        source.clone()
    }
}

/// A policy that copies elements with a caller-supplied function and drops them normally.
///
/// # Examples
///
/// ```
/// use policy_collections::{CopyWith, LinkedList};
///
/// // Store every value scaled by ten.
/// let mut list = LinkedList::with_policy(CopyWith::new(|value: &u32| value * 10));
/// list.prepend(&4).unwrap();
///
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [40]);
/// ```
#[derive(Clone, Copy)]
pub struct CopyWith<C> {
    copy_fn: C,
}

impl<C> CopyWith<C> {
    /// Creates a policy that copies elements using `copy_fn`.
    #[must_use]
    pub fn new(copy_fn: C) -> Self {
        Self { copy_fn }
    }
}

impl<T, C> ElementPolicy<T> for CopyWith<C>
where
    C: Fn(&T) -> T,
{
    #[inline]
    fn duplicate(&self, source: &T) -> T {
        (self.copy_fn)(source)
    }
}

impl<C> fmt::Debug for CopyWith<C> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
    }
}

/// A policy that copies elements with [`Clone`] and releases them with a caller-supplied
/// function.
///
/// The free function receives the element by value, so it decides what happens to it.
#[derive(Clone, Copy)]
pub struct FreeWith<F> {
    free_fn: F,
}

impl<F> FreeWith<F> {
    /// Creates a policy that releases elements using `free_fn`.
    #[must_use]
    pub fn new(free_fn: F) -> Self {
        Self { free_fn }
    }
}

impl<T, F> ElementPolicy<T> for FreeWith<F>
where
    T: Clone,
    F: Fn(T),
{
    #[inline]
    fn duplicate(&self, source: &T) -> T {
        source.clone()
    }

    #[inline]
    fn dispose(&self, element: T) {
        (self.free_fn)(element);
    }
}

impl<F> fmt::Debug for FreeWith<F> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
    }
}

/// A policy with both a caller-supplied copy function and a caller-supplied free function.
///
/// This is the policy to use when elements own resources that the plain [`Clone`]/[`Drop`] pair
/// does not manage, for example handles that must be registered and unregistered elsewhere.
#[derive(Clone, Copy)]
pub struct FnPolicy<C, F> {
    copy_fn: C,
    free_fn: F,
}

impl<C, F> FnPolicy<C, F> {
    /// Creates a policy that copies elements using `copy_fn` and releases them using `free_fn`.
    #[must_use]
    pub fn new(copy_fn: C, free_fn: F) -> Self {
        Self { copy_fn, free_fn }
    }
}

impl<T, C, F> ElementPolicy<T> for FnPolicy<C, F>
where
    C: Fn(&T) -> T,
    F: Fn(T),
{
    #[inline]
    fn duplicate(&self, source: &T) -> T {
        (self.copy_fn)(source)
    }

    #[inline]
    fn dispose(&self, element: T) {
        (self.free_fn)(element);
    }
}

impl<C, F> fmt::Debug for FnPolicy<C, F> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
    }
}
