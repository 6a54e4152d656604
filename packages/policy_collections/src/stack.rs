use std::fmt;

use crate::{CloneElements, ElementPolicy, LinkedList, Result};

/// A last-in-first-out stack built on [`LinkedList`].
///
/// The top of the stack is the head of the underlying list, so every operation is O(1).
/// Pushed values are duplicated through the stack's [`ElementPolicy`] and popped elements are
/// released through it.
///
/// # Examples
///
/// ```
/// use policy_collections::Stack;
///
/// let mut stack = Stack::new();
///
/// for value in 0..10 {
///     stack.push(&value).unwrap();
/// }
///
/// assert_eq!(stack.head(), Some(&9));
///
/// for _ in 0..3 {
///     stack.pop();
/// }
///
/// assert_eq!(stack.head(), Some(&6));
/// assert_eq!(stack.len(), 7);
/// ```
pub struct Stack<T, P = CloneElements>
where
    P: ElementPolicy<T>,
{
    list: LinkedList<T, P>,
}

impl<T: Clone> Stack<T> {
    /// Creates an empty stack that copies elements with [`Clone`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CloneElements)
    }
}

impl<T, P> Stack<T, P>
where
    P: ElementPolicy<T>,
{
    /// Creates an empty stack that uses the given policy.
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self {
            list: LinkedList::with_policy(policy),
        }
    }

    /// Returns the number of elements on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the stack holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Places a policy-made copy of `value` on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for the element cannot be allocated. The stack is not
    /// modified in that case.
    pub fn push(&mut self, value: &T) -> Result<()> {
        self.list.prepend(value)?;
        Ok(())
    }

    /// Removes the top element, releasing it through the policy.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    pub fn pop(&mut self) {
        let top = self.list.begin().expect("cannot pop from an empty stack");
        self.list.remove(top);
    }

    /// Returns the top element, or `None` if the stack is empty.
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.list.begin().and_then(|top| self.list.get(top))
    }

    /// Returns the top element for modification, or `None` if the stack is empty.
    #[must_use]
    pub fn head_mut(&mut self) -> Option<&mut T> {
        let top = self.list.begin()?;
        self.list.get_mut(top)
    }
}

impl<T: Clone> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> fmt::Debug for Stack<T, P>
where
    T: fmt::Debug,
    P: ElementPolicy<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack").field("list", &self.list).finish()
    }
}
