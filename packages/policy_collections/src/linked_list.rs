use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{self, AtomicU64};

use crate::{CloneElements, ElementPolicy, NodeArena, NodeId, Result};

/// Global counter for generating unique list IDs.
static LIST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique list ID.
fn generate_list_id() -> u64 {
    LIST_ID_COUNTER.fetch_add(1, atomic::Ordering::Relaxed)
}

/// A singly linked list whose elements enter through an [`ElementPolicy`].
///
/// Nodes are addressed through [`NodeId`] handles. Operations that only need to look at the
/// start of the list or at a known node are O(1): [`prepend()`](Self::prepend),
/// [`insert_after()`](Self::insert_after), [`begin()`](Self::begin), [`next()`](Self::next).
/// Operations that need a predecessor or the end of the list scan the chain and are O(n):
/// [`append()`](Self::append), [`insert()`](Self::insert), [`remove()`](Self::remove),
/// [`find()`](Self::find).
///
/// Values given to the list by reference are duplicated into list-owned nodes by the policy and
/// released through the policy when their node is removed or the list is dropped.
///
/// # Examples
///
/// ```
/// use policy_collections::LinkedList;
///
/// let mut list = LinkedList::new();
///
/// for value in 0..10 {
///     list.prepend(&value).unwrap();
/// }
///
/// assert_eq!(
///     list.iter().copied().collect::<Vec<_>>(),
///     [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]
/// );
///
/// let five = list.find(&5, |a, b| a.cmp(b)).unwrap();
/// list.remove(five);
///
/// assert_eq!(list.len(), 9);
/// assert!(list.find(&5, |a, b| a.cmp(b)).is_none());
/// ```
///
/// # Node handles
///
/// A [`NodeId`] must belong to the list it is used with and its node must still be in the list.
/// Violating this is detected: [`get()`](Self::get) and [`get_mut()`](Self::get_mut) return
/// `None`, every other operation panics.
///
/// # Memory
///
/// Nodes live in storage owned by the list. A removed node's slot is kept and reused by the next
/// insertion instead of being returned to the allocator, so removal never allocates or frees
/// memory. The storage reaches the size of the longest the list has ever been and is only
/// released when the list is dropped.
pub struct LinkedList<T, P = CloneElements>
where
    P: ElementPolicy<T>,
{
    /// Uniquely identifies this list so handles of other lists can be rejected.
    list_id: u64,

    arena: NodeArena<T>,

    head: Option<usize>,

    policy: P,
}

impl<T: Clone> LinkedList<T> {
    /// Creates an empty list that copies elements with [`Clone`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CloneElements)
    }
}

impl<T, P> LinkedList<T, P>
where
    P: ElementPolicy<T>,
{
    /// Creates an empty list that uses the given policy.
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self {
            list_id: generate_list_id(),
            arena: NodeArena::new(),
            head: None,
            policy,
        }
    }

    /// Returns the number of elements in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the policy attached to the list.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the first node, or `None` if the list is empty.
    #[must_use]
    pub fn begin(&self) -> Option<NodeId> {
        self.head.map(|index| self.node_id(index))
    }

    /// Returns the node after `node`, or `None` if `node` is the last one.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this list or has been removed.
    #[must_use]
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        let index = self.resolve(node);
        self.arena.next(index).map(|next| self.node_id(next))
    }

    /// Returns the element stored in `node`, or `None` if the node is not in this list.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.contains(node).then(|| self.arena.value(node.index()))
    }

    /// Returns the element stored in `node` for modification, or `None` if the node is not in
    /// this list.
    #[must_use]
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        if self.contains(node) {
            Some(self.arena.value_mut(node.index()))
        } else {
            None
        }
    }

    /// Returns `true` if `node` belongs to this list and is still in it.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.list_id() == self.list_id && self.arena.contains(node.index(), node.generation())
    }

    /// Iterates over the elements from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            current: self.head,
            remaining: self.len(),
        }
    }

    /// Inserts a policy-made copy of `value` as the new first element.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for the node cannot be allocated. The list is not modified in
    /// that case.
    pub fn prepend(&mut self, value: &T) -> Result<NodeId> {
        self.arena.reserve_one()?;

        let copy = self.policy.duplicate(value);
        let (index, generation) = self.arena.insert(copy, self.head);
        self.head = Some(index);

        Ok(NodeId::new(self.list_id, index, generation))
    }

    /// Inserts a policy-made copy of `value` as the new last element.
    ///
    /// The end of the list is found by walking from `hint` if given, otherwise from the first
    /// node. Passing a node close to the end makes this cheaper. If the list is empty, the hint
    /// is ignored and the new node becomes the first one.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for the node cannot be allocated. The list is not modified in
    /// that case.
    ///
    /// # Panics
    ///
    /// Panics if `hint` does not belong to this list or has been removed.
    pub fn append(&mut self, hint: Option<NodeId>, value: &T) -> Result<NodeId> {
        let Some(head) = self.head else {
            return self.insert(None, value);
        };

        let mut last = hint.map_or(head, |node| self.resolve(node));

        while let Some(next) = self.arena.next(last) {
            last = next;
        }

        self.link_after(last, value)
    }

    /// Inserts a policy-made copy of `value` immediately before `before`, or as the new first
    /// element if `before` is `None`.
    ///
    /// Finding the predecessor of `before` takes a scan from the start of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for the node cannot be allocated. The list is not modified in
    /// that case.
    ///
    /// # Panics
    ///
    /// Panics if `before` does not belong to this list or has been removed.
    pub fn insert(&mut self, before: Option<NodeId>, value: &T) -> Result<NodeId> {
        let Some(before) = before else {
            return self.prepend(value);
        };

        let before_index = self.resolve(before);

        match self.predecessor(before_index) {
            None => self.prepend(value),
            Some(predecessor) => self.link_after(predecessor, value),
        }
    }

    /// Inserts a policy-made copy of `value` immediately after `after`.
    ///
    /// # Errors
    ///
    /// Returns an error if memory for the node cannot be allocated. The list is not modified in
    /// that case.
    ///
    /// # Panics
    ///
    /// Panics if `after` does not belong to this list or has been removed.
    pub fn insert_after(&mut self, after: NodeId, value: &T) -> Result<NodeId> {
        let after_index = self.resolve(after);
        self.link_after(after_index, value)
    }

    /// Removes `node` from the list, releasing its element through the policy.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this list or has been removed.
    pub fn remove(&mut self, node: NodeId) {
        let end = self.next(node);
        self.remove_range(node, end);
    }

    /// Removes the nodes from `begin` up to but not including `end`, releasing their elements
    /// through the policy.
    ///
    /// If `end` is `None` or does not come after `begin`, everything from `begin` to the end of
    /// the list is removed.
    ///
    /// # Panics
    ///
    /// Panics if `begin` or `end` does not belong to this list or has been removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_collections::LinkedList;
    ///
    /// let mut list = LinkedList::new();
    /// let first = list.append(None, &1).unwrap();
    /// let second = list.append(Some(first), &2).unwrap();
    /// let third = list.append(Some(second), &3).unwrap();
    /// list.append(Some(third), &4).unwrap();
    ///
    /// // Removes 2 and 3.
    /// list.remove_range(second, list.next(third));
    ///
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 4]);
    /// ```
    pub fn remove_range(&mut self, begin: NodeId, end: Option<NodeId>) {
        let begin_index = self.resolve(begin);
        let end_index = end.map(|node| self.resolve(node));

        let predecessor = self.predecessor(begin_index);

        // Find the first node that stays and unlink the range before releasing any element.
        let mut first_kept = Some(begin_index);

        while let Some(index) = first_kept {
            if Some(index) == end_index {
                break;
            }

            first_kept = self.arena.next(index);
        }

        match predecessor {
            None => self.head = first_kept,
            Some(predecessor) => self.arena.set_next(predecessor, first_kept),
        }

        // The removed nodes still link to each other, ending at `first_kept`.
        let mut current = Some(begin_index);

        while current != first_kept {
            let Some(index) = current else {
                break;
            };

            let (value, next) = self.arena.remove(index);
            current = next;
            self.policy.dispose(value);
        }
    }

    /// Returns the first node whose element compares equal to `value`, scanning from the start
    /// of the list.
    ///
    /// `cmp` is called with the element of a node and `value`; a node matches if it returns
    /// [`Ordering::Equal`].
    #[must_use]
    pub fn find<F>(&self, value: &T, mut cmp: F) -> Option<NodeId>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut current = self.head;

        while let Some(index) = current {
            if cmp(self.arena.value(index), value) == Ordering::Equal {
                return Some(self.node_id(index));
            }

            current = self.arena.next(index);
        }

        None
    }

    /// Reverses the order of the nodes in place.
    ///
    /// Node IDs remain valid; only the links between nodes change.
    pub fn reverse(&mut self) {
        let mut current = self.head;
        let mut reversed = None;

        while let Some(index) = current {
            current = self.arena.next(index);
            self.arena.set_next(index, reversed);
            reversed = Some(index);
        }

        self.head = reversed;
    }

    /// Compares this list with `other`.
    ///
    /// A longer list is always greater than a shorter one. Lists of equal length are compared
    /// element by element from the start using `cmp`; the first non-equal result decides.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    ///
    /// use policy_collections::LinkedList;
    ///
    /// let mut short = LinkedList::new();
    /// short.prepend(&100).unwrap();
    ///
    /// let mut long = LinkedList::new();
    /// long.prepend(&1).unwrap();
    /// long.prepend(&2).unwrap();
    ///
    /// assert_eq!(short.compare(&long, |a, b| a.cmp(b)), Ordering::Less);
    /// ```
    #[must_use]
    pub fn compare<Q, F>(&self, other: &LinkedList<T, Q>, mut cmp: F) -> Ordering
    where
        Q: ElementPolicy<T>,
        F: FnMut(&T, &T) -> Ordering,
    {
        self.len().cmp(&other.len()).then_with(|| {
            self.iter()
                .zip(other.iter())
                .map(|(a, b)| cmp(a, b))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Stores a copy of `value` in a new node linked after the node at `index`.
    fn link_after(&mut self, index: usize, value: &T) -> Result<NodeId> {
        self.arena.reserve_one()?;

        let copy = self.policy.duplicate(value);
        let (new_index, generation) = self.arena.insert(copy, self.arena.next(index));
        self.arena.set_next(index, Some(new_index));

        Ok(NodeId::new(self.list_id, new_index, generation))
    }

    /// Returns the index of the node linking to `index`, or `None` if `index` is the head.
    fn predecessor(&self, index: usize) -> Option<usize> {
        let mut previous = None;
        let mut current = self.head;

        while let Some(candidate) = current {
            if candidate == index {
                return previous;
            }

            previous = Some(candidate);
            current = self.arena.next(candidate);
        }

        // Every live node is reachable from the head.
        unreachable!("node index {index} is live but not linked into the list");
    }

    fn resolve(&self, node: NodeId) -> usize {
        assert!(
            node.list_id() == self.list_id,
            "node {node:?} belongs to a different list"
        );
        assert!(
            self.arena.contains(node.index(), node.generation()),
            "node {node:?} has been removed from the list"
        );

        node.index()
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId::new(self.list_id, index, self.arena.generation(index))
    }
}

impl<T, P> Drop for LinkedList<T, P>
where
    P: ElementPolicy<T>,
{
    fn drop(&mut self) {
        let mut current = self.head.take();

        while let Some(index) = current {
            let (value, next) = self.arena.remove(index);
            current = next;
            self.policy.dispose(value);
        }
    }
}

impl<T: Clone> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> fmt::Debug for LinkedList<T, P>
where
    T: fmt::Debug,
    P: ElementPolicy<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, P> IntoIterator for &'a LinkedList<T, P>
where
    P: ElementPolicy<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`LinkedList`], from head to tail.
///
/// Returned by [`LinkedList::iter()`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    arena: &'a NodeArena<T>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;

        self.current = self.arena.next(index);
        // Cannot underflow because every node we visit was counted.
        self.remaining = self.remaining.wrapping_sub(1);

        Some(self.arena.value(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
