use std::mem;

use tracing::{debug, trace};

use crate::{Error, Result};

/// Storage for the nodes of one linked list.
///
/// Nodes live in a `Vec` of entries and link to each other by entry index. Removed entries are
/// kept as vacant slots that form an intrusive freelist, so indexes stay stable for as long as
/// the node exists. Each entry carries a generation that is bumped when the entry is vacated,
/// which lets callers detect indexes that refer to a node that no longer exists.
///
/// The arena knows nothing about list order except the `next` link stored in each node.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    entries: Vec<Entry<T>>,

    /// Head of the freelist of vacant entries, if any.
    first_free_index: Option<usize>,

    /// Number of occupied entries.
    count: usize,
}

#[derive(Debug)]
enum Entry<T> {
    /// The entry holds a live node.
    Occupied {
        value: T,
        next: Option<usize>,
        generation: u32,
    },

    /// The entry is available for reuse, forming part of the freelist.
    Vacant {
        next_free_index: Option<usize>,

        /// The generation the next node stored here will receive.
        generation: u32,
    },
}

impl<T> NodeArena<T> {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            first_free_index: None,
            count: 0,
        }
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// Ensures that the next [`insert()`](Self::insert) will not need to allocate.
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        if self.first_free_index.is_some() || self.entries.len() < self.entries.capacity() {
            return Ok(());
        }

        let old_capacity = self.entries.capacity();

        self.entries.try_reserve(1).map_err(|_reserve_error| {
            debug!(old_capacity, "node arena allocation failed");

            Error::OutOfMemory {
                bytes: size_of::<Entry<T>>(),
            }
        })?;

        trace!(
            old_capacity,
            new_capacity = self.entries.capacity(),
            "grew node arena"
        );

        Ok(())
    }

    /// Stores a new node and returns its index and generation.
    ///
    /// Call [`reserve_one()`](Self::reserve_one) first to handle allocation failure gracefully.
    pub(crate) fn insert(&mut self, value: T, next: Option<usize>) -> (usize, u32) {
        // Cannot overflow because that would imply more nodes than fit in virtual memory.
        self.count = self.count.wrapping_add(1);

        if let Some(index) = self.first_free_index {
            let entry = self
                .entries
                .get_mut(index)
                .expect("freelist only contains indexes of existing entries");

            let Entry::Vacant {
                next_free_index,
                generation,
            } = *entry
            else {
                panic!("freelist entry {index} is occupied");
            };

            *entry = Entry::Occupied {
                value,
                next,
                generation,
            };
            self.first_free_index = next_free_index;

            return (index, generation);
        }

        let index = self.entries.len();
        self.entries.push(Entry::Occupied {
            value,
            next,
            generation: 0,
        });

        (index, 0)
    }

    /// Removes the node at `index`, returning its value and its `next` link.
    ///
    /// # Panics
    ///
    /// Panics if there is no live node at `index`.
    pub(crate) fn remove(&mut self, index: usize) -> (T, Option<usize>) {
        let entry = self
            .entries
            .get_mut(index)
            .unwrap_or_else(|| panic!("node index {index} out of bounds"));

        let Entry::Occupied { generation, .. } = *entry else {
            panic!("node index {index} is vacant");
        };

        let vacant = Entry::Vacant {
            next_free_index: self.first_free_index,
            generation: generation.wrapping_add(1),
        };

        let Entry::Occupied { value, next, .. } = mem::replace(entry, vacant) else {
            unreachable!("entry was verified to be occupied above");
        };

        self.first_free_index = Some(index);

        // Cannot underflow because we just removed an occupied entry.
        self.count = self.count.wrapping_sub(1);

        (value, next)
    }

    /// Returns `true` if `index` holds a live node of the given generation.
    #[must_use]
    pub(crate) fn contains(&self, index: usize, generation: u32) -> bool {
        matches!(
            self.entries.get(index),
            Some(Entry::Occupied { generation: g, .. }) if *g == generation
        )
    }

    #[must_use]
    pub(crate) fn generation(&self, index: usize) -> u32 {
        match self.occupied(index) {
            Entry::Occupied { generation, .. } => *generation,
            Entry::Vacant { .. } => unreachable!("occupied() only returns occupied entries"),
        }
    }

    #[must_use]
    pub(crate) fn value(&self, index: usize) -> &T {
        match self.occupied(index) {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant { .. } => unreachable!("occupied() only returns occupied entries"),
        }
    }

    #[must_use]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut T {
        match self.occupied_mut(index) {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant { .. } => unreachable!("occupied_mut() only returns occupied entries"),
        }
    }

    #[must_use]
    pub(crate) fn next(&self, index: usize) -> Option<usize> {
        match self.occupied(index) {
            Entry::Occupied { next, .. } => *next,
            Entry::Vacant { .. } => unreachable!("occupied() only returns occupied entries"),
        }
    }

    pub(crate) fn set_next(&mut self, index: usize, new_next: Option<usize>) {
        match self.occupied_mut(index) {
            Entry::Occupied { next, .. } => *next = new_next,
            Entry::Vacant { .. } => unreachable!("occupied_mut() only returns occupied entries"),
        }
    }

    fn occupied(&self, index: usize) -> &Entry<T> {
        let entry = self
            .entries
            .get(index)
            .unwrap_or_else(|| panic!("node index {index} out of bounds"));

        assert!(
            matches!(entry, Entry::Occupied { .. }),
            "node index {index} is vacant"
        );

        entry
    }

    fn occupied_mut(&mut self, index: usize) -> &mut Entry<T> {
        let entry = self
            .entries
            .get_mut(index)
            .unwrap_or_else(|| panic!("node index {index} out of bounds"));

        assert!(
            matches!(entry, Entry::Occupied { .. }),
            "node index {index} is vacant"
        );

        entry
    }
}
