/// Names one node of one specific [`LinkedList`][crate::LinkedList].
///
/// Node IDs are returned by the list operations that insert elements and are accepted by the
/// operations that navigate, insert around or remove nodes. They are plain values and can be
/// copied freely; holding one does not keep the node alive.
///
/// An ID stops being valid once its node is removed. Lists recognize both stale IDs and IDs that
/// belong to a different list: element accessors return `None` for them and structural
/// operations panic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId {
    list_id: u64,
    index: usize,
    generation: u32,
}

impl NodeId {
    #[must_use]
    pub(crate) fn new(list_id: u64, index: usize, generation: u32) -> Self {
        Self {
            list_id,
            index,
            generation,
        }
    }

    #[must_use]
    pub(crate) fn list_id(self) -> u64 {
        self.list_id
    }

    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;
    use std::fmt::Debug;
    use std::hash::Hash;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(NodeId: Send, Sync, Copy, Debug, Eq, Hash);

    #[test]
    fn accessors_return_constructor_values() {
        let id = NodeId::new(9, 4, 2);

        assert_eq!(id.list_id(), 9);
        assert_eq!(id.index(), 4);
        assert_eq!(id.generation(), 2);
    }

    #[test]
    fn ids_differing_in_any_part_are_distinct() {
        let ids: HashSet<NodeId> = [
            NodeId::new(1, 0, 0),
            NodeId::new(2, 0, 0),
            NodeId::new(1, 1, 0),
            NodeId::new(1, 0, 1),
            NodeId::new(1, 0, 0),
        ]
        .into_iter()
        .collect();

        assert_eq!(ids.len(), 4);
    }
}
