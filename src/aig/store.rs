//! The node store: an arena of nodes addressed by dense ids.

use super::{AigNode, NodeId, NodeKind};

/// Owns every node of an [`Aig`]. Other structures only hold ids.
///
/// [`Aig`]: super::Aig
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeStore {
    slots: Vec<Option<AigNode>>,
    /// Ids of deleted nodes, reused last-in first-out.
    free: Vec<NodeId>,
}

impl NodeStore {
    /// Hands out a fresh node of the given kind, reusing a freed id if there is one.
    pub(crate) fn allocate(&mut self, kind: NodeKind) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id].is_none());
                self.slots[id] = Some(AigNode::new(id, kind));
                id
            }
            None => {
                let id = self.slots.len();
                self.slots.push(Some(AigNode::new(id, kind)));
                id
            }
        }
    }

    /// Frees the slot of a node. The node must be disconnected already.
    pub(crate) fn recycle(&mut self, id: NodeId) -> AigNode {
        let node = self.slots[id]
            .take()
            .unwrap_or_else(|| panic!("recycling node {} which does not exist", id));
        assert_eq!(node.refs, 0, "recycling node {} which is still referenced", id);
        self.free.push(id);
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&AigNode> {
        self.slots.get(id)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut AigNode> {
        self.slots.get_mut(id)?.as_mut()
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// One past the largest id ever handed out.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Live nodes in increasing id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &AigNode> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}
