//! Representatives and choices.
//!
//! A representative links a gate to a functionally equivalent node (up to complement) with a
//! smaller id. Links form a forest whose roots are the smallest members of each class.
//! Proposals usually come from an external prover and may be wrong in ways that would break the
//! network structurally: [`Aig::mark_valid_choices`] drops the unsafe ones and threads the
//! others into choice lists anchored at their representative.

use std::collections::HashSet;

use log::debug;

use super::{Aig, AigEdge, NodeId, NodeKind, NodeMap};

impl Aig {
    /// Records `repr` as the representative of `node`. Returns whether it was recorded.
    ///
    /// Only two-input gates can have a representative, and outputs or buffers cannot be one:
    /// such proposals are dropped.
    ///
    /// # Panics
    ///
    /// If `repr >= node`, or if either node does not exist.
    pub fn set_representative(&mut self, repr: NodeId, node: NodeId) -> bool {
        assert!(
            repr < node,
            "representative {} must have a smaller id than node {}",
            repr,
            node
        );
        let (repr_kind, kind) = (self.node(repr).kind, self.node(node).kind);
        if matches!(repr_kind, NodeKind::Co | NodeKind::Buf)
            || !matches!(kind, NodeKind::And | NodeKind::Xor)
        {
            debug!(
                "dropping representative {} ({:?}) of node {} ({:?})",
                repr, repr_kind, node, kind
            );
            return false;
        }
        self.set_repr_slot(node, Some(repr));
        true
    }

    /// Declares `a` and `b` equivalent: the larger id gets the smaller one as representative.
    /// Does nothing if `a == b`. Returns whether a representative was recorded.
    pub fn merge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (repr, node) = if a < b { (a, b) } else { (b, a) };
        self.set_representative(repr, node)
    }

    /// Writes the representative of `id`, keeping members and choice lists in sync.
    fn set_repr_slot(&mut self, id: NodeId, repr: Option<NodeId>) {
        let previous = self.find_repr(id);
        if previous == repr {
            return;
        }
        if let Some(previous) = previous {
            self.unlink_choice(id);
            if let Some(members) = self.repr_members.get_mut(&previous) {
                members.retain(|&m| m != id);
                if members.is_empty() {
                    self.repr_members.remove(&previous);
                }
            }
        }
        if self.reprs.len() <= id {
            self.reprs.resize(id + 1, None);
        }
        self.reprs[id] = repr;
        if let Some(repr) = repr {
            self.repr_members.entry(repr).or_default().push(id);
        }
    }

    /// Takes `id` out of the choice list of its representative.
    fn unlink_choice(&mut self, id: NodeId) {
        let Some(head) = self.find_repr(id) else {
            return;
        };
        let mut current = head;
        while let Some(next) = self.equiv(current) {
            if next == id {
                self.equivs[current] = self.equivs.get_mut(id).and_then(Option::take);
                return;
            }
            current = next;
        }
    }

    /// Direct representative of a node, if any.
    pub fn find_repr(&self, id: NodeId) -> Option<NodeId> {
        self.reprs.get(id).copied().flatten()
    }

    /// Root of the class of a node, following representatives as far as they go.
    /// `None` if the node has no representative.
    pub fn find_repr_transitive(&self, id: NodeId) -> Option<NodeId> {
        let mut repr = self.find_repr(id)?;
        while let Some(next) = self.find_repr(repr) {
            repr = next;
        }
        Some(repr)
    }

    pub fn clear_repr(&mut self, id: NodeId) {
        self.set_repr_slot(id, None);
    }

    /// Drops all representatives and choice lists.
    pub fn repr_stop(&mut self) {
        self.reprs.clear();
        self.repr_members.clear();
        self.equivs.clear();
    }

    /// Number of nodes with a representative.
    pub fn count_reprs(&self) -> usize {
        self.reprs.iter().filter(|r| r.is_some()).count()
    }

    /// Points every representative directly at the root of its class.
    ///
    /// Returns the number of remapped nodes that are still referenced: those still need to be
    /// replaced by their representative before the classes can become choices.
    pub fn remap_reprs(&mut self) -> usize {
        let mut referenced = 0;
        for id in 0..self.reprs.len() {
            if self.reprs[id].is_none() || !self.contains(id) {
                continue;
            }
            let root = self.find_repr_transitive(id);
            self.set_repr_slot(id, root);
            if self.node(id).refs > 0 {
                referenced += 1;
            }
        }
        referenced
    }

    /// The value of `id` in a duplicate described by `map`: the value of its representative if
    /// it has one, complemented when the two nodes have different phases.
    pub fn value_of(&self, id: NodeId, map: &NodeMap) -> Option<AigEdge> {
        match self.find_repr(id) {
            Some(repr) => {
                let flip = self.node(repr).phase ^ self.node(id).phase;
                map.get(repr).map(|edge| edge.not_if(flip))
            }
            None => map.get(id),
        }
    }

    /// Keeps the representatives that can safely become choices and builds the choice lists.
    ///
    /// A representative is dropped if it is not a gate, if it lies in the transitive fanin of
    /// its node (unifying them would create a cycle), or if the node is still referenced. Each
    /// surviving node is inserted in the list of its representative, see [`Aig::equiv`].
    /// Previous choice lists are discarded. Returns the number of nodes kept.
    pub fn mark_valid_choices(&mut self) -> usize {
        self.equivs.clear();
        self.equivs.resize(self.reprs.len(), None);
        let (mut kept, mut not_gate, mut in_tfi, mut referenced) = (0, 0, 0, 0);
        for id in 0..self.reprs.len() {
            let Some(repr) = self.reprs[id] else { continue };
            debug_assert!(repr < id);
            if !self.node(repr).is_node() {
                self.set_repr_slot(id, None);
                not_gate += 1;
                continue;
            }
            if self.in_tfi(id, repr) {
                self.set_repr_slot(id, None);
                in_tfi += 1;
                continue;
            }
            if self.node(id).refs > 0 {
                self.set_repr_slot(id, None);
                referenced += 1;
                continue;
            }
            self.equivs[id] = self.equivs[repr];
            self.equivs[repr] = Some(id);
            kept += 1;
        }
        debug!(
            "choices: kept {}, dropped {} (not a gate: {}, in fanin cone: {}, referenced: {})",
            kept,
            not_gate + in_tfi + referenced,
            not_gate,
            in_tfi,
            referenced
        );
        kept
    }

    /// Whether `target` can be reached from `id` through fanins and choice links.
    fn in_tfi(&self, id: NodeId, target: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            let node = self.node(id);
            if node.is_ci() || !visited.insert(id) {
                continue;
            }
            stack.extend(node.get_fanins().iter().map(|e| e.node));
            stack.extend(self.equiv(id));
        }
        false
    }

    /// Next node in the choice list going through `id`.
    pub fn equiv(&self, id: NodeId) -> Option<NodeId> {
        self.equivs.get(id).copied().flatten()
    }

    /// The representative followed by its choices.
    pub fn choice_class(&self, repr: NodeId) -> Vec<NodeId> {
        let mut class = vec![repr];
        let mut current = repr;
        while let Some(next) = self.equiv(current) {
            class.push(next);
            current = next;
        }
        class
    }

    /// A choice node is a referenced node with alternatives.
    pub fn is_choice(&self, id: NodeId) -> bool {
        self.equiv(id).is_some() && self.get_node(id).is_some_and(|n| n.refs > 0)
    }

    pub fn count_choices(&self) -> usize {
        (0..self.equivs.len()).filter(|&id| self.is_choice(id)).count()
    }

    /// Removes every representative or choice entry of and to a node about to be freed.
    pub(crate) fn forget_repr(&mut self, id: NodeId) {
        if self.reprs.is_empty() && self.equivs.is_empty() {
            return;
        }
        self.set_repr_slot(id, None);
        // Its whole choice list goes with its members
        for member in self.repr_members.remove(&id).unwrap_or_default() {
            self.reprs[member] = None;
        }
        let mut current = id;
        while let Some(next) = self.equivs.get_mut(current).and_then(Option::take) {
            current = next;
        }
    }
}
