use super::{AigEdge, FaninId};

/// A node id.
///
/// The constant node has id 0 by convention. Ids index the node store directly,
/// and the id of a deleted node may be handed out again to a later node.
pub type NodeId = usize;

/// The kind of an AIG node.
///
/// The kind of an internal node may change in place (see [`Aig::replace`]), the id never does.
///
/// [`Aig::replace`]: super::Aig::replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The constant high/true signal.
    Const1,
    /// A combinational input.
    Ci,
    /// A combinational output, with a single fanin (its driver).
    Co,
    /// A transient single-fanin pass-through, left behind by a replacement.
    Buf,
    /// A two-input AND gate.
    And,
    /// A two-input XOR gate.
    Xor,
}

/// An AIG node, as stored in the manager.
///
/// Fanins are signed references to other nodes. The reference count of a node is the number of
/// fanin slots pointing at it plus the number of external uses registered with [`Aig::pin`].
///
/// [`Aig::pin`]: super::Aig::pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AigNode {
    pub(super) id: NodeId,
    pub(super) kind: NodeKind,
    pub(super) fanin0: Option<AigEdge>,
    pub(super) fanin1: Option<AigEdge>,
    /// Longest path from a combinational input.
    pub(super) level: u32,
    /// Value of the node under the all-zero input pattern.
    pub(super) phase: bool,
    pub(super) refs: u32,
    pub(super) pins: u32,
}

impl AigNode {
    pub(super) fn new(id: NodeId, kind: NodeKind) -> Self {
        AigNode {
            id,
            kind,
            fanin0: None,
            fanin1: None,
            level: 0,
            phase: kind == NodeKind::Const1,
            refs: 0,
            pins: 0,
        }
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }

    pub fn get_kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_const(&self) -> bool {
        self.kind == NodeKind::Const1
    }

    pub fn is_ci(&self) -> bool {
        self.kind == NodeKind::Ci
    }

    pub fn is_co(&self) -> bool {
        self.kind == NodeKind::Co
    }

    pub fn is_buf(&self) -> bool {
        self.kind == NodeKind::Buf
    }

    pub fn is_and(&self) -> bool {
        self.kind == NodeKind::And
    }

    pub fn is_xor(&self) -> bool {
        self.kind == NodeKind::Xor
    }

    /// Internal two-input gate (AND or XOR).
    pub fn is_node(&self) -> bool {
        matches!(self.kind, NodeKind::And | NodeKind::Xor)
    }

    /// Inputs and outputs are terminals: they are never deleted nor replaced.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Ci | NodeKind::Co)
    }

    /// Structurally hashed nodes. Only live two-input gates with both fanins set are in the table.
    pub(super) fn is_hashed(&self) -> bool {
        self.is_node() && self.fanin0.is_some() && self.fanin1.is_some()
    }

    pub fn get_fanin0(&self) -> Option<AigEdge> {
        self.fanin0
    }

    pub fn get_fanin1(&self) -> Option<AigEdge> {
        self.fanin1
    }

    pub fn get_fanins(&self) -> Vec<AigEdge> {
        self.fanin0.into_iter().chain(self.fanin1).collect()
    }

    pub(super) fn get_fanin(&self, fanin_id: FaninId) -> Option<AigEdge> {
        match fanin_id {
            FaninId::Fanin0 => self.fanin0,
            FaninId::Fanin1 => self.fanin1,
        }
    }

    /// Which fanin slot of this node points at `fanin`, if any.
    pub fn which_fanin(&self, fanin: NodeId) -> Option<FaninId> {
        if self.fanin0.map(|e| e.node) == Some(fanin) {
            Some(FaninId::Fanin0)
        } else if self.fanin1.map(|e| e.node) == Some(fanin) {
            Some(FaninId::Fanin1)
        } else {
            None
        }
    }

    pub fn get_level(&self) -> u32 {
        self.level
    }

    pub fn get_phase(&self) -> bool {
        self.phase
    }

    pub fn get_refs(&self) -> u32 {
        self.refs
    }

    /// Number of external uses (see [`Aig::pin`]).
    ///
    /// [`Aig::pin`]: super::Aig::pin
    pub fn get_pins(&self) -> u32 {
        self.pins
    }

    /// Number of fanin slots of other nodes pointing at this node.
    pub fn get_fanout_count(&self) -> u32 {
        self.refs - self.pins
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fresh_nodes() {
        let c = AigNode::new(0, NodeKind::Const1);
        assert!(c.is_const());
        assert!(c.get_phase());
        let i = AigNode::new(1, NodeKind::Ci);
        assert!(i.is_terminal());
        assert!(!i.get_phase());
        assert!(i.get_fanins().is_empty());
    }

    #[test]
    fn which_fanin() {
        let mut n = AigNode::new(3, NodeKind::And);
        n.fanin0 = Some(AigEdge::new(1, false));
        n.fanin1 = Some(AigEdge::new(2, true));
        assert!(n.is_hashed());
        assert_eq!(n.which_fanin(1), Some(FaninId::Fanin0));
        assert_eq!(n.which_fanin(2), Some(FaninId::Fanin1));
        assert_eq!(n.which_fanin(4), None);
        assert_eq!(n.get_fanin(FaninId::Fanin1), Some(AigEdge::new(2, true)));
    }
}
