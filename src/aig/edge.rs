//! An [`AigEdge`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! Edges are plain values: a node id plus a polarity bit. They do not keep the node alive,
//! the [`Aig`] manager owns every node and counts references itself.
//!
//! [`AigNode`]: crate::AigNode
//! [`Aig`]: crate::Aig

use std::ops::Not;

use super::NodeId;

/// Unambiguous fanin selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaninId {
    Fanin0,
    Fanin1,
}

impl From<bool> for FaninId {
    fn from(value: bool) -> Self {
        if value {
            FaninId::Fanin1
        } else {
            FaninId::Fanin0
        }
    }
}

impl From<usize> for FaninId {
    fn from(value: usize) -> Self {
        if value == 0 {
            FaninId::Fanin0
        } else if value == 1 {
            FaninId::Fanin1
        } else {
            panic!("could not create FaninId from value={}", value)
        }
    }
}

impl FaninId {
    pub(crate) fn index(self) -> usize {
        match self {
            FaninId::Fanin0 => 0,
            FaninId::Fanin1 => 1,
        }
    }
}

/// A directed edge representing a fanin (or any other signed reference) to an AIG node.
///
/// The edge can carry an inverter according to the value of `complement`.
/// The derived order compares node ids first, then polarity: this is the total order
/// used to canonicalize the fanins of commutative gates.
///
/// ```rust
/// use aigman::{Aig, AigEdge};
/// let mut aig = Aig::new();
/// let a = aig.create_ci();
/// assert_eq!(a, !!a);
/// assert!(a.is_complement_of(&!a));
/// assert_eq!(AigEdge::FALSE, !AigEdge::TRUE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AigEdge {
    pub(super) node: NodeId,
    /// Set to true if signal should be inverted.
    pub(super) complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl From<&AigEdge> for (NodeId, bool) {
    fn from(edge: &AigEdge) -> Self {
        (edge.node, edge.complement)
    }
}

impl AigEdge {
    /// The constant node carries the value `true`, id 0.
    pub const TRUE: AigEdge = AigEdge {
        node: 0,
        complement: false,
    };

    pub const FALSE: AigEdge = AigEdge {
        node: 0,
        complement: true,
    };

    pub fn new(node: NodeId, complement: bool) -> Self {
        AigEdge { node, complement }
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    /// Complements the edge if `cond` holds.
    pub fn not_if(self, cond: bool) -> Self {
        if cond { !self } else { self }
    }

    /// The same edge without its inverter.
    pub fn regular(self) -> Self {
        AigEdge {
            node: self.node,
            complement: false,
        }
    }

    pub fn is_const(&self) -> bool {
        self.node == 0
    }

    pub fn is_cst_true(&self) -> bool {
        self.node == 0 && !self.complement
    }

    pub fn is_cst_false(&self) -> bool {
        self.node == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.node == other.node && self.complement ^ other.complement
    }
}
