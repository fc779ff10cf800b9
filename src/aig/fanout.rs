//! Fanout lists.
//!
//! Every fanin slot of every node is an edge record `(fanout id, slot)`. The records pointing at a
//! given node are threaded into a circular doubly-linked list rooted at that node, so adding and
//! removing an edge is O(1) and the fanouts of a node can be enumerated without scanning the AIG.

use super::{FaninId, NodeId};

/// A fanout edge: fanin slot `slot` of node `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FanoutEdge {
    pub node: NodeId,
    pub slot: FaninId,
}

impl FanoutEdge {
    pub fn new(node: NodeId, slot: FaninId) -> Self {
        FanoutEdge { node, slot }
    }
}

#[derive(Debug, Clone, Default)]
struct FanoutRecord {
    /// Head of the list of edges pointing at this node.
    first: Option<FanoutEdge>,
    /// Links of the edges leaving this node, one pair per fanin slot.
    prev: [Option<FanoutEdge>; 2],
    next: [Option<FanoutEdge>; 2],
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FanoutStore {
    records: Vec<FanoutRecord>,
}

impl FanoutStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        FanoutStore {
            records: vec![FanoutRecord::default(); capacity],
        }
    }

    fn ensure(&mut self, id: NodeId) {
        if id >= self.records.len() {
            let len = (2 * self.records.len()).max(id + 1);
            self.records.resize(len, FanoutRecord::default());
        }
    }

    fn prev(&self, edge: FanoutEdge) -> Option<FanoutEdge> {
        self.records[edge.node].prev[edge.slot.index()]
    }

    fn next(&self, edge: FanoutEdge) -> Option<FanoutEdge> {
        self.records[edge.node].next[edge.slot.index()]
    }

    fn set_prev(&mut self, edge: FanoutEdge, prev: Option<FanoutEdge>) {
        self.records[edge.node].prev[edge.slot.index()] = prev;
    }

    fn set_next(&mut self, edge: FanoutEdge, next: Option<FanoutEdge>) {
        self.records[edge.node].next[edge.slot.index()] = next;
    }

    /// Splices `edge` at the end of the fanout list of `fanin`.
    pub(crate) fn add(&mut self, fanin: NodeId, edge: FanoutEdge) {
        self.ensure(fanin.max(edge.node));
        match self.records[fanin].first {
            None => {
                self.records[fanin].first = Some(edge);
                self.set_prev(edge, Some(edge));
                self.set_next(edge, Some(edge));
            }
            Some(first) => {
                let last = self
                    .prev(first)
                    .expect("fanout list is circular, head must have a predecessor");
                debug_assert_eq!(self.next(last), Some(first));
                self.set_prev(edge, Some(last));
                self.set_next(edge, Some(first));
                self.set_next(last, Some(edge));
                self.set_prev(first, Some(edge));
            }
        }
    }

    /// Unlinks `edge` from the fanout list of `fanin`.
    pub(crate) fn remove(&mut self, fanin: NodeId, edge: FanoutEdge) {
        let (Some(prev), Some(next)) = (self.prev(edge), self.next(edge)) else {
            panic!(
                "edge {:?} is not linked in the fanout list of node {}",
                edge, fanin
            );
        };
        debug_assert_eq!(self.next(prev), Some(edge));
        debug_assert_eq!(self.prev(next), Some(edge));
        self.set_prev(edge, None);
        self.set_next(edge, None);
        if self.records[fanin].first == Some(edge) {
            if next == edge {
                self.records[fanin].first = None;
                return;
            }
            self.records[fanin].first = Some(next);
        }
        self.set_next(prev, Some(next));
        self.set_prev(next, Some(prev));
    }

    pub(crate) fn first(&self, id: NodeId) -> Option<FanoutEdge> {
        self.records.get(id)?.first
    }

    /// All the edges pointing at `id`, in insertion order.
    pub(crate) fn fanouts(&self, id: NodeId) -> Vec<FanoutEdge> {
        let mut fanouts = Vec::new();
        let Some(first) = self.first(id) else {
            return fanouts;
        };
        let mut edge = first;
        loop {
            fanouts.push(edge);
            match self.next(edge) {
                Some(next) if next != first => edge = next,
                _ => break,
            }
        }
        fanouts
    }
}
