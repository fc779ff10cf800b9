//! Structural hashing.
//!
//! Two-input gates are content-addressed by their canonical `(kind, fanin0, fanin1)` key, so that
//! building the same gate twice returns the node already in the AIG.

use std::collections::HashMap;

use super::{Aig, AigEdge, AigNode, NodeId, NodeKind};

/// Canonical key of a two-input gate: fanins are sorted by id, then polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct StrashKey {
    kind: NodeKind,
    fanin0: AigEdge,
    fanin1: AigEdge,
}

impl StrashKey {
    pub(crate) fn new(kind: NodeKind, a: AigEdge, b: AigEdge) -> Self {
        debug_assert!(matches!(kind, NodeKind::And | NodeKind::Xor));
        let (fanin0, fanin1) = if a <= b { (a, b) } else { (b, a) };
        StrashKey {
            kind,
            fanin0,
            fanin1,
        }
    }

    pub(crate) fn of_node(node: &AigNode) -> Option<Self> {
        if !node.is_hashed() {
            return None;
        }
        Some(StrashKey::new(node.kind, node.fanin0?, node.fanin1?))
    }

    pub(crate) fn fanins(&self) -> (AigEdge, AigEdge) {
        (self.fanin0, self.fanin1)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StrashTable {
    table: HashMap<StrashKey, NodeId>,
}

impl StrashTable {
    pub(crate) fn lookup(&self, key: &StrashKey) -> Option<NodeId> {
        self.table.get(key).copied()
    }

    /// Returns the node previously stored under this key, if any.
    pub(crate) fn insert(&mut self, key: StrashKey, id: NodeId) -> Option<NodeId> {
        self.table.insert(key, id)
    }

    /// Removes the entry only if it belongs to `id`.
    pub(crate) fn remove(&mut self, key: &StrashKey, id: NodeId) -> bool {
        if self.table.get(key) == Some(&id) {
            self.table.remove(key);
            true
        } else {
            false
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&StrashKey, &NodeId)> {
        self.table.iter()
    }
}

impl Aig {
    /// Returns `p0 & p1`, reusing an existing gate when possible.
    ///
    /// Trivial cases are simplified before the table is consulted:
    /// `x & x = x`, `x & !x = 0`, `x & 1 = x`, `x & 0 = 0`.
    ///
    /// ```rust
    /// use aigman::{Aig, AigEdge};
    /// let mut aig = Aig::new();
    /// let a = aig.create_ci();
    /// let b = aig.create_ci();
    /// let n1 = aig.and(a, b);
    /// let n2 = aig.and(b, a);
    /// assert_eq!(n1, n2);
    /// assert_eq!(aig.and(a, !a), AigEdge::FALSE);
    /// assert_eq!(aig.and(a, AigEdge::TRUE), a);
    /// ```
    ///
    /// Edges pointing at buffers (see [`Aig::replace`]) are followed to the signal they stand
    /// for, so that no gate ever reads a buffer.
    ///
    /// # Panics
    ///
    /// If one of the edges points at a node which does not exist.
    pub fn and(&mut self, p0: AigEdge, p1: AigEdge) -> AigEdge {
        let (p0, p1) = (self.follow_buffers(p0), self.follow_buffers(p1));
        if p0 == p1 {
            return p0;
        }
        if p0.is_complement_of(&p1) {
            return AigEdge::FALSE;
        }
        if p0.is_const() {
            return if p0.is_cst_true() { p1 } else { AigEdge::FALSE };
        }
        if p1.is_const() {
            return if p1.is_cst_true() { p0 } else { AigEdge::FALSE };
        }
        self.lookup_or_create(NodeKind::And, p0, p1)
    }

    /// Returns `p0 ^ p1`.
    ///
    /// When XOR gates are enabled (see [`AigParams::catch_xor`]), both fanins are made regular
    /// and the complement is moved to the result, so that a single gate serves all four
    /// polarity combinations. Otherwise the XOR is decomposed into AND gates.
    ///
    /// [`AigParams::catch_xor`]: super::AigParams::catch_xor
    pub fn xor(&mut self, p0: AigEdge, p1: AigEdge) -> AigEdge {
        let (p0, p1) = (self.follow_buffers(p0), self.follow_buffers(p1));
        if p0 == p1 {
            return AigEdge::FALSE;
        }
        if p0.is_complement_of(&p1) {
            return AigEdge::TRUE;
        }
        if p0.is_const() {
            return p1.not_if(p0.is_cst_true());
        }
        if p1.is_const() {
            return p0.not_if(p1.is_cst_true());
        }
        if !self.params.catch_xor {
            let l = self.and(p0, !p1);
            let r = self.and(!p0, p1);
            return self.or(l, r);
        }
        let complement = p0.get_complement() ^ p1.get_complement();
        self.lookup_or_create(NodeKind::Xor, p0.regular(), p1.regular())
            .not_if(complement)
    }

    pub fn or(&mut self, p0: AigEdge, p1: AigEdge) -> AigEdge {
        !self.and(!p0, !p1)
    }

    /// Returns `if c { t } else { e }`.
    pub fn mux(&mut self, c: AigEdge, t: AigEdge, e: AigEdge) -> AigEdge {
        let l = self.and(c, t);
        let r = self.and(!c, e);
        self.or(l, r)
    }

    /// Returns a signal which is true iff one of the pairs differs.
    pub fn miter(&mut self, pairs: &[(AigEdge, AigEdge)]) -> AigEdge {
        let mut res = AigEdge::FALSE;
        for &(a, b) in pairs {
            let x = self.xor(a, b);
            res = self.or(res, x);
        }
        res
    }

    /// Builds a two-input gate of the given kind.
    ///
    /// # Panics
    ///
    /// If `kind` is not [`NodeKind::And`] nor [`NodeKind::Xor`].
    pub fn oper(&mut self, kind: NodeKind, p0: AigEdge, p1: AigEdge) -> AigEdge {
        match kind {
            NodeKind::And => self.and(p0, p1),
            NodeKind::Xor => self.xor(p0, p1),
            _ => panic!("cannot build a two-input gate of kind {:?}", kind),
        }
    }

    /// Looks up a gate in the structural hash table without creating it.
    /// No trivial-case simplification is applied.
    pub fn lookup(&self, kind: NodeKind, p0: AigEdge, p1: AigEdge) -> Option<NodeId> {
        if !matches!(kind, NodeKind::And | NodeKind::Xor) {
            return None;
        }
        self.strash.lookup(&StrashKey::new(kind, p0, p1))
    }

    /// Number of gates currently in the structural hash table.
    pub fn strash_size(&self) -> usize {
        self.strash.len()
    }

    fn lookup_or_create(&mut self, kind: NodeKind, p0: AigEdge, p1: AigEdge) -> AigEdge {
        let key = StrashKey::new(kind, p0, p1);
        if let Some(id) = self.strash.lookup(&key) {
            return AigEdge::new(id, false);
        }
        let (fanin0, fanin1) = key.fanins();
        let id = self.create_node(kind, Some(fanin0), Some(fanin1));
        AigEdge::new(id, false)
    }
}
