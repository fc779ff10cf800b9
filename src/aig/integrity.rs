use std::collections::HashSet;

use crate::{Aig, AigError, AigNode, FaninId, FanoutEdge, NodeId, NodeKind, Result};

use super::strash::StrashKey;

fn invalid(message: String) -> AigError {
    AigError::InvalidState(message)
}

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment (outside of a replacement).
    ///
    /// Checked:
    /// - the constant has id 0, and is the only one
    /// - every fanin refers to a live node, other than the node itself, with the arity of its kind
    /// - no node reads a buffer once replacements are done
    /// - reference counts match the fanin slots and pins pointing at each node
    /// - every hashed gate is in the structural hash table exactly once, and nothing else is
    /// - fanout lists (if tracked) hold exactly the fanin slots pointing at each node
    /// - representatives have smaller ids, are indexed by class, and choice lists only link live nodes
    /// - there is no combinational cycle
    pub fn check_integrity(&self) -> Result<()> {
        match self.get_node(0) {
            Some(node) if node.is_const() => (),
            _ => return Err(invalid("node 0 should be the constant".to_string())),
        }

        let mut refs = vec![0u32; self.id_bound()];
        for node in self.nodes() {
            self.check_node_integrity(node)?;
            for fanin in node.get_fanins() {
                refs[fanin.get_node_id()] += 1;
            }
        }
        for node in self.nodes() {
            let expected = refs[node.get_id()] + node.pins;
            if node.refs != expected {
                return Err(invalid(format!(
                    "node {} has {} references, expected {}",
                    node.get_id(),
                    node.refs,
                    expected
                )));
            }
        }

        self.check_strash_integrity()?;
        self.check_fanout_integrity()?;
        self.check_repr_integrity()?;

        for (&id, kind) in self
            .cis
            .iter()
            .map(|id| (id, NodeKind::Ci))
            .chain(self.cos.iter().map(|id| (id, NodeKind::Co)))
        {
            if self.get_node(id).map(|n| n.kind) != Some(kind) {
                return Err(invalid(format!("terminal {} should be a {:?}", id, kind)));
            }
        }

        // Checks for acyclicity
        self.topological_sort()?;

        Ok(())
    }

    /// Check the integrity for an individual node, that is:
    /// - check that only the constant has id 0
    /// - check that fanins match the kind, and refer to known nodes for this AIG (not buffers)
    /// - check that the phase is consistent with the fanins
    fn check_node_integrity(&self, node: &AigNode) -> Result<()> {
        let id = node.get_id();
        if node.is_const() != (id == 0) {
            return Err(invalid(format!("node {} is misplaced constant", id)));
        }
        let arity_ok = match node.kind {
            NodeKind::Const1 | NodeKind::Ci => node.fanin0.is_none() && node.fanin1.is_none(),
            NodeKind::Co | NodeKind::Buf => node.fanin0.is_some() && node.fanin1.is_none(),
            NodeKind::And | NodeKind::Xor => node.fanin0.is_some() && node.fanin1.is_some(),
        };
        if !arity_ok {
            return Err(invalid(format!(
                "node {} of kind {:?} has fanins {:?} and {:?}",
                id, node.kind, node.fanin0, node.fanin1
            )));
        }
        for fanin in node.get_fanins() {
            let fanin_id = fanin.get_node_id();
            if fanin_id == id {
                return Err(invalid(format!("node {} is its own fanin", id)));
            }
            match self.get_node(fanin_id) {
                None => {
                    return Err(invalid(format!(
                        "edge of node {} pointing at node {} which is not in the AIG anymore",
                        id, fanin_id
                    )));
                }
                Some(fanin_node) if fanin_node.is_co() => {
                    return Err(invalid(format!("node {} reads output {}", id, fanin_id)));
                }
                // Buffers only have fanouts while a replacement is in progress
                Some(fanin_node) if fanin_node.is_buf() && self.buffers.is_empty() => {
                    return Err(invalid(format!("node {} reads buffer {}", id, fanin_id)));
                }
                _ => (),
            }
        }
        if node.is_xor()
            && node
                .get_fanins()
                .iter()
                .any(|fanin| fanin.get_complement())
        {
            return Err(invalid(format!("xor {} has a complemented fanin", id)));
        }
        if node.phase != self.phase_new(id) {
            return Err(invalid(format!("node {} has a stale phase", id)));
        }
        Ok(())
    }

    fn check_strash_integrity(&self) -> Result<()> {
        let mut hashed = 0;
        for node in self.nodes().filter(|n| n.is_hashed()) {
            hashed += 1;
            let key = StrashKey::of_node(node)
                .ok_or_else(|| invalid(format!("node {} cannot be hashed", node.get_id())))?;
            if Some(key.fanins()) != node.fanin0.zip(node.fanin1) {
                return Err(invalid(format!(
                    "fanins of node {} are not in canonical order",
                    node.get_id()
                )));
            }
            if self.strash.lookup(&key) != Some(node.get_id()) {
                return Err(invalid(format!(
                    "node {} is not in the structural hash table",
                    node.get_id()
                )));
            }
        }
        if hashed != self.strash.len() {
            return Err(invalid(format!(
                "structural hash table holds {} entries for {} gates",
                self.strash.len(),
                hashed
            )));
        }
        for (key, &id) in self.strash.iter() {
            let node = self
                .get_node(id)
                .ok_or_else(|| invalid(format!("hashed node {} does not exist", id)))?;
            if StrashKey::of_node(node).as_ref() != Some(key) {
                return Err(invalid(format!("node {} is hashed under a stale key", id)));
            }
        }
        Ok(())
    }

    fn check_fanout_integrity(&self) -> Result<()> {
        let Some(fanouts) = self.fanouts.as_ref() else {
            return Ok(());
        };
        let mut expected: Vec<HashSet<FanoutEdge>> = vec![HashSet::new(); self.id_bound()];
        for node in self.nodes() {
            for (slot, fanin) in [(FaninId::Fanin0, node.fanin0), (FaninId::Fanin1, node.fanin1)] {
                if let Some(fanin) = fanin {
                    expected[fanin.get_node_id()].insert(FanoutEdge::new(node.get_id(), slot));
                }
            }
        }
        for node in self.nodes() {
            let id = node.get_id();
            let actual = fanouts.fanouts(id);
            let unique: HashSet<FanoutEdge> = actual.iter().copied().collect();
            if actual.len() != unique.len() || unique != expected[id] {
                return Err(invalid(format!(
                    "fanouts of node {} are {:?}, expected {:?}",
                    id, actual, expected[id]
                )));
            }
        }
        Ok(())
    }

    fn check_repr_integrity(&self) -> Result<()> {
        for (id, repr) in self.reprs.iter().enumerate() {
            let Some(repr) = *repr else { continue };
            if repr >= id || !self.contains(id) || !self.contains(repr) {
                return Err(invalid(format!(
                    "node {} has invalid representative {}",
                    id, repr
                )));
            }
            if !self.repr_members.get(&repr).is_some_and(|m| m.contains(&id)) {
                return Err(invalid(format!(
                    "node {} is missing from the members of {}",
                    id, repr
                )));
            }
        }
        let members: usize = self.repr_members.values().map(Vec::len).sum();
        if members != self.count_reprs() {
            return Err(invalid(format!(
                "{} class members recorded for {} representatives",
                members,
                self.count_reprs()
            )));
        }
        for (id, next) in self.equivs.iter().enumerate() {
            let Some(next) = *next else { continue };
            if !self.contains(id) || !self.contains(next) {
                return Err(invalid(format!(
                    "choice link from {} to {} refers to a deleted node",
                    id, next
                )));
            }
        }
        Ok(())
    }

    /// Ids of the nodes which are neither reachable from an output nor pinned.
    pub fn dangling_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| (n.is_node() || n.is_buf()) && n.refs == 0)
            .map(|n| n.get_id())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, AigEdge, AigParams};

    #[test]
    fn valid_after_edits() {
        let mut aig = Aig::with_params(AigParams::default().catch_xor(false));
        let cis: Vec<AigEdge> = (0..5).map(|_| aig.create_ci()).collect();
        let mut acc = cis[0];
        for &ci in &cis[1..] {
            acc = aig.xor(acc, ci);
        }
        let o = aig.create_co(acc);
        let m = aig.miter(&[(cis[0], cis[1]), (cis[2], !cis[3])]);
        aig.create_co(!m);
        aig.check_integrity().unwrap();

        aig.set_co_driver(o, cis[4]).unwrap();
        aig.check_integrity().unwrap();
        assert!(aig.dangling_nodes().is_empty());
    }

    #[test]
    fn stale_reference_count() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.node_mut(n.get_node_id()).refs += 1;
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn dangling() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, !b);
        assert_eq!(aig.dangling_nodes(), vec![m.get_node_id()]);
        aig.cleanup();
        assert!(aig.dangling_nodes().is_empty());
        aig.check_integrity().unwrap();
    }
}
