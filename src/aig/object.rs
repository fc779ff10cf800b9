//! Connecting, disconnecting and deleting nodes.
//!
//! [`Aig::connect`] and [`Aig::disconnect`] are the only places where reference counts, fanout
//! lists and the structural hash table change. Everything else is built on top of them.

use log::trace;

use super::{
    Aig, AigEdge, AigError, FaninId, FanoutEdge, FanoutStore, NodeId, NodeKind, Result,
    strash::StrashKey,
};

impl Aig {
    /// Allocates a node and connects it to its fanins.
    pub(crate) fn create_node(
        &mut self,
        kind: NodeKind,
        fanin0: Option<AigEdge>,
        fanin1: Option<AigEdge>,
    ) -> NodeId {
        let id = self.store.allocate(kind);
        self.connect(id, fanin0, fanin1);
        id
    }

    /// Sets the fanins of a node which currently has none.
    ///
    /// Increments the reference count of each fanin and links the node into their fanout lists,
    /// then recomputes the level and phase of the node, and hashes it if it is a two-input gate.
    pub(crate) fn connect(&mut self, id: NodeId, fanin0: Option<AigEdge>, fanin1: Option<AigEdge>) {
        {
            let node = self.node(id);
            assert!(!node.is_ci() && !node.is_const(), "node {} cannot have fanins", id);
            debug_assert!(node.fanin0.is_none() && node.fanin1.is_none());
        }
        for (slot, fanin) in [(FaninId::Fanin0, fanin0), (FaninId::Fanin1, fanin1)] {
            let Some(fanin) = fanin else { continue };
            assert_ne!(fanin.node, id, "node {} cannot be its own fanin", id);
            self.node_mut(fanin.node).refs += 1;
            if let Some(fanouts) = self.fanouts.as_mut() {
                fanouts.add(fanin.node, FanoutEdge::new(id, slot));
            }
        }
        let node = self.node_mut(id);
        node.fanin0 = fanin0;
        node.fanin1 = fanin1;
        let level = self.level_new(id);
        let phase = self.phase_new(id);
        let node = self.node_mut(id);
        node.level = level;
        node.phase = phase;
        if let Some(key) = StrashKey::of_node(node) {
            let previous = self.strash.insert(key, id);
            debug_assert!(
                previous.is_none() || previous == Some(id),
                "node {} duplicates node {:?} in the structural hash table",
                id,
                previous
            );
        }
    }

    /// Removes all the fanins of a node: mirror of [`Aig::connect`].
    pub(crate) fn disconnect(&mut self, id: NodeId) {
        if let Some(key) = StrashKey::of_node(self.node(id)) {
            self.strash.remove(&key, id);
        }
        let (fanin0, fanin1) = {
            let node = self.node(id);
            (node.fanin0, node.fanin1)
        };
        for (slot, fanin) in [(FaninId::Fanin0, fanin0), (FaninId::Fanin1, fanin1)] {
            let Some(fanin) = fanin else { continue };
            if let Some(fanouts) = self.fanouts.as_mut() {
                fanouts.remove(fanin.node, FanoutEdge::new(id, slot));
            }
            let fanin_node = self.node_mut(fanin.node);
            assert!(fanin_node.refs > 0, "node {} has no reference left", fanin.node);
            fanin_node.refs -= 1;
        }
        let node = self.node_mut(id);
        node.fanin0 = None;
        node.fanin1 = None;
    }

    /// Deletes a node which nobody references anymore.
    ///
    /// # Panics
    ///
    /// If the node is still referenced, or is a terminal (input, output) or the constant.
    pub fn delete(&mut self, id: NodeId) {
        let node = self.node(id);
        assert!(
            !node.is_terminal() && !node.is_const(),
            "node {} is a terminal and cannot be deleted",
            id
        );
        assert_eq!(node.refs, 0, "node {} is still referenced", id);
        self.disconnect(id);
        self.recycle(id);
    }

    /// Gives the id of a disconnected node back to the store.
    fn recycle(&mut self, id: NodeId) {
        if self.node(id).is_buf() {
            self.buffers.retain(|&b| b != id);
        }
        self.forget_repr(id);
        trace!("deleting node {}", id);
        self.store.recycle(id);
    }

    /// Disconnects `id` (deleting it too if `free_top`) and deletes every fanin whose reference
    /// count drops to zero, recursively: the whole fanout-free cone of `id` goes away.
    ///
    /// Inputs and the constant are never deleted. Returns the number of deleted nodes.
    ///
    /// # Panics
    ///
    /// If `id` is a terminal, or is still referenced and `free_top` is set.
    pub fn delete_recursive(&mut self, id: NodeId, free_top: bool) -> usize {
        {
            let node = self.node(id);
            if node.is_ci() || node.is_const() {
                return 0;
            }
            assert!(!node.is_co(), "output {} cannot be deleted", id);
            assert!(
                !free_top || node.refs == 0,
                "node {} is still referenced",
                id
            );
        }
        let mut deleted = 0;
        let mut stack = vec![(id, free_top)];
        while let Some((id, free)) = stack.pop() {
            // Nodes are pushed when their last reference goes away, and nothing can revive them
            if !self.store.contains(id) || (free && self.node(id).refs > 0) {
                continue;
            }
            let fanins = self.node(id).get_fanins();
            self.disconnect(id);
            if free {
                self.recycle(id);
                deleted += 1;
            }
            // Fanin 0 is explored first
            for fanin in fanins.into_iter().rev() {
                let node = self.node(fanin.node);
                if !node.is_ci() && !node.is_const() && node.refs == 0 {
                    stack.push((fanin.node, true));
                }
            }
        }
        deleted
    }

    /// Registers an external use of a node: it counts as a reference, so the node is not
    /// collected, and replacing another node by this one goes through a buffer.
    pub fn pin(&mut self, id: NodeId) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or(AigError::NodeDoesNotExist(id))?;
        node.refs += 1;
        node.pins += 1;
        Ok(())
    }

    /// Drops an external use registered with [`Aig::pin`]. The node is not deleted, even if
    /// this was its last reference (use [`Aig::cleanup`] for that).
    pub fn unpin(&mut self, id: NodeId) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or(AigError::NodeDoesNotExist(id))?;
        if node.pins == 0 {
            return Err(AigError::InvalidState(format!(
                "node {} has no external use to drop",
                id
            )));
        }
        node.refs -= 1;
        node.pins -= 1;
        Ok(())
    }

    /// Makes `co` driven by `driver`. The previous driver is deleted with its fanout-free cone if
    /// nothing else uses it.
    pub fn set_co_driver(&mut self, co: NodeId, driver: AigEdge) -> Result<()> {
        let old = self.get_co_driver(co)?;
        if !self.contains(driver.node) {
            return Err(AigError::NodeDoesNotExist(driver.node));
        }
        let driver = self.real_edge(driver)?;
        self.disconnect(co);
        self.connect(co, Some(driver), None);
        let old_node = self.node(old.node);
        if !old_node.is_ci() && !old_node.is_const() && old_node.refs == 0 {
            self.delete_recursive(old.node, true);
        }
        Ok(())
    }

    /// Deletes all the gates nobody references (and their now-unreferenced fanins).
    /// Returns the number of deleted nodes.
    pub fn cleanup(&mut self) -> usize {
        let dangling: Vec<NodeId> = self
            .nodes()
            .filter(|n| (n.is_node() || n.is_buf()) && n.refs == 0)
            .map(|n| n.get_id())
            .collect();
        let mut deleted = 0;
        for id in dangling {
            // Might be gone already, as part of the cone of another dangling node
            if self.contains(id) && self.node(id).refs == 0 {
                deleted += self.delete_recursive(id, true);
            }
        }
        deleted
    }

    /// Starts tracking fanouts, building the lists from the current fanins.
    pub fn fanout_start(&mut self) {
        if self.fanouts.is_some() {
            return;
        }
        let mut fanouts = FanoutStore::with_capacity(self.id_bound());
        for node in self.store.iter() {
            let id = node.get_id();
            if let Some(fanin) = node.fanin0 {
                fanouts.add(fanin.node, FanoutEdge::new(id, FaninId::Fanin0));
            }
            if let Some(fanin) = node.fanin1 {
                fanouts.add(fanin.node, FanoutEdge::new(id, FaninId::Fanin1));
            }
        }
        self.fanouts = Some(fanouts);
    }

    /// Stops tracking fanouts.
    pub fn fanout_stop(&mut self) {
        self.fanouts = None;
    }

    pub fn has_fanouts(&self) -> bool {
        self.fanouts.is_some()
    }

    /// The fanin slots pointing at a node, if fanouts are tracked.
    pub fn get_fanouts(&self, id: NodeId) -> Option<Vec<FanoutEdge>> {
        Some(self.fanouts.as_ref()?.fanouts(id))
    }

    pub(crate) fn first_fanout(&self, id: NodeId) -> Option<FanoutEdge> {
        self.fanouts.as_ref()?.first(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::AigParams;

    #[test]
    fn ref_counts() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n1 = aig.and(a, b);
        let n2 = aig.and(b, a);
        assert_eq!(n1.get_node_id(), n2.get_node_id());
        assert_eq!(aig.get_node(a.get_node_id()).unwrap().get_refs(), 1);
        assert_eq!(aig.get_node(b.get_node_id()).unwrap().get_refs(), 1);

        let n3 = aig.and(n1, !a);
        aig.create_co(n3);
        aig.create_co(!n3);
        assert_eq!(aig.get_node(a.get_node_id()).unwrap().get_refs(), 2);
        assert_eq!(aig.get_node(n1.get_node_id()).unwrap().get_refs(), 1);
        assert_eq!(aig.get_node(n3.get_node_id()).unwrap().get_refs(), 2);
        let fanouts = aig.get_fanouts(a.get_node_id()).unwrap();
        assert_eq!(fanouts.len(), 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn delete_single() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.delete(n.get_node_id());
        assert!(!aig.contains(n.get_node_id()));
        assert_eq!(aig.strash_size(), 0);
        assert_eq!(aig.get_node(a.get_node_id()).unwrap().get_refs(), 0);
        assert!(aig.get_fanouts(b.get_node_id()).unwrap().is_empty());
        aig.check_integrity().unwrap();

        // The id is handed out again
        let m = aig.and(a, !b);
        assert_eq!(m.get_node_id(), n.get_node_id());
        aig.check_integrity().unwrap();
    }

    #[test]
    #[should_panic]
    fn delete_referenced() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.create_co(n);
        aig.delete(n.get_node_id());
    }

    #[test]
    #[should_panic]
    fn delete_input() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        aig.delete(a.get_node_id());
    }

    #[test]
    fn delete_cone() {
        //     n4
        //    /  \
        //   n3   \
        //  /  \   \
        // a    b   c     (n3 also used by n5, kept alive by an output)
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n3 = aig.and(a, b);
        let n4 = aig.and(n3, c);
        let n5 = aig.and(!n3, !c);
        aig.create_co(n5);

        // n3 is shared, only n4 goes away
        assert_eq!(aig.delete_recursive(n4.get_node_id(), true), 1);
        assert!(aig.contains(n3.get_node_id()));
        aig.check_integrity().unwrap();

        // Now a dangling cone: n7 = (a & c) & (b & c)
        let n6 = aig.and(a, c);
        let n8 = aig.and(b, c);
        let n7 = aig.and(n6, n8);
        assert_eq!(aig.delete_recursive(n7.get_node_id(), true), 3);
        for n in [n6, n7, n8] {
            assert!(!aig.contains(n.get_node_id()));
        }
        assert!(aig.contains(c.get_node_id()));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn delete_keeps_top() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, c);
        // The top node keeps its id slot, but loses its fanins
        assert_eq!(aig.delete_recursive(m.get_node_id(), false), 1);
        assert!(aig.contains(m.get_node_id()));
        assert!(aig.get_node(m.get_node_id()).unwrap().get_fanins().is_empty());
        assert!(!aig.contains(n.get_node_id()));
        assert_eq!(aig.strash_size(), 0);
    }

    #[test]
    fn no_dangling_edges() {
        let mut aig = Aig::new();
        let cis: Vec<AigEdge> = (0..4).map(|_| aig.create_ci()).collect();
        let x = aig.and(cis[0], cis[1]);
        let y = aig.and(x, cis[2]);
        let z = aig.xor(y, cis[3]);
        aig.delete_recursive(z.get_node_id(), true);
        for node in aig.nodes() {
            for fanin in node.get_fanins() {
                assert!(aig.contains(fanin.get_node_id()));
            }
        }
        assert_eq!(aig.num_nodes(), 0);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn pins() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.pin(n.get_node_id()).unwrap();
        assert_eq!(aig.cleanup(), 0);
        assert_eq!(aig.get_node(n.get_node_id()).unwrap().get_fanout_count(), 0);
        aig.check_integrity().unwrap();
        aig.unpin(n.get_node_id()).unwrap();
        assert!(aig.unpin(n.get_node_id()).is_err());
        assert!(aig.pin(99).is_err());
        assert_eq!(aig.cleanup(), 1);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn patch_output() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, c);
        let o = aig.create_co(m);
        aig.set_co_driver(o, !a).unwrap();
        assert_eq!(aig.get_co_driver(o).unwrap(), !a);
        assert_eq!(aig.num_nodes(), 0);
        assert!(aig.set_co_driver(a.get_node_id(), b).is_err());
        assert!(aig.set_co_driver(o, AigEdge::new(77, false)).is_err());
        aig.check_integrity().unwrap();
    }

    #[test]
    fn late_fanouts() {
        let mut aig = Aig::with_params(AigParams::default().fanouts(false));
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, !b);
        aig.create_co(m);
        assert!(aig.get_fanouts(a.get_node_id()).is_none());
        aig.check_integrity().unwrap();

        aig.fanout_start();
        assert_eq!(aig.get_fanouts(b.get_node_id()).unwrap().len(), 2);
        assert_eq!(aig.get_fanouts(m.get_node_id()).unwrap().len(), 1);
        aig.check_integrity().unwrap();

        aig.fanout_stop();
        assert!(!aig.has_fanouts());
    }
}
