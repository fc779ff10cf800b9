//! Node replacement.
//!
//! [`Aig::replace`] makes an existing node compute another function while keeping its id, so that
//! everything holding the id (outputs, fanouts, your own tables) sees the new function.
//! When the new implementation cannot simply be moved into the old node, the old node becomes a
//! buffer pointing at it, and buffers are then pushed through their fanouts until none is left.

use std::collections::VecDeque;

use log::{debug, warn};

use super::{Aig, AigEdge, AigError, NodeId, NodeKind, Result};

impl Aig {
    /// Replaces `old` by `new`: after the call, node `old` computes the function of `new`.
    ///
    /// The cone of `old` that is no longer used is deleted. If `new` is a fresh gate (not
    /// complemented, not referenced), it is moved into `old` and its own id is freed: keep
    /// using `old` to refer to it. Otherwise `old` goes through a buffer, which is propagated to
    /// the fanouts of `old` (rebuilding them, which may trigger more replacements) before the
    /// call returns.
    ///
    /// A referenced `old` (pinned, see [`Aig::pin`]) may stay a buffer after the call. Building
    /// gates or outputs from it, or passing it as `new` to a later replacement, reads through the
    /// buffer.
    ///
    /// Fanouts are needed to find the consumers of buffers, so they are tracked from now on if
    /// they were not already. If `update_level` is set, the levels of `old` and its transitive
    /// fanouts are updated, otherwise only `old` gets a fresh level.
    ///
    /// ```rust
    /// use aigman::Aig;
    /// let mut aig = Aig::new();
    /// let a = aig.create_ci();
    /// let b = aig.create_ci();
    /// let n1 = aig.and(a, b);
    /// let o = aig.create_co(n1);
    /// let n2 = aig.and(a, !b);
    /// aig.replace(n1.get_node_id(), n2, false).unwrap();
    /// // The output still points at n1, which now computes a & !b
    /// assert_eq!(aig.get_co_driver(o).unwrap(), n1);
    /// assert_eq!(aig.simulate(&[0b1100, 0b1010]).unwrap()[0] & 0b1111, 0b0100);
    /// ```
    ///
    /// # Errors
    ///
    /// [`AigError::BufferCycle`] if buffer propagation does not terminate within
    /// [`AigParams::buffer_step_limit`] steps. Mutations done before that point are kept.
    ///
    /// # Panics
    ///
    /// If `old` is a terminal or the constant, if `new` points at `old` or at one of its
    /// fanouts, or if `new` points at a buffer.
    ///
    /// [`AigParams::buffer_step_limit`]: super::AigParams::buffer_step_limit
    pub fn replace(&mut self, old: NodeId, new: AigEdge, update_level: bool) -> Result<()> {
        let new = self.real_edge(new)?;
        if self.replace_once(old, new, update_level) {
            self.propagate_buffers(update_level)?;
        }
        Ok(())
    }

    /// One replacement step, without buffer propagation. Returns true if a buffer was created.
    fn replace_once(&mut self, old: NodeId, new: AigEdge, update_level: bool) -> bool {
        let new_id = new.get_node_id();
        {
            let old_node = self.node(old);
            assert!(
                !old_node.is_terminal() && !old_node.is_const(),
                "node {} is a terminal and cannot be replaced",
                old
            );
            assert_ne!(old, new_id, "node {} cannot be replaced by itself", old);
            let new_node = self.node(new_id);
            assert!(
                !new_node.is_buf(),
                "node {} cannot be replaced by buffer {}",
                old,
                new_id
            );
            assert!(
                new_node.which_fanin(old).is_none(),
                "node {} cannot be replaced by its fanout {}",
                old,
                new_id
            );
        }
        if self.fanouts.is_none() {
            debug!("tracking fanouts to propagate buffers");
            self.fanout_start();
        }

        // Delete the cone of the old node, keeping the new one alive and the old slot around
        self.node_mut(new_id).refs += 1;
        self.delete_recursive(old, false);
        self.node_mut(new_id).refs -= 1;

        let new_node = self.node(new_id);
        if new.get_complement() || new_node.refs > 0 || !new_node.is_node() {
            self.node_mut(old).kind = NodeKind::Buf;
            self.connect(old, Some(new), None);
            self.stats.buf_replaces += 1;
            self.buffers.push(old);
            self.stats.buf_max = self.stats.buf_max.max(self.buffers.len());
            debug!("node {} replaced by a buffer to {:?}", old, new);
            true
        } else {
            let (kind, fanin0, fanin1) = (new_node.kind, new_node.fanin0, new_node.fanin1);
            let phase_old = self.node(old).phase;
            self.node_mut(old).kind = kind;
            self.disconnect(new_id);
            self.connect(old, fanin0, fanin1);
            self.delete(new_id);
            if self.node(old).phase != phase_old {
                self.update_phase(old);
            }
            if update_level {
                self.update_level(old);
            }
            false
        }
    }

    /// Rebuilds the consumers of pending buffers until no buffer is left.
    /// Returns the number of steps taken.
    pub(crate) fn propagate_buffers(&mut self, update_level: bool) -> Result<usize> {
        let limit = self.params.buffer_step_limit;
        let mut steps = 0;
        'pending: while let Some(&last) = self.buffers.last() {
            // Walk down to a node which is not a buffer itself
            let mut id = last;
            while self.node(id).is_buf() {
                steps += 1;
                if steps > limit {
                    return Err(self.abandon_buffers(steps));
                }
                match self.first_fanout(id) {
                    Some(edge) => id = edge.node,
                    None => {
                        // Nothing to fix downstream
                        if self.node(id).refs == 0 {
                            self.delete_recursive(id, true);
                        } else if id == last {
                            self.buffers.retain(|&b| b != id);
                        } else {
                            // A pinned buffer reading the pending one
                            self.skip_buffer_fanin(id)?;
                        }
                        continue 'pending;
                    }
                }
            }
            steps += 1;
            if steps > limit {
                return Err(self.abandon_buffers(steps));
            }
            if let Err(err) = self.fix_buffer_fanins(id, update_level) {
                self.buffers.clear();
                return Err(err);
            }
        }
        debug!("propagated buffers in {} steps", steps);
        Ok(steps)
    }

    fn abandon_buffers(&mut self, steps: usize) -> AigError {
        warn!(
            "a cycle is encountered while propagating buffers, giving up after {} steps ({} buffers pending)",
            steps,
            self.buffers.len()
        );
        self.buffers.clear();
        AigError::BufferCycle { steps }
    }

    /// Rebuilds a node whose fanins go through buffers, using the real fanins instead.
    fn fix_buffer_fanins(&mut self, id: NodeId, update_level: bool) -> Result<()> {
        let (kind, fanin0, fanin1) = {
            let node = self.node(id);
            (node.kind, node.fanin0, node.fanin1)
        };
        let no_fanin = || AigError::InvalidState(format!("node {} should have fanins", id));
        let real0 = self.real_edge(fanin0.ok_or_else(no_fanin)?)?;
        self.stats.buf_fixes += 1;
        match kind {
            NodeKind::Co => self.set_co_driver(id, real0),
            NodeKind::And | NodeKind::Xor => {
                let real1 = self.real_edge(fanin1.ok_or_else(no_fanin)?)?;
                let result = self.oper(kind, real0, real1);
                self.replace_once(id, result, update_level);
                Ok(())
            }
            _ => Err(AigError::InvalidState(format!(
                "node {} of kind {:?} cannot consume a buffer",
                id, kind
            ))),
        }
    }

    /// Points buffer `id` straight at the signal its buffer fanin stands for.
    fn skip_buffer_fanin(&mut self, id: NodeId) -> Result<()> {
        let fanin = self.node(id).fanin0.ok_or_else(|| {
            AigError::InvalidState(format!("buffer {} has no fanin", id))
        })?;
        let real = self.real_edge(fanin)?;
        self.disconnect(id);
        self.connect(id, Some(real), None);
        self.stats.buf_fixes += 1;
        Ok(())
    }

    /// Like [`Aig::real_edge`], but keeps `edge` as is when buffers form a cycle.
    pub(crate) fn follow_buffers(&self, edge: AigEdge) -> AigEdge {
        self.real_edge(edge).unwrap_or(edge)
    }

    /// Follows buffers from `edge` to the signal they stand for.
    pub fn real_edge(&self, edge: AigEdge) -> Result<AigEdge> {
        let mut edge = edge;
        let mut steps = 0;
        while self.node(edge.node).is_buf() {
            steps += 1;
            if steps > self.params.buffer_step_limit {
                return Err(AigError::BufferCycle { steps });
            }
            let fanin = self.node(edge.node).fanin0.ok_or_else(|| {
                AigError::InvalidState(format!("buffer {} has no fanin", edge.node))
            })?;
            edge = fanin.not_if(edge.complement);
        }
        Ok(edge)
    }

    /// Pushes a phase change of `id` through its transitive fanouts.
    fn update_phase(&mut self, id: NodeId) {
        let mut queue: VecDeque<NodeId> = self
            .get_fanouts(id)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| edge.node)
            .collect();
        while let Some(id) = queue.pop_front() {
            let phase = self.phase_new(id);
            if phase == self.node(id).phase {
                continue;
            }
            self.node_mut(id).phase = phase;
            if let Some(fanouts) = self.get_fanouts(id) {
                queue.extend(fanouts.into_iter().map(|edge| edge.node));
            }
        }
    }

    /// Recomputes the level of `id` and pushes the changes through its transitive fanouts.
    ///
    /// Does nothing beyond `id` itself when fanouts are not tracked.
    pub fn update_level(&mut self, id: NodeId) {
        let mut queue = VecDeque::from([id]);
        let mut start = true;
        while let Some(id) = queue.pop_front() {
            if !self.contains(id) {
                continue;
            }
            let level = self.level_new(id);
            if !start && level == self.node(id).level {
                continue;
            }
            start = false;
            self.node_mut(id).level = level;
            if let Some(fanouts) = self.get_fanouts(id) {
                queue.extend(fanouts.into_iter().map(|edge| edge.node));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::AigParams;

    #[test]
    fn replace_in_place() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n1 = aig.and(a, b);
        let o = aig.create_co(n1);
        let n2 = aig.and(a, !b);
        aig.replace(n1.get_node_id(), n2, false).unwrap();

        assert_eq!(aig.get_co_driver(o).unwrap(), n1);
        assert!(!aig.contains(n2.get_node_id()));
        assert_eq!(aig.num_nodes(), 1);
        assert_eq!(aig.num_bufs(), 0);
        assert_eq!(aig.get_stats().buf_replaces, 0);
        // Hashed under its new fanins
        assert_eq!(aig.and(!b, a), n1);
        let outs = aig.simulate(&[0b1100, 0b1010]).unwrap();
        assert_eq!(outs[0] & 0b1111, 0b0100);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_by_complement() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n1 = aig.and(a, b);
        let n2 = aig.and(n1, c);
        let o1 = aig.create_co(n2);
        let x = aig.or(a, b);
        let o2 = aig.create_co(x);
        aig.replace(n1.get_node_id(), x, false).unwrap();

        assert_eq!(aig.num_bufs(), 0);
        assert_eq!(aig.get_stats().buf_replaces, 1);
        assert!(aig.get_stats().buf_fixes >= 1);
        assert_eq!(aig.get_co_driver(o2).unwrap(), x);
        // o1 still reads n2, which now computes (a | b) & c
        assert_eq!(aig.get_co_driver(o1).unwrap(), n2);
        let (va, vb, vc) = (0xf0u64, 0xccu64, 0xaau64);
        let outs = aig.simulate(&[va, vb, vc]).unwrap();
        assert_eq!(outs[0] & 0xff, (va | vb) & vc & 0xff);
        assert_eq!(outs[1] & 0xff, (va | vb) & 0xff);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_by_input() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n1 = aig.and(a, b);
        let n2 = aig.xor(n1, b);
        let o1 = aig.create_co(n1);
        let o2 = aig.create_co(!n2);
        aig.replace(n1.get_node_id(), !a, true).unwrap();

        assert_eq!(aig.get_co_driver(o1).unwrap(), !a);
        assert_eq!(aig.num_bufs(), 0);
        let outs = aig.simulate(&[0b1100, 0b1010]).unwrap();
        assert_eq!(outs[0] & 0b1111, 0b0011);
        assert_eq!(outs[1] & 0b1111, !(0b0011u64 ^ 0b1010) & 0b1111);
        // !(!a ^ b) is a ^ b, a regular edge
        assert!(!aig.get_co_driver(o2).unwrap().get_complement());
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_merges_fanouts() {
        // p = (a & b) & d and q = (a & c) & d; proving a & c == a & b merges p and q
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let d = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(a, c);
        let p = aig.and(n, d);
        let q = aig.and(m, d);
        let op = aig.create_co(p);
        let oq = aig.create_co(q);
        aig.replace(m.get_node_id(), n, false).unwrap();

        assert_eq!(aig.get_co_driver(op).unwrap(), p);
        assert_eq!(aig.get_co_driver(oq).unwrap(), p);
        assert_eq!(aig.num_nodes(), 2);
        assert_eq!(aig.num_bufs(), 0);
        assert_eq!(aig.get_node(c.get_node_id()).unwrap().get_refs(), 0);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_by_constant() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, !a);
        let o = aig.create_co(m);
        // m is never true
        aig.replace(m.get_node_id(), AigEdge::FALSE, false).unwrap();
        assert_eq!(aig.get_co_driver(o).unwrap(), AigEdge::FALSE);
        assert_eq!(aig.num_nodes(), 0);
        assert_eq!(aig.get_node(a.get_node_id()).unwrap().get_refs(), 0);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_pinned() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.pin(n.get_node_id()).unwrap();
        // The pinned node keeps its id, as a buffer nobody consumes
        aig.replace(n.get_node_id(), b, false).unwrap();
        let node = aig.get_node(n.get_node_id()).unwrap();
        assert!(node.is_buf());
        assert_eq!(aig.real_edge(n).unwrap(), b);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn pinned_buffer_is_read_through() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n = aig.and(a, b);
        aig.pin(n.get_node_id()).unwrap();
        aig.replace(n.get_node_id(), b, false).unwrap();

        // New logic built from the pinned id reads b directly
        let m = aig.and(n, c);
        aig.create_co(m);
        let fanins = aig.get_node(m.get_node_id()).unwrap().get_fanins();
        assert!(fanins.contains(&b) && fanins.contains(&c));
        assert_eq!(aig.num_bufs(), 1);
        aig.check_integrity().unwrap();

        // So does a replacement by the pinned id
        let x = aig.and(a, !c);
        let o = aig.create_co(x);
        aig.replace(x.get_node_id(), !n, false).unwrap();
        assert_eq!(aig.get_co_driver(o).unwrap(), !b);
        assert_eq!(aig.num_bufs(), 1);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn pinned_buffer_reading_buffer() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n = aig.and(a, b);
        let p = aig.and(a, c);
        let o = aig.create_co(p);
        aig.pin(n.get_node_id()).unwrap();
        aig.replace(n.get_node_id(), !p, false).unwrap();
        assert_eq!(aig.get_node(n.get_node_id()).unwrap().get_fanin0(), Some(!p));

        // p goes through a buffer too, the pinned buffer must not keep reading it
        aig.replace(p.get_node_id(), b, false).unwrap();
        assert_eq!(aig.get_co_driver(o).unwrap(), b);
        assert_eq!(aig.get_node(n.get_node_id()).unwrap().get_fanin0(), Some(!b));
        assert!(!aig.contains(p.get_node_id()));
        assert_eq!(aig.num_bufs(), 1);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn gate_reading_buffer_is_invalid() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let n = aig.and(a, b);
        aig.pin(n.get_node_id()).unwrap();
        aig.replace(n.get_node_id(), b, false).unwrap();
        aig.check_integrity().unwrap();
        aig.create_node(NodeKind::And, Some(n), Some(c));
        assert!(aig.check_integrity().is_err());
    }

    #[test]
    fn replace_starts_fanouts() {
        let mut aig = Aig::with_params(AigParams::default().fanouts(false));
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, a);
        aig.create_co(m);
        aig.replace(m.get_node_id(), n, false).unwrap();
        assert!(aig.has_fanouts());
        assert_eq!(aig.num_nodes(), 1);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_updates_levels() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let d = aig.create_ci();
        let x1 = aig.and(a, b);
        let x2 = aig.and(x1, c);
        let x3 = aig.and(x2, d);
        let y = aig.and(x3, a);
        let o = aig.create_co(y);
        assert_eq!(aig.level_max(), 4);

        let z = aig.and(c, d);
        aig.replace(x3.get_node_id(), z, true).unwrap();
        assert_eq!(aig.get_node(x3.get_node_id()).unwrap().get_level(), 1);
        assert_eq!(aig.get_node(y.get_node_id()).unwrap().get_level(), 2);
        assert_eq!(aig.get_node(o).unwrap().get_level(), 2);
        assert_eq!(aig.level_max(), 2);
        assert!(!aig.contains(x1.get_node_id()));
        aig.check_integrity().unwrap();
    }

    #[test]
    fn replace_keeps_fanout_levels() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let c = aig.create_ci();
        let d = aig.create_ci();
        let x1 = aig.and(a, b);
        let x2 = aig.and(x1, c);
        let x3 = aig.and(x2, d);
        let y = aig.and(x3, a);
        aig.create_co(y);

        let z = aig.and(c, d);
        aig.replace(x3.get_node_id(), z, false).unwrap();
        // Only the replaced node is up to date
        assert_eq!(aig.get_node(x3.get_node_id()).unwrap().get_level(), 1);
        assert_eq!(aig.get_node(y.get_node_id()).unwrap().get_level(), 4);
        aig.update_level(x3.get_node_id());
        assert_eq!(aig.get_node(y.get_node_id()).unwrap().get_level(), 2);
        assert_eq!(aig.level_max(), 2);
    }

    #[test]
    #[should_panic]
    fn replace_by_itself() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        aig.create_co(n);
        let _ = aig.replace(n.get_node_id(), !n, false);
    }

    #[test]
    #[should_panic]
    fn replace_by_fanout() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let n = aig.and(a, b);
        let m = aig.and(n, a);
        aig.create_co(m);
        let _ = aig.replace(n.get_node_id(), m, false);
    }

    #[test]
    #[should_panic]
    fn replace_terminal() {
        let mut aig = Aig::new();
        let a = aig.create_ci();
        let b = aig.create_ci();
        let _ = aig.replace(a.get_node_id(), b, false);
    }

    #[test]
    fn buffer_cycle() {
        let mut aig = Aig::with_params(AigParams::default().buffer_step_limit(1000));
        let a = aig.create_ci();
        let b1 = aig.create_node(NodeKind::Buf, Some(a), None);
        let b2 = aig.create_node(NodeKind::Buf, Some(AigEdge::new(b1, false)), None);
        // Close the loop by hand: b1 now reads b2
        aig.disconnect(b1);
        aig.connect(b1, Some(AigEdge::new(b2, true)), None);
        aig.buffers.push(b1);
        aig.buffers.push(b2);

        let res = aig.propagate_buffers(false);
        assert!(matches!(res, Err(AigError::BufferCycle { steps }) if steps > 1000));
        assert!(aig.buffers.is_empty());
        assert!(matches!(
            aig.real_edge(AigEdge::new(b1, false)),
            Err(AigError::BufferCycle { .. })
        ));
    }
}
