use std::collections::HashSet;

use log::debug;

use crate::{Aig, AigEdge, AigError, NodeId, NodeKind, Result};

/// Side table from the ids of an AIG to the signals standing for them in a duplicate.
///
/// Returned by the duplication functions, so you can follow your own nodes into the copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    map: Vec<Option<AigEdge>>,
}

impl NodeMap {
    pub fn get(&self, id: NodeId) -> Option<AigEdge> {
        self.map.get(id).copied().flatten()
    }

    pub fn insert(&mut self, id: NodeId, edge: AigEdge) {
        if self.map.len() <= id {
            self.map.resize(id + 1, None);
        }
        self.map[id] = Some(edge);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of mapped ids.
    pub fn len(&self) -> usize {
        self.map.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Aig {
    /// Performs a real clone of the AIG.
    ///
    /// Instead of copying the arena (which [`Aig::clone`] does), every node is rebuilt in a
    /// brand new AIG:
    /// - create inputs
    /// - create gates, each after its fanins, in increasing id order (dangling gates included)
    /// - create outputs
    ///
    /// Ids are compacted and structural hashing is applied again. Representatives are not
    /// carried, see [`Aig::transfer_repr`].
    pub fn deep_clone(&self) -> Result<Self> {
        Ok(self.deep_clone_with_map()?.0)
    }

    /// Same as [`Aig::deep_clone`], also returning where each node went.
    pub fn deep_clone_with_map(&self) -> Result<(Self, NodeMap)> {
        self.dup(true, false)
    }

    /// Rebuilds the AIG from its outputs, using the representative of a node (phase corrected)
    /// instead of the node itself whenever it has one.
    ///
    /// # Errors
    ///
    /// [`AigError::ReprCycle`] if some node is needed to build its own representative. This
    /// cannot happen after [`Aig::mark_valid_choices`].
    pub fn dup_repr(&self) -> Result<Self> {
        Ok(self.dup_repr_with_map(false)?.0)
    }

    /// Same as [`Aig::dup_repr`], also returning where each node went.
    ///
    /// If `ordered`, every gate is duplicated in increasing id order, dangling ones included.
    /// Otherwise only the cones of the outputs (and of the representatives they use) are.
    pub fn dup_repr_with_map(&self, ordered: bool) -> Result<(Self, NodeMap)> {
        self.dup(ordered, true)
    }

    /// Copies the representatives of this AIG into a duplicate of it.
    /// Returns the number of representatives set in `new`.
    ///
    /// Pairs which collapsed into a single node, or whose larger member is not a gate in the
    /// duplicate, are skipped.
    pub fn transfer_repr(&self, new: &mut Aig, map: &NodeMap) -> usize {
        let mut count = 0;
        for (id, repr) in self.reprs.iter().enumerate() {
            let Some(repr) = *repr else { continue };
            let (Some(a), Some(b)) = (map.get(id), map.get(repr)) else {
                continue;
            };
            let (a, b) = (a.get_node_id(), b.get_node_id());
            if a == b {
                continue;
            }
            if new.merge(a, b) {
                count += 1;
            }
        }
        debug!("transferred {} representatives", count);
        count
    }

    fn dup(&self, ordered: bool, with_reprs: bool) -> Result<(Self, NodeMap)> {
        let mut new = Aig::with_params(self.params.clone());
        let mut map = NodeMap::default();
        map.insert(0, AigEdge::TRUE);
        for &ci in &self.cis {
            map.insert(ci, new.create_ci());
        }
        if ordered {
            for id in self.gate_ids() {
                self.dup_cone(&mut new, &mut map, id, with_reprs)?;
            }
        }
        for &co in &self.cos {
            let driver = self.get_co_driver(co)?;
            self.dup_cone(&mut new, &mut map, driver.get_node_id(), with_reprs)?;
            let value = self.dup_value(driver, &map, with_reprs)?;
            map.insert(co, AigEdge::new(new.create_co(value), false));
        }
        debug!(
            "duplicated {} gates into {} gates",
            self.num_nodes(),
            new.num_nodes()
        );
        Ok((new, map))
    }

    /// The signal of `edge` in the duplicate, its node being already mapped.
    fn dup_value(&self, edge: AigEdge, map: &NodeMap, with_reprs: bool) -> Result<AigEdge> {
        let id = edge.get_node_id();
        let value = if with_reprs {
            self.value_of(id, map)
        } else {
            map.get(id)
        };
        value
            .map(|v| v.not_if(edge.get_complement()))
            .ok_or_else(|| AigError::InvalidState(format!("node {} was not duplicated", id)))
    }

    /// Duplicates `root` after everything it depends on.
    fn dup_cone(
        &self,
        new: &mut Aig,
        map: &mut NodeMap,
        root: NodeId,
        with_reprs: bool,
    ) -> Result<()> {
        let mut stack = vec![(root, false)];
        let mut on_path = HashSet::new();
        while let Some((id, expanded)) = stack.pop() {
            if map.contains(id) {
                continue;
            }
            let node = self.get_node(id).ok_or(AigError::NodeDoesNotExist(id))?;
            let repr = if with_reprs { self.find_repr(id) } else { None };
            if !expanded {
                if !on_path.insert(id) {
                    return Err(if with_reprs {
                        AigError::ReprCycle(id)
                    } else {
                        AigError::InvalidState(format!("combinational cycle through node {}", id))
                    });
                }
                stack.push((id, true));
                match repr {
                    Some(repr) => stack.push((repr, false)),
                    None => stack.extend(node.get_fanins().iter().rev().map(|e| (e.node, false))),
                }
                continue;
            }
            on_path.remove(&id);
            let value = match (repr, node.kind, node.fanin0, node.fanin1) {
                (Some(_), _, _, _) => self.dup_value(AigEdge::new(id, false), map, true)?,
                (None, NodeKind::And | NodeKind::Xor, Some(f0), Some(f1)) => {
                    let f0 = self.dup_value(f0, map, with_reprs)?;
                    let f1 = self.dup_value(f1, map, with_reprs)?;
                    new.oper(node.kind, f0, f1)
                }
                (None, NodeKind::Buf, Some(f0), None) => self.dup_value(f0, map, with_reprs)?,
                _ => {
                    return Err(AigError::InvalidState(format!(
                        "node {} of kind {:?} cannot be duplicated",
                        id, node.kind
                    )));
                }
            };
            map.insert(id, value);
        }
        Ok(())
    }
}
