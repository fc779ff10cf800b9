//! Provides a DFS visitor to allow simple AIG traversal, and topological orders.
//!
//! See [`Dfs`] for details.
//!
//! [`Dfs`]: Dfs

use std::collections::HashSet;

use crate::{Aig, AigError, NodeId, Result};

/// A simple DFS visitor over node ids.
///
/// Nodes are yielded in preorder. You can:
/// - start a DFS from a node using [`from_node`]
/// - or visit everything that matters by starting from the outputs using [`from_outputs`].
///
/// In the latter case, it will start by the first output, then explore all non-previously-explored
/// nodes from the second output, and so on until all the outputs have been processed.
/// Dangling gates are not visited.
///
/// [`from_node`]: Dfs::from_node
/// [`from_outputs`]: Dfs::from_outputs
///
/// Example:
///
/// ```rust
/// use aigman::{Aig, dfs::Dfs};
/// let mut aig = Aig::new();
/// let a = aig.create_ci();
/// let b = aig.create_ci();
/// let n = aig.and(a, !b);
/// aig.create_co(n);
/// let mut dfs = Dfs::from_outputs(&aig);
/// let mut count = 0;
/// while let Some(_id) = dfs.next(&aig) {
///     // You can still borrow mut aig here
///     count += 1;
/// }
/// assert_eq!(count, 4);
/// ```
///
/// Inspired by [petgraph DFS](https://docs.rs/petgraph/latest/petgraph/visit/struct.Dfs.html).
pub struct Dfs {
    /// Must maintain the following invariant:
    /// - all nodes on the stack have not been visited yet
    /// - their `seen` flag is set to true to avoid adding them one more time to the stack
    /// - the different outputs from which to start a DFS are in starts
    ///   (they might have been visited already by the time we start the DFS from them,
    ///   and will simply be discarded if that's the case).
    stack: Vec<NodeId>,
    seen: HashSet<NodeId>,
    starts: Vec<NodeId>,
}

impl Dfs {
    /// Create a DFS from the initial start node.
    /// You will only browse the fanin of this node.
    pub fn from_node(start: NodeId) -> Self {
        Dfs {
            stack: vec![start],
            seen: HashSet::from([start]),
            starts: Vec::new(),
        }
    }

    /// Create a DFS from the outputs of the given AIG.
    pub fn from_outputs(aig: &Aig) -> Self {
        Dfs::from_nodes(aig.get_cos())
    }

    /// Create a DFS exploring the fanins of several nodes, one after the other.
    pub fn from_nodes(starts: &[NodeId]) -> Self {
        let mut starts: Vec<NodeId> = starts.iter().rev().copied().collect();
        let mut dfs = Dfs {
            stack: Vec::new(),
            seen: HashSet::new(),
            starts: Vec::new(),
        };
        if let Some(start) = starts.pop() {
            dfs.stack.push(start);
            dfs.seen.insert(start);
        }
        dfs.starts = starts;
        dfs
    }

    /// Returns true if we are ready to start again! Else false, we are done.
    /// Should only be called when stack is empty (ie we are done with the current fanin).
    fn new_start(&mut self) -> bool {
        assert!(self.stack.is_empty());

        while let Some(id) = self.starts.pop() {
            if self.seen.insert(id) {
                self.stack.push(id);
                return true;
            }
        }
        false
    }

    /// Yield the next node of the DFS, or None if it is done.
    /// Nodes deleted since they were discovered are skipped.
    pub fn next(&mut self, aig: &Aig) -> Option<NodeId> {
        loop {
            while let Some(id) = self.stack.pop() {
                let Some(node) = aig.get_node(id) else {
                    continue;
                };
                for child in node.get_fanins().iter().rev() {
                    let child_id = child.get_node_id();
                    if self.seen.insert(child_id) {
                        self.stack.push(child_id);
                    }
                }
                return Some(id);
            }

            // Maybe we can start from a different output?
            if !self.new_start() {
                return None;
            }
        }
    }
}

impl Aig {
    /// All live nodes, every node after its fanins. Unreachable gates are included.
    ///
    /// # Errors
    ///
    /// [`AigError::InvalidState`] if the fanins form a cycle.
    pub fn topological_sort(&self) -> Result<Vec<NodeId>> {
        let roots: Vec<NodeId> = self.nodes().map(|n| n.get_id()).collect();
        self.post_order(&roots)
    }

    /// The transitive fanin of the outputs (outputs included), every node after its fanins.
    pub fn topological_sort_from_outputs(&self) -> Result<Vec<NodeId>> {
        self.post_order(self.get_cos())
    }

    /// Iterative post-order from the given roots.
    pub(crate) fn post_order(&self, roots: &[NodeId]) -> Result<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut on_path = HashSet::new();
        for &root in roots {
            let mut stack = vec![(root, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    on_path.remove(&id);
                    done.insert(id);
                    order.push(id);
                    continue;
                }
                if done.contains(&id) {
                    continue;
                }
                if !on_path.insert(id) {
                    return Err(AigError::InvalidState(format!(
                        "combinational cycle through node {}",
                        id
                    )));
                }
                let node = self.get_node(id).ok_or(AigError::NodeDoesNotExist(id))?;
                stack.push((id, true));
                for fanin in node.get_fanins().iter().rev() {
                    stack.push((fanin.get_node_id(), false));
                }
            }
        }
        Ok(order)
    }
}
