//! Module defining the [`Aig`] manager, as well as [`AigNode`], [`AigEdge`] and some others relevant structs.
//!
//! The manager is built around a handful of primitives:
//! - construction: [`Aig::create_ci`], [`Aig::create_co`], [`Aig::and`], [`Aig::xor`], ...
//!   (two-input gates are structurally hashed, see [`Aig::and`])
//! - replacement: [`Aig::replace`], the only way optimizations should install a new
//!   implementation for an existing node
//! - representatives and choices: [`Aig::merge`], [`Aig::mark_valid_choices`], [`Aig::dup_repr`].

mod clone;
pub mod dfs;
pub mod dot;
pub mod edge;
pub mod error;
mod fanout;
mod integrity;
pub mod node;
mod object;
mod params;
mod replace;
mod repr;
pub mod sim;
mod store;
mod strash;

pub use clone::NodeMap;
pub use edge::{AigEdge, FaninId};
pub use error::{AigError, Result};
pub use fanout::FanoutEdge;
pub use node::{AigNode, NodeId, NodeKind};
pub use params::{AigParams, DEFAULT_BUFFER_STEP_LIMIT};

use std::collections::HashMap;

use fanout::FanoutStore;
use store::NodeStore;
use strash::StrashTable;

/// Counters about replacements, kept for the lifetime of the manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AigStats {
    /// Number of replacements which had to leave a buffer behind.
    pub buf_replaces: usize,
    /// Number of nodes rebuilt to get rid of a buffer fanin.
    pub buf_fixes: usize,
    /// Largest number of buffers pending at once.
    pub buf_max: usize,
}

/// A whole AIG.
///
/// The manager exclusively owns its nodes. Nodes are addressed by their [`NodeId`], and every
/// other structure (structural hash table, fanout lists, representatives, or your own code) only
/// stores ids. Ids survive replacements: after [`Aig::replace`], the id of the replaced node
/// computes the new function.
///
/// Reference counts are maintained eagerly. A gate whose last fanout disappears during a
/// replacement is deleted right away, together with its fanout-free cone. Gates created but never
/// used stay around until [`Aig::cleanup`] is called.
///
/// Note that [`Aig::clone`] copies the whole arena (ids are kept). Use [`Aig::deep_clone`] to
/// rebuild a compact copy.
#[derive(Debug, Clone)]
pub struct Aig {
    store: NodeStore,
    cis: Vec<NodeId>,
    cos: Vec<NodeId>,
    strash: StrashTable,
    /// Fanout lists, if tracked.
    fanouts: Option<FanoutStore>,
    /// Representative of each node, always a smaller id.
    reprs: Vec<Option<NodeId>>,
    /// Nodes having each node as representative.
    repr_members: HashMap<NodeId, Vec<NodeId>>,
    /// Next node in the choice list of each class.
    equivs: Vec<Option<NodeId>>,
    /// Buffers waiting to be propagated.
    buffers: Vec<NodeId>,
    params: AigParams,
    stats: AigStats,
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node included) with default parameters.
    pub fn new() -> Self {
        Aig::with_params(AigParams::default())
    }

    pub fn with_params(params: AigParams) -> Self {
        let mut store = NodeStore::default();
        let id = store.allocate(NodeKind::Const1);
        debug_assert_eq!(id, 0);
        let fanouts = params.fanouts.then(FanoutStore::default);
        Aig {
            store,
            cis: Vec::new(),
            cos: Vec::new(),
            strash: StrashTable::default(),
            fanouts,
            reprs: Vec::new(),
            repr_members: HashMap::new(),
            equivs: Vec::new(),
            buffers: Vec::new(),
            params,
            stats: AigStats::default(),
        }
    }

    pub fn get_params(&self) -> &AigParams {
        &self.params
    }

    pub fn get_stats(&self) -> AigStats {
        self.stats
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&AigNode> {
        self.store.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.store.contains(id)
    }

    /// Internal accessor, the node must exist.
    pub(crate) fn node(&self, id: NodeId) -> &AigNode {
        self.store
            .get(id)
            .unwrap_or_else(|| panic!("node {} does not exist", id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut AigNode {
        self.store
            .get_mut(id)
            .unwrap_or_else(|| panic!("node {} does not exist", id))
    }

    /// Creates a new combinational input.
    pub fn create_ci(&mut self) -> AigEdge {
        let id = self.store.allocate(NodeKind::Ci);
        self.cis.push(id);
        AigEdge::new(id, false)
    }

    /// Creates a new combinational output driven by `driver` (buffers are followed).
    pub fn create_co(&mut self, driver: AigEdge) -> NodeId {
        let driver = self.follow_buffers(driver);
        let id = self.store.allocate(NodeKind::Co);
        self.connect(id, Some(driver), None);
        self.cos.push(id);
        id
    }

    /// Combinational inputs, in creation order.
    pub fn get_cis(&self) -> &[NodeId] {
        &self.cis
    }

    /// Combinational outputs, in creation order.
    pub fn get_cos(&self) -> &[NodeId] {
        &self.cos
    }

    /// The signal driving an output.
    pub fn get_co_driver(&self, co: NodeId) -> Result<AigEdge> {
        let node = self.get_node(co).ok_or(AigError::NodeDoesNotExist(co))?;
        match (node.is_co(), node.fanin0) {
            (true, Some(driver)) => Ok(driver),
            (true, None) => Err(AigError::InvalidState(format!(
                "output {} has no driver",
                co
            ))),
            (false, _) => Err(AigError::NotAnOutput(co)),
        }
    }

    /// The signals driving the outputs, in output order.
    pub fn get_outputs(&self) -> Vec<AigEdge> {
        self.cos
            .iter()
            .filter_map(|&co| self.node(co).fanin0)
            .collect()
    }

    /// Live nodes in increasing id order (constant, inputs, outputs and gates alike).
    pub fn nodes(&self) -> impl Iterator<Item = &AigNode> {
        self.store.iter()
    }

    /// Ids of the live two-input gates in increasing id order.
    pub fn gate_ids(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.is_node())
            .map(|n| n.get_id())
            .collect()
    }

    /// One past the largest id in use so far.
    pub fn id_bound(&self) -> usize {
        self.store.capacity()
    }

    /// Number of live objects of every kind, constant included.
    pub fn num_objs(&self) -> usize {
        self.store.len()
    }

    pub fn num_cis(&self) -> usize {
        self.cis.len()
    }

    pub fn num_cos(&self) -> usize {
        self.cos.len()
    }

    pub fn num_ands(&self) -> usize {
        self.nodes().filter(|n| n.is_and()).count()
    }

    pub fn num_xors(&self) -> usize {
        self.nodes().filter(|n| n.is_xor()).count()
    }

    pub fn num_bufs(&self) -> usize {
        self.nodes().filter(|n| n.is_buf()).count()
    }

    /// Number of two-input gates.
    pub fn num_nodes(&self) -> usize {
        self.nodes().filter(|n| n.is_node()).count()
    }

    /// Largest level among the outputs.
    pub fn level_max(&self) -> u32 {
        self.cos
            .iter()
            .map(|&co| self.node(co).level)
            .max()
            .unwrap_or(0)
    }

    /// Phase of the signal, ie its value under the all-zero input pattern.
    pub fn edge_phase(&self, edge: AigEdge) -> bool {
        self.node(edge.node).phase ^ edge.complement
    }

    fn edge_level(&self, edge: Option<AigEdge>) -> u32 {
        edge.map(|e| self.node(e.node).level).unwrap_or(0)
    }

    /// Level the node should have, given the levels of its fanins.
    pub(crate) fn level_new(&self, id: NodeId) -> u32 {
        let node = self.node(id);
        match node.kind {
            NodeKind::And | NodeKind::Xor => {
                1 + self
                    .edge_level(node.fanin0)
                    .max(self.edge_level(node.fanin1))
            }
            NodeKind::Co | NodeKind::Buf => self.edge_level(node.fanin0),
            NodeKind::Const1 | NodeKind::Ci => 0,
        }
    }

    /// Phase the node should have, given the phases of its fanins.
    pub(crate) fn phase_new(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let phase = |e: Option<AigEdge>| e.map(|e| self.edge_phase(e)).unwrap_or(true);
        match node.kind {
            NodeKind::And => phase(node.fanin0) & phase(node.fanin1),
            NodeKind::Xor => phase(node.fanin0) ^ phase(node.fanin1),
            NodeKind::Co | NodeKind::Buf => phase(node.fanin0),
            NodeKind::Const1 => true,
            NodeKind::Ci => false,
        }
    }
}
