//! A mutable, structurally hashed And-Inverter Graph manager.
//!
//! Gates are stored in an arena and addressed by id. Identical gates are shared through a
//! structural hash table, unused cones are collected eagerly through reference counts, and
//! [`Aig::replace`] swaps the implementation of a node without changing its id. Equivalence
//! proposals are recorded as representatives and packed into choices for later selection.
//!
//! ```rust
//! use aigman::Aig;
//! let mut aig = Aig::new();
//! let a = aig.create_ci();
//! let b = aig.create_ci();
//! let c = aig.create_ci();
//! let ab = aig.and(a, b);
//! let x = aig.and(ab, c);
//! aig.create_co(x);
//!
//! // Another implementation of the same function, proposed as a choice
//! let bc = aig.and(b, c);
//! let y = aig.and(a, bc);
//! aig.merge(x.get_node_id(), y.get_node_id());
//! assert_eq!(aig.mark_valid_choices(), 1);
//! assert!(aig.is_choice(x.get_node_id()));
//! ```

pub mod aig;

// Re-exporting symbols and modules.
pub use aig::dfs;
pub use aig::dot;
pub use aig::sim;
pub use aig::{
    Aig, AigEdge, AigError, AigNode, AigParams, AigStats, DEFAULT_BUFFER_STEP_LIMIT, FaninId,
    FanoutEdge, NodeId, NodeKind, NodeMap, Result,
};
