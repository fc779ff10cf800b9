use thiserror::Error;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
///
/// Broken preconditions (replacing a node by itself, merging ids out of order, ...) are caller
/// bugs and panic instead.
#[derive(Debug, Error)]
pub enum AigError {
    /// The node with given id does not exist.
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// The node exists but is not a combinational output.
    #[error("node with id={0} is not a combinational output")]
    NotAnOutput(NodeId),

    /// Buffer propagation did not converge within the configured number of steps.
    /// This only happens if buffers form a cycle.
    #[error("buffer propagation gave up after {steps} steps, buffers form a cycle")]
    BufferCycle { steps: usize },

    /// Duplicating with representatives went through a cycle, starting from the given node.
    /// Run [`Aig::mark_valid_choices`] first to drop such representatives.
    ///
    /// [`Aig::mark_valid_choices`]: super::Aig::mark_valid_choices
    #[error("cycle through representatives reached from node {0}")]
    ReprCycle(NodeId),

    /// Simulation was given a wrong number of input patterns.
    #[error("expected {expected} input patterns, got {got}")]
    InputCountMismatch { expected: usize, got: usize },

    /// The AIG has reached an invalid state. This should never happen.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),
}
