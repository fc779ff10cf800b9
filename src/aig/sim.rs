//! Bit-parallel simulation: each `u64` carries 64 input patterns.
//!
//! Handy to check that a transformation preserved the function of the outputs, or to propose
//! candidate equivalences before merging classes.

use crate::{Aig, AigEdge, AigError, NodeKind, Result};

/// Input patterns enumerating every assignment of `n` inputs, bit `k` of input `i` being bit `i`
/// of `k`. Patterns repeat when `n < 6`.
///
/// # Panics
///
/// If `n > 6`: 64 patterns cannot cover more inputs.
pub fn exhaustive_patterns(n: usize) -> Vec<u64> {
    const MASKS: [u64; 6] = [
        0xaaaa_aaaa_aaaa_aaaa,
        0xcccc_cccc_cccc_cccc,
        0xf0f0_f0f0_f0f0_f0f0,
        0xff00_ff00_ff00_ff00,
        0xffff_0000_ffff_0000,
        0xffff_ffff_0000_0000,
    ];
    assert!(n <= MASKS.len(), "cannot enumerate {} inputs in 64 patterns", n);
    MASKS[..n].to_vec()
}

impl Aig {
    /// Value of every live node, indexed by id (dead slots hold 0).
    pub fn simulate_nodes(&self, inputs: &[u64]) -> Result<Vec<u64>> {
        if inputs.len() != self.num_cis() {
            return Err(AigError::InputCountMismatch {
                expected: self.num_cis(),
                got: inputs.len(),
            });
        }
        let mut values = vec![0u64; self.id_bound()];
        for (&ci, &value) in self.get_cis().iter().zip(inputs) {
            values[ci] = value;
        }
        let edge_value = |values: &[u64], edge: Option<AigEdge>| -> Result<u64> {
            let edge = edge.ok_or_else(|| AigError::InvalidState("missing fanin".to_string()))?;
            let value = values[edge.get_node_id()];
            Ok(if edge.get_complement() { !value } else { value })
        };
        for id in self.topological_sort()? {
            let node = self.node(id);
            values[id] = match node.kind {
                NodeKind::Const1 => u64::MAX,
                NodeKind::Ci => continue,
                NodeKind::Co | NodeKind::Buf => edge_value(&values, node.fanin0)?,
                NodeKind::And => edge_value(&values, node.fanin0)? & edge_value(&values, node.fanin1)?,
                NodeKind::Xor => edge_value(&values, node.fanin0)? ^ edge_value(&values, node.fanin1)?,
            };
        }
        Ok(values)
    }

    /// Value of every output, in output order.
    ///
    /// ```rust
    /// use aigman::{Aig, sim::exhaustive_patterns};
    /// let mut aig = Aig::new();
    /// let a = aig.create_ci();
    /// let b = aig.create_ci();
    /// let x = aig.xor(a, b);
    /// aig.create_co(!x);
    /// let outs = aig.simulate(&exhaustive_patterns(2)).unwrap();
    /// assert_eq!(outs[0] & 0xf, 0b1001);
    /// ```
    ///
    /// # Errors
    ///
    /// [`AigError::InputCountMismatch`] if there is not exactly one pattern per input.
    pub fn simulate(&self, inputs: &[u64]) -> Result<Vec<u64>> {
        let values = self.simulate_nodes(inputs)?;
        Ok(self.get_cos().iter().map(|&co| values[co]).collect())
    }
}
