/// Default cap on the number of steps of a single buffer propagation.
pub const DEFAULT_BUFFER_STEP_LIMIT: usize = 1_000_000;

/// Configuration of an [`Aig`] manager.
///
/// ```rust
/// use aigman::{Aig, AigParams};
/// let aig = Aig::with_params(AigParams::default().fanouts(false).catch_xor(false));
/// assert!(!aig.has_fanouts());
/// ```
///
/// [`Aig`]: super::Aig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AigParams {
    /// Maintain fanout lists from the start.
    pub fanouts: bool,
    /// Create native XOR gates instead of decomposing XOR into AND gates.
    pub catch_xor: bool,
    /// Propagating buffers for longer than this means there is a cycle.
    pub buffer_step_limit: usize,
}

impl Default for AigParams {
    fn default() -> Self {
        AigParams {
            fanouts: true,
            catch_xor: true,
            buffer_step_limit: DEFAULT_BUFFER_STEP_LIMIT,
        }
    }
}

impl AigParams {
    pub fn fanouts(mut self, value: bool) -> Self {
        self.fanouts = value;
        self
    }

    pub fn catch_xor(mut self, value: bool) -> Self {
        self.catch_xor = value;
        self
    }

    pub fn buffer_step_limit(mut self, value: usize) -> Self {
        self.buffer_step_limit = value;
        self
    }
}
