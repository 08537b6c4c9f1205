use crate::arena::{Arena, NodeId};
use crate::error::LayerGradError;

/// Common interface of network components that map input nodes to output nodes.
pub trait Module: std::fmt::Debug {
    /// Appends the nodes computing this module's outputs for `inputs` to `arena`.
    ///
    /// # Errors
    /// [`LayerGradError::ShapeMismatch`] if `inputs` does not have the expected length.
    fn build(&self, arena: &mut Arena, inputs: &[NodeId]) -> Result<Vec<NodeId>, LayerGradError>;

    /// Handles of every learnable leaf (weights, then bias, neuron by neuron).
    fn parameters(&self) -> Vec<NodeId>;

    fn num_inputs(&self) -> usize;

    fn num_outputs(&self) -> usize;

    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }
}
