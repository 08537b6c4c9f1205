use crate::arena::{Arena, NodeId};
use crate::error::LayerGradError;
use crate::nn::init::InitScheme;
use rand::Rng;

/// A single `tanh` unit: `tanh(b + Σ wᵢ·xᵢ)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neuron {
    weights: Vec<NodeId>,
    bias: NodeId,
}

impl Neuron {
    /// Allocates `num_inputs` weights and a bias as leaves of `arena`.
    pub fn new<R: Rng + ?Sized>(
        arena: &mut Arena,
        num_inputs: usize,
        scheme: InitScheme,
        rng: &mut R,
    ) -> Result<Self, LayerGradError> {
        let weights = (0..num_inputs)
            .map(|_| Ok(arena.constant(scheme.sample(rng)?)))
            .collect::<Result<Vec<_>, LayerGradError>>()?;
        let bias = arena.constant(scheme.sample(rng)?);
        Ok(Neuron { weights, bias })
    }

    pub fn weights(&self) -> &[NodeId] {
        &self.weights
    }

    pub fn bias(&self) -> NodeId {
        self.bias
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    /// Weights followed by the bias.
    pub fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.weights.clone();
        params.push(self.bias);
        params
    }

    /// Appends the activation nodes for `inputs` and returns the output node.
    ///
    /// The weighted sum is accumulated left to right starting from the bias.
    pub fn build(&self, arena: &mut Arena, inputs: &[NodeId]) -> Result<NodeId, LayerGradError> {
        if inputs.len() != self.weights.len() {
            return Err(LayerGradError::ShapeMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
                operation: "Neuron::build".to_string(),
            });
        }
        let mut act = self.bias;
        for (&w, &x) in self.weights.iter().zip(inputs) {
            let wx = arena.mul(w, x);
            act = arena.add(act, wx);
        }
        Ok(arena.tanh(act))
    }
}

#[cfg(test)]
#[path = "neuron_test.rs"]
mod tests;
