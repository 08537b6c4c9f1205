use crate::arena::{Arena, NodeId};
use crate::error::LayerGradError;
use crate::nn::init::InitScheme;
use crate::nn::module::Module;
use crate::nn::neuron::Neuron;
use rand::Rng;

/// Fully connected layer of [`Neuron`]s sharing the same inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    num_inputs: usize,
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        arena: &mut Arena,
        num_inputs: usize,
        num_outputs: usize,
        scheme: InitScheme,
        rng: &mut R,
    ) -> Result<Self, LayerGradError> {
        let neurons = (0..num_outputs)
            .map(|_| Neuron::new(arena, num_inputs, scheme, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Layer {
            num_inputs,
            neurons,
        })
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }
}

impl Module for Layer {
    fn build(&self, arena: &mut Arena, inputs: &[NodeId]) -> Result<Vec<NodeId>, LayerGradError> {
        if inputs.len() != self.num_inputs {
            return Err(LayerGradError::ShapeMismatch {
                expected: self.num_inputs,
                actual: inputs.len(),
                operation: "Layer::build".to_string(),
            });
        }
        self.neurons
            .iter()
            .map(|neuron| neuron.build(arena, inputs))
            .collect()
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.neurons.iter().flat_map(Neuron::parameters).collect()
    }

    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        self.neurons.len()
    }
}
