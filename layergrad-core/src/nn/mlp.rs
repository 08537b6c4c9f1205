use crate::arena::{Arena, NodeId};
use crate::error::LayerGradError;
use crate::nn::init::InitScheme;
use crate::nn::layer::Layer;
use crate::nn::module::Module;
use rand::Rng;

/// Multi-layer perceptron: a stack of [`Layer`]s, each feeding the next.
///
/// ```
/// use layergrad_core::nn::{Mlp, Module};
/// use layergrad_core::{Arena, Topology};
/// use rand::SeedableRng;
///
/// let mut arena = Arena::new();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let mlp = Mlp::new(&mut arena, 3, &[4, 4, 1], &mut rng).unwrap();
///
/// let x = [arena.constant(2.0), arena.constant(3.0), arena.constant(-1.0)];
/// let out = mlp.build(&mut arena, &x).unwrap();
/// Topology::build(&arena, out[0]).run();
/// assert!(arena.data(out[0]).abs() <= 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mlp {
    num_inputs: usize,
    layers: Vec<Layer>,
}

impl Mlp {
    /// Network with `num_inputs` inputs and one layer per entry of `sizes`, initialised
    /// uniformly in `[-1, 1]` from `rng`.
    pub fn new<R: Rng + ?Sized>(
        arena: &mut Arena,
        num_inputs: usize,
        sizes: &[usize],
        rng: &mut R,
    ) -> Result<Self, LayerGradError> {
        Mlp::with_scheme(arena, num_inputs, sizes, InitScheme::default(), rng)
    }

    /// Same as [`Mlp::new`], seeded from the thread-local generator.
    pub fn random(
        arena: &mut Arena,
        num_inputs: usize,
        sizes: &[usize],
    ) -> Result<Self, LayerGradError> {
        Mlp::new(arena, num_inputs, sizes, &mut rand::thread_rng())
    }

    pub fn with_scheme<R: Rng + ?Sized>(
        arena: &mut Arena,
        num_inputs: usize,
        sizes: &[usize],
        scheme: InitScheme,
        rng: &mut R,
    ) -> Result<Self, LayerGradError> {
        scheme.validate()?;
        let mut layers = Vec::with_capacity(sizes.len());
        let mut fan_in = num_inputs;
        for &size in sizes {
            layers.push(Layer::new(arena, fan_in, size, scheme, rng)?);
            fan_in = size;
        }
        log::debug!(
            "Created MLP {} -> {:?} with {} parameters",
            num_inputs,
            sizes,
            layers.iter().map(Module::num_parameters).sum::<usize>()
        );
        Ok(Mlp { num_inputs, layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

impl Module for Mlp {
    fn build(&self, arena: &mut Arena, inputs: &[NodeId]) -> Result<Vec<NodeId>, LayerGradError> {
        if inputs.len() != self.num_inputs {
            return Err(LayerGradError::ShapeMismatch {
                expected: self.num_inputs,
                actual: inputs.len(),
                operation: "Mlp::build".to_string(),
            });
        }
        let mut x = inputs.to_vec();
        for layer in &self.layers {
            x = layer.build(arena, &x)?;
        }
        Ok(x)
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.layers.iter().flat_map(Module::parameters).collect()
    }

    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        self.layers
            .last()
            .map(Module::num_outputs)
            .unwrap_or(self.num_inputs)
    }
}

#[cfg(test)]
#[path = "mlp_test.rs"]
mod tests;
