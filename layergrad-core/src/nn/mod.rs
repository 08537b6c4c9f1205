//! # Neural Network Building Blocks (`nn`)
//!
//! Small multi-layer perceptrons expressed directly as scalar graph nodes. A network
//! owns only the handles of its parameters (weights and biases, all leaves of the
//! arena); [`Module::build`] appends the nodes computing the network's outputs for a
//! given set of input nodes. Building the same network for several inputs shares the
//! parameters between the resulting sub-graphs.

pub mod init;
pub mod layer;
pub mod loss;
pub mod mlp;
pub mod module;
pub mod neuron;

pub use init::InitScheme;
pub use layer::Layer;
pub use mlp::Mlp;
pub use module::Module;
pub use neuron::Neuron;
