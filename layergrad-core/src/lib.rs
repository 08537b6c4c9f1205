//! # layergrad
//!
//! Reverse-mode automatic differentiation over scalar computation graphs, with a
//! layered execution plan that a persistent worker pool runs in parallel.
//!
//! ```
//! use layergrad_core::{Arena, Topology};
//!
//! let mut arena = Arena::new();
//! let a = arena.constant(-2.0);
//! let b = arena.constant(3.0);
//! let e = arena.add(a, b);
//!
//! let topo = Topology::build(&arena, e);
//! topo.run();
//! assert_eq!(arena.data(e), 1.0);
//! assert_eq!(arena.grad(a), 1.0);
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod executor;
pub mod nn;
pub mod node;
pub mod ops;
pub mod scheduler;
pub mod topology;
pub mod utils;

pub use arena::{Arena, NodeId};
pub use config::RuntimeConfig;
pub use error::LayerGradError;
pub use executor::{Executor, SequentialExecutor};
pub use node::{Node, Op, OpKind};
pub use scheduler::{ParallelScheduler, WorkerState};
pub use topology::{Layer, Topology};
