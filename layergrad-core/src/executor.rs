//! Executors run a [`Topology`]: forward sweep, gradient reset/seed, backward sweep,
//! and the gradient-step update.
//!
//! [`SequentialExecutor`] is the single-threaded reference. The
//! [`ParallelScheduler`](crate::scheduler::ParallelScheduler) implements the same
//! trait and must produce identical values.

use crate::error::LayerGradError;
use crate::node::{self, DirectSink};
use crate::topology::{Plan, Step, Topology};

/// Common interface of the sequential and parallel executors.
pub trait Executor {
    /// Forward sweep, gradient reset/seed, then backward sweep.
    fn run(&mut self, topology: &Topology) -> Result<(), LayerGradError>;

    /// Forward sweep only.
    fn run_forward(&mut self, topology: &Topology) -> Result<(), LayerGradError>;

    /// `data += step * grad` for every node of the topology.
    fn update(&mut self, topology: &Topology, step: f64) -> Result<(), LayerGradError>;
}

/// Single-threaded reference executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn run(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        topology.run();
        Ok(())
    }

    fn run_forward(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        topology.run_forward();
        Ok(())
    }

    fn update(&mut self, topology: &Topology, step: f64) -> Result<(), LayerGradError> {
        topology.update(step);
        Ok(())
    }
}

pub(crate) fn forward_sweep(plan: &Plan) {
    for layer in &plan.layers {
        for step in layer.steps() {
            node::forward(&plan.store, step.node, step.op);
        }
    }
}

pub(crate) fn backward_sweep(plan: &Plan) {
    let mut sink = DirectSink(&plan.store);
    for layer in plan.layers.iter().rev() {
        for step in layer.steps() {
            node::backward(&plan.store, step.node, step.op, &mut sink);
        }
    }
}

/// Zeroes every gradient, then seeds each node of the final layer with `1`.
pub(crate) fn reset_grads(plan: &Plan) {
    for layer in &plan.layers {
        for step in layer.steps() {
            plan.store.set_grad(step.node, 0.0);
        }
    }
    if let Some(last) = plan.layers.last() {
        for step in last.steps() {
            plan.store.set_grad(step.node, 1.0);
        }
    }
}

pub(crate) fn update_all(plan: &Plan, step: f64) {
    for layer in &plan.layers {
        update_slice(plan, layer.steps(), step);
    }
}

pub(crate) fn update_slice(plan: &Plan, steps: &[Step], step: f64) {
    for s in steps {
        let grad = plan.store.grad(s.node);
        plan.store.add_data(s.node, step * grad);
    }
}
