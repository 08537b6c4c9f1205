//! # Topology Builder
//!
//! A [`Topology`] is the execution plan for the sub-graph reachable from one root (or a
//! set of roots). Nodes are partitioned into layers by longest-path distance from the
//! leaves:
//!
//! ```text
//! layer(n) = 0                            if n has no parents
//! layer(n) = 1 + max(layer(p) for p in n) otherwise
//! ```
//!
//! Every node therefore sits in a strictly higher layer than each of its parents, so
//! all nodes of one layer can be computed at the same time once the previous layers
//! are done (forward), or in reverse layer order for the backward pass.
//!
//! The plan copies each node's [`Op`] and shares the arena's value cells, which lets
//! scheduler threads execute it without touching the [`Arena`]. Building is a single
//! depth-first traversal, cheap enough to repeat; rebuilding for an unchanged graph
//! shape produces an identical plan.
//!
//! While building, each layer also records which parents receive gradient from two or
//! more distinct nodes of that layer ("contended" parents). The parallel scheduler
//! stages those contributions instead of writing them concurrently.

mod build;

use crate::arena::{Arena, NodeId, NodeStore};
use crate::error::LayerGradError;
use crate::executor;
use crate::node::Op;
use std::fmt;
use std::sync::Arc;

/// One unit of work in a layer: the node and a copy of its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) node: NodeId,
    pub(crate) op: Op,
    /// Per parent slot: the contribution goes to a contended parent.
    pub(crate) staged: [bool; 2],
}

/// Nodes at equal longest-path distance from the leaves, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    steps: Vec<Step>,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|step| step.node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.steps.iter().any(|step| step.node == id)
    }

    /// Number of parent slots whose gradient must be merged after the layer's barrier.
    pub fn num_staged(&self) -> usize {
        self.steps
            .iter()
            .map(|step| step.staged.iter().filter(|s| **s).count())
            .sum()
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[derive(Debug)]
pub(crate) struct Plan {
    pub(crate) layers: Vec<Layer>,
    pub(crate) store: NodeStore,
}

/// Layered execution plan for a root's sub-graph. See the [module docs](self).
///
/// Cloning is cheap and yields a handle to the same plan.
#[derive(Debug, Clone)]
pub struct Topology {
    plan: Arc<Plan>,
}

impl Topology {
    /// Builds the plan for everything reachable from `root`.
    ///
    /// # Panics
    /// Panics if `root` does not belong to `arena`.
    pub fn build(arena: &Arena, root: NodeId) -> Self {
        Topology::from_layers(arena, build::layer_nodes(arena, &[root]))
    }

    /// Builds one plan covering several roots. Roots that end up in the final layer
    /// are all seeded with a unit gradient by the executors.
    pub fn build_from_roots(arena: &Arena, roots: &[NodeId]) -> Result<Self, LayerGradError> {
        if roots.is_empty() {
            return Err(LayerGradError::EmptyRootSet);
        }
        Ok(Topology::from_layers(arena, build::layer_nodes(arena, roots)))
    }

    fn from_layers(arena: &Arena, buckets: Vec<Vec<(NodeId, Op)>>) -> Self {
        let layers: Vec<Layer> = buckets
            .into_iter()
            .map(|bucket| Layer {
                steps: build::mark_contended(bucket),
            })
            .collect();
        let topology = Topology {
            plan: Arc::new(Plan {
                layers,
                store: arena.store().clone(),
            }),
        };
        log::debug!(
            "Built topology: {} layers, {} nodes, {} staged parent slots",
            topology.num_layers(),
            topology.num_parameters(),
            topology.layers().iter().map(Layer::num_staged).sum::<usize>()
        );
        topology
    }

    pub fn num_layers(&self) -> usize {
        self.plan.layers.len()
    }

    /// Number of nodes in the plan: every reachable node, not only the leaf weights.
    pub fn num_parameters(&self) -> usize {
        self.plan.layers.iter().map(Layer::len).sum()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.plan.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.plan.layers.iter().map(Layer::len).collect()
    }

    /// Node handles per layer, in execution order.
    pub fn layer_nodes(&self) -> Vec<Vec<NodeId>> {
        self.plan
            .layers
            .iter()
            .map(|layer| layer.nodes().collect())
            .collect()
    }

    /// Layer index of `id`, if the node is part of this plan.
    pub fn layer_of(&self, id: NodeId) -> Option<usize> {
        self.plan.layers.iter().position(|layer| layer.contains(id))
    }

    /// Nodes of the final layer; these are seeded with `grad = 1`.
    pub fn roots(&self) -> Vec<NodeId> {
        self.plan
            .layers
            .last()
            .map(|layer| layer.nodes().collect())
            .unwrap_or_default()
    }

    /// Sequential forward sweep, gradient reset/seed and backward sweep.
    pub fn run(&self) {
        executor::forward_sweep(&self.plan);
        executor::reset_grads(&self.plan);
        executor::backward_sweep(&self.plan);
    }

    /// Sequential forward sweep only.
    pub fn run_forward(&self) {
        executor::forward_sweep(&self.plan);
    }

    /// Zeroes every gradient in the plan and seeds the final layer with `1`.
    pub fn reset_grads(&self) {
        executor::reset_grads(&self.plan);
    }

    /// `data += step * grad` for every node in the plan. Pass a negative `step` for
    /// gradient descent.
    pub fn update(&self, step: f64) {
        executor::update_all(&self.plan, step);
    }

    pub(crate) fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }
}

impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        self.plan.layers == other.plan.layers
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Num Layers: {}, Num Parameters: {}",
            self.num_layers(),
            self.num_parameters()
        )?;
        for (i, layer) in self.plan.layers.iter().enumerate() {
            writeln!(f, "[layer {}] Num parameters: {}", i, layer.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "topology_test.rs"]
mod tests;
