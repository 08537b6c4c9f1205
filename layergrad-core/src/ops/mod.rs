//! # Graph Operations Module (`ops`)
//!
//! Every operation supported by the engine lives here, grouped by family. Each
//! operation provides three pieces:
//!
//! - **Builder:** a method on [`Arena`](crate::Arena) (`add`, `tanh`, ...) that
//!   allocates the result node and wires its parents. Builders are the only way to
//!   create non-leaf nodes, which keeps the graph acyclic: a node can only reference
//!   nodes that already exist.
//! - **`xxx_forward`:** the value of the node given its parents' values.
//! - **`xxx_backward`:** the contribution to each parent's gradient given the node's
//!   own settled gradient (chain rule).
//!
//! The rules are plain functions over `f64` so they can be tested in isolation;
//! [`crate::node`] dispatches to them.
//!
//! ## Submodules:
//!
//! - [`arithmetic`]: add, sub, mul, div, neg.
//! - [`pow`]: power with a constant exponent.
//! - [`activation`]: tanh, relu.

pub mod activation;
pub mod arithmetic;
pub mod pow;

use crate::arena::{Arena, NodeId};
use crate::node::Op;

impl Arena {
    /// Creates a leaf node holding `value`.
    pub fn constant(&mut self, value: f64) -> NodeId {
        self.push(Op::Leaf, value)
    }

    /// Allocates a computed node after checking that its parents belong to this arena.
    pub(crate) fn push_op(&mut self, op: Op) -> NodeId {
        for parent in op.parents().into_iter().flatten() {
            assert!(
                self.contains(parent),
                "Parent {} does not belong to this arena ({} nodes)",
                parent,
                self.len()
            );
        }
        self.push(op, 0.0)
    }
}
