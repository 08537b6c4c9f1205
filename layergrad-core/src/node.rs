//! # Nodes and operation dispatch
//!
//! A node is a scalar `data` value, a `grad` accumulator and an [`Op`] describing how
//! the value is produced from its parents. The operation enum carries exactly the
//! parent handles its arity needs, so a malformed node cannot be expressed.
//!
//! [`forward`] and [`backward`] dispatch to the per-operation rules in
//! [`crate::ops`]. They only read settled inputs and write their own outputs; choosing
//! a valid invocation order is the caller's job (sequential executor or scheduler).

use crate::arena::{NodeId, NodeStore};
use crate::ops::{activation, arithmetic, pow};

/// Operation tag without the parent handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Empty,
    Add,
    Sub,
    Mul,
    Div,
    PowConst,
    Neg,
    Tanh,
    Relu,
}

/// How a node's value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Constant, input or weight. Never recomputed.
    Leaf,
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Div(NodeId, NodeId),
    /// `base ^ exponent`. The exponent must be a constant leaf: it never receives a
    /// gradient.
    PowConst { base: NodeId, exponent: NodeId },
    Neg(NodeId),
    Tanh(NodeId),
    Relu(NodeId),
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::Leaf => OpKind::Empty,
            Op::Add(..) => OpKind::Add,
            Op::Sub(..) => OpKind::Sub,
            Op::Mul(..) => OpKind::Mul,
            Op::Div(..) => OpKind::Div,
            Op::PowConst { .. } => OpKind::PowConst,
            Op::Neg(_) => OpKind::Neg,
            Op::Tanh(_) => OpKind::Tanh,
            Op::Relu(_) => OpKind::Relu,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Neg(_) | Op::Tanh(_) | Op::Relu(_) => 1,
            _ => 2,
        }
    }

    /// Parent handles in slot order. Unused slots are `None`.
    pub fn parents(&self) -> [Option<NodeId>; 2] {
        match *self {
            Op::Leaf => [None, None],
            Op::Add(a, b) | Op::Sub(a, b) | Op::Mul(a, b) | Op::Div(a, b) => [Some(a), Some(b)],
            Op::PowConst { base, exponent } => [Some(base), Some(exponent)],
            Op::Neg(a) | Op::Tanh(a) | Op::Relu(a) => [Some(a), None],
        }
    }

    /// Parents that receive a gradient from this node during `backward`.
    pub(crate) fn grad_parents(&self) -> [Option<NodeId>; 2] {
        match *self {
            Op::PowConst { base, .. } => [Some(base), None],
            _ => self.parents(),
        }
    }
}

/// Point-in-time copy of a node, returned by [`Arena::node`](crate::Arena::node).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub op: Op,
    pub data: f64,
    pub grad: f64,
}

/// Receiver of the gradient contributions produced by [`backward`].
///
/// `slot` is the parent position (0 or 1) within the producing node's [`Op`].
pub(crate) trait GradSink {
    fn accumulate(&mut self, slot: usize, parent: NodeId, delta: f64);
}

/// Adds every contribution straight into the parent's accumulator.
pub(crate) struct DirectSink<'a>(pub(crate) &'a NodeStore);

impl GradSink for DirectSink<'_> {
    #[inline]
    fn accumulate(&mut self, _slot: usize, parent: NodeId, delta: f64) {
        self.0.add_grad(parent, delta);
    }
}

/// Recomputes `id`'s value from its parents' values.
pub(crate) fn forward(store: &NodeStore, id: NodeId, op: Op) {
    let value = match op {
        Op::Leaf => return,
        Op::Add(a, b) => arithmetic::add_forward(store.data(a), store.data(b)),
        Op::Sub(a, b) => arithmetic::sub_forward(store.data(a), store.data(b)),
        Op::Mul(a, b) => arithmetic::mul_forward(store.data(a), store.data(b)),
        Op::Div(a, b) => arithmetic::div_forward(store.data(a), store.data(b)),
        Op::PowConst { base, exponent } => {
            pow::pow_const_forward(store.data(base), store.data(exponent))
        }
        Op::Neg(a) => arithmetic::neg_forward(store.data(a)),
        Op::Tanh(a) => activation::tanh_forward(store.data(a)),
        Op::Relu(a) => activation::relu_forward(store.data(a)),
    };
    store.set_data(id, value);
}

/// Pushes `id`'s gradient contributions to its parents through `sink`.
pub(crate) fn backward<S: GradSink>(store: &NodeStore, id: NodeId, op: Op, sink: &mut S) {
    let grad = store.grad(id);
    match op {
        Op::Leaf => {}
        Op::Add(a, b) => {
            let [da, db] = arithmetic::add_backward(grad);
            sink.accumulate(0, a, da);
            sink.accumulate(1, b, db);
        }
        Op::Sub(a, b) => {
            let [da, db] = arithmetic::sub_backward(grad);
            sink.accumulate(0, a, da);
            sink.accumulate(1, b, db);
        }
        Op::Mul(a, b) => {
            let [da, db] = arithmetic::mul_backward(store.data(a), store.data(b), grad);
            sink.accumulate(0, a, da);
            sink.accumulate(1, b, db);
        }
        Op::Div(a, b) => {
            let [da, db] = arithmetic::div_backward(store.data(a), store.data(b), grad);
            sink.accumulate(0, a, da);
            sink.accumulate(1, b, db);
        }
        Op::PowConst { base, exponent } => {
            let d = pow::pow_const_backward(store.data(base), store.data(exponent), grad);
            sink.accumulate(0, base, d);
        }
        Op::Neg(a) => sink.accumulate(0, a, arithmetic::neg_backward(grad)),
        Op::Tanh(a) => sink.accumulate(0, a, activation::tanh_backward(store.data(id), grad)),
        Op::Relu(a) => sink.accumulate(0, a, activation::relu_backward(store.data(id), grad)),
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;
