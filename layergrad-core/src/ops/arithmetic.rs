//! Element-wise arithmetic on scalar nodes: add, sub, mul, div, neg.

use crate::arena::{Arena, NodeId};
use crate::node::Op;

// --- Builders ---

impl Arena {
    /// `a + b`
    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_op(Op::Add(a, b))
    }

    /// `a - b`
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_op(Op::Sub(a, b))
    }

    /// `a * b`
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_op(Op::Mul(a, b))
    }

    /// `a / b`
    pub fn div(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_op(Op::Div(a, b))
    }

    /// `-a`
    pub fn neg(&mut self, a: NodeId) -> NodeId {
        self.push_op(Op::Neg(a))
    }
}

// --- Forward Operation ---

#[inline]
pub fn add_forward(a: f64, b: f64) -> f64 {
    a + b
}

#[inline]
pub fn sub_forward(a: f64, b: f64) -> f64 {
    a - b
}

#[inline]
pub fn mul_forward(a: f64, b: f64) -> f64 {
    a * b
}

#[inline]
pub fn div_forward(a: f64, b: f64) -> f64 {
    a / b
}

#[inline]
pub fn neg_forward(a: f64) -> f64 {
    -a
}

// --- Backward Operation ---
//
// Each rule returns the amount to add to every parent's gradient, in slot order.
// A rule written as `parent -= x` returns `-x`; adding a negated value is exact in
// IEEE arithmetic, so both forms give the same bits.

#[inline]
pub fn add_backward(grad: f64) -> [f64; 2] {
    [grad, grad]
}

#[inline]
pub fn sub_backward(grad: f64) -> [f64; 2] {
    [grad, -grad]
}

#[inline]
pub fn mul_backward(a: f64, b: f64, grad: f64) -> [f64; 2] {
    [b * grad, a * grad]
}

#[inline]
pub fn div_backward(a: f64, b: f64, grad: f64) -> [f64; 2] {
    [grad / b, -((a / (b * b)) * grad)]
}

#[inline]
pub fn neg_backward(grad: f64) -> f64 {
    -grad
}

#[cfg(test)]
#[path = "arithmetic_test.rs"]
mod tests;
