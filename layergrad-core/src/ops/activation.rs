//! Activation functions: tanh and relu.
//!
//! Both backward rules are written in terms of the node's own output value, which is
//! already settled when the backward pass reaches it.

use crate::arena::{Arena, NodeId};
use crate::node::Op;

impl Arena {
    pub fn tanh(&mut self, a: NodeId) -> NodeId {
        self.push_op(Op::Tanh(a))
    }

    /// Rectified linear unit, `max(a, 0)`.
    pub fn relu(&mut self, a: NodeId) -> NodeId {
        self.push_op(Op::Relu(a))
    }
}

// --- Forward Operation ---

/// `(e^(2a) - 1) / (e^(2a) + 1)`.
///
/// Saturates to `1.0` once `e^(2a)` overflows, where the quotient would be `inf / inf`.
#[inline]
pub fn tanh_forward(a: f64) -> f64 {
    let ex = (2.0 * a).exp();
    if ex.is_infinite() {
        return 1.0;
    }
    (ex - 1.0) / (ex + 1.0)
}

#[inline]
pub fn relu_forward(a: f64) -> f64 {
    if a < 0.0 {
        0.0
    } else {
        a
    }
}

// --- Backward Operation ---

#[inline]
pub fn tanh_backward(out: f64, grad: f64) -> f64 {
    (1.0 - out * out) * grad
}

#[inline]
pub fn relu_backward(out: f64, grad: f64) -> f64 {
    if out > 0.0 {
        grad
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
