//! Power with a constant exponent.
//!
//! The exponent is a graph node so that it can be shared like any other constant, but
//! it is not differentiated: callers must pass a constant leaf, and no gradient is
//! ever written to it.

use crate::arena::{Arena, NodeId};
use crate::node::Op;

impl Arena {
    /// `base ^ exponent`, with `exponent` treated as a constant.
    pub fn pow_const(&mut self, base: NodeId, exponent: NodeId) -> NodeId {
        self.push_op(Op::PowConst { base, exponent })
    }
}

// --- Forward Operation ---

#[inline]
pub fn pow_const_forward(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}

// --- Backward Operation ---

/// Contribution to the base's gradient: `b * a^(b-1) * grad`.
#[inline]
pub fn pow_const_backward(base: f64, exponent: f64, grad: f64) -> f64 {
    exponent * base.powf(exponent - 1.0) * grad
}

#[cfg(test)]
#[path = "pow_test.rs"]
mod tests;
