use crate::arena::{Arena, NodeId};
use crate::error::LayerGradError;

/// Builds `Σ (predᵢ - targetᵢ)²` as a chain of additions starting from a constant `0`,
/// and returns the loss node.
pub fn sum_squared_error(
    arena: &mut Arena,
    predictions: &[NodeId],
    targets: &[NodeId],
) -> Result<NodeId, LayerGradError> {
    if predictions.len() != targets.len() {
        return Err(LayerGradError::ShapeMismatch {
            expected: predictions.len(),
            actual: targets.len(),
            operation: "sum_squared_error".to_string(),
        });
    }
    let two = arena.constant(2.0);
    let mut loss = arena.constant(0.0);
    for (&pred, &target) in predictions.iter().zip(targets) {
        let diff = arena.sub(pred, target);
        let sq = arena.pow_const(diff, two);
        loss = arena.add(loss, sq);
    }
    Ok(loss)
}

#[cfg(test)]
#[path = "loss_test.rs"]
mod tests;
