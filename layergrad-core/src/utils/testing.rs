use crate::arena::{Arena, NodeId};
use crate::topology::Topology;
use rand::Rng;

/// Checks that `actual` and `expected` have the same length and agree within
/// `tolerance`. Panics with the first offending index otherwise.
pub fn check_values_near(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Value mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Builds a random DAG over `leaves` leaf nodes and `inner` computed nodes, then folds
/// every computed node into a single root with `add`, which is returned.
///
/// Parents are drawn among the nodes created so far, so shared parents (and the
/// `x * x` pattern) are common. Two extra constants are shared by many nodes: the
/// exponent of every `pow_const` (also usable as an ordinary parent) and the divisor of
/// every `div`, which keeps quotients finite.
pub fn random_graph<R: Rng>(arena: &mut Arena, rng: &mut R, leaves: usize, inner: usize) -> NodeId {
    let mut nodes: Vec<NodeId> = (0..leaves.max(1))
        .map(|_| arena.constant(rng.gen_range(-1.0..1.0)))
        .collect();
    let exponent = arena.constant(2.0);
    let divisor = arena.constant(1.5);
    nodes.push(exponent);
    nodes.push(divisor);
    let fixed = nodes.len();

    for _ in 0..inner {
        let a = nodes[rng.gen_range(0..nodes.len())];
        let b = nodes[rng.gen_range(0..nodes.len())];
        let id = match rng.gen_range(0..8) {
            0 => arena.add(a, b),
            1 => arena.sub(a, b),
            2 => arena.mul(a, b),
            3 => arena.tanh(a),
            4 => arena.neg(b),
            5 => arena.div(a, divisor),
            6 => {
                // Squares of bounded values stay bounded.
                let t = arena.tanh(a);
                arena.pow_const(t, exponent)
            }
            _ => arena.relu(a),
        };
        nodes.push(id);
    }
    let first = nodes[0];
    nodes
        .into_iter()
        .skip(fixed)
        .reduce(|acc, n| arena.add(acc, n))
        .unwrap_or(first)
}

/// `(data, grad)` bit patterns of every node in `topology`, layer by layer.
pub fn snapshot_bits(arena: &Arena, topology: &Topology) -> Vec<(u64, u64)> {
    topology
        .layers()
        .iter()
        .flat_map(|layer| layer.nodes())
        .map(|id| (arena.data(id).to_bits(), arena.grad(id).to_bits()))
        .collect()
}

/// Leaf values of `topology` (its first layer), in plan order.
pub fn leaf_values(arena: &Arena, topology: &Topology) -> Vec<f64> {
    topology
        .layers()
        .first()
        .map(|layer| layer.nodes().map(|id| arena.data(id)).collect())
        .unwrap_or_default()
}
