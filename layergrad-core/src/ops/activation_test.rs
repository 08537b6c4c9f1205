use super::*;
use crate::topology::Topology;
use approx::assert_relative_eq;

#[test]
fn test_tanh_forward_matches_std() {
    for &x in &[-3.0, -0.5, 0.0, 0.25, 2.0] {
        assert_relative_eq!(tanh_forward(x), f64::tanh(x), epsilon = 1e-12);
    }
}

#[test]
fn test_tanh_saturates_on_overflow() {
    assert_eq!(tanh_forward(1000.0), 1.0);
    assert_relative_eq!(tanh_forward(-1000.0), -1.0);
}

#[test]
fn test_tanh_backward() {
    let out = tanh_forward(0.5);
    assert_relative_eq!(tanh_backward(out, 2.0), 2.0 * (1.0 - out * out));
}

#[test]
fn test_relu_rules() {
    assert_eq!(relu_forward(-2.0), 0.0);
    assert_eq!(relu_forward(0.0), 0.0);
    assert_eq!(relu_forward(3.5), 3.5);
    assert_eq!(relu_backward(3.5, 2.0), 2.0);
    assert_eq!(relu_backward(0.0, 2.0), 0.0);
}

#[test]
fn test_relu_gradient_through_graph() {
    let mut arena = Arena::new();
    let pos = arena.constant(1.5);
    let neg = arena.constant(-1.5);
    let rp = arena.relu(pos);
    let rn = arena.relu(neg);
    let sum = arena.add(rp, rn);
    let topo = Topology::build(&arena, sum);
    topo.run();
    assert_eq!(arena.data(sum), 1.5);
    assert_eq!(arena.grad(pos), 1.0);
    assert_eq!(arena.grad(neg), 0.0);
}
