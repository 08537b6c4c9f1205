use layergrad_core::{Arena, NodeId};
use std::sync::Once;

static INIT: Once = Once::new();

// Each integration test binary compiles this module on its own and uses a subset.
#[allow(dead_code)]
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Handles of the composite polynomial graph.
#[allow(dead_code)]
pub struct Polynomial {
    pub a: NodeId,
    pub b: NodeId,
    pub g: NodeId,
}

/// ```text
/// c = a + b;  d = a*b + b^3
/// c += c + 1;  c += 1 + c + (-a)
/// d += d*2 + relu(b + a);  d += 3*d + relu(b - a)
/// e = c - d;  f = e^2;  g = f/2 + 10/f
/// ```
/// with `a = -4`, `b = 2`.
#[allow(dead_code)]
pub fn build_polynomial(arena: &mut Arena) -> Polynomial {
    let a = arena.constant(-4.0);
    let b = arena.constant(2.0);

    let c = arena.add(a, b);
    let ab = arena.mul(a, b);
    let three = arena.constant(3.0);
    let b3 = arena.pow_const(b, three);
    let d = arena.add(ab, b3);

    let one = arena.constant(1.0);
    let c1 = arena.add(c, one);
    let c = arena.add(c, c1);
    let one = arena.constant(1.0);
    let one_c = arena.add(one, c);
    let neg_a = arena.neg(a);
    let rhs = arena.add(one_c, neg_a);
    let c = arena.add(c, rhs);

    let two = arena.constant(2.0);
    let d2 = arena.mul(d, two);
    let bpa = arena.add(b, a);
    let relu1 = arena.relu(bpa);
    let rhs = arena.add(d2, relu1);
    let d = arena.add(d, rhs);
    let three = arena.constant(3.0);
    let d3 = arena.mul(three, d);
    let bma = arena.sub(b, a);
    let relu2 = arena.relu(bma);
    let rhs = arena.add(d3, relu2);
    let d = arena.add(d, rhs);

    let e = arena.sub(c, d);
    let two = arena.constant(2.0);
    let f = arena.pow_const(e, two);
    let two = arena.constant(2.0);
    let half = arena.div(f, two);
    let ten = arena.constant(10.0);
    let ten_f = arena.div(ten, f);
    let g = arena.add(half, ten_f);

    Polynomial { a, b, g }
}

/// The four-sample toy dataset: inputs and targets.
#[allow(dead_code)]
pub fn toy_dataset() -> (Vec<[f64; 3]>, Vec<f64>) {
    (
        vec![
            [2.0, 3.0, -1.0],
            [3.0, -1.0, 0.5],
            [0.5, 1.0, 1.0],
            [1.0, 1.0, -1.0],
        ],
        vec![1.0, -1.0, -1.0, 1.0],
    )
}
