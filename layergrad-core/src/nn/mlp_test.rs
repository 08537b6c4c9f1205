use super::*;
use crate::topology::Topology;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn toy_mlp(arena: &mut Arena, seed: u64) -> Mlp {
    let mut rng = StdRng::seed_from_u64(seed);
    Mlp::new(arena, 3, &[4, 4, 1], &mut rng).unwrap()
}

#[test]
fn test_shape_and_parameter_count() {
    let mut arena = Arena::new();
    let mlp = toy_mlp(&mut arena, 0);
    assert_eq!(mlp.layers().len(), 3);
    assert_eq!(mlp.num_inputs(), 3);
    assert_eq!(mlp.num_outputs(), 1);
    // (3 + 1) * 4 + (4 + 1) * 4 + (4 + 1) * 1
    assert_eq!(mlp.num_parameters(), 41);
    assert_eq!(arena.len(), 41);
}

#[test]
fn test_same_seed_same_weights() {
    let mut a = Arena::new();
    let mut b = Arena::new();
    let ma = toy_mlp(&mut a, 5);
    let mb = toy_mlp(&mut b, 5);
    let wa: Vec<f64> = ma.parameters().into_iter().map(|p| a.data(p)).collect();
    let wb: Vec<f64> = mb.parameters().into_iter().map(|p| b.data(p)).collect();
    assert_eq!(wa, wb);
}

#[test]
fn test_build_output_in_tanh_range() {
    let mut arena = Arena::new();
    let mlp = toy_mlp(&mut arena, 1);
    let x = [arena.constant(2.0), arena.constant(3.0), arena.constant(-1.0)];
    let out = mlp.build(&mut arena, &x).unwrap();
    assert_eq!(out.len(), 1);

    let topo = Topology::build(&arena, out[0]);
    topo.run();
    assert!(arena.data(out[0]).abs() <= 1.0);
    assert_eq!(arena.grad(out[0]), 1.0);
    // Every parameter feeds the single output.
    for p in mlp.parameters() {
        assert!(topo.layer_of(p).is_some());
    }
}

#[test]
fn test_builds_share_parameters() {
    let mut arena = Arena::new();
    let mlp = toy_mlp(&mut arena, 2);
    let params = arena.len();
    let x1 = [arena.constant(1.0), arena.constant(0.0), arena.constant(-1.0)];
    let x2 = [arena.constant(0.5), arena.constant(0.5), arena.constant(0.5)];
    let y1 = mlp.build(&mut arena, &x1).unwrap()[0];
    let y2 = mlp.build(&mut arena, &x2).unwrap()[0];
    assert_ne!(y1, y2);
    assert_eq!(mlp.num_parameters(), params);
    let topo = Topology::build_from_roots(&arena, &[y1, y2]).unwrap();
    assert_eq!(topo.roots(), vec![y1, y2]);
}

#[test]
fn test_build_rejects_wrong_input_count() {
    let mut arena = Arena::new();
    let mlp = toy_mlp(&mut arena, 3);
    let x = [arena.constant(1.0), arena.constant(2.0)];
    let err = mlp.build(&mut arena, &x).unwrap_err();
    assert_eq!(
        err,
        LayerGradError::ShapeMismatch {
            expected: 3,
            actual: 2,
            operation: "Mlp::build".to_string(),
        }
    );
}

#[test]
fn test_normal_scheme() {
    let mut arena = Arena::new();
    let mut rng = StdRng::seed_from_u64(4);
    let scheme = InitScheme::normal(0.0, 0.01).unwrap();
    let mlp = Mlp::with_scheme(&mut arena, 2, &[3], scheme, &mut rng).unwrap();
    for p in mlp.parameters() {
        assert!(arena.data(p).abs() < 0.1);
    }

    let bad = InitScheme::Normal {
        mean: 0.0,
        std_dev: -1.0,
    };
    assert!(Mlp::with_scheme(&mut arena, 2, &[3], bad, &mut rng).is_err());
}

#[test]
fn test_random_constructor() {
    let mut arena = Arena::new();
    let mlp = Mlp::random(&mut arena, 2, &[2, 1]).unwrap();
    assert_eq!(mlp.num_parameters(), 3 * 2 + 3);
}
