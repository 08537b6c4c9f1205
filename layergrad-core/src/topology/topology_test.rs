use super::*;
use crate::utils::testing::{leaf_values, random_graph};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn assert_parents_below(arena: &Arena, topo: &Topology) {
    for (k, layer) in topo.layers().iter().enumerate() {
        for id in layer.nodes() {
            for parent in arena.op(id).parents().into_iter().flatten() {
                let pk = topo.layer_of(parent).expect("parent must be in the plan");
                assert!(pk < k, "parent {} in layer {} >= child {} in layer {}", parent, pk, id, k);
            }
        }
    }
}

#[test]
fn test_leaf_root_yields_single_layer() {
    let mut arena = Arena::new();
    let a = arena.constant(3.0);
    let topo = Topology::build(&arena, a);
    assert_eq!(topo.num_layers(), 1);
    assert_eq!(topo.layer_nodes(), vec![vec![a]]);
    assert_eq!(topo.roots(), vec![a]);
}

#[test]
fn test_layers_follow_longest_path() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let c = arena.add(a, b); // layer 1
    let d = arena.tanh(c); // layer 2
    let e = arena.mul(d, a); // layer 3, even though `a` is a leaf
    let topo = Topology::build(&arena, e);
    assert_eq!(topo.layer_nodes(), vec![vec![a, b], vec![c], vec![d], vec![e]]);
    assert_eq!(topo.layer_sizes(), vec![2, 1, 1, 1]);
    assert_eq!(topo.num_parameters(), 5);
}

#[test]
fn test_fan_out_node_placed_once() {
    let mut arena = Arena::new();
    let a = arena.constant(2.0);
    let l = arena.neg(a);
    let r = arena.tanh(a);
    let top = arena.add(l, r);
    let topo = Topology::build(&arena, top);
    assert_eq!(topo.num_parameters(), 4);
    assert_eq!(topo.layer_nodes(), vec![vec![a], vec![l, r], vec![top]]);
}

#[test]
fn test_unreachable_nodes_excluded() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let _other = arena.mul(a, b);
    let root = arena.neg(a);
    let topo = Topology::build(&arena, root);
    assert_eq!(topo.num_parameters(), 2);
    assert_eq!(topo.layer_of(b), None);
}

#[test]
fn test_parent_layer_strictly_lower_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut arena = Arena::new();
        let root = random_graph(&mut arena, &mut rng, 6, 60);
        let topo = Topology::build(&arena, root);
        assert_parents_below(&arena, &topo);
        assert_eq!(topo.roots(), vec![root]);
    }
}

#[test]
fn test_rebuild_is_idempotent_after_leaf_mutation() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut arena = Arena::new();
    let root = random_graph(&mut arena, &mut rng, 5, 40);
    let first = Topology::build(&arena, root);
    first.run();

    let before = leaf_values(&arena, &first);
    for (i, leaf) in first.layers()[0].nodes().enumerate() {
        arena.set_data(leaf, 10.0 * i as f64);
    }
    let second = Topology::build(&arena, root);
    assert_ne!(leaf_values(&arena, &second), before);
    assert_eq!(first, second);
    assert_eq!(first.layer_nodes(), second.layer_nodes());
}

#[test]
fn test_build_from_roots() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let s = arena.add(a, b);
    let p = arena.mul(a, b);
    let topo = Topology::build_from_roots(&arena, &[s, p]).unwrap();
    assert_eq!(topo.roots(), vec![s, p]);
    topo.run();
    assert_eq!(arena.grad(s), 1.0);
    assert_eq!(arena.grad(p), 1.0);
    // d(s + p)/da = 1 + b
    assert_eq!(arena.grad(a), 3.0);
    assert_eq!(arena.grad(b), 2.0);

    assert_eq!(
        Topology::build_from_roots(&arena, &[]).unwrap_err(),
        LayerGradError::EmptyRootSet
    );
}

#[test]
fn test_contended_parents_are_flagged() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let x = arena.add(a, b);
    let y = arena.mul(a, b);
    let sq = arena.mul(x, x);
    let root = arena.add(sq, y);
    let topo = Topology::build(&arena, root);

    // Layer 1 holds `x` and `y`, both feeding `a` and `b`.
    let layer1 = &topo.layers()[1];
    assert_eq!(layer1.nodes().collect::<Vec<_>>(), vec![x, y]);
    assert_eq!(layer1.num_staged(), 4);
    // `x * x` is one node: nothing to stage.
    assert_eq!(topo.layers()[2].num_staged(), 0);
}

#[test]
fn test_pow_exponent_not_counted_as_contended() {
    let mut arena = Arena::new();
    let a = arena.constant(2.0);
    let b = arena.constant(3.0);
    let two = arena.constant(2.0);
    let pa = arena.pow_const(a, two);
    let pb = arena.pow_const(b, two);
    let root = arena.add(pa, pb);
    let topo = Topology::build(&arena, root);
    assert_eq!(topo.layers()[1].num_staged(), 0);
}

#[test]
fn test_deep_chain_does_not_recurse() {
    let mut arena = Arena::new();
    let mut acc = arena.constant(0.0);
    let one = arena.constant(1.0);
    for _ in 0..200_000 {
        acc = arena.add(acc, one);
    }
    let topo = Topology::build(&arena, acc);
    assert_eq!(topo.num_layers(), 200_001);
    topo.run();
    assert_eq!(arena.data(acc), 200_000.0);
    assert_eq!(arena.grad(one), 200_000.0);
}

#[test]
fn test_display_summary() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let c = arena.add(a, b);
    let topo = Topology::build(&arena, c);
    assert_eq!(
        topo.to_string(),
        "Num Layers: 2, Num Parameters: 3\n[layer 0] Num parameters: 2\n[layer 1] Num parameters: 1\n"
    );
}

#[test]
fn test_update_applies_step_to_every_node() {
    let mut arena = Arena::new();
    let a = arena.constant(1.0);
    let b = arena.constant(2.0);
    let c = arena.mul(a, b);
    let topo = Topology::build(&arena, c);
    topo.run();
    topo.update(-0.5);
    assert_eq!(arena.data(a), 1.0 - 0.5 * 2.0);
    assert_eq!(arena.data(b), 2.0 - 0.5 * 1.0);
    assert_eq!(arena.data(c), 2.0 - 0.5 * 1.0);
}
