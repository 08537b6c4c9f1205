use layergrad_core::nn::{loss, Mlp, Module};
use layergrad_core::utils::testing::{random_graph, snapshot_bits};
use layergrad_core::{Arena, Executor, ParallelScheduler, SequentialExecutor, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod common;

/// Runs `build` twice in fresh arenas, once per executor, and compares every value bit
/// for bit.
fn assert_equivalent<F>(threads: usize, build: F)
where
    F: Fn(&mut Arena) -> Topology,
{
    let mut seq_arena = Arena::new();
    let seq_topo = build(&mut seq_arena);
    SequentialExecutor.run(&seq_topo).unwrap();

    let mut par_arena = Arena::new();
    let par_topo = build(&mut par_arena);
    let mut pool = ParallelScheduler::new(threads).unwrap();
    pool.run(&par_topo).unwrap();

    assert_eq!(seq_topo, par_topo);
    assert_eq!(
        snapshot_bits(&seq_arena, &seq_topo),
        snapshot_bits(&par_arena, &par_topo),
        "{} threads",
        threads
    );
}

fn thread_counts() -> Vec<usize> {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    vec![1, 2, cores]
}

#[test]
fn test_random_graphs() {
    common::init_logger();
    for threads in thread_counts() {
        for seed in 100..110 {
            assert_equivalent(threads, |arena| {
                let mut rng = StdRng::seed_from_u64(seed);
                let root = random_graph(arena, &mut rng, 10, 300);
                Topology::build(arena, root)
            });
        }
    }
}

#[test]
fn test_polynomial() {
    common::init_logger();
    for threads in thread_counts() {
        assert_equivalent(threads, |arena| {
            let poly = common::build_polynomial(arena);
            Topology::build(arena, poly.g)
        });
    }
}

#[test]
fn test_mlp_loss() {
    common::init_logger();
    let (xs, ys) = common::toy_dataset();
    for threads in thread_counts() {
        assert_equivalent(threads, |arena| {
            let mut rng = StdRng::seed_from_u64(17);
            let mlp = Mlp::new(arena, 3, &[4, 4, 1], &mut rng).unwrap();
            let mut preds = Vec::new();
            let mut targets = Vec::new();
            for (x, &y) in xs.iter().zip(&ys) {
                let inputs: Vec<_> = x.iter().map(|&v| arena.constant(v)).collect();
                preds.push(mlp.build(arena, &inputs).unwrap()[0]);
                targets.push(arena.constant(y));
            }
            let loss = loss::sum_squared_error(arena, &preds, &targets).unwrap();
            Topology::build(arena, loss)
        });
    }
}

#[test]
fn test_wide_layer_with_shared_parents() {
    common::init_logger();
    for threads in thread_counts() {
        assert_equivalent(threads, |arena| {
            let xs: Vec<_> = (0..8).map(|i| arena.constant(0.1 * i as f64 - 0.3)).collect();
            let mut wide = Vec::new();
            for i in 0..500 {
                let a = xs[i % xs.len()];
                let b = xs[(i * 7 + 3) % xs.len()];
                wide.push(arena.mul(a, b));
            }
            let mut acc = arena.constant(0.0);
            for n in wide {
                let t = arena.tanh(n);
                acc = arena.add(acc, t);
            }
            Topology::build(arena, acc)
        });
    }
}
