//! # Scalar Graph Walkthrough
//!
//! Builds a few small graphs by hand and differentiates them:
//!
//! 1.  `f = (a + b) * (a * b)` run on the parallel scheduler.
//! 2.  A composite polynomial mixing every operation (`pow_const`, `relu`, `div`, ...),
//!     run sequentially and in parallel.
//! 3.  A 3 -> 4 -> 4 -> 1 MLP applied to a single input vector.
//!
//! ## Running
//! `RUST_LOG=debug cargo run --example scalar_graph`
//!
//! `LAYERGRAD_NUM_THREADS` overrides the worker count (defaults to one per core).

use layergrad_core::nn::{Mlp, Module};
use layergrad_core::{Arena, LayerGradError, ParallelScheduler, RuntimeConfig, Topology};

fn product_graph(pool: &mut ParallelScheduler) -> Result<(), LayerGradError> {
    let mut arena = Arena::new();
    let a = arena.constant(-2.0);
    let b = arena.constant(3.0);
    let e = arena.add(a, b);
    let d = arena.mul(a, b);
    let f = arena.mul(e, d);

    let topo = Topology::build(&arena, f);
    pool.run(&topo)?;

    for (name, id) in [("a", a), ("b", b), ("e", e), ("d", d), ("f", f)] {
        println!("{}: {:.6} | {:.6}", name, arena.data(id), arena.grad(id));
    }
    Ok(())
}

fn polynomial(pool: &mut ParallelScheduler) -> Result<(), LayerGradError> {
    let mut arena = Arena::new();
    let a = arena.constant(-4.0);
    let b = arena.constant(2.0);

    // c = a + b; d = a * b + b^3
    let c = arena.add(a, b);
    let ab = arena.mul(a, b);
    let three = arena.constant(3.0);
    let b_cubed = arena.pow_const(b, three);
    let d = arena.add(ab, b_cubed);

    // c += c + 1
    let one = arena.constant(1.0);
    let t = arena.add(c, one);
    let c = arena.add(c, t);
    // c += 1 + c + (-a)
    let one = arena.constant(1.0);
    let t = arena.add(one, c);
    let neg_a = arena.neg(a);
    let t = arena.add(t, neg_a);
    let c = arena.add(c, t);

    // d += d * 2 + relu(b + a)
    let two = arena.constant(2.0);
    let t = arena.mul(d, two);
    let s = arena.add(b, a);
    let r = arena.relu(s);
    let t = arena.add(t, r);
    let d = arena.add(d, t);
    // d += 3 * d + relu(b - a)
    let three = arena.constant(3.0);
    let t = arena.mul(three, d);
    let s = arena.sub(b, a);
    let r = arena.relu(s);
    let t = arena.add(t, r);
    let d = arena.add(d, t);

    // g = (c - d)^2 / 2 + 10 / (c - d)^2
    let e = arena.sub(c, d);
    let two = arena.constant(2.0);
    let f = arena.pow_const(e, two);
    let two = arena.constant(2.0);
    let half = arena.div(f, two);
    let ten = arena.constant(10.0);
    let inv = arena.div(ten, f);
    let g = arena.add(half, inv);

    let topo = Topology::build(&arena, g);
    print!("{}", topo);

    topo.run();
    println!("sequential g.data: {:.4} == 24.7041", arena.data(g));

    pool.run(&topo)?;
    println!("parallel   g.data: {:.4} == 24.7041", arena.data(g));
    println!("a.grad: {:.4} == 138.8338", arena.grad(a));
    println!("b.grad: {:.4} == 645.5773", arena.grad(b));
    Ok(())
}

fn mlp_forward(pool: &mut ParallelScheduler) -> Result<(), LayerGradError> {
    let mut arena = Arena::new();
    let x = [arena.constant(2.0), arena.constant(3.0), arena.constant(-1.0)];
    let mlp = Mlp::random(&mut arena, 3, &[4, 4, 1])?;
    let out = mlp.build(&mut arena, &x)?;

    let topo = Topology::build(&arena, out[0]);
    pool.run(&topo)?;
    println!("ret: {:.6} | {:.6}", arena.data(out[0]), arena.grad(out[0]));
    Ok(())
}

fn main() -> Result<(), LayerGradError> {
    env_logger::init();

    let config = RuntimeConfig::from_env()?;
    let mut pool = ParallelScheduler::from_config(&config)?;
    println!("Scheduler running {} workers", pool.num_threads());

    println!("--- product graph ---");
    product_graph(&mut pool)?;
    println!("--- polynomial ---");
    polynomial(&mut pool)?;
    println!("--- MLP forward ---");
    mlp_forward(&mut pool)?;

    pool.shutdown();
    Ok(())
}
