//! # Toy MLP Training
//!
//! Trains a 3 -> 4 -> 4 -> 1 `tanh` network on four samples by plain gradient descent.
//!
//! Each sample gets its own topology (the prediction), and one more topology covers the
//! summed squared error. Every iteration runs the sample topologies, then the loss
//! topology (whose backward pass leaves `dloss/dnode` in every node), and finally applies
//! `data += step * grad` through each sample topology.
//!
//! ## Running
//! `RUST_LOG=info cargo run --release --example train_toy_mlp`

use layergrad_core::nn::{loss, Mlp, Module};
use layergrad_core::{Arena, LayerGradError, ParallelScheduler, RuntimeConfig, Topology};
use std::time::Instant;

const ITERATIONS: usize = 20;
const STEP: f64 = -0.05;

fn main() -> Result<(), LayerGradError> {
    env_logger::init();

    let config = RuntimeConfig::from_env()?;
    let mut arena = Arena::from_config(&config);
    let mut pool = ParallelScheduler::from_config(&config)?;

    let xs = [
        [2.0, 3.0, -1.0],
        [3.0, -1.0, 0.5],
        [0.5, 1.0, 1.0],
        [1.0, 1.0, -1.0],
    ];
    let ys = [1.0, -1.0, -1.0, 1.0];

    let mlp = Mlp::random(&mut arena, 3, &[4, 4, 1])?;
    log::info!("MLP with {} parameters", mlp.num_parameters());

    let mut preds = Vec::with_capacity(xs.len());
    let mut sample_topos = Vec::with_capacity(xs.len());
    for x in &xs {
        let inputs: Vec<_> = x.iter().map(|&v| arena.constant(v)).collect();
        let pred = mlp.build(&mut arena, &inputs)?[0];
        sample_topos.push(Topology::build(&arena, pred));
        preds.push(pred);
    }
    let targets: Vec<_> = ys.iter().map(|&y| arena.constant(y)).collect();
    let loss = loss::sum_squared_error(&mut arena, &preds, &targets)?;
    let loss_topo = Topology::build(&arena, loss);
    print!("{}", loss_topo);

    let start = Instant::now();
    for iteration in 0..ITERATIONS {
        for topo in &sample_topos {
            pool.run(topo)?;
        }
        pool.run(&loss_topo)?;
        for topo in &sample_topos {
            pool.update(topo, STEP)?;
        }
        println!("[{}] loss: {:.6}", iteration, arena.data(loss));
    }

    for pred in &preds {
        println!("ypred: {:.6}", arena.data(*pred));
    }
    println!("Trained in {:.3}s", start.elapsed().as_secs_f64());

    pool.shutdown();
    let shared = arena.teardown();
    log::info!("Arena released, {} blocks still held by topologies", shared);
    Ok(())
}
