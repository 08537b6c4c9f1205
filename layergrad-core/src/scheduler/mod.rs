//! # Parallel Scheduler
//!
//! A persistent pool of worker threads that executes a [`Topology`] layer by layer.
//!
//! For every layer the orchestrating thread (the caller of [`ParallelScheduler::run`])
//! splits the layer's nodes into `N` contiguous slices of `ceil(len / N)` nodes, sends
//! slice `i` to worker `i`, then waits for a "done" signal from every worker before
//! moving on. No worker can start layer `k + 1` before all of layer `k` has finished,
//! and the channel hand-off at each barrier is what makes one layer's writes visible to
//! the next; node values themselves are never locked.
//!
//! ## Shared parents in the backward pass
//!
//! Two nodes of the same layer may share a parent, whose gradient both accumulate
//! into. Such "contended" parents are flagged when the topology is built. Workers add
//! uncontended contributions directly and stage contended ones in a local buffer that
//! travels back with the "done" signal; the orchestrator merges the buffers in worker
//! order after the barrier. Since slices are contiguous, every parent receives its
//! contributions in the same order as with the [`SequentialExecutor`], so both
//! executors produce bit-identical results.
//!
//! [`SequentialExecutor`]: crate::executor::SequentialExecutor

mod worker;

pub use worker::WorkerState;

use crate::config::RuntimeConfig;
use crate::error::LayerGradError;
use crate::executor::{self, Executor};
use crate::topology::{Plan, Topology};
use std::ops::Range;
use std::sync::Arc;
use worker::{Done, Job, WorkerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Forward,
    Backward,
    Update,
}

impl Pass {
    fn name(self) -> &'static str {
        match self {
            Pass::Forward => "forward",
            Pass::Backward => "backward",
            Pass::Update => "update",
        }
    }
}

/// Bounds of worker `index`'s slice when `len` nodes are split across `workers`.
pub(crate) fn slice_bounds(len: usize, workers: usize, index: usize) -> Range<usize> {
    let size = len.div_ceil(workers.max(1));
    let start = (size * index).min(len);
    let end = (size * (index + 1)).min(len);
    start..end
}

/// Fixed-size worker pool. See the [module docs](self).
pub struct ParallelScheduler {
    workers: Vec<WorkerHandle>,
    poisoned: bool,
    stopped: bool,
}

impl std::fmt::Debug for ParallelScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelScheduler")
            .field("num_threads", &self.workers.len())
            .field("poisoned", &self.poisoned)
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl ParallelScheduler {
    /// Starts `num_threads` workers; `0` starts one per available core.
    pub fn new(num_threads: usize) -> Result<Self, LayerGradError> {
        ParallelScheduler::from_config(&RuntimeConfig::default().with_num_threads(num_threads))
    }

    /// Starts the pool described by `config`.
    ///
    /// If any worker fails to start, the ones already running are torn down and the
    /// error is returned: the pool never runs short-handed.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, LayerGradError> {
        let num_threads = config.resolved_num_threads();
        let mut scheduler = ParallelScheduler {
            workers: Vec::with_capacity(num_threads),
            poisoned: false,
            stopped: false,
        };
        for index in 0..num_threads {
            // On error `scheduler` is dropped, which stops the workers started so far.
            let worker = WorkerHandle::spawn(index, &config.thread_name)?;
            scheduler.workers.push(worker);
        }
        log::info!("Started scheduler pool with {} workers", num_threads);
        Ok(scheduler)
    }

    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(WorkerHandle::state).collect()
    }

    /// Parallel forward sweep, gradient reset/seed and backward sweep.
    pub fn run(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        self.ensure_usable()?;
        let plan = topology.plan();
        log::debug!(
            "Parallel run: {} layers, {} nodes, {} workers",
            topology.num_layers(),
            topology.num_parameters(),
            self.workers.len()
        );
        self.forward_layers(plan)?;
        executor::reset_grads(plan);
        for layer in (0..plan.layers.len()).rev() {
            self.dispatch_layer(plan, Pass::Backward, layer)?;
        }
        Ok(())
    }

    /// Parallel forward sweep only.
    pub fn run_forward(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        self.ensure_usable()?;
        self.forward_layers(topology.plan())
    }

    /// `data += step * grad` for every node, split across the workers with a single
    /// dispatch and a single join.
    pub fn update(&mut self, topology: &Topology, step: f64) -> Result<(), LayerGradError> {
        self.ensure_usable()?;
        let plan = topology.plan();
        let num_workers = self.workers.len();
        let mut dispatched = 0;
        let mut failure = None;
        for (index, worker) in self.workers.iter_mut().enumerate() {
            let ranges = plan
                .layers
                .iter()
                .map(|layer| slice_bounds(layer.len(), num_workers, index))
                .collect();
            let job = Job::Update {
                plan: Arc::clone(plan),
                step,
                ranges,
            };
            if worker.jobs.send(job).is_err() {
                failure = Some(index);
                break;
            }
            dispatched += 1;
        }
        for worker in &self.workers[..dispatched] {
            if worker.done.recv().is_err() {
                failure.get_or_insert(worker.index);
            }
        }
        match failure {
            Some(index) => Err(self.poison(index, Pass::Update, 0)),
            None => Ok(()),
        }
    }

    /// Stops and joins every worker. Further runs return [`LayerGradError::PoolStopped`].
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        for worker in &mut self.workers {
            worker.stop();
        }
        self.stopped = true;
        log::info!("Scheduler pool with {} workers stopped", self.workers.len());
    }

    fn forward_layers(&mut self, plan: &Arc<Plan>) -> Result<(), LayerGradError> {
        for layer in 0..plan.layers.len() {
            self.dispatch_layer(plan, Pass::Forward, layer)?;
        }
        Ok(())
    }

    /// Dispatch-all then join-all for one layer, followed by the merge of staged
    /// gradient contributions in worker order.
    fn dispatch_layer(
        &mut self,
        plan: &Arc<Plan>,
        pass: Pass,
        layer: usize,
    ) -> Result<(), LayerGradError> {
        let len = plan.layers[layer].len();
        let num_workers = self.workers.len();
        log::trace!("Dispatching {} of layer {} ({} nodes)", pass.name(), layer, len);

        let mut dispatched = 0;
        let mut failure = None;
        for (index, worker) in self.workers.iter_mut().enumerate() {
            let range = slice_bounds(len, num_workers, index);
            let job = match pass {
                Pass::Forward => Job::Forward {
                    plan: Arc::clone(plan),
                    layer,
                    range,
                },
                _ => Job::Backward {
                    plan: Arc::clone(plan),
                    layer,
                    range,
                    staging: std::mem::take(&mut worker.staging),
                },
            };
            if worker.jobs.send(job).is_err() {
                failure = Some(index);
                break;
            }
            dispatched += 1;
        }

        for worker in &mut self.workers[..dispatched] {
            match worker.done.recv() {
                Ok(Done { mut staged }) => {
                    for (parent, delta) in staged.drain(..) {
                        plan.store.add_grad(parent, delta);
                    }
                    worker.staging = staged;
                }
                Err(_) => {
                    failure.get_or_insert(worker.index);
                }
            }
        }

        match failure {
            Some(index) => Err(self.poison(index, pass, layer)),
            None => Ok(()),
        }
    }

    fn ensure_usable(&self) -> Result<(), LayerGradError> {
        if self.stopped {
            return Err(LayerGradError::PoolStopped);
        }
        if self.poisoned {
            return Err(LayerGradError::PoolPoisoned);
        }
        Ok(())
    }

    fn poison(&mut self, index: usize, pass: Pass, layer: usize) -> LayerGradError {
        log::warn!(
            "Worker {} disconnected during {} of layer {}; pool is now unusable",
            index,
            pass.name(),
            layer
        );
        self.poisoned = true;
        LayerGradError::WorkerDisconnected {
            index,
            pass: pass.name(),
            layer,
        }
    }
}

impl Executor for ParallelScheduler {
    fn run(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        ParallelScheduler::run(self, topology)
    }

    fn run_forward(&mut self, topology: &Topology) -> Result<(), LayerGradError> {
        ParallelScheduler::run_forward(self, topology)
    }

    fn update(&mut self, topology: &Topology, step: f64) -> Result<(), LayerGradError> {
        ParallelScheduler::update(self, topology, step)
    }
}

impl Drop for ParallelScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
