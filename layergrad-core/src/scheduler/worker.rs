use crate::arena::{NodeId, NodeStore};
use crate::error::LayerGradError;
use crate::executor;
use crate::node::{self, GradSink};
use crate::topology::Plan;
use std::ops::Range;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of a pool worker: `Idle -> Working -> Idle`, `Stopped` once torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Idle = 0,
    Working = 1,
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Idle,
            1 => WorkerState::Working,
            _ => WorkerState::Stopped,
        }
    }
}

/// Gradient contributions held back until the layer's barrier.
pub(crate) type Staged = Vec<(NodeId, f64)>;

pub(crate) enum Job {
    Forward {
        plan: Arc<Plan>,
        layer: usize,
        range: Range<usize>,
    },
    Backward {
        plan: Arc<Plan>,
        layer: usize,
        range: Range<usize>,
        staging: Staged,
    },
    /// One range per layer; no barrier between layers.
    Update {
        plan: Arc<Plan>,
        step: f64,
        ranges: Vec<Range<usize>>,
    },
    Stop,
}

pub(crate) struct Done {
    pub(crate) staged: Staged,
}

/// Writes uncontended contributions directly, stages the rest.
struct StagingSink<'a> {
    store: &'a NodeStore,
    staged: [bool; 2],
    buffer: &'a mut Staged,
}

impl GradSink for StagingSink<'_> {
    #[inline]
    fn accumulate(&mut self, slot: usize, parent: NodeId, delta: f64) {
        if self.staged[slot] {
            self.buffer.push((parent, delta));
        } else {
            self.store.add_grad(parent, delta);
        }
    }
}

/// Orchestrator-side handle: the two one-slot signals plus the thread itself.
pub(crate) struct WorkerHandle {
    pub(crate) index: usize,
    pub(crate) jobs: SyncSender<Job>,
    pub(crate) done: Receiver<Done>,
    /// Staging buffer handed back and forth to avoid reallocating every layer.
    pub(crate) staging: Staged,
    state: Arc<AtomicU8>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub(crate) fn spawn(index: usize, name: &str) -> Result<Self, LayerGradError> {
        let (job_tx, job_rx) = mpsc::sync_channel::<Job>(1);
        let (done_tx, done_rx) = mpsc::sync_channel::<Done>(1);
        let state = Arc::new(AtomicU8::new(WorkerState::Idle as u8));
        let thread_state = Arc::clone(&state);

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name, index))
            .spawn(move || worker_loop(index, job_rx, done_tx, thread_state))
            .map_err(|e| LayerGradError::ThreadSpawn {
                index,
                reason: e.to_string(),
            })?;

        Ok(WorkerHandle {
            index,
            jobs: job_tx,
            done: done_rx,
            staging: Vec::new(),
            state,
            thread: Some(thread),
        })
    }

    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Sends the stop message and joins the thread. Idempotent.
    pub(crate) fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // Fails only if the worker already exited; joining is still correct.
        let _ = self.jobs.send(Job::Stop);
        if thread.join().is_err() {
            log::warn!("Worker {} panicked before teardown", self.index);
        }
        self.state
            .store(WorkerState::Stopped as u8, Ordering::Release);
    }
}

fn worker_loop(index: usize, jobs: Receiver<Job>, done: SyncSender<Done>, state: Arc<AtomicU8>) {
    log::trace!("Worker {} started", index);
    while let Ok(job) = jobs.recv() {
        if matches!(job, Job::Stop) {
            break;
        }
        state.store(WorkerState::Working as u8, Ordering::Release);
        let staged = execute(job);
        state.store(WorkerState::Idle as u8, Ordering::Release);
        if done.send(Done { staged }).is_err() {
            break;
        }
    }
    state.store(WorkerState::Stopped as u8, Ordering::Release);
    log::trace!("Worker {} stopped", index);
}

fn execute(job: Job) -> Staged {
    match job {
        Job::Forward { plan, layer, range } => {
            for step in &plan.layers[layer].steps()[range] {
                node::forward(&plan.store, step.node, step.op);
            }
            Vec::new()
        }
        Job::Backward {
            plan,
            layer,
            range,
            mut staging,
        } => {
            staging.clear();
            let mut sink = StagingSink {
                store: &plan.store,
                staged: [false; 2],
                buffer: &mut staging,
            };
            for step in &plan.layers[layer].steps()[range] {
                sink.staged = step.staged;
                node::backward(&plan.store, step.node, step.op, &mut sink);
            }
            staging
        }
        Job::Update { plan, step, ranges } => {
            for (layer, range) in plan.layers.iter().zip(ranges) {
                executor::update_slice(&plan, &layer.steps()[range], step);
            }
            Vec::new()
        }
        Job::Stop => Vec::new(),
    }
}
