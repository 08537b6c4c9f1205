use thiserror::Error;

/// Custom error type for the layergrad engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum LayerGradError {
    #[error("Failed to spawn worker thread {index}: {reason}")]
    ThreadSpawn { index: usize, reason: String },

    #[error("Worker {index} disconnected while processing {pass} of layer {layer}")]
    WorkerDisconnected {
        index: usize,
        pass: &'static str,
        layer: usize,
    },

    #[error("Scheduler pool is unusable after a worker failure")]
    PoolPoisoned,

    #[error("Scheduler pool has been shut down")]
    PoolStopped,

    #[error("Invalid configuration value for {key}: {value:?} ({reason})")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Shape mismatch: expected {expected} inputs, got {actual} during {operation}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Cannot build a topology from an empty list of roots")]
    EmptyRootSet,
}
