use crate::arena::DEFAULT_BLOCK_CAPACITY;
use crate::error::LayerGradError;
use std::env;
use std::num::NonZeroUsize;
use std::thread;

/// Environment variable overriding [`RuntimeConfig::num_threads`].
pub const ENV_NUM_THREADS: &str = "LAYERGRAD_NUM_THREADS";
/// Environment variable overriding [`RuntimeConfig::block_capacity`].
pub const ENV_BLOCK_CAPACITY: &str = "LAYERGRAD_BLOCK_CAPACITY";

/// Runtime settings shared by the arena and the parallel scheduler.
///
/// `num_threads == 0` means "one worker per available core".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub num_threads: usize,
    pub block_capacity: usize,
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            num_threads: 0,
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            thread_name: "layergrad-worker".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Starts from the defaults and applies `LAYERGRAD_NUM_THREADS` /
    /// `LAYERGRAD_BLOCK_CAPACITY` when they are set.
    pub fn from_env() -> Result<Self, LayerGradError> {
        let mut config = RuntimeConfig::default();
        if let Ok(raw) = env::var(ENV_NUM_THREADS) {
            config.num_threads = parse_usize(ENV_NUM_THREADS, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_BLOCK_CAPACITY) {
            let capacity = parse_usize(ENV_BLOCK_CAPACITY, &raw)?;
            config = config.with_block_capacity(capacity)?;
        }
        log::debug!("RuntimeConfig loaded from environment: {:?}", config);
        Ok(config)
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_block_capacity(mut self, block_capacity: usize) -> Result<Self, LayerGradError> {
        if block_capacity == 0 {
            return Err(LayerGradError::InvalidConfig {
                key: "block_capacity".to_string(),
                value: block_capacity.to_string(),
                reason: "a block must hold at least one node".to_string(),
            });
        }
        self.block_capacity = block_capacity;
        Ok(self)
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Number of workers the scheduler will actually start.
    pub fn resolved_num_threads(&self) -> usize {
        if self.num_threads > 0 {
            return self.num_threads;
        }
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, LayerGradError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| LayerGradError::InvalidConfig {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
