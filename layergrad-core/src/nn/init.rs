//! Parameter initialisation schemes.

use crate::error::LayerGradError;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// How weights and biases get their starting value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitScheme {
    /// Uniform in `[-1, 1]`.
    #[default]
    Uniform11,
    /// Normal distribution with the given mean and standard deviation.
    Normal { mean: f64, std_dev: f64 },
}

impl InitScheme {
    /// Checked constructor for [`InitScheme::Normal`].
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, LayerGradError> {
        let scheme = InitScheme::Normal { mean, std_dev };
        scheme.validate()?;
        Ok(scheme)
    }

    pub fn validate(&self) -> Result<(), LayerGradError> {
        match *self {
            InitScheme::Uniform11 => Ok(()),
            InitScheme::Normal { mean, std_dev } => normal_distribution(mean, std_dev).map(|_| ()),
        }
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, LayerGradError> {
        match *self {
            InitScheme::Uniform11 => Ok(uniform_11(rng)),
            InitScheme::Normal { mean, std_dev } => {
                Ok(normal_distribution(mean, std_dev)?.sample(rng))
            }
        }
    }
}

/// Uniform sample in `[-1, 1]`.
pub fn uniform_11<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..=1.0)
}

fn normal_distribution(mean: f64, std_dev: f64) -> Result<Normal<f64>, LayerGradError> {
    let invalid = |reason: String| LayerGradError::InvalidConfig {
        key: "init.std_dev".to_string(),
        value: std_dev.to_string(),
        reason,
    };
    // `Normal::new` accepts a negative std_dev and mirrors the distribution.
    if std_dev.is_nan() || std_dev < 0.0 {
        return Err(invalid("standard deviation must be non-negative".to_string()));
    }
    Normal::new(mean, std_dev).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
