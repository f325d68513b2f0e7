//! Emission distributions for continuous-density hidden Markov models.
//!
//! A closed set of tagged variants rather than an open trait: every
//! distribution the continuous model accepts is listed here, each exposing a
//! density, a log-density, and a dimension. The multivariate Gaussian caches
//! its precision matrix and covariance log-determinant at construction
//! through [`CholeskyDecomposition`], so the per-observation density is a
//! quadratic form with no solve in the hot path.

use crate::cholesky::CholeskyDecomposition;
use crate::errors::{
    validate_all_finite, validate_probability_vector, InferenceError, InferenceResult,
    PROBABILITY_TOLERANCE,
};
use crate::matrix::ensure_rectangular;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const LN_TWO_PI: f64 = 1.837_877_066_409_345_3;

/// A single Gaussian component of a mixture.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianComponent {
    /// Component mean
    pub mean: f64,
    /// Component variance, strictly positive
    pub variance: f64,
}

/// Emission distribution attached to one hidden state of a
/// continuous-density model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EmissionDistribution {
    /// Probability mass function over symbol indices. An observation vector
    /// carries the symbol in its first component.
    Discrete { probabilities: Vec<f64> },
    /// Univariate normal distribution.
    Gaussian { mean: f64, variance: f64 },
    /// Multivariate normal distribution with precomputed precision matrix
    /// and covariance log-determinant.
    MultivariateGaussian {
        mean: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        precision: Vec<Vec<f64>>,
        log_det_covariance: f64,
    },
    /// Convex combination of univariate Gaussian components.
    GaussianMixture {
        weights: Vec<f64>,
        components: Vec<GaussianComponent>,
    },
}

impl EmissionDistribution {
    /// Discrete distribution over `probabilities.len()` symbols.
    pub fn discrete(probabilities: Vec<f64>) -> InferenceResult<Self> {
        if probabilities.is_empty() {
            return Err(InferenceError::InvalidParameter {
                parameter: "probabilities".to_string(),
                value: 0.0,
                constraint: "at least one symbol is required".to_string(),
            });
        }
        validate_probability_vector(&probabilities, "discrete emission")?;
        Ok(Self::Discrete { probabilities })
    }

    /// Univariate Gaussian with the given mean and (positive) variance.
    pub fn gaussian(mean: f64, variance: f64) -> InferenceResult<Self> {
        if !mean.is_finite() {
            return Err(InferenceError::InvalidParameter {
                parameter: "mean".to_string(),
                value: mean,
                constraint: "must be finite".to_string(),
            });
        }
        if !(variance.is_finite() && variance > 0.0) {
            return Err(InferenceError::InvalidParameter {
                parameter: "variance".to_string(),
                value: variance,
                constraint: "must be finite and positive".to_string(),
            });
        }
        Ok(Self::Gaussian { mean, variance })
    }

    /// Multivariate Gaussian. Factors the covariance once and caches its
    /// inverse and log-determinant.
    ///
    /// Fails with [`InferenceError::SingularMatrix`] when the covariance is
    /// not symmetric positive definite.
    pub fn multivariate_gaussian(
        mean: Vec<f64>,
        covariance: Vec<Vec<f64>>,
    ) -> InferenceResult<Self> {
        let (rows, cols) = ensure_rectangular(&covariance, "multivariate gaussian emission")?;
        if rows != cols || rows != mean.len() {
            return Err(InferenceError::DimensionMismatch {
                operation: "multivariate gaussian emission".to_string(),
                detail: format!(
                    "mean has length {}, covariance is {}x{}",
                    mean.len(),
                    rows,
                    cols
                ),
            });
        }
        validate_all_finite(&mean, "multivariate gaussian mean")?;
        for row in &covariance {
            validate_all_finite(row, "multivariate gaussian covariance")?;
        }

        let chol = CholeskyDecomposition::from_copy(&covariance)?;
        let log_det_covariance = chol.log_determinant()?;
        let precision = chol.inverse()?;

        Ok(Self::MultivariateGaussian {
            mean,
            covariance,
            precision,
            log_det_covariance,
        })
    }

    /// Mixture of univariate Gaussians. `weights` must form a probability
    /// vector with one entry per component; small drift of the weight sum
    /// from 1 (at most 1e-6) is renormalized with a warning.
    pub fn gaussian_mixture(
        mut weights: Vec<f64>,
        components: Vec<GaussianComponent>,
    ) -> InferenceResult<Self> {
        if components.is_empty() {
            return Err(InferenceError::InvalidParameter {
                parameter: "components".to_string(),
                value: 0.0,
                constraint: "at least one mixture component is required".to_string(),
            });
        }
        if weights.len() != components.len() {
            return Err(InferenceError::DimensionMismatch {
                operation: "gaussian mixture emission".to_string(),
                detail: format!(
                    "{} weights for {} components",
                    weights.len(),
                    components.len()
                ),
            });
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE && (sum - 1.0).abs() <= 1e-6 {
            log::warn!(
                "gaussian mixture weights sum to {}, renormalizing",
                sum
            );
            for w in &mut weights {
                *w /= sum;
            }
        }
        validate_probability_vector(&weights, "gaussian mixture weights")?;
        for c in &components {
            if !(c.variance.is_finite() && c.variance > 0.0) {
                return Err(InferenceError::InvalidParameter {
                    parameter: "component variance".to_string(),
                    value: c.variance,
                    constraint: "must be finite and positive".to_string(),
                });
            }
            if !c.mean.is_finite() {
                return Err(InferenceError::InvalidParameter {
                    parameter: "component mean".to_string(),
                    value: c.mean,
                    constraint: "must be finite".to_string(),
                });
            }
        }
        Ok(Self::GaussianMixture {
            weights,
            components,
        })
    }

    /// Dimensionality of the observations this distribution expects: 1 for
    /// the univariate variants, the mean length for the multivariate
    /// Gaussian.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Discrete { .. } | Self::Gaussian { .. } | Self::GaussianMixture { .. } => 1,
            Self::MultivariateGaussian { mean, .. } => mean.len(),
        }
    }

    /// Probability density (or mass, for the discrete variant) at the
    /// observation.
    ///
    /// For the discrete variant the first component of the observation is
    /// interpreted as a symbol index; a non-integral or out-of-range value
    /// is a [`InferenceError::DomainError`].
    pub fn density(&self, observation: &[f64]) -> InferenceResult<f64> {
        if observation.len() != self.dimension() {
            return Err(InferenceError::DimensionMismatch {
                operation: "emission density".to_string(),
                detail: format!(
                    "observation has dimension {}, distribution expects {}",
                    observation.len(),
                    self.dimension()
                ),
            });
        }

        match self {
            Self::Discrete { probabilities } => {
                let symbol = discrete_symbol(observation[0], probabilities.len())?;
                Ok(probabilities[symbol])
            }
            Self::Gaussian { mean, variance } => {
                Ok(univariate_normal_density(observation[0], *mean, *variance))
            }
            Self::MultivariateGaussian { .. } => Ok(self.log_density(observation)?.exp()),
            Self::GaussianMixture {
                weights,
                components,
            } => {
                let x = observation[0];
                let mut total = 0.0;
                for (w, c) in weights.iter().zip(components) {
                    total += w * univariate_normal_density(x, c.mean, c.variance);
                }
                Ok(total)
            }
        }
    }

    /// Natural logarithm of the density. For the multivariate Gaussian this
    /// is the primary form; the quadratic form through the cached precision
    /// matrix never exponentiates intermediate values.
    pub fn log_density(&self, observation: &[f64]) -> InferenceResult<f64> {
        match self {
            Self::MultivariateGaussian {
                mean,
                precision,
                log_det_covariance,
                ..
            } => {
                if observation.len() != mean.len() {
                    return Err(InferenceError::DimensionMismatch {
                        operation: "emission density".to_string(),
                        detail: format!(
                            "observation has dimension {}, distribution expects {}",
                            observation.len(),
                            mean.len()
                        ),
                    });
                }
                let k = mean.len();
                let centered: Vec<f64> =
                    observation.iter().zip(mean).map(|(x, m)| x - m).collect();
                // Quadratic form d' * P * d.
                let mut quad = 0.0;
                for (i, row) in precision.iter().enumerate() {
                    let mut s = 0.0;
                    for (j, p) in row.iter().enumerate() {
                        s += p * centered[j];
                    }
                    quad += centered[i] * s;
                }
                Ok(-0.5 * (k as f64 * LN_TWO_PI + log_det_covariance + quad))
            }
            _ => {
                let d = self.density(observation)?;
                Ok(d.ln())
            }
        }
    }
}

/// Interprets an observation component as a discrete symbol index.
fn discrete_symbol(value: f64, symbols: usize) -> InferenceResult<usize> {
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > 1e-9 || rounded < 0.0 {
        return Err(InferenceError::DomainError {
            function: "discrete emission density".to_string(),
            reason: format!("observation {} is not a symbol index", value),
        });
    }
    let symbol = rounded as usize;
    if symbol >= symbols {
        return Err(InferenceError::DomainError {
            function: "discrete emission density".to_string(),
            reason: format!("symbol {} out of range for {} symbols", symbol, symbols),
        });
    }
    Ok(symbol)
}

fn univariate_normal_density(x: f64, mean: f64, variance: f64) -> f64 {
    let z = (x - mean) * (x - mean) / variance;
    (-0.5 * z).exp() / (2.0 * std::f64::consts::PI * variance).sqrt()
}

/// Mean of `values` under normalized `weights` (assumed to sum to one).
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> InferenceResult<f64> {
    if values.len() != weights.len() {
        return Err(InferenceError::DimensionMismatch {
            operation: "weighted mean".to_string(),
            detail: format!("{} values for {} weights", values.len(), weights.len()),
        });
    }
    if values.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(values.iter().zip(weights).map(|(v, w)| v * w).sum())
}

/// Variance of `values` under normalized `weights`.
///
/// Divides the weighted sum of squared deviations by `1 - sum(w_i^2)`,
/// matching the reference formula this library reproduces. Note this is not
/// the usual reliability-weights correction; see the companion test.
pub fn weighted_variance(values: &[f64], weights: &[f64]) -> InferenceResult<f64> {
    let mean = weighted_mean(values, weights)?;
    let mut sum = 0.0;
    let mut square_sum = 0.0;
    for (v, w) in values.iter().zip(weights) {
        let d = v - mean;
        sum += w * d * d;
        square_sum += w * w;
    }
    let normalizer = 1.0 - square_sum;
    if normalizer <= 0.0 {
        return Err(InferenceError::NumericalError {
            reason: format!(
                "weighted variance normalizer 1 - sum(w^2) = {} is not positive",
                normalizer
            ),
        });
    }
    Ok(sum / normalizer)
}
