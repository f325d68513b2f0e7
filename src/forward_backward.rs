//! Scaled forward-backward recursions and Viterbi path search.
//!
//! Operates on a precomputed emission matrix `emissions[t][i] = B_i(obs_t)`
//! so the same core serves the discrete and the continuous-density models.
//! The forward pass rescales each time step to unit mass and records the
//! scaling factors; the log-likelihood is the sum of their logarithms, so
//! sequences far longer than the underflow horizon of a raw product remain
//! representable. The backward pass reuses the forward scaling factors, and
//! the product of matching forward and backward rows yields state
//! posteriors.

use crate::errors::{InferenceError, InferenceResult};
use crate::matrix::ensure_rectangular;

/// Output of the scaled forward pass.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// Scaled forward variables, one row per time step
    pub probabilities: Vec<Vec<f64>>,
    /// Per-step scaling factors; their logs sum to the log-likelihood
    pub scaling: Vec<f64>,
}

impl ForwardPass {
    /// Log-likelihood of the observation sequence: sum of the logs of the
    /// scaling factors.
    pub fn log_likelihood(&self) -> f64 {
        self.scaling.iter().map(|s| s.ln()).sum()
    }
}

fn check_parameters(
    a: &[Vec<f64>],
    emissions: &[Vec<f64>],
    operation: &str,
) -> InferenceResult<usize> {
    let (a_rows, a_cols) = ensure_rectangular(a, operation)?;
    if a_rows != a_cols {
        return Err(InferenceError::DimensionMismatch {
            operation: operation.to_string(),
            detail: format!("transition matrix is {}x{}, expected square", a_rows, a_cols),
        });
    }
    let (_, e_cols) = ensure_rectangular(emissions, operation)?;
    if e_cols != a_rows {
        return Err(InferenceError::DimensionMismatch {
            operation: operation.to_string(),
            detail: format!(
                "emission rows have {} states, transition matrix has {}",
                e_cols, a_rows
            ),
        });
    }
    Ok(a_rows)
}

/// Scaled forward recursion.
///
/// `emissions[t][i]` holds the emission density of state `i` for the
/// observation at time `t`. Requires a non-empty emission matrix; the
/// empty-sequence convention lives in the model-level entry points.
pub fn forward(
    a: &[Vec<f64>],
    pi: &[f64],
    emissions: &[Vec<f64>],
) -> InferenceResult<ForwardPass> {
    if emissions.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let states = check_parameters(a, emissions, "forward pass")?;
    if pi.len() != states {
        return Err(InferenceError::DimensionMismatch {
            operation: "forward pass".to_string(),
            detail: format!(
                "initial distribution has length {}, expected {}",
                pi.len(),
                states
            ),
        });
    }
    let steps = emissions.len();

    let mut fwd = vec![vec![0.0; states]; steps];
    let mut scaling = vec![0.0; steps];

    for i in 0..states {
        fwd[0][i] = pi[i] * emissions[0][i];
    }
    scaling[0] = fwd[0].iter().sum();
    if scaling[0] != 0.0 {
        for v in &mut fwd[0] {
            *v /= scaling[0];
        }
    }

    for t in 1..steps {
        for i in 0..states {
            let mut sum = 0.0;
            for j in 0..states {
                sum += fwd[t - 1][j] * a[j][i];
            }
            fwd[t][i] = sum * emissions[t][i];
        }
        scaling[t] = fwd[t].iter().sum();
        if scaling[t] != 0.0 {
            for v in &mut fwd[t] {
                *v /= scaling[t];
            }
        }
    }

    Ok(ForwardPass {
        probabilities: fwd,
        scaling,
    })
}

/// Backward recursion under the scaling factors produced by [`forward`].
pub fn backward(
    a: &[Vec<f64>],
    emissions: &[Vec<f64>],
    scaling: &[f64],
) -> InferenceResult<Vec<Vec<f64>>> {
    if emissions.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let states = check_parameters(a, emissions, "backward pass")?;
    let steps = emissions.len();
    if scaling.len() != steps {
        return Err(InferenceError::DimensionMismatch {
            operation: "backward pass".to_string(),
            detail: format!(
                "{} scaling factors for {} observations",
                scaling.len(),
                steps
            ),
        });
    }

    let mut bwd = vec![vec![0.0; states]; steps];
    for i in 0..states {
        bwd[steps - 1][i] = 1.0 / scaling[steps - 1];
    }

    for t in (0..steps - 1).rev() {
        for i in 0..states {
            let mut sum = 0.0;
            for j in 0..states {
                sum += a[i][j] * emissions[t + 1][j] * bwd[t + 1][j];
            }
            bwd[t][i] = sum / scaling[t];
        }
    }

    Ok(bwd)
}

/// State posteriors gamma[t][i] = P(state_t = i | observations), formed by
/// normalizing the elementwise product of matching forward and backward
/// rows.
pub fn posteriors(forward: &ForwardPass, backward: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
    if forward.probabilities.len() != backward.len() {
        return Err(InferenceError::DimensionMismatch {
            operation: "state posteriors".to_string(),
            detail: format!(
                "forward pass has {} steps, backward pass has {}",
                forward.probabilities.len(),
                backward.len()
            ),
        });
    }

    let mut gamma = Vec::with_capacity(backward.len());
    for (f_row, b_row) in forward.probabilities.iter().zip(backward) {
        let mut row: Vec<f64> = f_row.iter().zip(b_row).map(|(f, b)| f * b).collect();
        let total: f64 = row.iter().sum();
        if total != 0.0 {
            for v in &mut row {
                *v /= total;
            }
        }
        gamma.push(row);
    }
    Ok(gamma)
}

/// Log-domain minimum-cost Viterbi search over a precomputed log-emission
/// matrix `log_emissions[t][i] = ln B_i(obs_t)`.
///
/// Returns the decoded state path and the minimal cost (the negated
/// log-probability of the path). Ties between predecessor states resolve to
/// the lowest index through the strict comparison.
pub(crate) fn viterbi(
    a: &[Vec<f64>],
    pi: &[f64],
    log_emissions: &[Vec<f64>],
) -> InferenceResult<(Vec<usize>, f64)> {
    if log_emissions.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let states = check_parameters(a, log_emissions, "viterbi decoding")?;
    if pi.len() != states {
        return Err(InferenceError::DimensionMismatch {
            operation: "viterbi decoding".to_string(),
            detail: format!(
                "initial distribution has length {}, expected {}",
                pi.len(),
                states
            ),
        });
    }
    let steps = log_emissions.len();

    let mut cost = vec![vec![0.0; states]; steps];
    let mut backpointer = vec![vec![0usize; states]; steps];

    for i in 0..states {
        cost[0][i] = -pi[i].ln() - log_emissions[0][i];
    }

    for t in 1..steps {
        for j in 0..states {
            let mut best_cost = f64::INFINITY;
            let mut best_state = 0;
            for i in 0..states {
                let candidate = cost[t - 1][i] - a[i][j].ln();
                if candidate < best_cost {
                    best_cost = candidate;
                    best_state = i;
                }
            }
            cost[t][j] = best_cost - log_emissions[t][j];
            backpointer[t][j] = best_state;
        }
    }

    let mut best_cost = f64::INFINITY;
    let mut best_state = 0;
    for (i, &c) in cost[steps - 1].iter().enumerate() {
        if c < best_cost {
            best_cost = c;
            best_state = i;
        }
    }

    let mut path = vec![0usize; steps];
    path[steps - 1] = best_state;
    for t in (1..steps).rev() {
        path[t - 1] = backpointer[t][path[t]];
    }

    Ok((path, best_cost))
}
