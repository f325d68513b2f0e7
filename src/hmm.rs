//! Discrete hidden Markov model.
//!
//! Owns a validated parameter triple (A, B, pi) and exposes the inference
//! operations: likelihood evaluation through the scaled forward pass,
//! Viterbi decoding in the log domain, and posterior state estimates from
//! the combined forward-backward recursion. Evaluation and decoding never
//! mutate the model, so a shared reference can serve concurrent callers.

use crate::errors::{
    validate_probability_vector, validate_stochastic_matrix, InferenceError, InferenceResult,
};
use crate::forward_backward::{self, ForwardPass};
use crate::topology::Topology;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hidden Markov model with a discrete emission alphabet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HiddenMarkovModel {
    /// Transition matrix A, states x states
    transitions: Vec<Vec<f64>>,
    /// Emission matrix B, states x symbols
    emissions: Vec<Vec<f64>>,
    /// Initial state distribution pi
    initial: Vec<f64>,
}

impl HiddenMarkovModel {
    /// Builds a model from a topology and an alphabet size. Emission rows
    /// start uniform; the generator is consulted only by randomized
    /// topologies.
    pub fn new<R: Rng + ?Sized>(
        topology: &Topology,
        symbols: usize,
        rng: &mut R,
    ) -> InferenceResult<Self> {
        if symbols == 0 {
            return Err(InferenceError::InvalidParameter {
                parameter: "symbols".to_string(),
                value: 0.0,
                constraint: "at least one symbol is required".to_string(),
            });
        }
        let (transitions, initial) = topology.create(rng)?;
        let states = initial.len();
        let uniform = 1.0 / symbols as f64;
        let emissions = vec![vec![uniform; symbols]; states];
        Ok(Self {
            transitions,
            emissions,
            initial,
        })
    }

    /// Builds a model directly from its parameter matrices, validating that
    /// every row of A and B is a probability distribution and that the
    /// dimensions agree.
    pub fn from_matrices(
        transitions: Vec<Vec<f64>>,
        emissions: Vec<Vec<f64>>,
        initial: Vec<f64>,
    ) -> InferenceResult<Self> {
        let states = transitions.len();
        if states == 0 {
            return Err(InferenceError::InvalidParameter {
                parameter: "states".to_string(),
                value: 0.0,
                constraint: "at least one state is required".to_string(),
            });
        }
        validate_stochastic_matrix(&transitions, states, "transition matrix")?;
        if emissions.len() != states {
            return Err(InferenceError::DimensionMismatch {
                operation: "model construction".to_string(),
                detail: format!(
                    "emission matrix has {} rows, transition matrix has {} states",
                    emissions.len(),
                    states
                ),
            });
        }
        let symbols = emissions[0].len();
        validate_stochastic_matrix(&emissions, symbols, "emission matrix")?;
        if initial.len() != states {
            return Err(InferenceError::DimensionMismatch {
                operation: "model construction".to_string(),
                detail: format!(
                    "initial distribution has length {}, expected {}",
                    initial.len(),
                    states
                ),
            });
        }
        validate_probability_vector(&initial, "initial distribution")?;
        Ok(Self {
            transitions,
            emissions,
            initial,
        })
    }

    /// Number of hidden states.
    pub fn states(&self) -> usize {
        self.transitions.len()
    }

    /// Size of the emission alphabet.
    pub fn symbols(&self) -> usize {
        self.emissions[0].len()
    }

    /// Transition matrix A.
    pub fn transitions(&self) -> &[Vec<f64>] {
        &self.transitions
    }

    /// Emission matrix B.
    pub fn emissions(&self) -> &[Vec<f64>] {
        &self.emissions
    }

    /// Initial state distribution pi.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Emission densities per time step for the given symbol sequence.
    fn emission_rows(&self, observations: &[usize]) -> InferenceResult<Vec<Vec<f64>>> {
        let symbols = self.symbols();
        let mut rows = Vec::with_capacity(observations.len());
        for (t, &symbol) in observations.iter().enumerate() {
            if symbol >= symbols {
                return Err(InferenceError::InvalidObservation {
                    index: t,
                    reason: format!("symbol {} out of range for {} symbols", symbol, symbols),
                });
            }
            rows.push(self.emissions.iter().map(|b| b[symbol]).collect());
        }
        Ok(rows)
    }

    /// Probability of the observation sequence under the model.
    ///
    /// An empty sequence has probability 0.0. This convention is
    /// deliberately preserved from the formulation this library reproduces,
    /// even though a vacuous product would suggest 1.0.
    pub fn evaluate(&self, observations: &[usize]) -> InferenceResult<f64> {
        if observations.is_empty() {
            return Ok(0.0);
        }
        Ok(self.evaluate_log(observations)?.exp())
    }

    /// Log-probability of the observation sequence; the empty sequence maps
    /// to negative infinity, consistent with [`HiddenMarkovModel::evaluate`].
    pub fn evaluate_log(&self, observations: &[usize]) -> InferenceResult<f64> {
        if observations.is_empty() {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(self.forward(observations)?.log_likelihood())
    }

    /// Scaled forward pass over the sequence.
    pub fn forward(&self, observations: &[usize]) -> InferenceResult<ForwardPass> {
        let emissions = self.emission_rows(observations)?;
        forward_backward::forward(&self.transitions, &self.initial, &emissions)
    }

    /// Backward pass under the scaling factors of a matching forward pass.
    pub fn backward(
        &self,
        observations: &[usize],
        scaling: &[f64],
    ) -> InferenceResult<Vec<Vec<f64>>> {
        let emissions = self.emission_rows(observations)?;
        forward_backward::backward(&self.transitions, &emissions, scaling)
    }

    /// Most likely state path (Viterbi) and its probability.
    ///
    /// An empty sequence decodes to an empty path with probability 0.0.
    pub fn decode(&self, observations: &[usize]) -> InferenceResult<(Vec<usize>, f64)> {
        let (path, log_probability) = self.decode_log(observations)?;
        Ok((path, log_probability.exp()))
    }

    /// Viterbi path with the log-probability of the joint path.
    pub fn decode_log(&self, observations: &[usize]) -> InferenceResult<(Vec<usize>, f64)> {
        if observations.is_empty() {
            return Ok((Vec::new(), f64::NEG_INFINITY));
        }
        let log_emissions: Vec<Vec<f64>> = self
            .emission_rows(observations)?
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.ln()).collect())
            .collect();
        let (path, cost) =
            forward_backward::viterbi(&self.transitions, &self.initial, &log_emissions)?;
        Ok((path, -cost))
    }

    /// Per-step posterior state distributions gamma from the combined
    /// forward-backward pass.
    pub fn posteriors(&self, observations: &[usize]) -> InferenceResult<Vec<Vec<f64>>> {
        let emissions = self.emission_rows(observations)?;
        let pass = forward_backward::forward(&self.transitions, &self.initial, &emissions)?;
        let bwd = forward_backward::backward(&self.transitions, &emissions, &pass.scaling)?;
        forward_backward::posteriors(&pass, &bwd)
    }

    /// Posterior decoding: the individually most likely state at each step.
    /// Unlike [`HiddenMarkovModel::decode`] the result is not necessarily a
    /// connected path.
    pub fn most_likely_states(&self, observations: &[usize]) -> InferenceResult<Vec<usize>> {
        let gamma = self.posteriors(observations)?;
        Ok(gamma.iter().map(|row| argmax(row)).collect())
    }
}

/// Index of the largest entry; earlier indices win ties.
pub(crate) fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = i;
        }
    }
    best
}
