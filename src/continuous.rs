//! Continuous-density hidden Markov model.
//!
//! Replaces the discrete emission matrix with one
//! [`EmissionDistribution`] per hidden state. Observations are vectors
//! whose length must equal the shared dimension of the emission
//! distributions; the inference operations reuse the same scaled
//! forward-backward core as the discrete model, with emission rows filled
//! from the per-state densities.

use crate::distributions::EmissionDistribution;
use crate::errors::{
    validate_probability_vector, validate_stochastic_matrix, InferenceError, InferenceResult,
};
use crate::forward_backward::{self, ForwardPass};
use crate::hmm::argmax;
use crate::topology::Topology;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hidden Markov model whose states emit through arbitrary density
/// functions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContinuousHiddenMarkovModel {
    transitions: Vec<Vec<f64>>,
    emissions: Vec<EmissionDistribution>,
    initial: Vec<f64>,
}

impl ContinuousHiddenMarkovModel {
    /// Builds a model from a topology and one emission distribution per
    /// state. The generator is consulted only by randomized topologies.
    pub fn new<R: Rng + ?Sized>(
        topology: &Topology,
        emissions: Vec<EmissionDistribution>,
        rng: &mut R,
    ) -> InferenceResult<Self> {
        let (transitions, initial) = topology.create(rng)?;
        Self::assemble(transitions, emissions, initial)
    }

    /// Builds a model directly from its parameters.
    pub fn from_parts(
        transitions: Vec<Vec<f64>>,
        emissions: Vec<EmissionDistribution>,
        initial: Vec<f64>,
    ) -> InferenceResult<Self> {
        validate_stochastic_matrix(&transitions, transitions.len(), "transition matrix")?;
        validate_probability_vector(&initial, "initial distribution")?;
        Self::assemble(transitions, emissions, initial)
    }

    fn assemble(
        transitions: Vec<Vec<f64>>,
        emissions: Vec<EmissionDistribution>,
        initial: Vec<f64>,
    ) -> InferenceResult<Self> {
        let states = initial.len();
        if emissions.len() != states {
            return Err(InferenceError::DimensionMismatch {
                operation: "continuous model construction".to_string(),
                detail: format!(
                    "{} emission distributions for {} states",
                    emissions.len(),
                    states
                ),
            });
        }
        if transitions.len() != states {
            return Err(InferenceError::DimensionMismatch {
                operation: "continuous model construction".to_string(),
                detail: format!(
                    "transition matrix has {} rows, initial distribution has {}",
                    transitions.len(),
                    states
                ),
            });
        }

        // All states must agree on the observation dimension.
        let dimension = emissions[0].dimension();
        if let Some(other) = emissions.iter().find(|d| d.dimension() != dimension) {
            return Err(InferenceError::DimensionMismatch {
                operation: "continuous model construction".to_string(),
                detail: format!(
                    "emission distributions mix dimensions {} and {}",
                    dimension,
                    other.dimension()
                ),
            });
        }

        Ok(Self {
            transitions,
            emissions,
            initial,
        })
    }

    /// Number of hidden states.
    pub fn states(&self) -> usize {
        self.initial.len()
    }

    /// Dimensionality of the observation vectors this model expects.
    pub fn dimension(&self) -> usize {
        self.emissions[0].dimension()
    }

    /// Transition matrix A.
    pub fn transitions(&self) -> &[Vec<f64>] {
        &self.transitions
    }

    /// Per-state emission distributions.
    pub fn emissions(&self) -> &[EmissionDistribution] {
        &self.emissions
    }

    /// Initial state distribution pi.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Emission densities per time step; a density failure at step `t`
    /// surfaces as an [`InferenceError::InvalidObservation`] carrying `t`.
    fn emission_rows(&self, observations: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
        let mut rows = Vec::with_capacity(observations.len());
        for (t, observation) in observations.iter().enumerate() {
            let mut row = Vec::with_capacity(self.emissions.len());
            for distribution in &self.emissions {
                let density = distribution.density(observation).map_err(|e| {
                    InferenceError::InvalidObservation {
                        index: t,
                        reason: e.to_string(),
                    }
                })?;
                row.push(density);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Density of the observation sequence under the model; an empty
    /// sequence has density 0.0, matching the discrete model's convention.
    pub fn evaluate(&self, observations: &[Vec<f64>]) -> InferenceResult<f64> {
        if observations.is_empty() {
            return Ok(0.0);
        }
        Ok(self.evaluate_log(observations)?.exp())
    }

    /// Log-density of the observation sequence.
    pub fn evaluate_log(&self, observations: &[Vec<f64>]) -> InferenceResult<f64> {
        if observations.is_empty() {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(self.forward(observations)?.log_likelihood())
    }

    /// Scaled forward pass over the sequence.
    pub fn forward(&self, observations: &[Vec<f64>]) -> InferenceResult<ForwardPass> {
        let emissions = self.emission_rows(observations)?;
        forward_backward::forward(&self.transitions, &self.initial, &emissions)
    }

    /// Backward pass under the scaling factors of a matching forward pass.
    pub fn backward(
        &self,
        observations: &[Vec<f64>],
        scaling: &[f64],
    ) -> InferenceResult<Vec<Vec<f64>>> {
        let emissions = self.emission_rows(observations)?;
        forward_backward::backward(&self.transitions, &emissions, scaling)
    }

    /// Most likely state path (Viterbi) and its joint density.
    pub fn decode(&self, observations: &[Vec<f64>]) -> InferenceResult<(Vec<usize>, f64)> {
        let (path, log_probability) = self.decode_log(observations)?;
        Ok((path, log_probability.exp()))
    }

    /// Viterbi path with the log form of the joint density. The
    /// multivariate Gaussian contributes through its log-density directly,
    /// so high-dimensional observations do not underflow before the log.
    pub fn decode_log(&self, observations: &[Vec<f64>]) -> InferenceResult<(Vec<usize>, f64)> {
        if observations.is_empty() {
            return Ok((Vec::new(), f64::NEG_INFINITY));
        }
        let mut log_emissions = Vec::with_capacity(observations.len());
        for (t, observation) in observations.iter().enumerate() {
            let mut row = Vec::with_capacity(self.emissions.len());
            for distribution in &self.emissions {
                let log_density = distribution.log_density(observation).map_err(|e| {
                    InferenceError::InvalidObservation {
                        index: t,
                        reason: e.to_string(),
                    }
                })?;
                row.push(log_density);
            }
            log_emissions.push(row);
        }
        let (path, cost) =
            forward_backward::viterbi(&self.transitions, &self.initial, &log_emissions)?;
        Ok((path, -cost))
    }

    /// Per-step posterior state distributions gamma.
    pub fn posteriors(&self, observations: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
        let emissions = self.emission_rows(observations)?;
        let pass = forward_backward::forward(&self.transitions, &self.initial, &emissions)?;
        let bwd = forward_backward::backward(&self.transitions, &emissions, &pass.scaling)?;
        forward_backward::posteriors(&pass, &bwd)
    }

    /// Posterior decoding: the individually most likely state per step.
    pub fn most_likely_states(&self, observations: &[Vec<f64>]) -> InferenceResult<Vec<usize>> {
        let gamma = self.posteriors(observations)?;
        Ok(gamma.iter().map(|row| argmax(row)).collect())
    }
}
