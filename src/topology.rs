//! State-transition topologies for hidden Markov models.
//!
//! A topology fixes the structure of the transition matrix and the initial
//! state distribution before a model is built. Randomized initialization
//! takes the generator as an explicit parameter, so two models built from
//! the same seeded generator are identical.

use crate::errors::{
    validate_probability_vector, validate_stochastic_matrix, InferenceError, InferenceResult,
};
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structural constraint on state transitions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Topology {
    /// Fully connected: every state can reach every other state. Rows are
    /// initialized uniformly, or drawn from the supplied generator when
    /// `random` is set. The initial distribution concentrates on state 0.
    Ergodic { states: usize, random: bool },
    /// Caller-supplied transition matrix and initial distribution, validated
    /// at construction.
    Custom {
        transitions: Vec<Vec<f64>>,
        initial: Vec<f64>,
    },
}

impl Topology {
    /// Fully connected topology with uniform transition rows.
    pub fn ergodic(states: usize) -> InferenceResult<Self> {
        Self::check_states(states)?;
        Ok(Self::Ergodic {
            states,
            random: false,
        })
    }

    /// Fully connected topology with randomly initialized transition rows.
    pub fn ergodic_random(states: usize) -> InferenceResult<Self> {
        Self::check_states(states)?;
        Ok(Self::Ergodic {
            states,
            random: true,
        })
    }

    /// Explicit transition matrix and initial distribution.
    pub fn custom(transitions: Vec<Vec<f64>>, initial: Vec<f64>) -> InferenceResult<Self> {
        let states = transitions.len();
        Self::check_states(states)?;
        validate_stochastic_matrix(&transitions, states, "custom topology transitions")?;
        if initial.len() != states {
            return Err(InferenceError::DimensionMismatch {
                operation: "custom topology".to_string(),
                detail: format!(
                    "initial distribution has length {}, transition matrix has {} states",
                    initial.len(),
                    states
                ),
            });
        }
        validate_probability_vector(&initial, "custom topology initial distribution")?;
        Ok(Self::Custom {
            transitions,
            initial,
        })
    }

    fn check_states(states: usize) -> InferenceResult<()> {
        if states == 0 {
            return Err(InferenceError::InvalidParameter {
                parameter: "states".to_string(),
                value: 0.0,
                constraint: "at least one state is required".to_string(),
            });
        }
        Ok(())
    }

    /// Number of hidden states this topology describes.
    pub fn states(&self) -> usize {
        match self {
            Self::Ergodic { states, .. } => *states,
            Self::Custom { transitions, .. } => transitions.len(),
        }
    }

    /// Materializes the transition matrix and initial distribution.
    ///
    /// The generator is only consulted for the random ergodic variant;
    /// deterministic variants ignore it.
    pub fn create<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> InferenceResult<(Vec<Vec<f64>>, Vec<f64>)> {
        match self {
            Self::Ergodic { states, random } => {
                let n = *states;
                let mut a = vec![vec![0.0; n]; n];
                if *random {
                    for row in &mut a {
                        let mut sum = 0.0;
                        for v in row.iter_mut() {
                            *v = rng.gen::<f64>();
                            sum += *v;
                        }
                        for v in row.iter_mut() {
                            *v /= sum;
                        }
                    }
                } else {
                    let uniform = 1.0 / n as f64;
                    for row in &mut a {
                        for v in row.iter_mut() {
                            *v = uniform;
                        }
                    }
                }

                let mut pi = vec![0.0; n];
                pi[0] = 1.0;
                Ok((a, pi))
            }
            Self::Custom {
                transitions,
                initial,
            } => Ok((transitions.clone(), initial.clone())),
        }
    }
}
