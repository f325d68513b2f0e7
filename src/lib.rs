//! # Markov Inference
//!
//! Hidden Markov model inference with the dense linear algebra and special
//! functions it rests on.
//!
//! This crate provides discrete and continuous-density hidden Markov models
//! with numerically stable inference: likelihood evaluation through the
//! scaled forward recursion, state-path decoding through log-domain Viterbi
//! search, and forward-backward posteriors for downstream training. The
//! supporting layers are usable on their own: a dense matrix kernel, LU/QR/
//! Cholesky decompositions with explicit singularity handling, and
//! Cephes-style special functions (the gamma and beta families, error
//! functions, the normal CDF with its inverse, and Bessel functions).
//!
//! ## Key Features
//!
//! - **Scaled inference**: per-step rescaling keeps forward-backward
//!   computations finite on sequences far beyond the raw-product underflow
//!   horizon
//! - **Deterministic decoding**: Viterbi ties resolve to the lowest state
//!   index, so decoded paths are reproducible across runs
//! - **Explicit failure modes**: singular matrices, domain violations, and
//!   overflow surface as typed errors, never as silent infinities
//! - **Explicit randomness**: randomized initialization takes the generator
//!   as a parameter; a seeded generator reproduces the model exactly
//!
//! ## Quick Start
//!
//! ```rust
//! use markov_inference::{HiddenMarkovModel, InferenceResult};
//!
//! fn main() -> InferenceResult<()> {
//!     // Two hidden states emitting two symbols.
//!     let hmm = HiddenMarkovModel::from_matrices(
//!         vec![vec![0.7, 0.3], vec![0.4, 0.6]],
//!         vec![vec![0.9, 0.1], vec![0.2, 0.8]],
//!         vec![0.6, 0.4],
//!     )?;
//!
//!     let probability = hmm.evaluate(&[0, 1])?;
//!     assert!((probability - 0.209).abs() < 1e-12);
//!
//!     let (path, _) = hmm.decode(&[0, 1])?;
//!     assert_eq!(path, vec![0, 1]);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The models in [`hmm`] and [`continuous`] share the recursion core in
//! [`forward_backward`]; emission densities for the continuous model come
//! from the closed distribution set in [`distributions`], whose
//! multivariate Gaussian caches its precision matrix through [`cholesky`].
//! The decompositions sit on the kernel in [`matrix`], and [`special`] and
//! [`bessel`] carry the rational-approximation function library.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Numeric foundation
pub mod errors;
pub mod matrix;

// Decompositions
pub mod cholesky;
pub mod lu;
pub mod qr;

// Special functions
pub mod bessel;
pub mod special;

// Hidden Markov models
pub mod continuous;
pub mod distributions;
pub mod forward_backward;
pub mod hmm;
pub mod topology;

// Re-exports for convenience - main public API
pub use continuous::ContinuousHiddenMarkovModel;
pub use distributions::{EmissionDistribution, GaussianComponent};
pub use errors::{InferenceError, InferenceResult};
pub use forward_backward::ForwardPass;
pub use hmm::HiddenMarkovModel;
pub use topology::Topology;

pub use cholesky::CholeskyDecomposition;
pub use lu::LuDecomposition;
pub use qr::QrDecomposition;
