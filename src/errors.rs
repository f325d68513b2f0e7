//! Error types and validation functions for the inference engine.
//!
//! This module provides the error taxonomy shared by the matrix kernel, the
//! decomposition library, the special functions, and the HMM algorithms,
//! along with reusable validation helpers for probability vectors and
//! stochastic matrices.

use thiserror::Error;

/// Error types for matrix, special-function, and HMM operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum InferenceError {
    /// Operand dimensions are incompatible with the requested operation.
    #[error("Dimension mismatch in {operation}: {detail}")]
    DimensionMismatch {
        /// Operation that rejected the operands
        operation: String,
        /// Description of the incompatibility
        detail: String,
    },

    /// Invalid parameter value for a model or algorithm.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Not enough data for the requested computation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// A decomposition predicate required by solve/inverse does not hold.
    #[error("Singular matrix: {predicate}")]
    SingularMatrix {
        /// The specific predicate that failed (e.g. "matrix is rank deficient")
        predicate: String,
    },

    /// Mathematical precondition of a special function violated.
    #[error("Domain error in {function}: {reason}")]
    DomainError {
        /// Function that rejected its argument
        function: String,
        /// Why the argument is outside the domain
        reason: String,
    },

    /// Intermediate special-function value exceeds the representable range.
    #[error("Overflow in {function}")]
    Overflow {
        /// Function whose intermediate value overflowed
        function: String,
    },

    /// An observation is not valid for the model it was passed to.
    #[error("Invalid observation at index {index}: {reason}")]
    InvalidObservation {
        /// Position of the offending observation in the input sequence
        index: usize,
        /// Why the observation was rejected
        reason: String,
    },

    /// Numerical computation failed for a reason not covered above.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for the failure
        reason: String,
    },
}

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Validates that a value is finite and not NaN.
///
/// # Example
/// ```rust
/// use markov_inference::errors::validate_finite;
///
/// assert!(validate_finite(1.0, "mean").is_ok());
/// assert!(validate_finite(f64::NAN, "mean").is_err());
/// ```
pub fn validate_finite(value: f64, name: &str) -> InferenceResult<()> {
    if !value.is_finite() {
        Err(InferenceError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value, naming its index.
pub fn validate_all_finite(data: &[f64], name: &str) -> InferenceResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        return Err(InferenceError::NumericalError {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
        });
    }
    Ok(())
}

/// Tolerance for probability-sum checks.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Validates that a vector is a discrete probability distribution:
/// non-negative entries summing to 1 within [`PROBABILITY_TOLERANCE`].
///
/// # Example
/// ```rust
/// use markov_inference::errors::validate_probability_vector;
///
/// assert!(validate_probability_vector(&[0.6, 0.4], "pi").is_ok());
/// assert!(validate_probability_vector(&[0.6, 0.6], "pi").is_err());
/// assert!(validate_probability_vector(&[1.2, -0.2], "pi").is_err());
/// ```
pub fn validate_probability_vector(probs: &[f64], name: &str) -> InferenceResult<()> {
    if probs.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    validate_all_finite(probs, name)?;

    if let Some((i, &p)) = probs.iter().enumerate().find(|(_, &p)| p < 0.0) {
        return Err(InferenceError::InvalidParameter {
            parameter: format!("{}[{}]", name, i),
            value: p,
            constraint: "must be non-negative".to_string(),
        });
    }

    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InferenceError::InvalidParameter {
            parameter: format!("sum({})", name),
            value: sum,
            constraint: format!("must equal 1 within {:e}", PROBABILITY_TOLERANCE),
        });
    }

    Ok(())
}

/// Validates that every row of a matrix is a probability distribution and
/// that the matrix is rectangular with `expected_cols` columns.
pub fn validate_stochastic_matrix(
    matrix: &[Vec<f64>],
    expected_cols: usize,
    name: &str,
) -> InferenceResult<()> {
    if matrix.is_empty() {
        return Err(InferenceError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    for (i, row) in matrix.iter().enumerate() {
        if row.len() != expected_cols {
            return Err(InferenceError::DimensionMismatch {
                operation: "stochastic matrix validation".to_string(),
                detail: format!(
                    "{} row {} has {} columns, expected {}",
                    name,
                    i,
                    row.len(),
                    expected_cols
                ),
            });
        }
        validate_probability_vector(row, &format!("{}[{}]", name, i))?;
    }

    Ok(())
}
