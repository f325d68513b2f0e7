//! Cholesky decomposition for symmetric matrices.
//!
//! Two factorization modes:
//!
//! - standard `L * L^T`, which expects a symmetric positive-definite input.
//!   The factorization never aborts midway; it records `symmetric` and
//!   `positive_definite` flags for the caller to inspect, and `solve` /
//!   `inverse` refuse when the respective predicate does not hold.
//! - robust square-root-free `L * D * L^T`, which defers the square root and
//!   therefore tolerates non-positive-definite input. In robust mode solve
//!   only requires symmetry (and nonzero diagonal entries of D).
//!
//! A zero diagonal element is a terminal condition for `solve` and
//! `inverse`; it surfaces as a singular-matrix error instead of a silent
//! division producing infinities.

use crate::errors::{InferenceError, InferenceResult};
use crate::matrix::ensure_rectangular;

/// Cholesky decomposition of a square symmetric matrix, captured at
/// construction time.
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition {
    /// Lower-triangular factor; unit diagonal in robust mode
    l: Vec<Vec<f64>>,
    /// Diagonal of D in robust mode; squared diagonal of L otherwise
    diagonal: Vec<f64>,
    robust: bool,
    symmetric: bool,
    positive_definite: bool,
    n: usize,
}

impl CholeskyDecomposition {
    /// Standard `L * L^T` factorization of a copy of `a`.
    pub fn from_copy(a: &[Vec<f64>]) -> InferenceResult<Self> {
        ensure_rectangular(a, "cholesky decomposition")?;
        Self::from_owned(a.to_vec())
    }

    /// Standard `L * L^T` factorization taking ownership of `a`.
    pub fn from_owned(a: Vec<Vec<f64>>) -> InferenceResult<Self> {
        Self::factorize(a, false)
    }

    /// Robust `L * D * L^T` factorization of a copy of `a`.
    pub fn from_copy_robust(a: &[Vec<f64>]) -> InferenceResult<Self> {
        ensure_rectangular(a, "cholesky decomposition")?;
        Self::from_owned_robust(a.to_vec())
    }

    /// Robust `L * D * L^T` factorization taking ownership of `a`.
    pub fn from_owned_robust(a: Vec<Vec<f64>>) -> InferenceResult<Self> {
        Self::factorize(a, true)
    }

    fn factorize(a: Vec<Vec<f64>>, robust: bool) -> InferenceResult<Self> {
        let (rows, cols) = ensure_rectangular(&a, "cholesky decomposition")?;
        if rows != cols {
            return Err(InferenceError::DimensionMismatch {
                operation: "cholesky decomposition".to_string(),
                detail: format!("requires a square matrix, got {}x{}", rows, cols),
            });
        }
        let n = rows;

        let mut symmetric = true;
        'sym: for i in 0..n {
            for j in (i + 1)..n {
                if a[i][j] != a[j][i] {
                    symmetric = false;
                    break 'sym;
                }
            }
        }

        let mut l = vec![vec![0.0; n]; n];
        let mut diagonal = vec![0.0; n];
        let mut positive_definite = true;

        if robust {
            // Square-root-free L*D*L^T: L has a unit diagonal, D absorbs the
            // (possibly non-positive) pivots.
            let mut v = vec![0.0; n];
            for i in 0..n {
                for j in 0..i {
                    v[j] = l[i][j] * diagonal[j];
                }

                let mut d = a[i][i];
                for k in 0..i {
                    d -= l[i][k] * v[k];
                }
                diagonal[i] = d;
                l[i][i] = 1.0;

                if d <= 0.0 {
                    positive_definite = false;
                    if d == 0.0 {
                        log::warn!(
                            "robust cholesky: zero pivot in D at index {}, solve will refuse",
                            i
                        );
                    }
                }

                for j in (i + 1)..n {
                    let mut s = a[j][i];
                    for k in 0..i {
                        s -= l[j][k] * v[k];
                    }
                    // A zero pivot leaves the column unresolved; the flag and
                    // the zero in D carry the information forward.
                    l[j][i] = if d != 0.0 { s / d } else { 0.0 };
                }
            }
        } else {
            for j in 0..n {
                let mut d = 0.0;
                for k in 0..j {
                    let mut s = 0.0;
                    for i in 0..k {
                        s += l[k][i] * l[j][i];
                    }
                    let pivot = l[k][k];
                    let value = if pivot != 0.0 {
                        (a[j][k] - s) / pivot
                    } else {
                        positive_definite = false;
                        0.0
                    };
                    l[j][k] = value;
                    d += value * value;
                }

                d = a[j][j] - d;
                if d <= 0.0 {
                    positive_definite = false;
                }
                l[j][j] = d.max(0.0).sqrt();
                diagonal[j] = d;
            }
        }

        Ok(Self {
            l,
            diagonal,
            robust,
            symmetric,
            positive_definite,
            n,
        })
    }

    /// Order of the factored matrix.
    pub fn order(&self) -> usize {
        self.n
    }

    /// Whether the robust `L * D * L^T` mode was used.
    pub fn is_robust(&self) -> bool {
        self.robust
    }

    /// True iff the input matrix was exactly symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// True iff every pivot encountered during factorization was strictly
    /// positive.
    pub fn is_positive_definite(&self) -> bool {
        self.positive_definite
    }

    /// The lower-triangular factor L (unit diagonal in robust mode).
    pub fn l(&self) -> &[Vec<f64>] {
        &self.l
    }

    /// The diagonal of D (robust mode) or the pivots d_j before the square
    /// root (standard mode).
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Determinant of the factored matrix: the product of the pivots.
    pub fn determinant(&self) -> f64 {
        self.diagonal.iter().product()
    }

    /// Natural logarithm of the determinant.
    ///
    /// Requires a positive-definite input, where the determinant is the
    /// product of strictly positive pivots.
    pub fn log_determinant(&self) -> InferenceResult<f64> {
        if !self.positive_definite {
            return Err(InferenceError::SingularMatrix {
                predicate: "matrix is not positive definite".to_string(),
            });
        }
        Ok(self.diagonal.iter().map(|&d| d.ln()).sum())
    }

    fn check_solvable(&self) -> InferenceResult<()> {
        if !self.symmetric {
            return Err(InferenceError::SingularMatrix {
                predicate: "matrix is not symmetric".to_string(),
            });
        }
        if self.robust {
            // Robust mode only needs symmetry plus nonzero pivots.
            if self.diagonal.iter().any(|&d| d == 0.0) {
                return Err(InferenceError::SingularMatrix {
                    predicate: "zero pivot in D".to_string(),
                });
            }
        } else if !self.positive_definite {
            return Err(InferenceError::SingularMatrix {
                predicate: "matrix is not positive definite".to_string(),
            });
        }
        Ok(())
    }

    /// Solves `A * X = B` through forward and back substitution.
    pub fn solve(&self, b: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
        let (b_rows, b_cols) = ensure_rectangular(b, "cholesky solve")?;
        if b_rows != self.n {
            return Err(InferenceError::DimensionMismatch {
                operation: "cholesky solve".to_string(),
                detail: format!(
                    "right-hand side has {} rows, matrix has {}",
                    b_rows, self.n
                ),
            });
        }
        self.check_solvable()?;

        let n = self.n;
        let mut x = b.to_vec();

        // Forward substitution: L * Y = B.
        for k in 0..n {
            for j in 0..b_cols {
                for i in 0..k {
                    let delta = x[i][j] * self.l[k][i];
                    x[k][j] -= delta;
                }
                x[k][j] /= self.l[k][k];
            }
        }

        // Robust mode: divide through by D.
        if self.robust {
            for k in 0..n {
                for j in 0..b_cols {
                    x[k][j] /= self.diagonal[k];
                }
            }
        }

        // Back substitution: L^T * X = Y.
        for k in (0..n).rev() {
            for j in 0..b_cols {
                for i in (k + 1)..n {
                    let delta = x[i][j] * self.l[i][k];
                    x[k][j] -= delta;
                }
                x[k][j] /= self.l[k][k];
            }
        }

        Ok(x)
    }

    /// Solves `A * x = b` for a single right-hand-side vector.
    pub fn solve_vector(&self, b: &[f64]) -> InferenceResult<Vec<f64>> {
        let rhs: Vec<Vec<f64>> = b.iter().map(|&v| vec![v]).collect();
        let x = self.solve(&rhs)?;
        Ok(x.into_iter().map(|row| row[0]).collect())
    }

    /// Inverse of the factored matrix, computed by solving against the
    /// identity.
    pub fn inverse(&self) -> InferenceResult<Vec<Vec<f64>>> {
        self.solve(&crate::matrix::identity(self.n))
    }
}
