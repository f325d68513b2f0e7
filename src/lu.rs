//! LU decomposition with partial pivoting.
//!
//! Factors a matrix as `P * A = L * U` by Gaussian elimination with row
//! pivoting, packing the unit-lower-triangular L (implicit diagonal) and
//! the upper-triangular U into a single matrix. The factorization itself
//! tolerates singular input; `solve` and `inverse` reject it through the
//! [`LuDecomposition::is_nonsingular`] predicate so a zero pivot never
//! becomes a silent division producing infinities.

use crate::errors::{InferenceError, InferenceResult};
use crate::matrix::ensure_rectangular;

/// LU decomposition of a rectangular matrix, captured at construction time.
///
/// The decomposition snapshots its input: mutating the original matrix after
/// construction does not affect the factors. Use
/// [`LuDecomposition::from_owned`] to hand ownership over and skip the copy.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Packed factors: U on and above the diagonal, L strictly below
    lu: Vec<Vec<f64>>,
    /// Row permutation applied during pivoting
    pivots: Vec<usize>,
    /// +1.0 for an even number of row swaps, -1.0 for odd
    pivot_sign: f64,
    rows: usize,
    cols: usize,
}

impl LuDecomposition {
    /// Factors a copy of `a`, leaving the caller's matrix untouched.
    pub fn from_copy(a: &[Vec<f64>]) -> InferenceResult<Self> {
        ensure_rectangular(a, "lu decomposition")?;
        Self::from_owned(a.to_vec())
    }

    /// Factors `a` in place, taking ownership of its storage.
    pub fn from_owned(a: Vec<Vec<f64>>) -> InferenceResult<Self> {
        let (rows, cols) = ensure_rectangular(&a, "lu decomposition")?;
        let mut lu = a;
        let mut pivots: Vec<usize> = (0..rows).collect();
        let mut pivot_sign = 1.0;

        for col in 0..cols.min(rows) {
            // Partial pivoting: pick the row with the largest magnitude in
            // this column at or below the diagonal.
            let mut max_row = col;
            let mut max_val = lu[col][col].abs();
            for row in (col + 1)..rows {
                let val = lu[row][col].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            if max_row != col {
                lu.swap(col, max_row);
                pivots.swap(col, max_row);
                pivot_sign = -pivot_sign;
            }

            let pivot = lu[col][col];
            if pivot == 0.0 {
                // Singular column: leave the exact zero on the diagonal so
                // is_nonsingular reports it; solve/inverse will refuse.
                continue;
            }

            for row in (col + 1)..rows {
                let factor = lu[row][col] / pivot;
                lu[row][col] = factor;
                for j in (col + 1)..cols {
                    let delta = factor * lu[col][j];
                    lu[row][j] -= delta;
                }
            }
        }

        Ok(Self {
            lu,
            pivots,
            pivot_sign,
            rows,
            cols,
        })
    }

    /// Number of rows of the factored matrix.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns of the factored matrix.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True iff no diagonal pivot of U is exactly zero.
    pub fn is_nonsingular(&self) -> bool {
        (0..self.cols.min(self.rows)).all(|i| self.lu[i][i] != 0.0)
    }

    /// Row permutation recorded during pivoting: output row `i` of the
    /// factorization corresponds to input row `pivots()[i]`.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// The unit-lower-triangular factor L.
    pub fn l(&self) -> Vec<Vec<f64>> {
        let k = self.rows.min(self.cols);
        let mut l = vec![vec![0.0; k]; self.rows];
        for i in 0..self.rows {
            for j in 0..k {
                if i > j {
                    l[i][j] = self.lu[i][j];
                } else if i == j {
                    l[i][j] = 1.0;
                }
            }
        }
        l
    }

    /// The upper-triangular factor U.
    pub fn u(&self) -> Vec<Vec<f64>> {
        let k = self.rows.min(self.cols);
        let mut u = vec![vec![0.0; self.cols]; k];
        for (i, row) in u.iter_mut().enumerate() {
            for j in i..self.cols {
                row[j] = self.lu[i][j];
            }
        }
        u
    }

    /// Determinant of the factored matrix: pivot sign times the product of
    /// U's diagonal. Requires a square input.
    pub fn determinant(&self) -> InferenceResult<f64> {
        if self.rows != self.cols {
            return Err(InferenceError::DimensionMismatch {
                operation: "lu determinant".to_string(),
                detail: format!(
                    "requires a square matrix, got {}x{}",
                    self.rows, self.cols
                ),
            });
        }

        let mut det = self.pivot_sign;
        for i in 0..self.cols {
            det *= self.lu[i][i];
        }
        Ok(det)
    }

    /// Solves `A * X = B` through the recorded permutation and the L and U
    /// factors. Requires a square, nonsingular A.
    pub fn solve(&self, b: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
        let (b_rows, b_cols) = ensure_rectangular(b, "lu solve")?;

        if self.rows != self.cols {
            return Err(InferenceError::DimensionMismatch {
                operation: "lu solve".to_string(),
                detail: format!(
                    "requires a square matrix, got {}x{}",
                    self.rows, self.cols
                ),
            });
        }
        if b_rows != self.rows {
            return Err(InferenceError::DimensionMismatch {
                operation: "lu solve".to_string(),
                detail: format!(
                    "right-hand side has {} rows, matrix has {}",
                    b_rows, self.rows
                ),
            });
        }
        if !self.is_nonsingular() {
            return Err(InferenceError::SingularMatrix {
                predicate: "zero pivot on the diagonal of U".to_string(),
            });
        }

        let n = self.rows;

        // Apply the row permutation to B.
        let mut x: Vec<Vec<f64>> = (0..n).map(|i| b[self.pivots[i]].clone()).collect();

        // Forward substitution through L (unit diagonal).
        for k in 0..n {
            for i in (k + 1)..n {
                let factor = self.lu[i][k];
                for j in 0..b_cols {
                    let delta = factor * x[k][j];
                    x[i][j] -= delta;
                }
            }
        }

        // Back substitution through U.
        for k in (0..n).rev() {
            let pivot = self.lu[k][k];
            for j in 0..b_cols {
                x[k][j] /= pivot;
            }
            for i in 0..k {
                let factor = self.lu[i][k];
                for j in 0..b_cols {
                    let delta = factor * x[k][j];
                    x[i][j] -= delta;
                }
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
    /// identity. Requires a square, nonsingular input.
    pub fn inverse(&self) -> InferenceResult<Vec<Vec<f64>>> {
        self.solve(&crate::matrix::identity(self.rows))
    }
}
