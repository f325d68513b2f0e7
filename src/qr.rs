//! QR decomposition by Householder reflections.
//!
//! Factors an m-by-n matrix (m >= n) as `A = Q * R` with orthogonal Q and
//! upper-triangular R, processing one column reflector at a time. The
//! reflectors are kept in compact form; `solve` applies them directly to the
//! right-hand side without materializing Q, which makes this the
//! least-squares solver for overdetermined systems.

use crate::errors::{InferenceError, InferenceResult};
use crate::matrix::ensure_rectangular;

/// QR decomposition of an m-by-n matrix with m >= n.
///
/// Construction snapshots the input. For a wide matrix, factor its transpose
/// through [`QrDecomposition::from_copy_transposed`].
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    /// Packed storage: R above the diagonal, Householder vectors below
    qr: Vec<Vec<f64>>,
    /// Diagonal of R (the packed diagonal holds reflector components)
    rdiag: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl QrDecomposition {
    /// Factors a copy of `a`, leaving the caller's matrix untouched.
    pub fn from_copy(a: &[Vec<f64>]) -> InferenceResult<Self> {
        ensure_rectangular(a, "qr decomposition")?;
        Self::from_owned(a.to_vec())
    }

    /// Factors a copy of the transpose of `a`, for callers whose system is
    /// naturally wide.
    pub fn from_copy_transposed(a: &[Vec<f64>]) -> InferenceResult<Self> {
        Self::from_owned(crate::matrix::transpose(a)?)
    }

    /// Factors `a` in place, taking ownership of its storage.
    pub fn from_owned(a: Vec<Vec<f64>>) -> InferenceResult<Self> {
        let (rows, cols) = ensure_rectangular(&a, "qr decomposition")?;

        if rows < cols {
            return Err(InferenceError::DimensionMismatch {
                operation: "qr decomposition".to_string(),
                detail: format!(
                    "requires rows >= columns, got {}x{} (factor the transpose instead)",
                    rows, cols
                ),
            });
        }

        let mut qr = a;
        let mut rdiag = vec![0.0; cols];

        for k in 0..cols {
            // 2-norm of the k-th column below the diagonal, guarded against
            // intermediate overflow via hypot-style accumulation.
            let mut nrm = 0.0f64;
            for row in qr.iter().skip(k) {
                nrm = nrm.hypot(row[k]);
            }

            if nrm != 0.0 {
                // Choose the sign that avoids cancellation.
                if qr[k][k] < 0.0 {
                    nrm = -nrm;
                }
                for row in qr.iter_mut().skip(k) {
                    row[k] /= nrm;
                }
                qr[k][k] += 1.0;

                // Apply the reflector to the remaining columns.
                for j in (k + 1)..cols {
                    let mut s = 0.0;
                    for row in qr.iter().skip(k) {
                        s += row[k] * row[j];
                    }
                    s = -s / qr[k][k];
                    for row in qr.iter_mut().skip(k) {
                        let delta = s * row[k];
                        row[j] += delta;
                    }
                }
            }

            rdiag[k] = -nrm;
        }

        Ok(Self {
            qr,
            rdiag,
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

    /// True iff no diagonal entry of R is exactly zero.
    pub fn is_full_rank(&self) -> bool {
        self.rdiag.iter().all(|&d| d != 0.0)
    }

    /// The upper-triangular factor R (n-by-n).
    pub fn r(&self) -> Vec<Vec<f64>> {
        let mut r = vec![vec![0.0; self.cols]; self.cols];
        for (i, row) in r.iter_mut().enumerate() {
            row[i] = self.rdiag[i];
            for j in (i + 1)..self.cols {
                row[j] = self.qr[i][j];
            }
        }
        r
    }

    /// The orthogonal factor Q in economy form (m-by-n), accumulated from
    /// the stored reflectors.
    pub fn q(&self) -> Vec<Vec<f64>> {
        let mut q = vec![vec![0.0; self.cols]; self.rows];
        for k in (0..self.cols).rev() {
            q[k][k] = 1.0;
            for j in k..self.cols {
                if self.qr[k][k] != 0.0 {
                    let mut s = 0.0;
                    for i in k..self.rows {
                        s += self.qr[i][k] * q[i][j];
                    }
                    s = -s / self.qr[k][k];
                    for i in k..self.rows {
                        q[i][j] += s * self.qr[i][k];
                    }
                }
            }
        }
        q
    }

    /// Least-squares solution of `A * X = B`: applies the stored reflectors
    /// to the right-hand side and back-substitutes through R.
    ///
    /// Fails with [`InferenceError::SingularMatrix`] when the matrix is rank
    /// deficient (some diagonal of R exactly zero).
    pub fn solve(&self, b: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
        let (b_rows, b_cols) = ensure_rectangular(b, "qr solve")?;

        if b_rows != self.rows {
            return Err(InferenceError::DimensionMismatch {
                operation: "qr solve".to_string(),
                detail: format!(
                    "right-hand side has {} rows, matrix has {}",
                    b_rows, self.rows
                ),
            });
        }
        if !self.is_full_rank() {
            return Err(InferenceError::SingularMatrix {
                predicate: "matrix is rank deficient (zero diagonal in R)".to_string(),
            });
        }

        let mut y = b.to_vec();

        // Compute Q' * B by applying each reflector in turn.
        for k in 0..self.cols {
            for j in 0..b_cols {
                let mut s = 0.0;
                for i in k..self.rows {
                    s += self.qr[i][k] * y[i][j];
                }
                s = -s / self.qr[k][k];
                for i in k..self.rows {
                    let delta = s * self.qr[i][k];
                    y[i][j] += delta;
                }
            }
        }

        // Back substitution through R.
        for k in (0..self.cols).rev() {
            for j in 0..b_cols {
                y[k][j] /= self.rdiag[k];
            }
            for i in 0..k {
                for j in 0..b_cols {
                    let delta = y[k][j] * self.qr[i][k];
                    y[i][j] -= delta;
                }
            }
        }

        // Only the first n rows carry the solution.
        Ok(y.into_iter().take(self.cols).collect())
    }

    /// Least-squares solution for a single right-hand-side vector.
    pub fn solve_vector(&self, b: &[f64]) -> InferenceResult<Vec<f64>> {
        let rhs: Vec<Vec<f64>> = b.iter().map(|&v| vec![v]).collect();
        let x = self.solve(&rhs)?;
        Ok(x.into_iter().map(|row| row[0]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::multiply;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_reconstruction() {
        let a = vec![
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
        ];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        assert!(qr.is_full_rank());

        let q = qr.q();
        let r = qr.r();
        let reconstructed = multiply(&q, &r).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert_approx_eq!(reconstructed[i][j], a[i][j], 1e-10);
            }
        }
    }

    #[test]
    fn test_q_has_orthonormal_columns() {
        let a = vec![
            vec![1.0, -1.0],
            vec![1.0, 4.0],
            vec![1.0, 4.0],
            vec![1.0, -1.0],
        ];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        let q = qr.q();
        for i in 0..2 {
            for j in 0..2 {
                let mut dot = 0.0;
                for row in &q {
                    dot += row[i] * row[j];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(dot, expected, 1e-10);
            }
        }
    }

    #[test]
    fn test_least_squares_solve() {
        // y = 2 + 3x with an inconsistent fourth observation; the normal
        // equations solution is still (2, 3) shifted by the residual split.
        let a = vec![
            vec![1.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 3.0],
        ];
        let b = vec![5.0, 8.0, 11.0];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        let x = qr.solve_vector(&b).unwrap();
        assert_approx_eq!(x[0], 2.0, 1e-9);
        assert_approx_eq!(x[1], 3.0, 1e-9);
    }

    #[test]
    fn test_rejects_wide_matrix() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            QrDecomposition::from_copy(&a),
            Err(InferenceError::DimensionMismatch { .. })
        ));

        // The transposed entry point accepts the same matrix.
        let qr = QrDecomposition::from_copy_transposed(&a).unwrap();
        assert_eq!(qr.rows(), 3);
        assert_eq!(qr.cols(), 2);
    }

    #[test]
    fn test_rank_deficient_solve_fails() {
        // Second column is twice the first.
        let a = vec![
            vec![1.0, 2.0],
            vec![2.0, 4.0],
            vec![3.0, 6.0],
        ];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        assert!(!qr.is_full_rank());
        assert!(matches!(
            qr.solve_vector(&[1.0, 2.0, 3.0]),
            Err(InferenceError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_square_solve_matches_lu() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        let x = qr.solve_vector(&b).unwrap();
        let lu = crate::lu::LuDecomposition::from_copy(&a).unwrap();
        let y = lu.solve_vector(&b).unwrap();
        assert_approx_eq!(x[0], y[0], 1e-10);
        assert_approx_eq!(x[1], y[1], 1e-10);
    }

    #[test]
    fn test_solve_dimension_mismatch() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let qr = QrDecomposition::from_copy(&a).unwrap();
        assert!(matches!(
            qr.solve_vector(&[1.0, 2.0]),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }
}
