//! Dense matrix and vector kernel.
//!
//! Elementary algebra over row-major `Vec<Vec<f64>>` matrices used by the
//! decomposition library and the HMM layer: multiplication, transposition,
//! linear-system solving, and inversion. Dimension compatibility is checked
//! at the public entry points; inner loops rely on `debug_assert!` so that
//! release builds pay no per-element checking cost.
//!
//! `solve` dispatches on the shape of the coefficient matrix: LU for square
//! systems, QR least squares for tall (overdetermined) systems.

use crate::errors::{InferenceError, InferenceResult};
use crate::lu::LuDecomposition;
use crate::qr::QrDecomposition;

/// Validates that a matrix is rectangular (not ragged) and non-empty,
/// returning its dimensions as (rows, cols).
pub(crate) fn ensure_rectangular(a: &[Vec<f64>], operation: &str) -> InferenceResult<(usize, usize)> {
    if a.is_empty() {
        return Err(InferenceError::DimensionMismatch {
            operation: operation.to_string(),
            detail: "empty matrix".to_string(),
        });
    }

    let n = a[0].len();
    if n == 0 {
        return Err(InferenceError::DimensionMismatch {
            operation: operation.to_string(),
            detail: "zero-width matrix (no columns)".to_string(),
        });
    }

    if !a.iter().all(|row| row.len() == n) {
        return Err(InferenceError::DimensionMismatch {
            operation: operation.to_string(),
            detail: "ragged matrix (inconsistent row lengths)".to_string(),
        });
    }

    Ok((a.len(), n))
}

/// Returns the n-by-n identity matrix.
pub fn identity(n: usize) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Matrix product `A * B`.
///
/// Requires the inner dimensions to match; fails with
/// [`InferenceError::DimensionMismatch`] otherwise. Returns a newly
/// allocated rows(A)-by-cols(B) matrix.
pub fn multiply(a: &[Vec<f64>], b: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
    let (m, inner_a) = ensure_rectangular(a, "multiply")?;
    let (inner_b, n) = ensure_rectangular(b, "multiply")?;

    if inner_a != inner_b {
        return Err(InferenceError::DimensionMismatch {
            operation: "multiply".to_string(),
            detail: format!("{}x{} * {}x{}", m, inner_a, inner_b, n),
        });
    }

    let mut product = vec![vec![0.0; n]; m];
    for i in 0..m {
        for k in 0..inner_a {
            let a_ik = a[i][k];
            debug_assert_eq!(b[k].len(), n);
            for j in 0..n {
                product[i][j] += a_ik * b[k][j];
            }
        }
    }

    Ok(product)
}

/// Matrix-vector product `A * x`.
pub fn multiply_vector(a: &[Vec<f64>], x: &[f64]) -> InferenceResult<Vec<f64>> {
    let (m, n) = ensure_rectangular(a, "multiply_vector")?;

    if n != x.len() {
        return Err(InferenceError::DimensionMismatch {
            operation: "multiply_vector".to_string(),
            detail: format!("{}x{} * {}-vector", m, n, x.len()),
        });
    }

    let mut product = vec![0.0; m];
    for i in 0..m {
        let mut sum = 0.0;
        for j in 0..n {
            sum += a[i][j] * x[j];
        }
        product[i] = sum;
    }

    Ok(product)
}

/// Returns the transpose of `a` as a new matrix.
pub fn transpose(a: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
    let (m, n) = ensure_rectangular(a, "transpose")?;

    let mut t = vec![vec![0.0; m]; n];
    for i in 0..m {
        for j in 0..n {
            t[j][i] = a[i][j];
        }
    }

    Ok(t)
}

/// Transposes a square matrix in place.
///
/// Fails with [`InferenceError::DimensionMismatch`] for non-square input,
/// where an in-place swap of off-diagonal pairs is not defined.
pub fn transpose_in_place(a: &mut [Vec<f64>]) -> InferenceResult<()> {
    let (m, n) = ensure_rectangular(a, "transpose_in_place")?;

    if m != n {
        return Err(InferenceError::DimensionMismatch {
            operation: "transpose_in_place".to_string(),
            detail: format!("requires a square matrix, got {}x{}", m, n),
        });
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let tmp = a[i][j];
            a[i][j] = a[j][i];
            a[j][i] = tmp;
        }
    }

    Ok(())
}

/// Solves the linear system `A * X = B`.
///
/// Dispatches on the shape of `A`: square systems go through LU with partial
/// pivoting, tall (overdetermined) systems through QR least squares. Wide
/// (underdetermined) systems are rejected with a dimension mismatch.
pub fn solve(a: &[Vec<f64>], b: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
    let (m, n) = ensure_rectangular(a, "solve")?;

    if m == n {
        LuDecomposition::from_copy(a)?.solve(b)
    } else if m > n {
        QrDecomposition::from_copy(a)?.solve(b)
    } else {
        Err(InferenceError::DimensionMismatch {
            operation: "solve".to_string(),
            detail: format!(
                "underdetermined system ({} equations, {} unknowns)",
                m, n
            ),
        })
    }
}

/// Solves `A * x = b` for a single right-hand-side vector.
pub fn solve_vector(a: &[Vec<f64>], b: &[f64]) -> InferenceResult<Vec<f64>> {
    let rhs: Vec<Vec<f64>> = b.iter().map(|&v| vec![v]).collect();
    let solution = solve(a, &rhs)?;
    Ok(solution.into_iter().map(|row| row[0]).collect())
}

/// Computes the inverse of a square matrix via LU decomposition.
///
/// Fails with [`InferenceError::DimensionMismatch`] for non-square input and
/// [`InferenceError::SingularMatrix`] when the matrix is singular.
pub fn inverse(a: &[Vec<f64>]) -> InferenceResult<Vec<Vec<f64>>> {
    let (m, n) = ensure_rectangular(a, "inverse")?;

    if m != n {
        return Err(InferenceError::DimensionMismatch {
            operation: "inverse".to_string(),
            detail: format!("requires a square matrix, got {}x{}", m, n),
        });
    }

    LuDecomposition::from_copy(a)?.inverse()
}

/// Computes the determinant of a square matrix via LU decomposition.
pub fn determinant(a: &[Vec<f64>]) -> InferenceResult<f64> {
    let (m, n) = ensure_rectangular(a, "determinant")?;

    if m != n {
        return Err(InferenceError::DimensionMismatch {
            operation: "determinant".to_string(),
            detail: format!("requires a square matrix, got {}x{}", m, n),
        });
    }

    LuDecomposition::from_copy(a)?.determinant()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_multiply_basic() {
        let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let b = vec![vec![5.0, 6.0], vec![7.0, 8.0]];
        let c = multiply(&a, &b).unwrap();
        assert_approx_eq!(c[0][0], 19.0, 1e-12);
        assert_approx_eq!(c[0][1], 22.0, 1e-12);
        assert_approx_eq!(c[1][0], 43.0, 1e-12);
        assert_approx_eq!(c[1][1], 50.0, 1e-12);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let b = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert!(matches!(
            multiply(&a, &b),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_multiply_rectangular() {
        // 2x3 * 3x1 = 2x1
        let a = vec![vec![1.0, 0.0, 2.0], vec![0.0, 3.0, -1.0]];
        let b = vec![vec![4.0], vec![1.0], vec![2.0]];
        let c = multiply(&a, &b).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].len(), 1);
        assert_approx_eq!(c[0][0], 8.0, 1e-12);
        assert_approx_eq!(c[1][0], 1.0, 1e-12);
    }

    #[test]
    fn test_multiply_vector() {
        let a = vec![vec![2.0, 0.0], vec![1.0, 3.0]];
        let x = vec![4.0, 5.0];
        let y = multiply_vector(&a, &x).unwrap();
        assert_approx_eq!(y[0], 8.0, 1e-12);
        assert_approx_eq!(y[1], 19.0, 1e-12);

        assert!(multiply_vector(&a, &[1.0]).is_err());
    }

    #[test]
    fn test_transpose_round_trip() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let t = transpose(&a).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].len(), 2);
        let back = transpose(&t).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_transpose_in_place_square() {
        let mut a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        transpose_in_place(&mut a).unwrap();
        assert_eq!(a, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
    }

    #[test]
    fn test_transpose_in_place_rejects_rectangular() {
        let mut a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            transpose_in_place(&mut a),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_solve_square_system() {
        // 2x + y = 5, x + 3y = 10 -> x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve_vector(&a, &b).unwrap();
        assert_approx_eq!(x[0], 1.0, 1e-10);
        assert_approx_eq!(x[1], 3.0, 1e-10);
    }

    #[test]
    fn test_solve_tall_least_squares() {
        // Overdetermined consistent system: y = 2 + 3x
        let a = vec![
            vec![1.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 3.0],
            vec![1.0, 4.0],
        ];
        let b = vec![5.0, 8.0, 11.0, 14.0];
        let x = solve_vector(&a, &b).unwrap();
        assert_approx_eq!(x[0], 2.0, 1e-9);
        assert_approx_eq!(x[1], 3.0, 1e-9);
    }

    #[test]
    fn test_solve_rejects_underdetermined() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let b = vec![1.0, 2.0];
        assert!(matches!(
            solve_vector(&a, &b),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_inverse_identity_round_trip() {
        let a = vec![
            vec![4.0, 2.0, 0.0],
            vec![2.0, 5.0, 1.0],
            vec![0.0, 1.0, 3.0],
        ];
        let inv = inverse(&a).unwrap();
        let product = multiply(&a, &inv).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(product[i][j], expected, 1e-10);
            }
        }
    }

    #[test]
    fn test_inverse_rejects_rectangular() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            inverse(&a),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_determinant() {
        let a = vec![vec![3.0, 8.0], vec![4.0, 6.0]];
        assert_approx_eq!(determinant(&a).unwrap(), -14.0, 1e-10);
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let a = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(multiply(&a, &a).is_err());
        assert!(transpose(&a).is_err());
    }
}
