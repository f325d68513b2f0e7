//! Numerical cross-checks for the special functions and decompositions.
//!
//! The special functions are compared against statrs as an independent
//! oracle; the decompositions are checked against each other, since LU, QR
//! and Cholesky must agree on determinants and solutions wherever their
//! domains overlap.

use assert_approx_eq::assert_approx_eq;
use markov_inference::*;
use statrs::distribution::{ContinuousCDF, Normal};

mod special_function_oracle {
    use super::*;

    #[test]
    fn test_gamma_against_oracle() {
        for x in [0.1, 0.5, 1.0, 2.5, 7.0, 20.5, 120.0] {
            let ours = special::gamma(x).unwrap();
            let oracle = statrs::function::gamma::gamma(x);
            assert_approx_eq!(ours / oracle, 1.0, 1e-10);
        }
        // Negative non-integers go through the reflection formula.
        for x in [-0.5, -2.5, -10.3] {
            let ours = special::gamma(x).unwrap();
            let oracle = statrs::function::gamma::gamma(x);
            assert_approx_eq!(ours / oracle, 1.0, 1e-9);
        }
    }

    #[test]
    fn test_ln_gamma_against_oracle() {
        for x in [0.01, 0.5, 3.0, 12.9, 150.0, 1e6] {
            let ours = special::ln_gamma(x).unwrap();
            let oracle = statrs::function::gamma::ln_gamma(x);
            assert_approx_eq!(ours, oracle, 1e-8 * oracle.abs().max(1.0));
        }
    }

    #[test]
    fn test_digamma_against_oracle() {
        for x in [0.1, 1.0, 2.7, 15.0, 100.0] {
            let ours = special::digamma(x).unwrap();
            let oracle = statrs::function::gamma::digamma(x);
            assert_approx_eq!(ours, oracle, 1e-8);
        }
    }

    #[test]
    fn test_incomplete_gamma_against_oracle() {
        for &(a, x) in &[(0.5, 0.1), (1.0, 2.0), (3.5, 3.5), (10.0, 4.0), (10.0, 25.0)] {
            let lower = special::lower_incomplete_gamma(a, x).unwrap();
            let upper = special::upper_incomplete_gamma(a, x).unwrap();
            assert_approx_eq!(lower, statrs::function::gamma::gamma_lr(a, x), 1e-10);
            assert_approx_eq!(upper, statrs::function::gamma::gamma_ur(a, x), 1e-10);
        }
    }

    #[test]
    fn test_incomplete_beta_against_oracle() {
        // Cases on both sides of the power-series/continued-fraction split.
        for &(a, b, x) in &[
            (0.5, 0.5, 0.25),
            (2.0, 3.0, 0.5),
            (5.0, 1.5, 0.96),
            (8.0, 10.0, 0.35),
            (1.0, 20.0, 0.02),
        ] {
            let ours = special::incomplete_beta(a, b, x).unwrap();
            let oracle = statrs::function::beta::beta_reg(a, b, x);
            assert_approx_eq!(ours, oracle, 1e-10);
        }
    }

    #[test]
    fn test_beta_against_oracle() {
        for &(a, b) in &[(1.0, 1.0), (2.5, 3.5), (0.5, 9.0), (30.0, 40.0)] {
            assert_approx_eq!(
                special::beta(a, b).unwrap() / statrs::function::beta::beta(a, b),
                1.0,
                1e-10
            );
            assert_approx_eq!(
                special::ln_beta(a, b).unwrap(),
                statrs::function::beta::ln_beta(a, b),
                1e-10
            );
        }
    }

    #[test]
    fn test_erf_against_oracle() {
        for x in [-9.0, -3.0, -0.5, 0.0, 0.5, 1.0, 4.0, 9.0] {
            assert_approx_eq!(special::erf(x), statrs::function::erf::erf(x), 1e-12);
        }
        // Relative accuracy in the far tail, where the x >= 8 branch runs.
        for x in [8.5, 12.0, 20.0] {
            let ours = special::erfc(x);
            let oracle = statrs::function::erf::erfc(x);
            assert_approx_eq!(ours / oracle, 1.0, 1e-8);
        }
    }

    #[test]
    fn test_normal_cdf_against_oracle() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        for x in [-5.0, -1.96, -0.1, 0.0, 0.5, 2.33, 6.0] {
            assert_approx_eq!(special::normal_cdf(x), normal.cdf(x), 1e-12);
        }
        for p in [1e-8, 0.01, 0.3, 0.5, 0.9, 0.999] {
            assert_approx_eq!(
                special::normal_inverse_cdf(p).unwrap(),
                normal.inverse_cdf(p),
                1e-7
            );
        }
    }
}

mod decomposition_consistency {
    use super::*;

    fn spd_matrix() -> Vec<Vec<f64>> {
        vec![
            vec![4.0, 2.0, 0.6],
            vec![2.0, 5.0, 1.5],
            vec![0.6, 1.5, 3.0],
        ]
    }

    #[test]
    fn test_determinants_agree_across_decompositions() {
        let a = spd_matrix();
        let lu = LuDecomposition::from_copy(&a).unwrap();
        let chol = CholeskyDecomposition::from_copy(&a).unwrap();
        assert!(chol.is_positive_definite());
        assert_approx_eq!(lu.determinant().unwrap(), chol.determinant(), 1e-9);
        assert_approx_eq!(matrix::determinant(&a).unwrap(), chol.determinant(), 1e-9);
    }

    #[test]
    fn test_solves_agree_across_decompositions() {
        let a = spd_matrix();
        let b = vec![1.0, -2.0, 0.5];

        let x_lu = LuDecomposition::from_copy(&a).unwrap().solve_vector(&b).unwrap();
        let x_qr = QrDecomposition::from_copy(&a).unwrap().solve_vector(&b).unwrap();
        let x_chol = CholeskyDecomposition::from_copy(&a)
            .unwrap()
            .solve_vector(&b)
            .unwrap();
        let x_robust = CholeskyDecomposition::from_copy_robust(&a)
            .unwrap()
            .solve_vector(&b)
            .unwrap();

        for i in 0..3 {
            assert_approx_eq!(x_lu[i], x_qr[i], 1e-9);
            assert_approx_eq!(x_lu[i], x_chol[i], 1e-9);
            assert_approx_eq!(x_lu[i], x_robust[i], 1e-9);
        }

        // All residuals vanish: A x = b.
        let residual = matrix::multiply_vector(&a, &x_lu).unwrap();
        for i in 0..3 {
            assert_approx_eq!(residual[i], b[i], 1e-9);
        }
    }

    #[test]
    fn test_inverses_agree_across_decompositions() {
        let a = spd_matrix();
        let inv_lu = LuDecomposition::from_copy(&a).unwrap().inverse().unwrap();
        let inv_chol = CholeskyDecomposition::from_copy(&a).unwrap().inverse().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_approx_eq!(inv_lu[i][j], inv_chol[i][j], 1e-9);
            }
        }
    }

    #[test]
    fn test_solve_dispatch_square_vs_overdetermined() {
        // Square systems route through LU.
        let a = vec![vec![3.0, 1.0], vec![1.0, 2.0]];
        let x = matrix::solve_vector(&a, &[9.0, 8.0]).unwrap();
        assert_approx_eq!(x[0], 2.0, 1e-10);
        assert_approx_eq!(x[1], 3.0, 1e-10);

        // Overdetermined systems route through QR least squares.
        let tall = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let x = matrix::solve_vector(&tall, &[1.0, 1.0, 2.0]).unwrap();
        assert_approx_eq!(x[0], 1.0, 1e-10);
        assert_approx_eq!(x[1], 1.0, 1e-10);

        // Underdetermined systems are rejected.
        let wide = vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]];
        assert!(matrix::solve_vector(&wide, &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_singular_input_rejected_everywhere() {
        let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];

        let lu = LuDecomposition::from_copy(&singular).unwrap();
        assert!(!lu.is_nonsingular());
        assert!(lu.solve_vector(&[1.0, 1.0]).is_err());

        // The same matrix is symmetric but not positive definite.
        let chol = CholeskyDecomposition::from_copy(&singular).unwrap();
        assert!(!chol.is_positive_definite());
        assert!(chol.solve_vector(&[1.0, 1.0]).is_err());

        assert!(matrix::inverse(&singular).is_err());
    }

    #[test]
    fn test_gaussian_emission_precision_matches_direct_inverse() {
        // The multivariate Gaussian's cached precision matrix is the plain
        // inverse of its covariance.
        let covariance = vec![vec![2.0, 0.3], vec![0.3, 1.0]];
        let mvg =
            EmissionDistribution::multivariate_gaussian(vec![0.0, 0.0], covariance.clone())
                .unwrap();
        let inverse = matrix::inverse(&covariance).unwrap();
        if let EmissionDistribution::MultivariateGaussian { precision, .. } = &mvg {
            for i in 0..2 {
                for j in 0..2 {
                    assert_approx_eq!(precision[i][j], inverse[i][j], 1e-10);
                }
            }
        } else {
            panic!("expected a multivariate gaussian");
        }
    }
}
