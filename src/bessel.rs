//! Bessel functions of the first and second kind.
//!
//! Rational approximations for |x| < 8 paired with trigonometric asymptotic
//! expansions beyond, plus the standard recurrences for integer orders
//! (downward for J when the argument is small relative to the order, upward
//! for Y). Y functions require a strictly positive argument and report
//! [`InferenceError::DomainError`] otherwise.

use crate::errors::{InferenceError, InferenceResult};

/// 2/pi, the weight of the logarithmic term in Y.
const TWO_OVER_PI: f64 = 0.636_619_772_367_581_3;

/// Bessel function of the first kind, order zero.
pub fn bessel_j0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 8.0 {
        let y = x * x;
        let ans1 = 57_568_490_574.0
            + y * (-13_362_590_354.0
                + y * (651_619_640.7
                    + y * (-11_214_424.18 + y * (77_392.330_17 + y * (-184.905_245_6)))));
        let ans2 = 57_568_490_411.0
            + y * (1_029_532_985.0
                + y * (9_494_680.718 + y * (59_272.648_53 + y * (267.853_271_2 + y))));
        ans1 / ans2
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 0.785_398_164;
        let ans1 = 1.0
            + y * (-0.109_862_862_7e-2
                + y * (0.273_451_040_7e-4
                    + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
        let ans2 = -0.156_249_999_5e-1
            + y * (0.143_048_876_5e-3
                + y * (-0.691_114_765_1e-5
                    + y * (0.762_109_516_1e-6 + y * (-0.934_935_152e-7))));
        (TWO_OVER_PI / ax).sqrt() * (xx.cos() * ans1 - z * xx.sin() * ans2)
    }
}

/// Bessel function of the first kind, order one.
pub fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 8.0 {
        let y = x * x;
        let ans1 = x
            * (72_362_614_232.0
                + y * (-7_895_059_235.0
                    + y * (242_396_853.1
                        + y * (-2_972_611.439
                            + y * (15_704.482_6 + y * (-30.160_366_06))))));
        let ans2 = 144_725_228_442.0
            + y * (2_300_535_178.0
                + y * (18_583_304.74 + y * (99_447.433_94 + y * (376.999_139_7 + y))));
        ans1 / ans2
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356_194_491;
        let ans1 = 1.0
            + y * (0.183_105e-2
                + y * (-0.351_639_649_6e-4
                    + y * (0.245_752_017_4e-5 + y * (-0.240_337_019e-6))));
        let ans2 = 0.046_874_999_95
            + y * (-0.200_269_087_3e-3
                + y * (0.844_919_909_6e-5
                    + y * (-0.882_289_87e-6 + y * 0.105_787_412e-6)));
        let ans = (TWO_OVER_PI / ax).sqrt() * (xx.cos() * ans1 - z * xx.sin() * ans2);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}

/// Bessel function of the first kind, integer order `n`.
///
/// Uses the upward recurrence when the argument dominates the order and
/// Miller's downward recurrence with renormalization otherwise.
pub fn bessel_jn(n: i32, x: f64) -> f64 {
    let n = n.unsigned_abs() as usize;
    match n {
        0 => return bessel_j0(x),
        1 => return bessel_j1(x),
        _ => {}
    }

    let ax = x.abs();
    if ax == 0.0 {
        return 0.0;
    }

    // Accuracy knobs for the downward recurrence.
    const ACC: f64 = 40.0;
    const BIGNO: f64 = 1.0e10;
    const BIGNI: f64 = 1.0e-10;

    let ans = if ax > n as f64 {
        // Upward recurrence from J0 and J1.
        let tox = 2.0 / ax;
        let mut bjm = bessel_j0(ax);
        let mut bj = bessel_j1(ax);
        for j in 1..n {
            let bjp = j as f64 * tox * bj - bjm;
            bjm = bj;
            bj = bjp;
        }
        bj
    } else {
        // Downward recurrence from an even starting order well above n.
        let tox = 2.0 / ax;
        let m = 2 * ((n + (ACC * n as f64).sqrt() as usize) / 2);
        let mut jsum = false;
        let mut sum = 0.0;
        let mut ans = 0.0;
        let mut bjp = 0.0;
        let mut bj = 1.0;
        for j in (1..=m).rev() {
            let bjm = j as f64 * tox * bj - bjp;
            bjp = bj;
            bj = bjm;
            if bj.abs() > BIGNO {
                bj *= BIGNI;
                bjp *= BIGNI;
                ans *= BIGNI;
                sum *= BIGNI;
            }
            if jsum {
                sum += bj;
            }
            jsum = !jsum;
            if j == n {
                ans = bjp;
            }
        }
        // Normalize with 1 = J0 + 2*J2 + 2*J4 + ...
        sum = 2.0 * sum - bj;
        ans / sum
    };

    if x < 0.0 && n % 2 == 1 {
        -ans
    } else {
        ans
    }
}

fn check_positive(x: f64, function: &str) -> InferenceResult<()> {
    if x <= 0.0 {
        return Err(InferenceError::DomainError {
            function: function.to_string(),
            reason: format!("argument {} must be positive", x),
        });
    }
    Ok(())
}

/// Bessel function of the second kind, order zero. Defined for x > 0.
pub fn bessel_y0(x: f64) -> InferenceResult<f64> {
    check_positive(x, "bessel_y0")?;

    if x < 8.0 {
        let y = x * x;
        let ans1 = -2_957_821_389.0
            + y * (7_062_834_065.0
                + y * (-512_359_803.6
                    + y * (10_879_881.29 + y * (-86_327.927_57 + y * 228.462_273_3))));
        let ans2 = 40_076_544_269.0
            + y * (745_249_964.8
                + y * (7_189_466.438 + y * (47_447.264_7 + y * (226.103_024_4 + y))));
        Ok(ans1 / ans2 + TWO_OVER_PI * bessel_j0(x) * x.ln())
    } else {
        let z = 8.0 / x;
        let y = z * z;
        let xx = x - 0.785_398_164;
        let ans1 = 1.0
            + y * (-0.109_862_862_7e-2
                + y * (0.273_451_040_7e-4
                    + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
        let ans2 = -0.156_249_999_5e-1
            + y * (0.143_048_876_5e-3
                + y * (-0.691_114_765_1e-5
                    + y * (0.762_109_516_1e-6 + y * (-0.934_935_152e-7))));
        Ok((TWO_OVER_PI / x).sqrt() * (xx.sin() * ans1 + z * xx.cos() * ans2))
    }
}

/// Bessel function of the second kind, order one. Defined for x > 0.
pub fn bessel_y1(x: f64) -> InferenceResult<f64> {
    check_positive(x, "bessel_y1")?;

    if x < 8.0 {
        let y = x * x;
        let ans1 = x
            * (-4.900_604_943e13
                + y * (1.275_274_39e13
                    + y * (-5.153_438_139e11
                        + y * (7.349_264_551e9
                            + y * (-4.237_922_726e7 + y * 8.511_937_935e4)))));
        let ans2 = 2.499_580_57e14
            + y * (4.244_419_664e12
                + y * (3.733_650_367e10
                    + y * (2.245_904_002e8
                        + y * (1.020_426_05e6 + y * (3.549_632_885e3 + y)))));
        Ok(ans1 / ans2 + TWO_OVER_PI * (bessel_j1(x) * x.ln() - 1.0 / x))
    } else {
        let z = 8.0 / x;
        let y = z * z;
        let xx = x - 2.356_194_491;
        let ans1 = 1.0
            + y * (0.183_105e-2
                + y * (-0.351_639_649_6e-4
                    + y * (0.245_752_017_4e-5 + y * (-0.240_337_019e-6))));
        let ans2 = 0.046_874_999_95
            + y * (-0.200_269_087_3e-3
                + y * (0.844_919_909_6e-5
                    + y * (-0.882_289_87e-6 + y * 0.105_787_412e-6)));
        Ok((TWO_OVER_PI / x).sqrt() * (xx.sin() * ans1 + z * xx.cos() * ans2))
    }
}

/// Bessel function of the second kind, integer order `n`. Defined for x > 0.
pub fn bessel_yn(n: i32, x: f64) -> InferenceResult<f64> {
    check_positive(x, "bessel_yn")?;

    let n = n.unsigned_abs() as usize;
    match n {
        0 => return bessel_y0(x),
        1 => return bessel_y1(x),
        _ => {}
    }

    // Upward recurrence is stable for Y.
    let tox = 2.0 / x;
    let mut bym = bessel_y0(x)?;
    let mut by = bessel_y1(x)?;
    for j in 1..n {
        let byp = j as f64 * tox * by - bym;
        bym = by;
        by = byp;
    }
    Ok(by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_j0_known_values() {
        assert_approx_eq!(bessel_j0(0.0), 1.0, 1e-12);
        assert_approx_eq!(bessel_j0(1.0), 0.7651976865579666, 1e-8);
        assert_approx_eq!(bessel_j0(2.404825557695773), 0.0, 1e-7);
        // Asymptotic branch
        assert_approx_eq!(bessel_j0(10.0), -0.24593576445134835, 1e-7);
        // Even symmetry
        assert_approx_eq!(bessel_j0(-3.0), bessel_j0(3.0), 1e-14);
    }

    #[test]
    fn test_j1_known_values() {
        assert_approx_eq!(bessel_j1(0.0), 0.0, 1e-12);
        assert_approx_eq!(bessel_j1(1.0), 0.4400505857449335, 1e-8);
        assert_approx_eq!(bessel_j1(10.0), 0.04347274616886144, 1e-7);
        // Odd symmetry, both branches
        assert_approx_eq!(bessel_j1(-2.0), -bessel_j1(2.0), 1e-14);
        assert_approx_eq!(bessel_j1(-10.0), -bessel_j1(10.0), 1e-14);
    }

    #[test]
    fn test_jn_recurrence_identity() {
        // J_{n-1}(x) + J_{n+1}(x) = (2n/x) J_n(x)
        for &x in &[1.5, 5.0, 12.0] {
            for n in 2..6 {
                let lhs = bessel_jn(n - 1, x) + bessel_jn(n + 1, x);
                let rhs = 2.0 * n as f64 / x * bessel_jn(n, x);
                assert_approx_eq!(lhs, rhs, 1e-7);
            }
        }
    }

    #[test]
    fn test_jn_known_values() {
        assert_approx_eq!(bessel_jn(2, 1.0), 0.11490348493190048, 1e-8);
        assert_approx_eq!(bessel_jn(5, 10.0), -0.23406152818679364, 1e-7);
        assert_approx_eq!(bessel_jn(0, 3.0), bessel_j0(3.0), 1e-14);
        assert_approx_eq!(bessel_jn(1, 3.0), bessel_j1(3.0), 1e-14);
        assert_approx_eq!(bessel_jn(3, 0.0), 0.0, 1e-14);
    }

    #[test]
    fn test_y0_y1_known_values() {
        assert_approx_eq!(bessel_y0(1.0).unwrap(), 0.08825696421567696, 1e-7);
        assert_approx_eq!(bessel_y0(10.0).unwrap(), 0.055671167283599395, 1e-7);
        assert_approx_eq!(bessel_y1(1.0).unwrap(), -0.7812128213002887, 1e-7);
        assert_approx_eq!(bessel_y1(10.0).unwrap(), 0.24901542420695388, 1e-7);
    }

    #[test]
    fn test_yn_recurrence_identity() {
        for &x in &[2.5, 9.0] {
            for n in 2..5 {
                let lhs = bessel_yn(n - 1, x).unwrap() + bessel_yn(n + 1, x).unwrap();
                let rhs = 2.0 * n as f64 / x * bessel_yn(n, x).unwrap();
                assert_approx_eq!(lhs, rhs, 1e-7);
            }
        }
    }

    #[test]
    fn test_y_rejects_non_positive() {
        assert!(bessel_y0(0.0).is_err());
        assert!(bessel_y1(-1.0).is_err());
        assert!(bessel_yn(3, 0.0).is_err());
    }

    #[test]
    fn test_wronskian_identity() {
        // J_{n+1}(x) Y_n(x) - J_n(x) Y_{n+1}(x) = 2/(pi x)
        for &x in &[1.0, 4.0, 15.0] {
            let w = bessel_jn(3, x) * bessel_yn(2, x).unwrap()
                - bessel_jn(2, x) * bessel_yn(3, x).unwrap();
            assert_approx_eq!(w, 2.0 / (std::f64::consts::PI * x), 1e-8);
        }
    }
}
