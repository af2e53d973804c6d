//! Kelvin functions of order zero
//!
//! `kei` is the radial Green's function of a thin elastic plate on a fluid
//! foundation. Small arguments use the ascending series (A&S 9.9.10-9.9.12),
//! large arguments the asymptotic expansion of `K0(x e^{iπ/4}) = ker x + i kei x`.

use std::f64::consts::{FRAC_PI_4, PI};

use nalgebra::Complex;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Above this argument the series loses too many digits to cancellation
const SERIES_LIMIT: f64 = 10.0;

const MAX_TERMS: usize = 200;

struct Series {
    ber: f64,
    bei: f64,
    // Σ (-1)^k φ(2k+1) (x²/4)^(2k+1) / ((2k+1)!)²
    kei_tail: f64,
}

fn ascending_series(x: f64) -> Series {
    let q = 0.25 * x * x;
    let mut s = Series {
        ber: 1.0,
        bei: 0.0,
        kei_tail: 0.0,
    };

    // term_m = q^m / (m!)², harmonic_m = 1 + 1/2 + ... + 1/m
    let mut term = 1.0;
    let mut harmonic = 0.0;
    for m in 1..MAX_TERMS {
        let mf = m as f64;
        term *= q / (mf * mf);
        harmonic += 1.0 / mf;

        let sign = if (m / 2) % 2 == 0 { 1.0 } else { -1.0 };
        if m % 2 == 0 {
            s.ber += sign * term;
        } else {
            s.bei += sign * term;
            s.kei_tail += sign * (harmonic - EULER_GAMMA) * term;
        }

        if mf > q && term < f64::EPSILON * 1e-3 {
            break;
        }
    }
    s
}

/// Kelvin function ber(x)
pub fn ber(x: f64) -> f64 {
    ascending_series(x).ber
}

/// Kelvin function bei(x)
pub fn bei(x: f64) -> f64 {
    ascending_series(x).bei
}

fn kei_series(x: f64) -> f64 {
    let s = ascending_series(x);
    -(0.5 * x).ln() * s.bei - FRAC_PI_4 * s.ber + s.kei_tail
}

fn kei_asymptotic(x: f64) -> f64 {
    let z = Complex::from_polar(x, FRAC_PI_4);

    // K0(z) ~ sqrt(π / 2z) e^{-z} Σ a_k / z^k, a_k = a_{k-1} · (-(2k-1)²) / (8k)
    let mut sum = Complex::new(1.0, 0.0);
    let mut term = Complex::new(1.0, 0.0);
    let mut last = f64::INFINITY;
    for k in 1..40 {
        let odd = (2 * k - 1) as f64;
        let next = term * (-(odd * odd) / (8.0 * k as f64)) / z;
        let size = next.norm();
        // Stop at the smallest term of the divergent expansion
        if size >= last || size < f64::EPSILON * 1e-3 {
            break;
        }
        term = next;
        sum += term;
        last = size;
    }

    let k0 = (Complex::new(PI / 2.0, 0.0) / z).sqrt() * (-z).exp() * sum;
    k0.im
}

/// Kelvin function kei(x) for `x >= 0`
///
/// `kei(0) = -π/4`; negative arguments return NaN.
pub fn kei(x: f64) -> f64 {
    if x < 0.0 || x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return -FRAC_PI_4;
    }
    if x <= SERIES_LIMIT {
        kei_series(x)
    } else {
        kei_asymptotic(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_values_at_origin() {
        assert_relative_eq!(kei(0.0), -FRAC_PI_4);
        assert_relative_eq!(ber(0.0), 1.0);
        assert_relative_eq!(bei(0.0), 0.0);
        assert_relative_eq!(kei(1e-12), -FRAC_PI_4, epsilon = 1e-10);
    }

    #[test]
    fn test_tabulated_values() {
        // Abramowitz & Stegun, table 9.12
        assert_relative_eq!(ber(1.0), 0.984_381_781_6, epsilon = 1e-9);
        assert_relative_eq!(bei(1.0), 0.249_566_040_0, epsilon = 1e-9);
        assert_relative_eq!(kei(1.0), -0.494_994_636_5, epsilon = 1e-8);
    }

    #[test]
    fn test_series_and_asymptotic_agree() {
        for x in [9.0, 10.0, 11.0] {
            let a = kei_series(x);
            let b = kei_asymptotic(x);
            assert_relative_eq!(a, b, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_far_field_decays() {
        assert!(kei(30.0).abs() < 1e-9);
        assert!(kei(20.0).abs() < kei(12.0).abs());
        assert!(kei(-1.0).is_nan());
    }

    #[test]
    fn test_kei_has_a_first_zero_near_3_9() {
        // The fore-bulge: kei changes sign once between 3.5 and 4.5
        assert!(kei(3.5) < 0.0);
        assert!(kei(4.5) > 0.0);
    }
}
