//! Gamma function evaluation.
//!
//! The radial profile normalizations and the Bessel K series both need
//! Γ(x) for real arguments of modest size (|x| ≲ 10 in practice). The
//! Lanczos approximation with g = 7 and a 9-term coefficient set gives
//! close to full double precision over that range, with the reflection
//! formula covering x < 1/2.

use std::f64::consts::PI;

/// Lanczos coefficients for g = 7.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function Γ(x) for real arguments.
///
/// Uses the Lanczos approximation for x ≥ 1/2 and the reflection formula
/// Γ(x)·Γ(1−x) = π/sin(πx) below that. Non-positive integers are poles
/// and return infinity; NaN input propagates.
///
/// # Arguments
/// * `x` - Argument; any finite real value away from the poles
///
/// # Returns
/// Γ(x) with relative accuracy around 1e-13 for |x| ≲ 20.
pub fn gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.5 {
        // Poles at x = 0, -1, -2, ...
        if x == x.floor() {
            return f64::INFINITY;
        }
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }

    let z = x - 1.0;
    let mut acc = LANCZOS_COEFFS[0];
    for (i, c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        acc += c / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powf(z + 0.5) * (-t).exp() * acc
}
