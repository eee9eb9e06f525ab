//! One-dimensional quadrature.
//!
//! Two rules cover everything the profile core integrates: a fixed-grid
//! trapezoid rule for smooth well-understood integrands, and adaptive
//! Simpson with Richardson error control for cumulative fluxes, the
//! turbulence structure function and Hankel transforms, where the
//! required resolution varies strongly across the interval.

/// Trapezoidal rule over `n` uniform intervals.
///
/// # Arguments
/// * `f` - Integrand
/// * `a`, `b` - Integration bounds (may be in either order)
/// * `n` - Number of intervals (≥ 1)
pub fn trapezoid<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    assert!(n >= 1, "Need at least one interval");
    let h = (b - a) / n as f64;
    let mut acc = 0.5 * (f(a) + f(b));
    for i in 1..n {
        acc += f(a + i as f64 * h);
    }
    acc * h
}

/// Recursion depth cap for adaptive Simpson; 2^30 subintervals is far
/// beyond anything a sane tolerance needs, and stops runaway recursion
/// on non-integrable inputs.
const MAX_DEPTH: u32 = 30;

/// Adaptive Simpson quadrature with absolute tolerance `tol`.
///
/// Each interval is accepted when the two-panel refinement agrees with
/// the one-panel estimate to within 15·tol (the factor comes from the
/// Richardson error estimate of Simpson's rule), and the standard
/// one-step extrapolation is applied on acceptance.
pub fn adaptive_simpson<F>(f: F, a: f64, b: f64, tol: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    simpson_step(&f, a, b, fa, fm, fb, whole, tol, MAX_DEPTH)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step<F>(
    f: &F,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    tol: f64,
    depth: u32,
) -> f64
where
    F: Fn(f64) -> f64,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15.0 * tol {
        return left + right + delta / 15.0;
    }
    simpson_step(f, a, m, fa, flm, fm, left, 0.5 * tol, depth - 1)
        + simpson_step(f, m, b, fm, frm, fb, right, 0.5 * tol, depth - 1)
}
