//! Bracketed one-dimensional root finding.
//!
//! The profile layer derives flux radii by inverting cumulative-flux
//! curves: given a residual function and a bracket known to contain the
//! root, return the root. Brent's method is the production choice: it
//! is derivative-free, keeps the bisection guarantee and converges
//! superlinearly on the smooth monotone residuals that show up here.
//! Plain bisection is kept as the simple fallback.

use thiserror::Error;

/// Errors raised by [`find_root`].
#[derive(Debug, Error)]
pub enum SolveError {
    /// The function does not change sign over the bracket, so no root is
    /// guaranteed to exist inside it.
    #[error("no sign change over bracket [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi}")]
    NoSignChange { lo: f64, hi: f64, f_lo: f64, f_hi: f64 },

    /// The iteration cap was reached before the requested tolerance.
    #[error("root find did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// The bracket endpoints are not a valid interval.
    #[error("invalid bracket [{lo}, {hi}]")]
    InvalidBracket { lo: f64, hi: f64 },
}

/// Root-finding algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Interval halving; robust, linear convergence.
    Bisection,
    /// Brent's method: bisection safeguard with inverse quadratic
    /// interpolation. The default for all production solves.
    Brent,
}

const MAX_ITER: usize = 100;

/// Find a root of `f` inside the bracket `[lo, hi]`.
///
/// The bracket must contain a sign change; an endpoint that is already a
/// root (f = 0 exactly) is returned immediately.
///
/// # Arguments
/// * `f` - Function to solve; evaluated only inside the bracket
/// * `lo`, `hi` - Bracket endpoints, `lo < hi`
/// * `method` - Algorithm to use
/// * `tol` - Absolute tolerance on the root position
///
/// # Returns
/// The root position, or a [`SolveError`] when the bracket is invalid,
/// contains no sign change, or the iteration cap is hit.
pub fn find_root<F>(f: F, lo: f64, hi: f64, method: Method, tol: f64) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
        return Err(SolveError::InvalidBracket { lo, hi });
    }
    let f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(SolveError::NoSignChange { lo, hi, f_lo, f_hi });
    }
    match method {
        Method::Bisection => bisect(f, lo, hi, f_lo, tol),
        Method::Brent => brent(f, lo, hi, f_lo, f_hi, tol),
    }
}

fn bisect<F>(f: F, mut lo: f64, mut hi: f64, mut f_lo: f64, tol: f64) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    for _ in 0..MAX_ITER {
        let mid = 0.5 * (lo + hi);
        if hi - lo < tol {
            return Ok(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(SolveError::NoConvergence { iterations: MAX_ITER })
}

/// Brent's method, after the classic zeroin algorithm.
fn brent<F>(f: F, lo: f64, hi: f64, f_lo: f64, f_hi: f64, tol: f64) -> Result<f64, SolveError>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f_lo, f_hi);
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = b - a;

    for _ in 0..MAX_ITER {
        if fb.abs() > fc.abs() {
            // Ensure b is the best estimate so far
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Attempt inverse quadratic interpolation (secant when a == c)
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = b - a;
        }
    }
    Err(SolveError::NoConvergence { iterations: MAX_ITER })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_root() {
        let root = find_root(|x| 2.0 * x - 1.0, 0.0, 2.0, Method::Brent, 1e-12).unwrap();
        assert_relative_eq!(root, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_transcendental_root() {
        // cos(x) = x near 0.739085
        let root = find_root(|x| x.cos() - x, 0.0, 1.0, Method::Brent, 1e-12).unwrap();
        assert_relative_eq!(root, 0.739_085_133_215_161, epsilon = 1e-9);
    }

    #[test]
    fn test_bisection_agrees_with_brent() {
        let f = |x: f64| x * x * x - 2.0;
        let brent = find_root(f, 0.0, 2.0, Method::Brent, 1e-10).unwrap();
        let bisect = find_root(f, 0.0, 2.0, Method::Bisection, 1e-10).unwrap();
        assert_relative_eq!(brent, bisect, epsilon = 1e-8);
        assert_relative_eq!(brent, 2.0_f64.powf(1.0 / 3.0), epsilon = 1e-9);
    }

    #[test]
    fn test_endpoint_root() {
        let root = find_root(|x| x, 0.0, 1.0, Method::Brent, 1e-12).unwrap();
        assert_eq!(root, 0.0);
    }

    #[test]
    fn test_no_sign_change() {
        let err = find_root(|x| x * x + 1.0, -1.0, 1.0, Method::Brent, 1e-12).unwrap_err();
        assert!(matches!(err, SolveError::NoSignChange { .. }));
    }

    #[test]
    fn test_invalid_bracket() {
        let err = find_root(|x| x, 1.0, 0.0, Method::Brent, 1e-12).unwrap_err();
        assert!(matches!(err, SolveError::InvalidBracket { .. }));
    }

    #[test]
    fn test_flat_then_steep() {
        // A residual shaped like the cumulative-flux curves: flat near
        // zero, steep in the middle, flat again near one.
        let f = |x: f64| (1.0 - (-5.0 * x).exp()) - 0.5;
        let root = find_root(f, 1e-3, 25.0, Method::Brent, 1e-10).unwrap();
        assert_relative_eq!(root, 2.0_f64.ln() / 5.0, epsilon = 1e-8);
    }
}
