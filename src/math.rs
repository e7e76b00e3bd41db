//! Mathematical structs and functions.

use arrayvec::ArrayVec;
use cgmath::{Point2, Vector2};

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Tolerance below which a quantity is treated as zero.
pub const SMALL_NUMBER: f64 = 1e-10;

/// Iteration budget for [`brent_zero`]; an exhausted budget means no root.
const BRENT_MAX_ITER: usize = 100;

/// Solves `a·x² + b·x + c = 0` for real roots.
///
/// A positive discriminant yields both roots (ascending for positive `a`),
/// a zero discriminant the single tangent root, a negative one nothing.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> ArrayVec<f64, 2> {
    let mut roots = ArrayVec::new();
    let delta = b * b - 4.0 * a * c;
    if delta > 0.0 {
        let sqrt_delta = delta.sqrt();
        roots.push((-b - sqrt_delta) / (2.0 * a));
        roots.push((-b + sqrt_delta) / (2.0 * a));
    } else if delta == 0.0 {
        roots.push(-b / (2.0 * a));
    }
    roots
}

/// Finds a zero of `f` within the bracket `[a, b]` using Brent's method.
///
/// The bracket must straddle a sign change or no root is reported. The
/// search converges once the bracket narrows below `tol` (or an exact zero
/// is hit) and gives up after a fixed iteration budget, so an adversarial
/// bracket cannot stall the caller.
pub fn brent_zero(a: f64, b: f64, tol: f64, mut f: impl FnMut(f64) -> f64) -> Option<f64> {
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);
    if fa * fb >= 0.0 {
        return None;
    }
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = c;
    let mut bisected = true;

    for _ in 0..BRENT_MAX_ITER {
        let mut s = if fa != fc && fb != fc {
            // Inverse quadratic interpolation.
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            // Secant.
            b - fb * (b - a) / (fb - fa)
        };

        // Fall back to bisection whenever the interpolated point is not
        // trusted to shrink the bracket fast enough.
        let lo = (3.0 * a + b) / 4.0;
        let outside = !((lo..=b).contains(&s) || (b..=lo).contains(&s));
        if outside
            || (bisected && (s - b).abs() >= 0.5 * (b - c).abs())
            || (!bisected && (s - b).abs() >= 0.5 * (c - d).abs())
            || (bisected && (b - c).abs() < tol)
            || (!bisected && (c - d).abs() < tol)
        {
            s = 0.5 * (a + b);
            bisected = true;
        } else {
            bisected = false;
        }

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;
        if fa * fs < 0.0 {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }

        if fs == 0.0 || (b - a).abs() <= tol {
            return Some(s);
        }
    }
    None
}
