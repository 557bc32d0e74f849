//! Interpolation (spec. §4.6): cubic natural interpolation via a
//! tridiagonal solve, and Catmull–Rom-to-Bezier conversion.

use crate::config::Config;
use crate::error::{SplineError, SplineResult};
use crate::numeric::distance;
use crate::spline::{bezier_knot_layout, Spline};

fn point_spline(point: &[f64]) -> Spline {
    Spline {
        degree: 0,
        dimension: point.len(),
        control_points: point.to_vec(),
        knots: vec![0.0, 1.0],
    }
}

/// Solve `M_{i-1} + 4 M_i + M_{i+1} = rhs_i` for `i` in `1..n-1`, with
/// `M_0 = M_{n-1} = 0` (natural boundary conditions), via the Thomas
/// algorithm. Returns the full length-`n` vector including the
/// clamped endpoints.
fn solve_natural_second_derivatives(coord: &[f64]) -> Vec<f64> {
    let n = coord.len();
    let mut m = vec![0.0; n];
    let unknowns = n.saturating_sub(2);
    if unknowns == 0 {
        return m;
    }

    let mut rhs = vec![0.0; unknowns];
    for i in 1..n - 1 {
        rhs[i - 1] = 6.0 * (coord[i + 1] - 2.0 * coord[i] + coord[i - 1]);
    }

    let mut cprime = vec![0.0; unknowns];
    let mut dprime = vec![0.0; unknowns];
    cprime[0] = 1.0 / 4.0;
    dprime[0] = rhs[0] / 4.0;
    for i in 1..unknowns {
        let denom = 4.0 - cprime[i - 1];
        cprime[i] = 1.0 / denom;
        dprime[i] = (rhs[i] - dprime[i - 1]) / denom;
    }

    let mut x = vec![0.0; unknowns];
    x[unknowns - 1] = dprime[unknowns - 1];
    for i in (0..unknowns - 1).rev() {
        x[i] = dprime[i] - cprime[i] * x[i + 1];
    }

    m[1..n - 1].copy_from_slice(&x);
    m
}

/// Hermite `(p0, p1, tangent0, tangent1)` (tangents already scaled for
/// the `[0, 1]` parameterization of this segment) to the four Bezier
/// control points of the equivalent cubic.
fn hermite_to_bezier(p0: &[f64], p1: &[f64], t0: &[f64], t1: &[f64], d: usize) -> [Vec<f64>; 4] {
    let mut b0 = vec![0.0; d];
    let mut b1 = vec![0.0; d];
    let mut b2 = vec![0.0; d];
    let mut b3 = vec![0.0; d];
    for c in 0..d {
        b0[c] = p0[c];
        b1[c] = p0[c] + t0[c] / 3.0;
        b2[c] = p1[c] - t1[c] / 3.0;
        b3[c] = p1[c];
    }
    [b0, b1, b2, b3]
}

/// Construct a C² cubic B-spline through `points` (a flat
/// `n * dimension` buffer) with natural boundary conditions (spec.
/// §4.6 `interpolate_cubic_natural`). Emitted as `n - 1` stacked cubic
/// Bezier segments. `n == 1` emits a degree-0 point.
pub fn interpolate_cubic_natural(points: &[f64], dimension: usize, _config: &Config) -> SplineResult<Spline> {
    if dimension == 0 {
        return Err(SplineError::DimZero);
    }
    if points.len() % dimension != 0 {
        return Err(SplineError::LctrlpDimMismatch {
            len: points.len(),
            dim: dimension,
        });
    }
    let n = points.len() / dimension;
    if n == 0 {
        return Err(SplineError::NumPoints(0));
    }
    if n == 1 {
        return Ok(point_spline(&points[0..dimension]));
    }

    let mut second_derivatives = vec![vec![0.0; n]; dimension];
    for c in 0..dimension {
        let coord: Vec<f64> = (0..n).map(|i| points[i * dimension + c]).collect();
        second_derivatives[c] = solve_natural_second_derivatives(&coord);
    }

    let segments = n - 1;
    let mut control_points = Vec::with_capacity(segments * 4 * dimension);
    for i in 0..segments {
        let p_i = &points[i * dimension..(i + 1) * dimension];
        let p_i1 = &points[(i + 1) * dimension..(i + 2) * dimension];

        let mut b1 = vec![0.0; dimension];
        let mut b2 = vec![0.0; dimension];
        for c in 0..dimension {
            let m_i = second_derivatives[c][i];
            let m_i1 = second_derivatives[c][i + 1];
            let cc = m_i / 2.0;
            let dd = (m_i1 - m_i) / 6.0;
            let bb = (p_i1[c] - p_i[c]) - cc - dd;
            b1[c] = p_i[c] + bb / 3.0;
            b2[c] = p_i[c] + 2.0 * bb / 3.0 + cc / 3.0;
        }
        control_points.extend_from_slice(p_i);
        control_points.extend_from_slice(&b1);
        control_points.extend_from_slice(&b2);
        control_points.extend_from_slice(p_i1);
    }

    let knots = bezier_knot_layout(4, segments);
    Ok(Spline {
        degree: 3,
        dimension,
        control_points,
        knots,
    })
}

fn dedup_within_epsilon(points: &[f64], dimension: usize, epsilon: f64) -> Vec<f64> {
    let eps = epsilon.abs();
    let n = points.len() / dimension;
    let mut out = Vec::with_capacity(points.len());
    for i in 0..n {
        let p = &points[i * dimension..(i + 1) * dimension];
        let keep = if out.is_empty() {
            true
        } else {
            let last = &out[out.len() - dimension..];
            distance(last, p) > eps
        };
        if keep {
            out.extend_from_slice(p);
        }
    }
    out
}

fn phantom_before(points: &[f64], dimension: usize, sentinel: Option<&[f64]>, epsilon: f64) -> Vec<f64> {
    let p0 = &points[0..dimension];
    let p1 = &points[dimension..2 * dimension];
    if let Some(s) = sentinel {
        if distance(s, p0) > epsilon.abs() {
            return s.to_vec();
        }
    }
    (0..dimension).map(|c| 2.0 * p0[c] - p1[c]).collect()
}

fn phantom_after(points: &[f64], dimension: usize, sentinel: Option<&[f64]>, epsilon: f64) -> Vec<f64> {
    let n = points.len() / dimension;
    let plast = &points[(n - 1) * dimension..n * dimension];
    let pprev = &points[(n - 2) * dimension..(n - 1) * dimension];
    if let Some(s) = sentinel {
        if distance(s, plast) > epsilon.abs() {
            return s.to_vec();
        }
    }
    (0..dimension).map(|c| 2.0 * plast[c] - pprev[c]).collect()
}

/// Convert a polyline to a clamped cubic B-spline via centripetal (or
/// uniform/chordal, by `alpha`) Catmull–Rom-to-Bezier conversion (spec.
/// §4.6 `interpolate_catmull_rom`). `alpha` is clamped to `[0, 1]`
/// (`0` uniform, `0.5` centripetal, `1` chordal). Consecutive points
/// within `epsilon` are merged first; if only one unique point
/// remains, the result is a degree-0 point.
#[allow(clippy::too_many_arguments)]
pub fn interpolate_catmull_rom(
    points: &[f64],
    dimension: usize,
    alpha: f64,
    first: Option<&[f64]>,
    last: Option<&[f64]>,
    epsilon: f64,
    _config: &Config,
) -> SplineResult<Spline> {
    if dimension == 0 {
        return Err(SplineError::DimZero);
    }
    if points.len() % dimension != 0 {
        return Err(SplineError::LctrlpDimMismatch {
            len: points.len(),
            dim: dimension,
        });
    }
    if points.is_empty() {
        return Err(SplineError::NumPoints(0));
    }
    let alpha = alpha.clamp(0.0, 1.0);

    let dedup = dedup_within_epsilon(points, dimension, epsilon);
    let n = dedup.len() / dimension;
    if n == 1 {
        return Ok(point_spline(&dedup[0..dimension]));
    }

    let before = phantom_before(&dedup, dimension, first, epsilon);
    let after = phantom_after(&dedup, dimension, last, epsilon);

    let mut extended = Vec::with_capacity(dedup.len() + 2 * dimension);
    extended.extend_from_slice(&before);
    extended.extend_from_slice(&dedup);
    extended.extend_from_slice(&after);

    let segments = n - 1;
    let mut control_points = Vec::with_capacity(segments * 4 * dimension);

    for seg in 0..segments {
        // indices into `extended`: seg+0 = P0, seg+1 = P1, seg+2 = P2, seg+3 = P3
        let p0 = &extended[seg * dimension..(seg + 1) * dimension];
        let p1 = &extended[(seg + 1) * dimension..(seg + 2) * dimension];
        let p2 = &extended[(seg + 2) * dimension..(seg + 3) * dimension];
        let p3 = &extended[(seg + 3) * dimension..(seg + 4) * dimension];

        let d01 = distance(p0, p1).max(1e-12).powf(alpha);
        let d12 = distance(p1, p2).max(1e-12).powf(alpha);
        let d23 = distance(p2, p3).max(1e-12).powf(alpha);

        let t0 = 0.0;
        let t1 = t0 + d01;
        let t2 = t1 + d12;
        let t3 = t2 + d23;

        let mut tangent1 = vec![0.0; dimension];
        let mut tangent2 = vec![0.0; dimension];
        for c in 0..dimension {
            let a = (p1[c] - p0[c]) / (t1 - t0) - (p2[c] - p0[c]) / (t2 - t0) + (p2[c] - p1[c]) / (t2 - t1);
            tangent1[c] = a * (t2 - t1);
            let b = (p2[c] - p1[c]) / (t2 - t1) - (p3[c] - p1[c]) / (t3 - t1) + (p3[c] - p2[c]) / (t3 - t2);
            tangent2[c] = b * (t2 - t1);
        }

        let [_, b1, b2, _] = hermite_to_bezier(p1, p2, &tangent1, &tangent2, dimension);
        control_points.extend_from_slice(p1);
        control_points.extend_from_slice(&b1);
        control_points.extend_from_slice(&b2);
        control_points.extend_from_slice(p2);
    }

    let knots = bezier_knot_layout(4, segments);
    log::debug!(
        "interpolate_catmull_rom: {} unique points -> {} segments, alpha={}",
        n,
        segments,
        alpha
    );
    Ok(Spline {
        degree: 3,
        dimension,
        control_points,
        knots,
    })
}
