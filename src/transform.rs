//! Transformations (spec. §4.5): derivatives, Bezier decomposition,
//! degree elevation, alignment, morphing, tension.

use crate::config::Config;
use crate::error::{SplineError, SplineResult};
use crate::knots::domain;
use crate::numeric::{distance, knot_eq};
use crate::spline::{bezier_knot_layout, Spline};

fn multiplicity_of(knots: &[f64], u: f64, epsilon: f64) -> usize {
    knots.iter().filter(|&&k| knot_eq(k, u, epsilon)).count()
}

/// Distinct interior knot values with their multiplicities, in
/// ascending order.
fn interior_knot_multiplicities(spline: &Spline, config: &Config) -> Vec<(f64, usize)> {
    let (dmin, dmax) = domain(spline);
    let knots = spline.knots();
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < knots.len() {
        let val = knots[idx];
        let mut j = idx + 1;
        while j < knots.len() && knot_eq(knots[j], val, config.knot_epsilon) {
            j += 1;
        }
        if val > dmin + config.knot_epsilon && val < dmax - config.knot_epsilon {
            out.push((val, j - idx));
        }
        idx = j;
    }
    out
}

impl Spline {
    /// Compute the `n`-th derivative (spec. §4.5 `derive`). Fails with
    /// `Underivable` if the source is discontinuous at an interior
    /// knot with a gap greater than `epsilon`; a negative `epsilon`
    /// skips the continuity check entirely.
    pub fn derive(&self, n: usize, epsilon: f64, config: &Config) -> SplineResult<Spline> {
        let mut cur = self.clone();
        for _ in 0..n {
            cur = cur.single_derivative(epsilon, config)?;
        }
        Ok(cur)
    }

    fn single_derivative(&self, epsilon: f64, config: &Config) -> SplineResult<Spline> {
        let p = self.degree();
        let d = self.dimension();
        if p == 0 {
            // spec. §4.5: "For degree 0, the derivative is a point at the origin."
            return Ok(Spline {
                degree: 0,
                dimension: d,
                control_points: vec![0.0; d],
                knots: vec![0.0, 1.0],
            });
        }

        if epsilon >= 0.0 {
            for &(val, mult) in interior_knot_multiplicities(self, config).iter() {
                if mult >= self.order() {
                    let net = crate::eval::eval(self, val, config)?;
                    if net.num_result == 2 {
                        let gap = distance(&net.points[0..d], &net.points[d..2 * d]);
                        if gap > epsilon {
                            return Err(SplineError::Underivable { gap, epsilon });
                        }
                    }
                }
            }
        }

        let ncp = self.num_control_points();
        let knots = self.knots();
        let mut new_cp = vec![0.0; (ncp - 1) * d];
        for i in 0..ncp - 1 {
            let denom = knots[i + p + 1] - knots[i + 1];
            for c in 0..d {
                let pi = self.control_points[i * d + c];
                let pi1 = self.control_points[(i + 1) * d + c];
                new_cp[i * d + c] = if denom.abs() > 0.0 {
                    p as f64 * (pi1 - pi) / denom
                } else {
                    0.0
                };
            }
        }
        let new_knots = knots[1..knots.len() - 1].to_vec();
        Ok(Spline {
            degree: p - 1,
            dimension: d,
            control_points: new_cp,
            knots: new_knots,
        })
    }

    /// Insert every interior knot until its multiplicity equals
    /// `order`, producing a spline whose control-point buffer is the
    /// concatenation of Bezier segments (spec. §4.5 `to_beziers`).
    pub fn to_beziers(&self, config: &Config) -> SplineResult<Spline> {
        let mut result = self.clone();
        let order = result.order();
        for (val, _) in interior_knot_multiplicities(self, config) {
            let mult = multiplicity_of(result.knots(), val, config.knot_epsilon);
            if mult < order {
                result.insert_knot(val, order - mult, config)?;
            }
        }
        log::debug!(
            "to_beziers: {} control points across {} segments",
            result.num_control_points(),
            result.num_control_points() / order
        );
        Ok(result)
    }

    /// Elevate the degree by `amount` via Bezier decomposition,
    /// per-segment closed-form elevation, and recomposition (spec.
    /// §4.5 `elevate_degree`).
    pub fn elevate_degree(&self, amount: usize, epsilon: f64, config: &Config) -> SplineResult<Spline> {
        if amount == 0 {
            return Ok(self.clone());
        }
        let mut bzr = self.to_beziers(config)?;
        let dim = bzr.dimension();

        for _ in 0..amount {
            let degree = bzr.degree();
            let order = degree + 1;
            let segments = bzr.num_control_points() / order;
            let new_order = order + 1;

            let mut new_cp = Vec::with_capacity(segments * new_order * dim);
            for seg in 0..segments {
                let seg_points = &bzr.control_points()[seg * order * dim..(seg + 1) * order * dim];
                new_cp.extend_from_slice(&elevate_bezier_segment(seg_points, degree, dim));
            }

            for seg in 0..segments.saturating_sub(1) {
                let last = &new_cp[(seg * new_order + new_order - 1) * dim..(seg * new_order + new_order) * dim];
                let first = &new_cp[(seg + 1) * new_order * dim..(seg + 1) * new_order * dim + dim];
                let gap = distance(last, first);
                if gap > epsilon {
                    log::debug!(
                        "elevate_degree: Bezier segments {} and {} meet with gap {} (epsilon {})",
                        seg,
                        seg + 1,
                        gap,
                        epsilon
                    );
                }
            }

            let new_knots = bezier_knot_layout(new_order, segments);
            bzr = Spline {
                degree: degree + 1,
                dimension: dim,
                control_points: new_cp,
                knots: new_knots,
            };
        }
        Ok(bzr)
    }

    /// Linearly interpolate each interior control point between the
    /// straight-line interpolant of the endpoints (at `t = 0`) and its
    /// original position (at `t = 1`); endpoints are unchanged. `t`
    /// outside `[0, 1]` is permitted and produces an undefined but
    /// well-formed shape (spec. §4.5 `tension`) — no validation is
    /// performed, by contract.
    pub fn tension(&self, t: f64) -> Spline {
        let mut result = self.clone();
        let n = result.num_control_points();
        let d = result.dimension();
        if n < 2 {
            return result;
        }
        let p0 = result.control_points[0..d].to_vec();
        let pn = result.control_points[(n - 1) * d..n * d].to_vec();
        for i in 1..n - 1 {
            let frac = i as f64 / (n - 1) as f64;
            for c in 0..d {
                let straight = p0[c] + frac * (pn[c] - p0[c]);
                let original = result.control_points[i * d + c];
                result.control_points[i * d + c] = straight * (1.0 - t) + original * t;
            }
        }
        result
    }
}

fn elevate_bezier_segment(points: &[f64], p: usize, d: usize) -> Vec<f64> {
    let mut q = vec![0.0; (p + 2) * d];
    for i in 0..=p + 1 {
        let t = i as f64 / (p + 1) as f64;
        for c in 0..d {
            let prev = if i >= 1 { points[(i - 1) * d + c] } else { 0.0 };
            let cur = if i <= p { points[i * d + c] } else { 0.0 };
            q[i * d + c] = t * prev + (1.0 - t) * cur;
        }
    }
    q
}

/// Produce `(s1', s2')` with identical degree, control-point count and
/// (where possible) knot vector, without changing geometry (spec. §4.5
/// `align`). A precondition for [`morph`].
pub fn align(s1: &Spline, s2: &Spline, epsilon: f64, config: &Config) -> SplineResult<(Spline, Spline)> {
    let mut a = s1.clone();
    let mut b = s2.clone();

    if a.degree() < b.degree() {
        a = a.elevate_degree(b.degree() - a.degree(), epsilon, config)?;
    } else if b.degree() < a.degree() {
        b = b.elevate_degree(a.degree() - b.degree(), epsilon, config)?;
    }

    let a_interior = interior_knot_multiplicities(&a, config);
    let b_interior = interior_knot_multiplicities(&b, config);

    let mut values: Vec<f64> = Vec::new();
    for &(v, _) in a_interior.iter().chain(b_interior.iter()) {
        if !values.iter().any(|&x| knot_eq(x, v, config.knot_epsilon)) {
            values.push(v);
        }
    }
    values.sort_by(|x, y| x.partial_cmp(y).unwrap());

    for v in values {
        let ma = a_interior
            .iter()
            .find(|&&(x, _)| knot_eq(x, v, config.knot_epsilon))
            .map(|&(_, m)| m)
            .unwrap_or(0);
        let mb = b_interior
            .iter()
            .find(|&&(x, _)| knot_eq(x, v, config.knot_epsilon))
            .map(|&(_, m)| m)
            .unwrap_or(0);
        let target = ma.max(mb);
        if ma < target {
            a.insert_knot(v, target - ma, config)?;
        }
        if mb < target {
            b.insert_knot(v, target - mb, config)?;
        }
    }
    log::debug!(
        "align: degree {} -> {} control points each",
        a.degree(),
        a.num_control_points()
    );
    Ok((a, b))
}

/// Linearly interpolate control points and knots between two splines
/// at `t` (clamped to `[0, 1]`). Aligns `start`/`end` internally if
/// needed; for repeated morphing over a time-indexed loop, prefer
/// pre-aligning and passing the aligned pair (spec. §4.5 `morph`).
///
/// `dest` lets a caller reuse an existing `Spline`'s buffer allocation
/// across a loop (mapping the source's "allocate the output buffer
/// only if its handle is null" contract onto ordinary `Vec` reuse);
/// pass `None` to always allocate fresh.
pub fn morph(
    start: &Spline,
    end: &Spline,
    t: f64,
    epsilon: f64,
    config: &Config,
    dest: Option<Spline>,
) -> SplineResult<Spline> {
    let t = t.clamp(0.0, 1.0);

    let already_aligned = start.degree() == end.degree()
        && start.knots().len() == end.knots().len()
        && start
            .knots()
            .iter()
            .zip(end.knots())
            .all(|(&x, &y)| knot_eq(x, y, config.knot_epsilon));

    let (a, b) = if already_aligned {
        (start.clone(), end.clone())
    } else {
        align(start, end, epsilon, config)?
    };

    let mut out = dest.unwrap_or_else(|| a.clone());
    out.degree = a.degree();
    out.dimension = a.dimension();
    out.knots.clear();
    out.knots
        .extend(a.knots().iter().zip(b.knots()).map(|(&ka, &kb)| ka * (1.0 - t) + kb * t));
    out.control_points.clear();
    out.control_points.extend(
        a.control_points()
            .iter()
            .zip(b.control_points())
            .map(|(&pa, &pb)| pa * (1.0 - t) + pb * t),
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::SplineType;

    fn cubic_example() -> Spline {
        let cfg = Config::default();
        Spline::new_with_control_points(
            4,
            2,
            3,
            SplineType::Clamped,
            &[0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0, 0.0],
            &cfg,
        )
        .unwrap()
    }

    #[test]
    fn derive_scenario_5() {
        let cfg = Config::default();
        let s = cubic_example();
        let d1 = s.derive(1, 1e-9, &cfg).unwrap();
        assert_eq!(d1.degree(), 2);
        assert_eq!(d1.num_control_points(), 3);
        assert_eq!(d1.num_knots(), s.num_knots() - 2);
    }

    #[test]
    fn degree_zero_derivative_is_origin_point() {
        let cfg = Config::default();
        let s = Spline::new_with_control_points(1, 2, 0, SplineType::Clamped, &[5.0, 5.0], &cfg).unwrap();
        let d = s.derive(1, 1e-9, &cfg).unwrap();
        assert_eq!(d.degree(), 0);
        assert_eq!(d.control_points(), &[0.0, 0.0]);
    }

    #[test]
    fn to_beziers_scenario_4() {
        let cfg = Config::default();
        let s = cubic_example();
        let b = s.to_beziers(&cfg).unwrap();
        assert_eq!(b.num_control_points(), 4);
    }

    #[test]
    fn to_beziers_is_idempotent() {
        let cfg = Config::default();
        let s = cubic_example();
        let once = s.to_beziers(&cfg).unwrap();
        let twice = once.to_beziers(&cfg).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn elevate_degree_preserves_shape() {
        let cfg = Config::default();
        let s = cubic_example();
        let elevated = s.elevate_degree(1, 1e-6, &cfg).unwrap();
        assert_eq!(elevated.degree(), 4);
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            let before = crate::eval::eval(&s, u, &cfg).unwrap();
            let after = crate::eval::eval(&elevated, u, &cfg).unwrap();
            assert!(distance(before.result(), after.result()) < 1e-6);
        }
    }

    #[test]
    fn tension_zero_is_straight_line() {
        let s = cubic_example();
        let straightened = s.tension(0.0);
        // interior points should lie on the segment between the endpoints
        let p0 = straightened.control_point(0).unwrap().to_vec();
        let p3 = straightened.control_point(3).unwrap().to_vec();
        let p1 = straightened.control_point(1).unwrap();
        let expect_x = p0[0] + (1.0 / 3.0) * (p3[0] - p0[0]);
        assert!((p1[0] - expect_x).abs() < 1e-9);
    }

    #[test]
    fn tension_one_is_identity() {
        let s = cubic_example();
        let same = s.tension(1.0);
        assert_eq!(same.control_points(), s.control_points());
    }

    #[test]
    fn morph_endpoints_match_aligned_inputs() {
        let cfg = Config::default();
        let a = cubic_example();
        let mut b = cubic_example();
        b.set_control_point(1, &[1.0, 5.0]).unwrap();

        let at0 = morph(&a, &b, 0.0, 1e-6, &cfg, None).unwrap();
        let at1 = morph(&a, &b, 1.0, 1e-6, &cfg, None).unwrap();
        assert_eq!(at0, a);
        assert_eq!(at1, b);
    }

    #[test]
    fn align_produces_matching_knot_vectors() {
        let cfg = Config::default();
        let a = cubic_example();
        let b = Spline::new_with_control_points(
            3,
            2,
            2,
            SplineType::Clamped,
            &[0.0, 0.0, 1.0, 1.0, 2.0, 0.0],
            &cfg,
        )
        .unwrap();
        let (a2, b2) = align(&a, &b, 1e-6, &cfg).unwrap();
        assert_eq!(a2.degree(), b2.degree());
        assert_eq!(a2.num_control_points(), b2.num_control_points());
        assert_eq!(a2.num_knots(), b2.num_knots());
    }
}
