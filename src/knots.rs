//! Knot operations (spec. §4.4): validated knot-vector setting (see
//! `Spline::set_knot` in `spline.rs`), knot insertion, splitting,
//! domain queries.

use crate::config::Config;
use crate::error::{SplineError, SplineResult};
use crate::numeric::{distance, knot_eq};
use crate::spline::Spline;

/// The parameter interval the spline is defined over: `(knots[degree],
/// knots[n])` (spec. §3.1, §4.4).
pub fn domain(spline: &Spline) -> (f64, f64) {
    let knots = spline.knots();
    (knots[spline.degree()], knots[spline.num_control_points()])
}

fn multiplicity_of(knots: &[f64], u: f64, epsilon: f64) -> usize {
    knots.iter().filter(|&&k| knot_eq(k, u, epsilon)).count()
}

impl Spline {
    /// Insert `u` `num` times, shifting the control-point buffer by one
    /// slot per insertion via the De Boor knot-insertion recurrence
    /// (spec. §4.4). Returns the index of the last instance of `u` in
    /// the resulting knot vector.
    pub fn insert_knot(&mut self, u: f64, num: usize, config: &Config) -> SplineResult<usize> {
        let (dmin, dmax) = domain(self);
        let eps = config.knot_epsilon;
        if u < dmin - eps || u > dmax + eps {
            return Err(SplineError::UUndefined { u, min: dmin, max: dmax });
        }
        let order = self.order();
        let d = self.dimension();

        let mut k = locate_for_insert(self.knots(), self.degree(), self.num_control_points(), u, eps);
        let mut s = multiplicity_of(self.knots(), u, eps);

        if s + num > order {
            return Err(SplineError::Multiplicity { order });
        }

        for _ in 0..num {
            let ncp = self.num_control_points();
            let mut new_cp = vec![0.0; (ncp + 1) * d];
            let left_start = k + 1 - order;
            // Unaffected control points on the left copy through unchanged.
            new_cp[..left_start * d].copy_from_slice(&self.control_points[..left_start * d]);
            // Affected positions are recomputed via the standard affine
            // blend between neighbouring control points.
            for i in left_start..=(k - s) {
                let denom = self.knots[i + order] - self.knots[i];
                let alpha = if denom.abs() > 0.0 {
                    (u - self.knots[i]) / denom
                } else {
                    0.0
                };
                for c in 0..d {
                    let left = self.control_points[(i - 1) * d + c];
                    let right = self.control_points[i * d + c];
                    new_cp[i * d + c] = (1.0 - alpha) * left + alpha * right;
                }
            }
            // Unaffected control points on the right shift by one slot.
            new_cp[(k - s + 1) * d..].copy_from_slice(&self.control_points[(k - s) * d..]);

            self.control_points = new_cp;
            self.knots.insert(k + 1, u);
            k += 1;
            s += 1;
        }

        log::debug!("insert_knot: u={}, num={}, resulting multiplicity={}", u, num, s);
        Ok(k)
    }

    /// Insert `u` until its multiplicity equals `order`, producing a
    /// discontinuity suitable for separating Bezier segments (spec.
    /// §4.4 `split`). At the domain endpoints this is a no-op and `k`
    /// is set to the appropriate boundary index.
    pub fn split(&mut self, u: f64, config: &Config) -> SplineResult<usize> {
        let (dmin, dmax) = domain(self);
        let eps = config.knot_epsilon;
        if knot_eq(u, dmin, eps) {
            return Ok(self.degree());
        }
        if knot_eq(u, dmax, eps) {
            return Ok(self.num_control_points() - 1);
        }
        let order = self.order();
        let s = multiplicity_of(self.knots(), u, eps);
        if s >= order {
            let k = locate_for_insert(self.knots(), self.degree(), self.num_control_points(), u, eps);
            return Ok(k);
        }
        self.insert_knot(u, order - s, config)
    }

    /// True iff, for every derivative order `i` in `[0, degree - 1]`,
    /// the distance between the `i`-th derivative evaluated at the
    /// domain minimum and maximum is at most `epsilon` (spec. §4.4
    /// `is_closed`). See SPEC_FULL.md / DESIGN.md for why the
    /// degree-th derivative is not included.
    pub fn is_closed(&self, epsilon: f64, config: &Config) -> SplineResult<bool> {
        let (dmin, dmax) = domain(self);
        for i in 0..self.degree() {
            let derivative = self.derive(i, -1.0, config)?;
            let a = crate::eval::eval(&derivative, derivative_domain_point(&derivative, dmin), config)?;
            let b = crate::eval::eval(&derivative, derivative_domain_point(&derivative, dmax), config)?;
            if distance(a.result(), b.result()) > epsilon {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Derivatives share the parent's domain (spec. §4.5), so evaluating at
/// the parent's endpoint is always valid for the derivative spline too
/// — except floating point snapping can occasionally land a hair
/// outside due to the derivative's own (slightly shifted) knot vector;
/// clamp defensively to the derivative's own domain endpoints.
fn derivative_domain_point(derivative: &Spline, parent_point: f64) -> f64 {
    let (dmin, dmax) = domain(derivative);
    parent_point.clamp(dmin, dmax)
}

/// Locate the index `k` such that `u` would be inserted at `k + 1`,
/// i.e. the last index with `knots[k] <= u` (used by `insert_knot` and
/// `split`, which need the same span location as `eval`'s step 2/3 but
/// phrased for the knot array directly rather than via a `Spline`
/// reference during mutation).
fn locate_for_insert(knots: &[f64], degree: usize, num_control_points: usize, u: f64, epsilon: f64) -> usize {
    if knot_eq(u, knots[num_control_points], epsilon) {
        return num_control_points - 1;
    }
    let mut k = degree;
    while k + 1 < num_control_points && !(u < knots[k + 1]) {
        k += 1;
    }
    k
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
    fn domain_matches_knot_endpoints() {
        let s = cubic_example();
        assert_eq!(domain(&s), (0.0, 1.0));
    }

    #[test]
    fn insert_knot_preserves_point_scenario_3() {
        let cfg = Config::default();
        let mut s = cubic_example();
        let before = crate::eval::eval(&s, 0.5, &cfg).unwrap();
        s.insert_knot(0.5, 1, &cfg).unwrap();
        assert_eq!(s.num_control_points(), 5);
        let after = crate::eval::eval(&s, 0.5, &cfg).unwrap();
        assert!((before.result()[0] - after.result()[0]).abs() < 1e-6);
        assert!((before.result()[1] - after.result()[1]).abs() < 1e-6);
    }

    #[test]
    fn insert_knot_rejects_excess_multiplicity() {
        let cfg = Config::default();
        let mut s = cubic_example();
        assert!(matches!(
            s.insert_knot(0.5, 5, &cfg),
            Err(SplineError::Multiplicity { .. })
        ));
    }

    #[test]
    fn insert_knot_rejects_out_of_domain() {
        let cfg = Config::default();
        let mut s = cubic_example();
        assert!(matches!(
            s.insert_knot(2.0, 1, &cfg),
            Err(SplineError::UUndefined { .. })
        ));
    }

    #[test]
    fn split_at_endpoint_is_noop() {
        let cfg = Config::default();
        let mut s = cubic_example();
        let n_before = s.num_control_points();
        let k = s.split(0.0, &cfg).unwrap();
        assert_eq!(s.num_control_points(), n_before);
        assert_eq!(k, s.degree());
    }
}
