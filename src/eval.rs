//! De Boor evaluation (spec. §4.3): `eval`, `eval_all`, `sample`,
//! `bisect`, and the [`EvalNet`] that describes the computation.

use crate::config::Config;
use crate::error::{SplineError, SplineResult};
use crate::knots::domain;
use crate::numeric::knot_eq;
use crate::spline::Spline;

/// Describes one evaluation of a spline: the De Boor triangle that
/// produced the point, laid out so the last `dimension` values are
/// the result (spec. §3.2), except in the discontinuity special case
/// where `result()` points at the first of the two stored points.
///
/// # Discontinuity indexing
///
/// At an interior knot whose multiplicity equals `order`, spec. §4.3
/// step 4 names the two flanking control points as
/// `control_points[k - order]` and `control_points[k - s]`; since
/// `s == order` in that branch those two indices coincide as literally
/// written. This implementation resolves the ambiguity by using the
/// pair `control_points[k - order]` (left limit) and
/// `control_points[k - order + 1]` (right limit) — the two control
/// points that flank the degenerate knot on either side — which is
/// the only reading that produces two *distinct* points, matching the
/// stated `num_result == 2` invariant (E2). See DESIGN.md.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalNet {
    pub u: f64,
    pub k: usize,
    pub multiplicity: usize,
    pub h: usize,
    pub dimension: usize,
    pub points: Vec<f64>,
    pub num_result: usize,
}

impl EvalNet {
    fn empty() -> EvalNet {
        EvalNet {
            u: 0.0,
            k: 0,
            multiplicity: 0,
            h: 0,
            dimension: 0,
            points: Vec::new(),
            num_result: 1,
        }
    }

    /// The evaluated point: the last `dimension` values of `points` in
    /// the regular case, or the first of the two stored points in the
    /// discontinuity case (`num_result == 2`).
    pub fn result(&self) -> &[f64] {
        let d = self.dimension;
        if self.num_result == 2 {
            &self.points[0..d]
        } else {
            let len = self.points.len();
            &self.points[len - d..len]
        }
    }
}

/// Locate `k` such that `knots[k] <= u < knots[k+1]`, with the domain
/// maximum mapped to `num_control_points - 1` (the "last non-empty
/// span" convention of spec. §4.3 step 2).
fn locate_span(knots: &[f64], degree: usize, num_control_points: usize, u: f64, epsilon: f64) -> usize {
    if knot_eq(u, knots[num_control_points], epsilon) {
        return num_control_points - 1;
    }
    let mut k = degree;
    while k + 1 < num_control_points && !(u < knots[k + 1]) {
        k += 1;
    }
    k
}

/// Multiplicity of `u` at index `k`, counting backward through equal
/// knots (spec. §4.3 step 3). Zero if `knots[k] != u`.
fn multiplicity_at(knots: &[f64], k: usize, u: f64, epsilon: f64) -> usize {
    if !knot_eq(knots[k], u, epsilon) {
        return 0;
    }
    let mut s = 1;
    let mut i = k;
    while i > 0 && knot_eq(knots[i - 1], u, epsilon) {
        s += 1;
        i -= 1;
    }
    s
}

/// Evaluate `spline` at `u`, reusing `net`'s buffer (spec. §4.3).
pub fn eval_into(spline: &Spline, u: f64, config: &Config, net: &mut EvalNet) -> SplineResult<()> {
    let degree = spline.degree();
    let order = spline.order();
    let ncp = spline.num_control_points();
    let d = spline.dimension();
    let knots = spline.knots();
    let (dmin, dmax) = domain(spline);
    let eps = config.knot_epsilon;

    if u < dmin - eps || u > dmax + eps {
        return Err(SplineError::UUndefined { u, min: dmin, max: dmax });
    }
    let uu = if knot_eq(u, dmin, eps) {
        dmin
    } else if knot_eq(u, dmax, eps) {
        dmax
    } else {
        u
    };

    let k = locate_span(knots, degree, ncp, uu, eps);
    let s = multiplicity_at(knots, k, uu, eps);

    net.u = uu;
    net.k = k;
    net.multiplicity = s;
    net.dimension = d;
    net.points.clear();

    if s == order {
        if knot_eq(uu, dmin, eps) {
            net.h = 0;
            net.num_result = 1;
            net.points.extend_from_slice(spline.control_point(0)?);
            return Ok(());
        }
        if knot_eq(uu, dmax, eps) {
            net.h = 0;
            net.num_result = 1;
            net.points.extend_from_slice(spline.control_point(ncp - 1)?);
            return Ok(());
        }
        net.h = 0;
        net.num_result = 2;
        net.points.extend_from_slice(spline.control_point(k - order)?);
        net.points.extend_from_slice(spline.control_point(k - order + 1)?);
        return Ok(());
    }

    let h = order - 1 - s;
    let count = order - s;
    net.h = h;
    net.num_result = 1;

    let mut cur = Vec::with_capacity(count * d);
    for j in 0..count {
        let p = k + 1 + j - order;
        cur.extend_from_slice(spline.control_point(p)?);
    }
    net.points.extend_from_slice(&cur);

    let mut cur_count = count;
    for r in 1..=h {
        let mut next = Vec::with_capacity((cur_count - 1) * d);
        for i in 0..cur_count - 1 {
            let knot_i = k + 1 + i + r - order;
            let denom = knots[k + 1 + i] - knots[knot_i];
            let a = if denom.abs() > 0.0 {
                (uu - knots[knot_i]) / denom
            } else {
                0.0
            };
            for c in 0..d {
                next.push((1.0 - a) * cur[i * d + c] + a * cur[(i + 1) * d + c]);
            }
        }
        net.points.extend_from_slice(&next);
        cur = next;
        cur_count -= 1;
    }
    Ok(())
}

/// Evaluate `spline` at `u`, returning a freshly allocated net.
pub fn eval(spline: &Spline, u: f64, config: &Config) -> SplineResult<EvalNet> {
    let mut net = EvalNet::empty();
    eval_into(spline, u, config, &mut net)?;
    Ok(net)
}

/// Evaluate many parameters, reusing one net buffer; returns only the
/// first result point per `u`, flattened (spec. §4.3 `eval_all`).
pub fn eval_all(spline: &Spline, us: &[f64], config: &Config) -> SplineResult<Vec<f64>> {
    let mut net = EvalNet::empty();
    let mut out = Vec::with_capacity(us.len() * spline.dimension());
    for &u in us {
        eval_into(spline, u, config, &mut net)?;
        out.extend_from_slice(net.result());
    }
    Ok(out)
}

/// Sample `num` parameters uniformly across the domain (spec. §4.3
/// `sample`). `num == 0` defaults to `30 * (n - degree)`; `num == 1`
/// evaluates only at the domain minimum.
pub fn sample(spline: &Spline, num: usize, config: &Config) -> SplineResult<Vec<f64>> {
    let (dmin, dmax) = domain(spline);
    let n = spline.num_control_points();
    let count = if num == 0 {
        30 * (n - spline.degree())
    } else {
        num
    };
    let us: Vec<f64> = if count <= 1 {
        vec![dmin]
    } else {
        (0..count)
            .map(|i| dmin + (dmax - dmin) * (i as f64) / ((count - 1) as f64))
            .collect()
    };
    eval_all(spline, &us, config)
}

/// One-dimensional bisection on the full domain, assuming the
/// `index`-th control-point component of `eval` is monotone in `u`
/// (spec. §4.3 `bisect`).
#[allow(clippy::too_many_arguments)]
pub fn bisect(
    spline: &Spline,
    value: f64,
    epsilon: f64,
    persnickety: bool,
    index: usize,
    ascending: bool,
    max_iter: usize,
    config: &Config,
) -> SplineResult<EvalNet> {
    if index >= spline.dimension() {
        return Err(SplineError::IndexError {
            index,
            len: spline.dimension(),
        });
    }
    let (mut lo, mut hi) = domain(spline);
    let eps = epsilon.abs();

    let mut best: Option<EvalNet> = None;
    let mut best_diff = f64::INFINITY;

    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        let net = eval(spline, mid, config)?;
        let comp = net.result()[index];
        let diff = (comp - value).abs();
        if diff < best_diff {
            best_diff = diff;
            best = Some(net.clone());
        }
        if diff <= eps {
            log::debug!("bisect converged: u={}, |diff|={}", mid, diff);
            return Ok(net);
        }
        if (comp > value) == ascending {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    if persnickety {
        Err(SplineError::NoResult)
    } else {
        best.ok_or(SplineError::NoResult)
    }
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
    fn clamped_endpoints_match_first_last_control_point() {
        let cfg = Config::default();
        let s = cubic_example();
        let net0 = eval(&s, 0.0, &cfg).unwrap();
        assert_eq!(net0.result(), &[0.0, 0.0]);
        let net1 = eval(&s, 1.0, &cfg).unwrap();
        assert_eq!(net1.result(), &[3.0, 0.0]);
    }

    #[test]
    fn interior_midpoint_scenario_2() {
        let cfg = Config::default();
        let s = cubic_example();
        let net = eval(&s, 0.5, &cfg).unwrap();
        let r = net.result();
        assert!((r[0] - 1.5).abs() < 1e-9, "x={}", r[0]);
        assert!((r[1] - 1.5).abs() < 1e-9, "y={}", r[1]);
    }

    #[test]
    fn out_of_domain_is_u_undefined() {
        let cfg = Config::default();
        let s = cubic_example();
        assert!(matches!(
            eval(&s, 1.5, &cfg),
            Err(SplineError::UUndefined { .. })
        ));
    }

    #[test]
    fn eval_all_matches_individual_eval() {
        let cfg = Config::default();
        let s = cubic_example();
        let us = [0.0, 0.25, 0.5, 0.75, 1.0];
        let all = eval_all(&s, &us, &cfg).unwrap();
        for (i, &u) in us.iter().enumerate() {
            let single = eval(&s, u, &cfg).unwrap();
            assert_eq!(&all[i * 2..i * 2 + 2], single.result());
        }
    }

    #[test]
    fn sample_default_count_and_endpoints() {
        let cfg = Config::default();
        let s = cubic_example();
        let pts = sample(&s, 0, &cfg).unwrap();
        assert_eq!(pts.len(), 30 * (4 - 3) * 2);
        assert_eq!(&pts[0..2], &[0.0, 0.0]);
        let last = pts.len() - 2;
        assert_eq!(&pts[last..], &[3.0, 0.0]);
    }

    #[test]
    fn bisect_finds_ascending_x() {
        let cfg = Config::default();
        let s = cubic_example();
        let net = bisect(&s, 1.5, 1e-9, true, 0, true, 100, &cfg).unwrap();
        assert!((net.u - 0.5).abs() < 1e-4);
    }

    #[test]
    fn bisect_index_out_of_range() {
        let cfg = Config::default();
        let s = cubic_example();
        assert!(matches!(
            bisect(&s, 0.0, 1e-9, true, 5, true, 10, &cfg),
            Err(SplineError::IndexError { .. })
        ));
    }
}
