//! Canonical JSON form and file persistence (spec. §4.7).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{SplineError, SplineResult};
use crate::numeric::knot_eq;
use crate::spline::Spline;

/// The canonical on-disk schema: `{degree, dimension, control_points,
/// knots}` (spec. §4.7). `parse_json` re-validates every invariant
/// (I1–I6) rather than trusting the file; `to_json` only ever produces
/// values that already satisfy them.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CanonicalSpline {
    degree: usize,
    dimension: usize,
    control_points: Vec<f64>,
    knots: Vec<f64>,
}

/// Serialize `spline` to the canonical JSON form (spec. §4.7
/// `to_json`).
pub fn to_json(spline: &Spline) -> SplineResult<String> {
    let canonical = CanonicalSpline {
        degree: spline.degree(),
        dimension: spline.dimension(),
        control_points: spline.control_points().to_vec(),
        knots: spline.knots().to_vec(),
    };
    serde_json::to_string(&canonical).map_err(SplineError::from)
}

/// Parse the canonical JSON form, reconstructing and revalidating the
/// spline against I1–I6 (spec. §4.7 `parse_json`).
pub fn parse_json(text: &str, config: &Config) -> SplineResult<Spline> {
    let canonical: CanonicalSpline = serde_json::from_str(text).map_err(SplineError::from)?;
    validate(canonical, config)
}

fn validate(canonical: CanonicalSpline, config: &Config) -> SplineResult<Spline> {
    let CanonicalSpline {
        degree,
        dimension,
        control_points,
        knots,
    } = canonical;

    if dimension == 0 {
        return Err(SplineError::DimZero);
    }
    if control_points.len() % dimension != 0 {
        return Err(SplineError::LctrlpDimMismatch {
            len: control_points.len(),
            dim: dimension,
        });
    }
    let n = control_points.len() / dimension;
    if degree >= n {
        return Err(SplineError::DegGeNctrlp {
            degree,
            num_control_points: n,
        });
    }
    let order = degree + 1;
    let expected_m = n + order;
    if knots.len() != expected_m {
        return Err(SplineError::NumKnots {
            got: knots.len(),
            expected: expected_m,
        });
    }
    if expected_m > config.max_num_knots {
        return Err(SplineError::NumKnotsCeiling {
            m: expected_m,
            max: config.max_num_knots,
        });
    }

    let eps = config.knot_epsilon;
    for w in knots.windows(2) {
        if w[1] < w[0] && !knot_eq(w[0], w[1], eps) {
            return Err(SplineError::KnotsDecr { index: 1 });
        }
    }

    let mut run_start = 0;
    for i in 1..=knots.len() {
        let boundary = i == knots.len() || !knot_eq(knots[i], knots[run_start], eps);
        if boundary {
            let multiplicity = i - run_start;
            if multiplicity > order {
                return Err(SplineError::Multiplicity { order });
            }
            run_start = i;
        }
    }

    Ok(Spline {
        degree,
        dimension,
        control_points,
        knots,
    })
}

/// Write `spline`'s canonical JSON form to `path` (spec. §4.7 `save`).
/// Filesystem failures map to `IO_ERROR`.
pub fn save(spline: &Spline, path: impl AsRef<Path>) -> SplineResult<()> {
    let text = to_json(spline)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Read and parse a spline previously written by [`save`] (spec. §4.7
/// `load`). Filesystem failures map to `IO_ERROR`; schema/invariant
/// failures map as in [`parse_json`].
pub fn load(path: impl AsRef<Path>, config: &Config) -> SplineResult<Spline> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text, config)
}
