//! The spline representation (spec. §3, §4.1, §4.2) and its lifecycle
//! (spec. §3.4).

use crate::config::Config;
use crate::error::{SplineError, SplineResult};

/// Knot-layout family used at construction time (spec. §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineType {
    /// Uniform knots spanning `[0, 1]`, no clamping at the ends.
    Opened,
    /// First/last `order` knots pinned to 0/1, uniform interior knots.
    /// The curve touches its first and last control point.
    Clamped,
    /// Every distinct knot has multiplicity `order`: a concatenation of
    /// `n / order` independent Bezier segments.
    Bezier,
}

/// The knot vector for `segments` stacked Bezier segments of the given
/// `order`: `segments + 1` distinct values uniformly spaced over
/// `[0, 1]`, each repeated `order` times (spec. §4.1 Bezier-style,
/// §4.5 `to_beziers`/`elevate_degree`).
pub(crate) fn bezier_knot_layout(order: usize, segments: usize) -> Vec<f64> {
    let mut v = Vec::with_capacity((segments + 1) * order);
    for i in 0..=segments {
        let value = i as f64 / segments as f64;
        v.extend(std::iter::repeat(value).take(order));
    }
    v
}

/// A B-spline / NURBS / Bezier / line / point curve of arbitrary degree
/// and dimensionality (spec. §3.1).
///
/// `control_points` is a flat buffer of `num_control_points * dimension`
/// values, laid out as contiguous `dimension`-tuples. For a rational
/// (NURBS) curve the last component of each tuple is the weight and the
/// preceding components are pre-multiplied by it (projective form,
/// spec. §3.1) — this type is unaware of rationality; callers
/// dehomogenize on output when they need to.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub(crate) degree: usize,
    pub(crate) dimension: usize,
    pub(crate) control_points: Vec<f64>,
    pub(crate) knots: Vec<f64>,
}

impl Spline {
    /// Construct a spline with `num_control_points` zero-initialized
    /// control points of dimension `dimension` and `degree`, laying out
    /// the knot vector over `[0, 1]` per `kind` (spec. §4.1).
    pub fn new(
        num_control_points: usize,
        dimension: usize,
        degree: usize,
        kind: SplineType,
        config: &Config,
    ) -> SplineResult<Spline> {
        let knots = Self::layout_knots(num_control_points, dimension, degree, kind, config)?;
        let control_points = vec![0.0; num_control_points * dimension];
        Ok(Spline {
            degree,
            dimension,
            control_points,
            knots,
        })
    }

    /// As [`Spline::new`], then copies `control_point_values` (a flat
    /// `num_control_points * dimension` buffer) into the control-point
    /// buffer (spec. §4.1 `new_with_control_points`).
    pub fn new_with_control_points(
        num_control_points: usize,
        dimension: usize,
        degree: usize,
        kind: SplineType,
        control_point_values: &[f64],
        config: &Config,
    ) -> SplineResult<Spline> {
        if control_point_values.len() != num_control_points * dimension {
            return Err(SplineError::LctrlpDimMismatch {
                len: control_point_values.len(),
                dim: dimension,
            });
        }
        let mut spline = Self::new(num_control_points, dimension, degree, kind, config)?;
        spline.control_points.copy_from_slice(control_point_values);
        Ok(spline)
    }

    fn layout_knots(
        n: usize,
        dimension: usize,
        degree: usize,
        kind: SplineType,
        config: &Config,
    ) -> SplineResult<Vec<f64>> {
        if dimension == 0 {
            return Err(SplineError::DimZero);
        }
        if degree >= n {
            return Err(SplineError::DegGeNctrlp {
                degree,
                num_control_points: n,
            });
        }
        let order = degree + 1;
        let m = n + order;
        if m > config.max_num_knots {
            return Err(SplineError::NumKnotsCeiling {
                m,
                max: config.max_num_knots,
            });
        }

        let knots = match kind {
            SplineType::Opened => (0..m).map(|i| i as f64 / (m - 1) as f64).collect(),
            SplineType::Clamped => {
                let interior = m - 2 * order;
                let mut v = Vec::with_capacity(m);
                v.extend(std::iter::repeat(0.0).take(order));
                for i in 1..=interior {
                    v.push(i as f64 / (interior + 1) as f64);
                }
                v.extend(std::iter::repeat(1.0).take(order));
                v
            }
            SplineType::Bezier => {
                if n % order != 0 {
                    return Err(SplineError::NumKnotsLayout { n, order });
                }
                bezier_knot_layout(order, n / order)
            }
        };
        Ok(knots)
    }

    /// Deep-copies `src`'s buffers into `self`. A no-op if `src` and
    /// `self` are the same value (spec. §4.1 `copy`).
    pub fn copy_from(&mut self, src: &Spline) {
        if std::ptr::eq(self, src) {
            return;
        }
        self.degree = src.degree;
        self.dimension = src.dimension;
        self.control_points.clear();
        self.control_points.extend_from_slice(&src.control_points);
        self.knots.clear();
        self.knots.extend_from_slice(&src.knots);
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn order(&self) -> usize {
        self.degree + 1
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_control_points(&self) -> usize {
        self.control_points.len() / self.dimension
    }

    pub fn num_knots(&self) -> usize {
        self.knots.len()
    }

    pub fn control_points(&self) -> &[f64] {
        &self.control_points
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// The `dimension` values of the `i`-th control point.
    pub fn control_point(&self, i: usize) -> SplineResult<&[f64]> {
        let n = self.num_control_points();
        if i >= n {
            return Err(SplineError::IndexError { index: i, len: n });
        }
        let start = i * self.dimension;
        Ok(&self.control_points[start..start + self.dimension])
    }

    /// Overwrite the `i`-th control point with `values` (unconditional,
    /// per spec. §4.2: control-point setters do not revalidate
    /// invariants).
    pub fn set_control_point(&mut self, i: usize, values: &[f64]) -> SplineResult<()> {
        let n = self.num_control_points();
        if i >= n {
            return Err(SplineError::IndexError { index: i, len: n });
        }
        if values.len() != self.dimension {
            return Err(SplineError::LctrlpDimMismatch {
                len: values.len(),
                dim: self.dimension,
            });
        }
        let start = i * self.dimension;
        self.control_points[start..start + self.dimension].copy_from_slice(values);
        Ok(())
    }

    pub fn knot(&self, i: usize) -> SplineResult<f64> {
        self.knots
            .get(i)
            .copied()
            .ok_or(SplineError::IndexError {
                index: i,
                len: self.knots.len(),
            })
    }

    /// Set the `i`-th knot, revalidating I2 (non-decreasing under
    /// knot-epsilon) and I3 (multiplicity bound) against the rest of the
    /// vector (spec. §4.2).
    pub fn set_knot(&mut self, i: usize, value: f64, config: &Config) -> SplineResult<()> {
        if i >= self.knots.len() {
            return Err(SplineError::IndexError {
                index: i,
                len: self.knots.len(),
            });
        }
        if i > 0 && value < self.knots[i - 1] && !crate::numeric::knot_eq(value, self.knots[i - 1], config.knot_epsilon)
        {
            return Err(SplineError::KnotsDecr { index: i });
        }
        if i + 1 < self.knots.len()
            && value > self.knots[i + 1]
            && !crate::numeric::knot_eq(value, self.knots[i + 1], config.knot_epsilon)
        {
            return Err(SplineError::KnotsDecr { index: i });
        }
        let order = self.order();
        let prospective_multiplicity = self
            .knots
            .iter()
            .enumerate()
            .filter(|&(j, &k)| j != i && crate::numeric::knot_eq(k, value, config.knot_epsilon))
            .count()
            + 1;
        if prospective_multiplicity > order {
            return Err(SplineError::Multiplicity { order });
        }
        self.knots[i] = value;
        Ok(())
    }
}
