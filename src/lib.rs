//! bspline-core
//! ===
//! A computational core for B-spline, NURBS, Bezier, line and point
//! curves of arbitrary degree and dimensionality: construction, De
//! Boor evaluation, knot insertion, derivatives, degree elevation,
//! Bezier decomposition, spline alignment and morphing, cubic natural
//! and Catmull-Rom interpolation, bisection search, and canonical JSON
//! persistence.
//!
//! All coordinates are `f64`. For a rational (NURBS) curve, the last
//! component of each control point is the weight, and the preceding
//! components are stored pre-multiplied by it (projective form) —
//! this crate is unaware of rationality and never dehomogenizes on a
//! caller's behalf.
//!
//! # Example
//!
//! ```rust
//! use bspline_core::{Config, Spline, SplineType, eval};
//!
//! let config = Config::default();
//! let spline = Spline::new_with_control_points(
//!     4, 2, 3, SplineType::Clamped,
//!     &[0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 3.0, 0.0],
//!     &config,
//! ).unwrap();
//! let net = eval::eval(&spline, 0.5, &config).unwrap();
//! assert!((net.result()[0] - 1.5).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod interpolate;
pub mod json;
pub mod knots;
pub mod numeric;
pub mod spline;
pub mod transform;

pub use config::Config;
pub use error::{SplineError, SplineErrorCode, SplineResult, Status};
pub use eval::EvalNet;
pub use spline::{Spline, SplineType};
pub use transform::{align, morph};
