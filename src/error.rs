//! The stable numeric error taxonomy (see spec. §6) and the `Status`
//! object every fallible operation can be converted into.

use std::fmt;

/// Numeric error codes. These values are part of the crate's stable
/// surface: do not renumber existing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum SplineErrorCode {
    Success = 0,
    Malloc = -1,
    DimZero = -2,
    DegGeNctrlp = -3,
    UUndefined = -4,
    Multiplicity = -5,
    KnotsDecr = -6,
    NumKnots = -7,
    Underivable = -8,
    LctrlpDimMismatch = -10,
    IoError = -11,
    ParseError = -12,
    IndexError = -13,
    NoResult = -14,
    NumPoints = -15,
}

impl SplineErrorCode {
    /// The raw numeric value, matching the taxonomy in spec. §6.
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// All the ways a public operation on a [`crate::spline::Spline`] can fail.
///
/// Every variant maps to exactly one [`SplineErrorCode`] via [`SplineError::code`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SplineError {
    #[error("dimension must be at least 1, got 0")]
    DimZero,
    #[error("degree {degree} must be less than the number of control points ({num_control_points})")]
    DegGeNctrlp {
        degree: usize,
        num_control_points: usize,
    },
    #[error(
        "bezier-style layout requires (n - order) to be a multiple of order: n={n}, order={order}"
    )]
    NumKnotsLayout { n: usize, order: usize },
    #[error("knot count {got} does not match the expected n + degree + 1 = {expected}")]
    NumKnots { got: usize, expected: usize },
    #[error("knot count {m} exceeds the configured ceiling MAX_NUM_KNOTS = {max}")]
    NumKnotsCeiling { m: usize, max: usize },
    #[error("parameter {u} is outside the domain [{min}, {max}]")]
    UUndefined { u: f64, min: f64, max: f64 },
    #[error("inserting this knot would raise multiplicity above order {order}")]
    Multiplicity { order: usize },
    #[error("knot vector is not non-decreasing at index {index}")]
    KnotsDecr { index: usize },
    #[error(
        "spline is discontinuous at the derivative point (gap {gap} exceeds epsilon {epsilon})"
    )]
    Underivable { gap: f64, epsilon: f64 },
    #[error("control point buffer length {len} is not a multiple of dimension {dim}")]
    LctrlpDimMismatch { len: usize, dim: usize },
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("failed to parse spline JSON: {0}")]
    ParseError(String),
    #[error("index {index} out of range (len {len})")]
    IndexError { index: usize, len: usize },
    #[error("bisection exhausted max_iter without reaching the target within epsilon")]
    NoResult,
    #[error("need at least one point, got {0}")]
    NumPoints(usize),
}

impl SplineError {
    /// The stable numeric code for this error, per spec. §6.
    pub fn code(&self) -> SplineErrorCode {
        use SplineError::*;
        match self {
            DimZero => SplineErrorCode::DimZero,
            DegGeNctrlp { .. } => SplineErrorCode::DegGeNctrlp,
            NumKnotsLayout { .. } => SplineErrorCode::NumKnots,
            NumKnots { .. } => SplineErrorCode::NumKnots,
            NumKnotsCeiling { .. } => SplineErrorCode::NumKnots,
            UUndefined { .. } => SplineErrorCode::UUndefined,
            Multiplicity { .. } => SplineErrorCode::Multiplicity,
            KnotsDecr { .. } => SplineErrorCode::KnotsDecr,
            Underivable { .. } => SplineErrorCode::Underivable,
            LctrlpDimMismatch { .. } => SplineErrorCode::LctrlpDimMismatch,
            IoError(_) => SplineErrorCode::IoError,
            ParseError(_) => SplineErrorCode::ParseError,
            IndexError { .. } => SplineErrorCode::IndexError,
            NoResult => SplineErrorCode::NoResult,
            NumPoints(_) => SplineErrorCode::NumPoints,
        }
    }

    /// Build the (code, message) pair described as the "Status object" in
    /// spec. §6. The message is the same short, human-readable string
    /// `Display` produces.
    pub fn status(&self) -> Status {
        Status {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<std::io::Error> for SplineError {
    fn from(e: std::io::Error) -> Self {
        SplineError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for SplineError {
    fn from(e: serde_json::Error) -> Self {
        SplineError::ParseError(e.to_string())
    }
}

/// A paired (code, message) describing a failure, per spec. §6. Callers
/// that only want the result can ignore this and use `?` on
/// `Result<T, SplineError>` directly; `Status` exists for call sites that
/// want to report the code and message separately (e.g. logging,
/// foreign-language bindings built atop this crate).
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub code: SplineErrorCode,
    pub message: String,
}

impl Status {
    pub fn success() -> Status {
        Status {
            code: SplineErrorCode::Success,
            message: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SplineErrorCode::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "success")
        } else {
            write!(f, "[{}] {}", self.code.value(), self.message)
        }
    }
}

pub type SplineResult<T> = Result<T, SplineError>;
