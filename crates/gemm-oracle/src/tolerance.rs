use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Matrix, OracleElement, OracleError, PrecisionClass};

/// Relative and absolute error bounds.
///
/// A value `actual` is close to `expected` when
/// `|actual - expected| <= atol + rtol * |expected|`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    /// Bounds for single, double and complex floats.
    pub const STANDARD: Self = Self::new(2e-5, 2e-5);
    /// Bounds for half floats, wide since their arithmetic is lossy.
    pub const LOW: Self = Self::new(0.2, 0.2);

    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Maximum accepted difference for the given expected value.
    pub fn bound<E: OracleElement>(&self, expected: E) -> f64 {
        self.atol + self.rtol * expected.magnitude()
    }

    /// Whether `actual` is close to `expected`. NaNs are only close to NaNs.
    pub fn accepts<E: OracleElement>(&self, actual: E, expected: E) -> bool {
        match (actual.is_nan(), expected.is_nan()) {
            (true, true) => true,
            (false, false) => difference(actual, expected) <= self.bound(expected),
            _ => false,
        }
    }
}

fn difference<E: OracleElement>(actual: E, expected: E) -> f64 {
    let (actual_re, actual_im) = actual.parts();
    let (expected_re, expected_im) = expected.parts();

    (actual_re - expected_re).hypot(actual_im - expected_im)
}

fn default_standard() -> Tolerance {
    Tolerance::STANDARD
}

fn default_low() -> Tolerance {
    Tolerance::LOW
}

/// Tolerance per [precision class](PrecisionClass).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToleranceProfile {
    #[serde(default = "default_standard")]
    pub standard: Tolerance,
    #[serde(default = "default_low")]
    pub low: Tolerance,
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self {
            standard: Tolerance::STANDARD,
            low: Tolerance::LOW,
        }
    }
}

impl ToleranceProfile {
    pub fn for_precision(&self, precision: PrecisionClass) -> Tolerance {
        match precision {
            PrecisionClass::Low => self.low,
            PrecisionClass::Standard => self.standard,
        }
    }

    pub fn for_elem<E: OracleElement>(&self) -> Tolerance {
        self.for_precision(E::KIND.precision())
    }
}

/// Elements of an output that are not close enough to the reference.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "{count}/{total} values differ more than tolerance, first at ({row}, {col}): actual={actual}, expected={expected}, difference={difference}, bound={bound}"
)]
pub struct Mismatch {
    pub row: usize,
    pub col: usize,
    pub actual: String,
    pub expected: String,
    pub difference: f64,
    pub bound: f64,
    pub count: usize,
    pub total: usize,
}

/// Compares an engine output to its reference element-wise.
pub fn assert_all_close<E: OracleElement>(
    actual: &Matrix<E>,
    expected: &Matrix<E>,
    tolerance: Tolerance,
) -> Result<(), OracleError> {
    if actual.shape() != expected.shape() {
        return Err(OracleError::OutputShape {
            expected: expected.shape(),
            actual: actual.shape(),
        });
    }

    let cols = expected.cols();
    let mut first = None;
    let mut count = 0;

    for (index, (a, e)) in actual
        .as_slice()
        .iter()
        .zip(expected.as_slice())
        .enumerate()
    {
        if !tolerance.accepts(*a, *e) {
            count += 1;
            if first.is_none() {
                first = Some((index, *a, *e));
            }
        }
    }

    match first {
        None => Ok(()),
        Some((index, a, e)) => Err(Mismatch {
            row: index / cols,
            col: index % cols,
            actual: format!("{a:?}"),
            expected: format!("{e:?}"),
            difference: difference(a, e),
            bound: tolerance.bound(e),
            count,
            total: expected.shape().num_elements(),
        }
        .into()),
    }
}
