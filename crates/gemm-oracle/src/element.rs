use core::fmt::{Debug, Display};
use core::ops::{Add, Mul};

use half::{bf16, f16};
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Precision class of an element type, used to select a comparison tolerance.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecisionClass {
    /// Reduced bit-width floats, usually only fast on accelerated paths.
    #[serde(rename = "low")]
    Low,
    /// Single, double and complex floats.
    #[serde(rename = "standard")]
    Standard,
}

/// Runtime description of an [element](OracleElement) type.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElemKind {
    #[serde(rename = "float16")]
    F16,
    #[serde(rename = "bfloat16")]
    BF16,
    #[serde(rename = "float32")]
    F32,
    #[serde(rename = "float64")]
    F64,
    #[serde(rename = "complex64")]
    C64,
    #[serde(rename = "complex128")]
    C128,
}

impl ElemKind {
    pub const ALL: [ElemKind; 6] = [
        ElemKind::F16,
        ElemKind::BF16,
        ElemKind::F32,
        ElemKind::F64,
        ElemKind::C64,
        ElemKind::C128,
    ];

    /// The dtype name used in case names and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ElemKind::F16 => "float16",
            ElemKind::BF16 => "bfloat16",
            ElemKind::F32 => "float32",
            ElemKind::F64 => "float64",
            ElemKind::C64 => "complex64",
            ElemKind::C128 => "complex128",
        }
    }

    /// Parses a dtype name as returned by [ElemKind::name].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn precision(&self) -> PrecisionClass {
        match self {
            ElemKind::F16 | ElemKind::BF16 => PrecisionClass::Low,
            _ => PrecisionClass::Standard,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ElemKind::C64 | ElemKind::C128)
    }
}

impl Display for ElemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric element the oracle can generate, multiply and compare.
///
/// Products are accumulated in [OracleElement::Acc], which is wider than the
/// element itself for low-precision floats.
pub trait OracleElement: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// Accumulator type used by reference and engine reductions.
    type Acc: Copy + Debug + Zero + Add<Output = Self::Acc> + Mul<Output = Self::Acc>;

    const KIND: ElemKind;

    fn widen(self) -> Self::Acc;

    fn narrow(acc: Self::Acc) -> Self;

    /// Complex conjugate, identity for real types.
    fn conj(self) -> Self;

    /// Real and imaginary parts as `f64`.
    fn parts(self) -> (f64, f64);

    /// Builds an element from real and imaginary parts, dropping the imaginary
    /// part for real types.
    fn from_parts(re: f64, im: f64) -> Self;

    fn zero() -> Self {
        Self::narrow(Self::Acc::zero())
    }

    /// Modulus of the element.
    fn magnitude(self) -> f64 {
        let (re, im) = self.parts();
        re.hypot(im)
    }

    fn is_nan(self) -> bool {
        let (re, im) = self.parts();
        re.is_nan() || im.is_nan()
    }
}

macro_rules! impl_real_element {
    ($ty:ty, $acc:ty, $kind:expr, $to_acc:expr, $from_acc:expr, $to_f64:expr, $from_f64:expr) => {
        impl OracleElement for $ty {
            type Acc = $acc;

            const KIND: ElemKind = $kind;

            fn widen(self) -> Self::Acc {
                $to_acc(self)
            }

            fn narrow(acc: Self::Acc) -> Self {
                $from_acc(acc)
            }

            fn conj(self) -> Self {
                self
            }

            fn parts(self) -> (f64, f64) {
                ($to_f64(self), 0.0)
            }

            fn from_parts(re: f64, _im: f64) -> Self {
                $from_f64(re)
            }
        }
    };
}

impl_real_element!(
    f32,
    f32,
    ElemKind::F32,
    |x| x,
    |x| x,
    |x: f32| x as f64,
    |x: f64| x as f32
);
impl_real_element!(f64, f64, ElemKind::F64, |x| x, |x| x, |x| x, |x| x);
impl_real_element!(
    f16,
    f32,
    ElemKind::F16,
    f16::to_f32,
    f16::from_f32,
    f16::to_f64,
    f16::from_f64
);
impl_real_element!(
    bf16,
    f32,
    ElemKind::BF16,
    bf16::to_f32,
    bf16::from_f32,
    bf16::to_f64,
    bf16::from_f64
);

macro_rules! impl_complex_element {
    ($float:ty, $kind:expr) => {
        impl OracleElement for Complex<$float> {
            type Acc = Complex<$float>;

            const KIND: ElemKind = $kind;

            fn widen(self) -> Self::Acc {
                self
            }

            fn narrow(acc: Self::Acc) -> Self {
                acc
            }

            fn conj(self) -> Self {
                Complex::conj(&self)
            }

            fn parts(self) -> (f64, f64) {
                (self.re as f64, self.im as f64)
            }

            fn from_parts(re: f64, im: f64) -> Self {
                Complex::new(re as $float, im as $float)
            }
        }
    };
}

impl_complex_element!(f32, ElemKind::C64);
impl_complex_element!(f64, ElemKind::C128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ElemKind::ALL {
            assert_eq!(ElemKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ElemKind::from_name("int32"), None);
    }

    #[test]
    fn only_half_types_are_low_precision() {
        assert_eq!(f16::KIND.precision(), PrecisionClass::Low);
        assert_eq!(bf16::KIND.precision(), PrecisionClass::Low);
        assert_eq!(f32::KIND.precision(), PrecisionClass::Standard);
        assert_eq!(Complex::<f64>::KIND.precision(), PrecisionClass::Standard);
    }

    #[test]
    fn conj_flips_imaginary_part_only() {
        let value = Complex::new(1.5f32, -2.0);
        assert_eq!(OracleElement::conj(value), Complex::new(1.5, 2.0));
        assert_eq!(OracleElement::conj(3.0f32), 3.0);
    }

    #[test]
    fn half_accumulates_in_f32() {
        let acc = f16::from_f32(0.5).widen() * f16::from_f32(4.0).widen();
        assert_eq!(f16::narrow(acc), f16::from_f32(2.0));
    }

    #[test]
    fn magnitude_uses_modulus() {
        assert_eq!(Complex::new(3.0f64, 4.0).magnitude(), 5.0);
        assert_eq!((-2.0f32).magnitude(), 2.0);
    }
}
