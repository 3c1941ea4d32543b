use crate::Error;
use alloc::string::ToString;
use core::{fmt, str::FromStr};

/// Floating point width of a numeric kind, ordered from least to most general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    /// 32-bit IEEE float.
    Single,
    /// 64-bit IEEE float.
    Double,
    /// Platform extended precision (`long double`).
    Extended,
}

/// The closed set of element kinds the linear filter supports.
///
/// Real kinds run the real Direct-Form-II-Transposed kernel, complex kinds run the complex
/// one. The extended kinds keep their own tag but are represented with 64-bit storage, as
/// stable Rust has no wider float type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// `float32`
    Float32,
    /// `float64`
    Float64,
    /// `longdouble`
    Extended,
    /// `complex64`, a pair of `float32`.
    Complex64,
    /// `complex128`, a pair of `float64`.
    Complex128,
    /// `clongdouble`
    ComplexExtended,
}

impl NumericKind {
    /// Every supported kind.
    pub const ALL: [NumericKind; 6] = [
        NumericKind::Float32,
        NumericKind::Float64,
        NumericKind::Extended,
        NumericKind::Complex64,
        NumericKind::Complex128,
        NumericKind::ComplexExtended,
    ];

    /// Whether elements of this kind are (real, imaginary) pairs.
    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            NumericKind::Complex64 | NumericKind::Complex128 | NumericKind::ComplexExtended
        )
    }

    /// Width of the real component.
    pub const fn precision(self) -> Precision {
        match self {
            NumericKind::Float32 | NumericKind::Complex64 => Precision::Single,
            NumericKind::Float64 | NumericKind::Complex128 => Precision::Double,
            NumericKind::Extended | NumericKind::ComplexExtended => Precision::Extended,
        }
    }

    /// Build a kind back from its width and complexity.
    pub const fn from_parts(precision: Precision, complex: bool) -> Self {
        match (precision, complex) {
            (Precision::Single, false) => NumericKind::Float32,
            (Precision::Double, false) => NumericKind::Float64,
            (Precision::Extended, false) => NumericKind::Extended,
            (Precision::Single, true) => NumericKind::Complex64,
            (Precision::Double, true) => NumericKind::Complex128,
            (Precision::Extended, true) => NumericKind::ComplexExtended,
        }
    }

    /// The most general kind able to represent both `self` and `other` without loss.
    ///
    /// ```
    /// use lfilt_core::NumericKind;
    ///
    /// let k = NumericKind::Float64.promote(NumericKind::Complex64);
    /// assert_eq!(k, NumericKind::Complex128);
    /// ```
    pub fn promote(self, other: Self) -> Self {
        Self::from_parts(
            self.precision().max(other.precision()),
            self.is_complex() || other.is_complex(),
        )
    }

    /// Canonical NumPy-style name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
            NumericKind::Extended => "longdouble",
            NumericKind::Complex64 => "complex64",
            NumericKind::Complex128 => "complex128",
            NumericKind::ComplexExtended => "clongdouble",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericKind {
    type Err = Error;

    /// Parse a NumPy dtype name or type code, ignoring a leading byte-order marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let code = tag.trim_start_matches(['<', '>', '=', '|']);
        match code {
            "float32" | "single" | "f" | "f4" => Ok(NumericKind::Float32),
            "float64" | "double" | "float" | "d" | "f8" => Ok(NumericKind::Float64),
            "longdouble" | "longfloat" | "float96" | "float128" | "g" | "f12" | "f16" => {
                Ok(NumericKind::Extended)
            }
            "complex64" | "csingle" | "F" | "c8" => Ok(NumericKind::Complex64),
            "complex128" | "cdouble" | "complex" | "D" | "c16" => Ok(NumericKind::Complex128),
            "clongdouble" | "clongfloat" | "complex192" | "complex256" | "G" | "c24" | "c32" => {
                Ok(NumericKind::ComplexExtended)
            }
            _ => Err(Error::UnsupportedKind {
                kind: tag.to_string(),
            }),
        }
    }
}
