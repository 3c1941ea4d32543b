use super::{kernel_family, lfilter, FilterElement};
use lfilt_core::{Error, NumericKind, Result};
use ndarray::{ArrayD, Ix1};
use num_complex::Complex;

/// A dynamically shaped array tagged with its [NumericKind].
///
/// The extended kinds share the 64-bit storage of [KindedArray::Float64] and
/// [KindedArray::Complex128] but keep their own tag through filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum KindedArray {
    /// `float32` elements.
    Float32(ArrayD<f32>),
    /// `float64` elements.
    Float64(ArrayD<f64>),
    /// `longdouble` elements.
    Extended(ArrayD<f64>),
    /// `complex64` elements.
    Complex64(ArrayD<Complex<f32>>),
    /// `complex128` elements.
    Complex128(ArrayD<Complex<f64>>),
    /// `clongdouble` elements.
    ComplexExtended(ArrayD<Complex<f64>>),
}

impl KindedArray {
    /// Element kind tag.
    pub fn kind(&self) -> NumericKind {
        match self {
            KindedArray::Float32(_) => NumericKind::Float32,
            KindedArray::Float64(_) => NumericKind::Float64,
            KindedArray::Extended(_) => NumericKind::Extended,
            KindedArray::Complex64(_) => NumericKind::Complex64,
            KindedArray::Complex128(_) => NumericKind::Complex128,
            KindedArray::ComplexExtended(_) => NumericKind::ComplexExtended,
        }
    }

    /// Shape of the underlying array.
    pub fn shape(&self) -> &[usize] {
        match self {
            KindedArray::Float32(x) => x.shape(),
            KindedArray::Float64(x) | KindedArray::Extended(x) => x.shape(),
            KindedArray::Complex64(x) => x.shape(),
            KindedArray::Complex128(x) | KindedArray::ComplexExtended(x) => x.shape(),
        }
    }

    /// Convert to a kind at least as general as the current one.
    ///
    /// Real values become complex values with a zero imaginary part; narrowing conversions
    /// are refused with [Error::InvalidArg].
    pub fn into_kind(self, kind: NumericKind) -> Result<Self> {
        let from = self.kind();
        if from == kind {
            return Ok(self);
        }
        if from.promote(kind) != kind {
            return Err(narrowing(from, kind));
        }
        Ok(match kind {
            NumericKind::Float32 => return Err(narrowing(from, kind)),
            NumericKind::Float64 => KindedArray::Float64(self.into_real_f64()?),
            NumericKind::Extended => KindedArray::Extended(self.into_real_f64()?),
            NumericKind::Complex64 => KindedArray::Complex64(self.into_complex_f32()?),
            NumericKind::Complex128 => KindedArray::Complex128(self.into_complex_f64()),
            NumericKind::ComplexExtended => {
                KindedArray::ComplexExtended(self.into_complex_f64())
            }
        })
    }

    fn into_real_f64(self) -> Result<ArrayD<f64>> {
        let from = self.kind();
        match self {
            KindedArray::Float32(x) => Ok(x.mapv(f64::from)),
            KindedArray::Float64(x) | KindedArray::Extended(x) => Ok(x),
            _ => Err(narrowing(from, NumericKind::Float64)),
        }
    }

    fn into_complex_f32(self) -> Result<ArrayD<Complex<f32>>> {
        let from = self.kind();
        match self {
            KindedArray::Float32(x) => Ok(x.mapv(|v| Complex::new(v, 0.0))),
            KindedArray::Complex64(x) => Ok(x),
            _ => Err(narrowing(from, NumericKind::Complex64)),
        }
    }

    fn into_complex_f64(self) -> ArrayD<Complex<f64>> {
        match self {
            KindedArray::Float32(x) => x.mapv(|v| Complex::new(f64::from(v), 0.0)),
            KindedArray::Float64(x) | KindedArray::Extended(x) => x.mapv(|v| Complex::new(v, 0.0)),
            KindedArray::Complex64(x) => {
                x.mapv(|v| Complex::new(f64::from(v.re), f64::from(v.im)))
            }
            KindedArray::Complex128(x) | KindedArray::ComplexExtended(x) => x,
        }
    }
}

impl From<ArrayD<f32>> for KindedArray {
    fn from(value: ArrayD<f32>) -> Self {
        KindedArray::Float32(value)
    }
}

impl From<ArrayD<f64>> for KindedArray {
    fn from(value: ArrayD<f64>) -> Self {
        KindedArray::Float64(value)
    }
}

impl From<ArrayD<Complex<f32>>> for KindedArray {
    fn from(value: ArrayD<Complex<f32>>) -> Self {
        KindedArray::Complex64(value)
    }
}

impl From<ArrayD<Complex<f64>>> for KindedArray {
    fn from(value: ArrayD<Complex<f64>>) -> Self {
        KindedArray::Complex128(value)
    }
}

fn narrowing(from: NumericKind, to: NumericKind) -> Error {
    Error::InvalidArg {
        arg: "kind".into(),
        reason: alloc::format!("cannot convert {from} to the narrower kind {to}"),
    }
}

/// [lfilter] over arrays whose element kind is only known at runtime.
///
/// All inputs are converted to the most general kind among them (widest precision, complex
/// if any input is complex) and filtered with the kernel registered for that kind. Outputs
/// carry that kind's tag. `b` and `a` must be one-dimensional.
///
/// ```
/// use lfilt::signal::filter::{lfilter_kinded, KindedArray};
/// use lfilt::NumericKind;
/// use ndarray::{array, ArrayD};
///
/// let b: ArrayD<f32> = array![0.5f32, 0.5].into_dyn();
/// let a: ArrayD<f64> = array![1.0].into_dyn();
/// let x: ArrayD<f32> = array![2.0f32, 4.0].into_dyn();
/// let (y, zf) = lfilter_kinded(b.into(), a.into(), x.into(), None, None).unwrap();
/// assert_eq!(y.kind(), NumericKind::Float64);
/// assert_eq!(y, KindedArray::Float64(array![1.0, 3.0].into_dyn()));
/// assert!(zf.is_none());
/// ```
pub fn lfilter_kinded(
    b: KindedArray,
    a: KindedArray,
    x: KindedArray,
    axis: Option<isize>,
    zi: Option<KindedArray>,
) -> Result<(KindedArray, Option<KindedArray>)> {
    let kind = [a.kind(), x.kind()]
        .into_iter()
        .chain(zi.as_ref().map(KindedArray::kind))
        .fold(b.kind(), NumericKind::promote);
    log::debug!(
        "lfilter_kinded b={} a={} x={} -> {} ({:?} kernel)",
        b.kind(),
        a.kind(),
        x.kind(),
        kind,
        kernel_family(kind)
    );

    let b = b.into_kind(kind)?;
    let a = a.into_kind(kind)?;
    let x = x.into_kind(kind)?;
    let zi = zi.map(|zi| zi.into_kind(kind)).transpose()?;

    macro_rules! dispatch {
        ($variant:ident) => {{
            let (KindedArray::$variant(b), KindedArray::$variant(a), KindedArray::$variant(x)) =
                (b, a, x)
            else {
                return Err(mismatch(kind));
            };
            let zi = match zi {
                Some(KindedArray::$variant(zi)) => Some(zi),
                Some(_) => return Err(mismatch(kind)),
                None => None,
            };
            let (y, zf) = filter_dyn(b, a, x, axis, zi)?;
            Ok((KindedArray::$variant(y), zf.map(KindedArray::$variant)))
        }};
    }

    match kind {
        NumericKind::Float32 => dispatch!(Float32),
        NumericKind::Float64 => dispatch!(Float64),
        NumericKind::Extended => dispatch!(Extended),
        NumericKind::Complex64 => dispatch!(Complex64),
        NumericKind::Complex128 => dispatch!(Complex128),
        NumericKind::ComplexExtended => dispatch!(ComplexExtended),
    }
}

fn filter_dyn<T: FilterElement>(
    b: ArrayD<T>,
    a: ArrayD<T>,
    x: ArrayD<T>,
    axis: Option<isize>,
    zi: Option<ArrayD<T>>,
) -> Result<(ArrayD<T>, Option<ArrayD<T>>)> {
    let b = b
        .into_dimensionality::<Ix1>()
        .map_err(|_| one_dimensional("b"))?;
    let a = a
        .into_dimensionality::<Ix1>()
        .map_err(|_| one_dimensional("a"))?;
    lfilter(b.view(), a.view(), x, axis, zi.as_ref().map(|zi| zi.view()))
}

fn one_dimensional(arg: &str) -> Error {
    Error::InvalidArg {
        arg: arg.into(),
        reason: "coefficient vectors must be one-dimensional".into(),
    }
}

fn mismatch(kind: NumericKind) -> Error {
    Error::InvalidArg {
        arg: "kind".into(),
        reason: alloc::format!("inputs could not be unified to {kind}"),
    }
}
