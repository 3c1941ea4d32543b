use super::dfii;
use core::fmt::Debug;
use lfilt_core::{NumericKind, Result};
use num_complex::Complex;
use num_traits::Zero;

/// Recurrence family an element kind runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelFamily {
    /// Coefficients pre-divided by `a[0]`.
    Real,
    /// Coefficients kept as given; `a[0]` folded in through its conjugate.
    Complex,
}

/// Kind → kernel table. Every [NumericKind] appears exactly once.
pub const KERNEL_REGISTRY: [(NumericKind, KernelFamily); 6] = [
    (NumericKind::Float32, KernelFamily::Real),
    (NumericKind::Float64, KernelFamily::Real),
    (NumericKind::Extended, KernelFamily::Real),
    (NumericKind::Complex64, KernelFamily::Complex),
    (NumericKind::Complex128, KernelFamily::Complex),
    (NumericKind::ComplexExtended, KernelFamily::Complex),
];

/// Kernel family registered for `kind`.
pub const fn kernel_family(kind: NumericKind) -> KernelFamily {
    let mut i = 0;
    while i < KERNEL_REGISTRY.len() {
        if KERNEL_REGISTRY[i].0 as u8 == kind as u8 {
            return KERNEL_REGISTRY[i].1;
        }
        i += 1;
    }
    // the table is total over NumericKind
    if kind.is_complex() {
        KernelFamily::Complex
    } else {
        KernelFamily::Real
    }
}

/// Resolve a dtype tag such as `"float32"` or `"c16"` to its kind and kernel family.
///
/// Tags naming any kind outside the registry fail with
/// [Error::UnsupportedKind](lfilt_core::Error::UnsupportedKind).
pub fn lookup_kernel(tag: &str) -> Result<(NumericKind, KernelFamily)> {
    let kind: NumericKind = tag.parse()?;
    Ok((kind, kernel_family(kind)))
}

/// Element types the filter engine is instantiated for.
///
/// Implemented for `f32`, `f64`, `Complex<f32>` and `Complex<f64>`; the extended kinds are
/// computed in the `f64` representations.
pub trait FilterElement: Copy + Zero + PartialEq + Debug + Send + Sync + 'static {
    /// Kind tag of this element type.
    const KIND: NumericKind;
    /// Recurrence family, as registered in [KERNEL_REGISTRY].
    const FAMILY: KernelFamily;

    /// Whether every component has the all-zero bit pattern. `-0.0` is not zero here.
    fn is_zero_bits(&self) -> bool;

    /// Family specific normalization of zero-padded coefficients of equal length.
    fn normalize(b: &mut [Self], a: &mut [Self]);

    /// Filter one lane, reading `x`, writing `y` and updating the delay line `z`.
    fn filter_lane<'x, 'y, I, O>(b: &[Self], a: &[Self], x: I, y: O, z: &mut [Self])
    where
        Self: 'x + 'y,
        I: Iterator<Item = &'x Self>,
        O: Iterator<Item = &'y mut Self>;
}

macro_rules! real_element {
    ($t:ty, $kind:expr) => {
        impl FilterElement for $t {
            const KIND: NumericKind = $kind;
            const FAMILY: KernelFamily = kernel_family($kind);

            #[inline]
            fn is_zero_bits(&self) -> bool {
                self.to_bits() == 0
            }

            #[inline]
            fn normalize(b: &mut [Self], a: &mut [Self]) {
                dfii::normalize_real(b, a);
            }

            #[inline]
            fn filter_lane<'x, 'y, I, O>(b: &[Self], a: &[Self], x: I, y: O, z: &mut [Self])
            where
                Self: 'x + 'y,
                I: Iterator<Item = &'x Self>,
                O: Iterator<Item = &'y mut Self>,
            {
                dfii::real_lane(b, a, x, y, z);
            }
        }
    };
}

macro_rules! complex_element {
    ($t:ty, $kind:expr) => {
        impl FilterElement for Complex<$t> {
            const KIND: NumericKind = $kind;
            const FAMILY: KernelFamily = kernel_family($kind);

            #[inline]
            fn is_zero_bits(&self) -> bool {
                self.re.to_bits() == 0 && self.im.to_bits() == 0
            }

            #[inline]
            fn normalize(_b: &mut [Self], _a: &mut [Self]) {}

            #[inline]
            fn filter_lane<'x, 'y, I, O>(b: &[Self], a: &[Self], x: I, y: O, z: &mut [Self])
            where
                Self: 'x + 'y,
                I: Iterator<Item = &'x Self>,
                O: Iterator<Item = &'y mut Self>,
            {
                dfii::complex_lane(b, a, x, y, z);
            }
        }
    };
}

real_element!(f32, NumericKind::Float32);
real_element!(f64, NumericKind::Float64);
complex_element!(f32, NumericKind::Complex64);
complex_element!(f64, NumericKind::Complex128);

#[cfg(test)]
mod test {
    use super::*;
    use lfilt_core::Error;

    #[test]
    fn registry_is_total_and_consistent() {
        for kind in NumericKind::ALL {
            let hits = KERNEL_REGISTRY.iter().filter(|(k, _)| *k == kind).count();
            assert_eq!(hits, 1, "{kind} registered {hits} times");
            let expected = if kind.is_complex() {
                KernelFamily::Complex
            } else {
                KernelFamily::Real
            };
            assert_eq!(kernel_family(kind), expected);
        }
    }

    #[test]
    fn element_types_agree_with_registry() {
        assert_eq!(<f32 as FilterElement>::FAMILY, KernelFamily::Real);
        assert_eq!(<f64 as FilterElement>::KIND, NumericKind::Float64);
        assert_eq!(<Complex<f32> as FilterElement>::KIND, NumericKind::Complex64);
        assert_eq!(
            <Complex<f64> as FilterElement>::FAMILY,
            KernelFamily::Complex
        );
    }

    #[test]
    fn lookup_by_tag() {
        assert_eq!(
            lookup_kernel("clongdouble"),
            Ok((NumericKind::ComplexExtended, KernelFamily::Complex))
        );
        assert_eq!(
            lookup_kernel("f4"),
            Ok((NumericKind::Float32, KernelFamily::Real))
        );
        assert!(matches!(
            lookup_kernel("int32"),
            Err(Error::UnsupportedKind { ref kind }) if kind == "int32"
        ));
    }
}
