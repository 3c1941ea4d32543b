use super::FilterElement;
use alloc::vec::Vec;
use lfilt_core::{Error, Result};
use ndarray::ArrayView1;

/// Numerator and denominator zero-padded to a common length `nfilt = max(len(b), len(a))`.
///
/// Built from fresh buffers; the caller's coefficient arrays are never written. For the real
/// kinds both vectors are divided by `a[0]`, so `a()[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedCoefficients<T> {
    b: Vec<T>,
    a: Vec<T>,
}

impl<T: FilterElement> PaddedCoefficients<T> {
    /// Validate, pad and normalize `b` and `a`.
    ///
    /// # Errors
    /// [Error::Configuration] when either vector is empty or `a[0]` is `+0.0` (compared bit for
    /// bit, so `-0.0` passes and yields non-finite output as plain division would), and
    /// [Error::Allocation] when the padded buffers cannot be reserved.
    pub fn try_new(b: ArrayView1<'_, T>, a: ArrayView1<'_, T>) -> Result<Self> {
        if b.is_empty() {
            return Err(Error::Configuration {
                arg: "b".into(),
                reason: "numerator coefficient vector is empty".into(),
            });
        }
        if a.is_empty() {
            return Err(Error::Configuration {
                arg: "a".into(),
                reason: "denominator coefficient vector is empty".into(),
            });
        }
        if a[0].is_zero_bits() {
            return Err(Error::Configuration {
                arg: "a".into(),
                reason: "filter coefficient a[0] == 0 is not supported".into(),
            });
        }

        let nfilt = b.len().max(a.len());
        let mut padded_b = padded(b, nfilt, "b")?;
        let mut padded_a = padded(a, nfilt, "a")?;
        T::normalize(&mut padded_b, &mut padded_a);
        Ok(Self {
            b: padded_b,
            a: padded_a,
        })
    }

    /// Same as [Self::try_new] for plain slices.
    pub fn from_slices(b: &[T], a: &[T]) -> Result<Self> {
        Self::try_new(ArrayView1::from(b), ArrayView1::from(a))
    }
}

impl<T> PaddedCoefficients<T> {
    /// Common length of the padded vectors.
    #[inline]
    pub fn nfilt(&self) -> usize {
        self.b.len()
    }

    /// Length of the delay line, `nfilt - 1`.
    #[inline]
    pub fn state_len(&self) -> usize {
        self.b.len() - 1
    }

    /// Padded numerator.
    #[inline]
    pub fn b(&self) -> &[T] {
        &self.b
    }

    /// Padded denominator.
    #[inline]
    pub fn a(&self) -> &[T] {
        &self.a
    }
}

fn padded<T: FilterElement>(
    src: ArrayView1<'_, T>,
    nfilt: usize,
    what: &'static str,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(nfilt)
        .map_err(|_| Error::Allocation { what, len: nfilt })?;
    out.extend(src.iter().copied());
    out.resize(nfilt, T::zero());
    Ok(out)
}
