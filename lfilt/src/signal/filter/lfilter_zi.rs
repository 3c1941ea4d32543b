use crate::linalg::companion_dyn;
use alloc::vec::Vec;
use lfilt_core::{Error, Result};
use nalgebra::{DMatrix, DVector, RealField};
use ndarray::{Array1, ArrayView1};

/// Construct initial conditions for [lfilter](super::lfilter) for step response
/// steady-state.
///
/// Computes an initial state `zi` that corresponds to the steady state of the step
/// response, so that filtering a signal starting at `x[0]` with `zi * x[0]` has no start-up
/// transient. The result has length `max(len(a), len(b)) - 1`.
///
/// Leading zeros of `a` are ignored; both vectors are normalized by the first nonzero
/// coefficient of `a`. The state is the solution of
///
/// ```text
/// (I - companion(a).T) zi = b[1:] - a[1:] * b[0]
/// ```
///
/// # Errors
/// * [Error::Configuration] when `b` is empty or every `a` coefficient is zero.
/// * [Error::InvalidArg] when the system is singular, i.e. the filter has a pole at `z = 1`
///   and no finite steady state exists.
///
/// # Examples
/// ```
/// use lfilt::signal::filter::{lfilter, lfilter_zi};
/// use ndarray::{array, Array1};
///
/// let b = array![0.25f64, 0.5, 0.25];
/// let a = array![1.0];
/// let zi = lfilter_zi(b.view(), a.view()).unwrap();
/// assert_eq!(zi, array![0.75, 0.25]);
///
/// let x = Array1::from_elem(6, 1.0);
/// let (y, _) = lfilter(b.view(), a.view(), x, None, Some(zi.view())).unwrap();
/// assert!(y.iter().all(|&v| (v - 1.0).abs() < 1e-12));
/// ```
pub fn lfilter_zi<T>(b: ArrayView1<'_, T>, a: ArrayView1<'_, T>) -> Result<Array1<T>>
where
    T: RealField + Copy,
{
    if b.is_empty() {
        return Err(Error::Configuration {
            arg: "b".into(),
            reason: "numerator coefficient vector is empty".into(),
        });
    }
    let first = a
        .iter()
        .position(|v| !v.is_zero())
        .ok_or_else(|| Error::Configuration {
            arg: "a".into(),
            reason: "there must be at least one nonzero `a` coefficient".into(),
        })?;
    let a = a.slice(ndarray::s![first..]);

    let n = a.len().max(b.len());
    let a0 = a[0];
    let mut bn: Vec<T> = b.iter().map(|&v| v / a0).collect();
    let mut an: Vec<T> = a.iter().map(|&v| v / a0).collect();
    bn.resize(n, T::zero());
    an.resize(n, T::zero());

    if n == 1 {
        return Ok(Array1::zeros(0));
    }

    let companion = companion_dyn(&an)?;
    let i_minus_a = DMatrix::<T>::identity(n - 1, n - 1) - companion.transpose();
    let rhs = DVector::<T>::from_iterator(n - 1, (1..n).map(|i| bn[i] - an[i] * bn[0]));

    let zi = i_minus_a.lu().solve(&rhs).ok_or_else(|| Error::InvalidArg {
        arg: "a".into(),
        reason: "steady-state system is singular; the filter has a pole at z = 1".into(),
    })?;
    log::trace!("lfilter_zi solved a {}x{} steady-state system", n - 1, n - 1);
    Ok(zi.iter().copied().collect())
}
