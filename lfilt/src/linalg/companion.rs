use core::ops::{Div, Neg};
use lfilt_core::{Error, Result};
use nalgebra::{DMatrix, Scalar};
use num_traits::{One, Zero};

/// Build the companion matrix of the polynomial `coeffs[0] * x^(m-1) + ... + coeffs[m-1]`.
///
/// The first row is `-coeffs[1..] / coeffs[0]` and the sub-diagonal is one, as in
/// `scipy.linalg.companion`. At least two coefficients are required and `coeffs[0]` must be
/// non-zero.
///
/// ```
/// use lfilt::linalg::companion_dyn;
///
/// let c = companion_dyn(&[1.0, -10.0, 31.0, -30.0]).unwrap();
/// assert_eq!(c.row(0).iter().copied().collect::<Vec<_>>(), vec![10.0, -31.0, 30.0]);
/// assert_eq!(c[(1, 0)], 1.0);
/// assert_eq!(c[(2, 1)], 1.0);
/// ```
pub fn companion_dyn<T>(coeffs: &[T]) -> Result<DMatrix<T>>
where
    T: Scalar + Zero + One + Copy + Div<Output = T> + Neg<Output = T>,
{
    let m = coeffs.len();
    if m < 2 {
        return Err(Error::InvalidArg {
            arg: "coeffs".into(),
            reason: "companion requires at least 2 coefficients".into(),
        });
    }
    let lead = coeffs[0];
    if lead.is_zero() {
        return Err(Error::InvalidArg {
            arg: "coeffs".into(),
            reason: "leading coefficient must be non-zero".into(),
        });
    }

    let mut matrix = DMatrix::<T>::zeros(m - 1, m - 1);
    for (j, &c) in coeffs[1..].iter().enumerate() {
        matrix[(0, j)] = -c / lead;
    }
    for i in 1..m - 1 {
        matrix[(i, i - 1)] = T::one();
    }
    Ok(matrix)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalizes_by_leading_coefficient() {
        let c = companion_dyn(&[2.0, 4.0, -6.0]).expect("valid polynomial");
        assert_eq!(c.shape(), (2, 2));
        assert_relative_eq!(c[(0, 0)], -2.0);
        assert_relative_eq!(c[(0, 1)], 3.0);
        assert_relative_eq!(c[(1, 0)], 1.0);
        assert_relative_eq!(c[(1, 1)], 0.0);
    }

    #[test]
    fn degenerate_polynomials_are_rejected() {
        assert!(companion_dyn::<f64>(&[1.0]).is_err());
        assert!(companion_dyn(&[0.0, 1.0, 2.0]).is_err());
    }
}
