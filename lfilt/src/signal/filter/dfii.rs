//! Direct-Form-II-transposed recurrences over a single lane.
//!
//! Both kernels read `x` and write `y` through iterators, so the same code runs over
//! contiguous, strided and reversed lanes. `z` is the delay line and must hold
//! `nfilt - 1` values, where `nfilt = b.len() = a.len()`.

use num_complex::Complex;
use num_traits::Float;

/// Divides `b` and `a` by `a[0]` in place.
pub(crate) fn normalize_real<F: Float>(b: &mut [F], a: &mut [F]) {
    let a0 = a[0];
    for c in b.iter_mut().chain(a.iter_mut()) {
        *c = *c / a0;
    }
}

/// Real kernel. Expects `a[0] == 1` (see [normalize_real]).
pub(crate) fn real_lane<'x, 'y, F, I, O>(b: &[F], a: &[F], x: I, y: O, z: &mut [F])
where
    F: Float + 'x + 'y,
    I: Iterator<Item = &'x F>,
    O: Iterator<Item = &'y mut F>,
{
    let nfilt = b.len();
    debug_assert_eq!(a.len(), nfilt);
    debug_assert_eq!(z.len() + 1, nfilt);

    if nfilt > 1 {
        let last = nfilt - 1;
        for (&xn, yn) in x.zip(y) {
            let out = z[0] + b[0] * xn;
            for i in 0..last - 1 {
                z[i] = z[i + 1] + xn * b[i + 1] - out * a[i + 1];
            }
            z[last - 1] = xn * b[last] - out * a[last];
            *yn = out;
        }
    } else {
        let b0 = b[0];
        for (&xn, yn) in x.zip(y) {
            *yn = xn * b0;
        }
    }
}

/// `c / a0 * s`, evaluated through `c * conj(a0) / |a0|^2`.
#[inline(always)]
fn scaled<F: Float>(c: Complex<F>, a0: Complex<F>, a0_mag: F, s: Complex<F>) -> Complex<F> {
    let tmpr = c.re * a0.re + c.im * a0.im;
    let tmpi = c.im * a0.re - c.re * a0.im;
    Complex::new(
        (tmpr * s.re - tmpi * s.im) / a0_mag,
        (tmpi * s.re + tmpr * s.im) / a0_mag,
    )
}

/// Complex kernel. Coefficients are not pre-normalized; `a[0]` must not be the zero bit
/// pattern. A signed zero `a[0]` makes `|a0|^2 == 0` and the output non-finite.
pub(crate) fn complex_lane<'x, 'y, F, I, O>(
    b: &[Complex<F>],
    a: &[Complex<F>],
    x: I,
    y: O,
    z: &mut [Complex<F>],
) where
    F: Float + 'x + 'y,
    I: Iterator<Item = &'x Complex<F>>,
    O: Iterator<Item = &'y mut Complex<F>>,
{
    let nfilt = b.len();
    debug_assert_eq!(a.len(), nfilt);
    debug_assert_eq!(z.len() + 1, nfilt);

    let a0 = a[0];
    let a0_mag = a0.re * a0.re + a0.im * a0.im;

    if nfilt > 1 {
        let last = nfilt - 1;
        for (&xn, yn) in x.zip(y) {
            let out = z[0] + scaled(b[0], a0, a0_mag, xn);
            for i in 0..last - 1 {
                z[i] = z[i + 1] + scaled(b[i + 1], a0, a0_mag, xn)
                    - scaled(a[i + 1], a0, a0_mag, out);
            }
            z[last - 1] = scaled(b[last], a0, a0_mag, xn) - scaled(a[last], a0, a0_mag, out);
            *yn = out;
        }
    } else {
        for (&xn, yn) in x.zip(y) {
            *yn = scaled(b[0], a0, a0_mag, xn);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::{vec, vec::Vec};
    use approx::assert_relative_eq;

    fn run_real(b: &[f64], a: &[f64], x: &[f64], z: &mut [f64]) -> Vec<f64> {
        let (mut b, mut a) = (b.to_vec(), a.to_vec());
        normalize_real(&mut b, &mut a);
        let mut y = vec![0.0; x.len()];
        real_lane(&b, &a, x.iter(), y.iter_mut(), z);
        y
    }

    #[test]
    fn real_first_order_iir() {
        // y[n] = x[n] + 0.5 y[n-1]
        let mut z = [0.0];
        let y = run_real(&[1.0, 0.0], &[1.0, -0.5], &[1.0, 0.0, 0.0, 0.0], &mut [0.0]);
        assert_eq!(y, vec![1.0, 0.5, 0.25, 0.125]);

        let y = run_real(&[2.0, 0.0], &[2.0, -1.0], &[1.0, 1.0, 1.0], &mut z);
        assert_relative_eq!(y.as_slice(), [1.0, 1.5, 1.75].as_slice());
        assert_relative_eq!(z[0], 0.875);
    }

    #[test]
    fn real_fir_matches_convolution() {
        let b = [0.25, 0.5, 0.25];
        let x = [4.0, 8.0, -4.0, 0.0, 2.0];
        let mut z = [0.0; 2];
        let y = run_real(&b, &[1.0, 0.0, 0.0], &x, &mut z);
        let expected: Vec<f64> = (0..x.len())
            .map(|n| (0..b.len()).filter(|k| *k <= n).map(|k| b[k] * x[n - k]).sum())
            .collect();
        assert_relative_eq!(y.as_slice(), expected.as_slice(), max_relative = 1e-12);
        // tail of the convolution is left in the delay line
        assert_relative_eq!(z[0], b[1] * x[4] + b[2] * x[3]);
        assert_relative_eq!(z[1], b[2] * x[4]);
    }

    #[test]
    fn real_pure_gain_uses_no_state() {
        let y = run_real(&[3.0], &[2.0], &[2.0, -4.0], &mut []);
        assert_eq!(y, vec![3.0, -6.0]);
    }

    #[test]
    fn complex_matches_real_with_unit_a0() {
        let b = [0.3, -0.2, 0.1];
        let a = [1.0, -0.4, 0.2];
        let x = [1.0, -2.0, 0.5, 3.0, 0.0, -1.0];
        let mut zr = [0.0; 2];
        let yr = run_real(&b, &a, &x, &mut zr);

        let cb: Vec<_> = b.iter().map(|v| Complex::new(*v, 0.0)).collect();
        let ca: Vec<_> = a.iter().map(|v| Complex::new(*v, 0.0)).collect();
        let cx: Vec<_> = x.iter().map(|v| Complex::new(*v, 0.0)).collect();
        let mut cy = vec![Complex::new(0.0, 0.0); x.len()];
        let mut cz = [Complex::new(0.0, 0.0); 2];
        complex_lane(&cb, &ca, cx.iter(), cy.iter_mut(), &mut cz);

        for (r, c) in yr.iter().zip(&cy) {
            assert_eq!(*r, c.re);
            assert_eq!(c.im, 0.0);
        }
        assert_eq!(zr[0], cz[0].re);
        assert_eq!(zr[1], cz[1].re);
    }

    #[test]
    fn complex_divides_by_complex_a0() {
        // y = (b0 / a0) x with a0 = i
        let b = [Complex::new(2.0, 0.0)];
        let a = [Complex::new(0.0, 1.0)];
        let x = [Complex::new(1.0, 1.0)];
        let mut y = [Complex::new(0.0, 0.0)];
        complex_lane(&b, &a, x.iter(), y.iter_mut(), &mut []);
        // 2 / i * (1 + i) = -2i (1 + i) = 2 - 2i
        assert_relative_eq!(y[0].re, 2.0);
        assert_relative_eq!(y[0].im, -2.0);
    }

    #[test]
    fn complex_first_order_with_scaled_a0() {
        let b = [Complex::new(2.0, 0.0), Complex::new(0.0, 0.0)];
        let a = [Complex::new(2.0, 0.0), Complex::new(0.0, -1.0)];
        let x = [Complex::new(1.0, 0.0); 3];
        let mut y = [Complex::new(0.0, 0.0); 3];
        let mut z = [Complex::new(0.0, 0.0)];
        complex_lane(&b, &a, x.iter(), y.iter_mut(), &mut z);

        // normalized: y[n] = x[n] + 0.5i * y[n-1]
        let mut prev = Complex::new(0.0, 0.0);
        for (xn, yn) in x.iter().zip(&y) {
            let expected = xn + Complex::new(0.0, 0.5) * prev;
            assert_relative_eq!(yn.re, expected.re, max_relative = 1e-12);
            assert_relative_eq!(yn.im, expected.im, max_relative = 1e-12);
            prev = expected;
        }
    }
}
