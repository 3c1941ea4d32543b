use super::arraytools::{check_and_get_axis, check_state_shape, state_shape};
use super::slices::SliceIter;
use super::strided::{broadcast_state, contiguous, StridedBuf, StridedBufMut};
use super::{kernel_family, FilterElement, PaddedCoefficients};
use alloc::vec::Vec;
use itertools::Itertools;
use lfilt_core::{Error, Result};
use ndarray::{Array, ArrayBase, ArrayView, ArrayView1, Data, Dimension, IxDyn};

/// Filtered output `y` and, when initial conditions were supplied, the final state `zf`.
pub type LFilterResult<T, D> = (Array<T, D>, Option<Array<T, D>>);

/// Filter `x` along one axis with the rational transfer function `B(z) / A(z)`.
///
/// Every slice of `x` obtained by fixing all axes but `axis` is filtered independently with a
/// Direct-Form-II-transposed implementation of the difference equation
///
/// ```text
/// a[0]*y[n] = b[0]*x[n] + b[1]*x[n-1] + ... + b[M]*x[n-M]
///                       - a[1]*y[n-1] - ... - a[N]*y[n-N]
/// ```
///
/// ## Parameters
/// * `b` : The numerator coefficient vector.
/// * `a` : The denominator coefficient vector. If `a[0]` is not 1, both `a` and `b` are
///   normalized by `a[0]`; `a[0] == 0` is rejected.
/// * `x` : An N-dimensional input array, in any memory layout (including negative strides).
/// * `axis`: The axis to filter along. Defaults to `-1` if `None`; valid values are
///   `-x.ndim() <= axis < x.ndim()`.
/// * `zi`: Initial conditions for the filter delays. Same rank as `x`, extent
///   `max(len(a), len(b)) - 1` along `axis` and, on every other axis, either the extent of
///   `x` or 1 (the state is then shared by every slice along that axis). `None` means initial
///   rest.
///
/// ## Returns
/// * `y` : The output of the digital filter, shaped like `x`.
/// * `zf` : If `zi` is `None` this is `None`, otherwise the final filter delay values at the
///   full (non-broadcast) state shape. Passing `zf` as `zi` of the next call continues the
///   filter across chunks.
///
/// # Errors
/// * [Error::Shape] for an out of range `axis` or a `zi` of the wrong rank or shape.
/// * [Error::Configuration] for empty coefficient vectors or `a[0] == 0`.
/// * [Error::Allocation] when the output buffers cannot be reserved.
///
/// No output is produced once an error is returned.
///
/// # Examples
/// ```
/// use lfilt::signal::filter::lfilter;
/// use ndarray::array;
///
/// // y[n] = x[n] + 0.5 y[n-1]
/// let b = array![1.0];
/// let a = array![1.0, -0.5];
/// let x = array![1.0, 0.0, 0.0, 0.0];
/// let zi = array![1.0];
/// let (y, zf) = lfilter(b.view(), a.view(), x, None, Some(zi.view())).unwrap();
/// assert_eq!(y, array![2.0, 1.0, 0.5, 0.25]);
/// assert_eq!(zf.unwrap(), array![0.125]);
/// ```
pub fn lfilter<T, S, D>(
    b: ArrayView1<'_, T>,
    a: ArrayView1<'_, T>,
    x: ArrayBase<S, D>,
    axis: Option<isize>,
    zi: Option<ArrayView<T, D>>,
) -> Result<LFilterResult<T, D>>
where
    T: FilterElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let op = FilterOp::try_new(b, a, x.shape(), axis, zi.as_ref().map(|zi| zi.shape()))?;
    op.run(&x, zi)
}

/// [lfilter] with the slices distributed over the rayon thread pool.
///
/// Produces the same bits as [lfilter]; every worker owns its delay line.
#[cfg(feature = "rayon")]
pub fn lfilter_par<T, S, D>(
    b: ArrayView1<'_, T>,
    a: ArrayView1<'_, T>,
    x: ArrayBase<S, D>,
    axis: Option<isize>,
    zi: Option<ArrayView<T, D>>,
) -> Result<LFilterResult<T, D>>
where
    T: FilterElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let op = FilterOp::try_new(b, a, x.shape(), axis, zi.as_ref().map(|zi| zi.shape()))?;
    op.run_par(&x, zi)
}

/// Implement [lfilter] as an associated function of the input array type.
pub trait LFilter<T, D>: Sized
where
    D: Dimension,
{
    /// See [lfilter].
    ///
    /// ```
    /// use lfilt::signal::filter::LFilter;
    /// use ndarray::{array, Array1, ArrayView1};
    ///
    /// let b = array![5., 4., 1., 2.];
    /// let a = array![1.];
    /// let x = array![1., 2., 3., 4., 3., 5., 6.];
    /// let expected = array![5., 14., 24., 36., 38., 47., 61.];
    ///
    /// let (by_ref, _) = ArrayView1::lfilter(b.view(), a.view(), x.view(), None, None).unwrap();
    /// let (by_value, _) = Array1::lfilter(b.view(), a.view(), x, None, None).unwrap();
    /// assert_eq!(by_ref, expected);
    /// assert_eq!(by_value, expected);
    /// ```
    fn lfilter(
        b: ArrayView1<'_, T>,
        a: ArrayView1<'_, T>,
        x: Self,
        axis: Option<isize>,
        zi: Option<ArrayView<'_, T, D>>,
    ) -> Result<LFilterResult<T, D>>;
}

impl<S, T, D> LFilter<T, D> for ArrayBase<S, D>
where
    S: Data<Elem = T>,
    T: FilterElement,
    D: Dimension,
{
    fn lfilter(
        b: ArrayView1<'_, T>,
        a: ArrayView1<'_, T>,
        x: Self,
        axis: Option<isize>,
        zi: Option<ArrayView<'_, T, D>>,
    ) -> Result<LFilterResult<T, D>> {
        lfilter(b, a, x, axis, zi)
    }
}

/// A validated filtering operation for inputs of one shape.
///
/// [FilterOp::try_new] performs every check (axis, coefficients, state shape) before any
/// buffer is allocated; [FilterOp::run] then allocates `y`, `zf` and the delay line and walks
/// the slices, seeding the delay line from `zi` (or zeros) and committing it to `zf` after
/// each slice.
#[derive(Debug, Clone)]
pub struct FilterOp<T> {
    coeffs: PaddedCoefficients<T>,
    shape: Vec<usize>,
    axis: usize,
}

impl<T: FilterElement> FilterOp<T> {
    /// Validate an operation over inputs shaped `x_shape`, with initial conditions shaped
    /// `zi_shape` when given.
    pub fn try_new(
        b: ArrayView1<'_, T>,
        a: ArrayView1<'_, T>,
        x_shape: &[usize],
        axis: Option<isize>,
        zi_shape: Option<&[usize]>,
    ) -> Result<Self> {
        let axis = check_and_get_axis(axis, x_shape.len())?;
        let coeffs = PaddedCoefficients::try_new(b, a)?;
        if let Some(zi_shape) = zi_shape {
            check_state_shape(x_shape, zi_shape, axis, coeffs.state_len())?;
        }
        Ok(Self {
            coeffs,
            shape: x_shape.to_vec(),
            axis,
        })
    }

    /// Resolved, non-negative filter axis.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Normalized and padded coefficients.
    pub fn coefficients(&self) -> &PaddedCoefficients<T> {
        &self.coeffs
    }

    /// Shape of `zi` without broadcasting, and of the returned `zf`.
    pub fn state_shape(&self) -> Vec<usize> {
        state_shape(&self.shape, self.axis, self.coeffs.state_len())
    }

    /// Filter `x`, which must have the shape the operation was validated for.
    pub fn run<S, D>(
        &self,
        x: &ArrayBase<S, D>,
        zi: Option<ArrayView<'_, T, D>>,
    ) -> Result<LFilterResult<T, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        self.check_input(x.shape())?;
        let axis = self.axis;
        let state_len = self.coeffs.state_len();

        let x = contiguous(x.view());
        let x_buf = StridedBuf::from_array(&x).ok_or_else(|| not_contiguous("x"))?;
        let zi = zi.map(contiguous);
        let zi_buf = match &zi {
            Some(zi) => {
                let buf = StridedBuf::from_array(zi).ok_or_else(|| not_contiguous("zi"))?;
                Some(broadcast_state(buf, &self.shape, axis, state_len)?)
            }
            None => None,
        };

        log::debug!(
            "lfilter kind={} family={:?} shape=({}) axis={} nfilt={} zi={}",
            T::KIND,
            kernel_family(T::KIND),
            self.shape.iter().format(","),
            axis,
            self.coeffs.nfilt(),
            zi_buf.is_some()
        );

        let mut y = try_zeroed(element_count(&self.shape, "y")?, "y")?;
        let mut delay = try_zeroed(state_len, "delay line")?;

        match zi_buf {
            None => {
                self.filter_slices(&x_buf, &mut y, &mut delay);
                Ok((into_array(&self.shape, y)?, None))
            }
            Some(zi_buf) => {
                let zf_shape = self.state_shape();
                let mut zf = try_zeroed(element_count(&zf_shape, "zf")?, "zf")?;
                self.filter_slices_with_state(
                    &x_buf, &zi_buf, &mut y, &mut zf, &zf_shape, &mut delay,
                );
                Ok((into_array(&self.shape, y)?, Some(into_array(&zf_shape, zf)?)))
            }
        }
    }

    /// [FilterOp::run] with the slices distributed over the rayon thread pool.
    #[cfg(feature = "rayon")]
    pub fn run_par<S, D>(
        &self,
        x: &ArrayBase<S, D>,
        zi: Option<ArrayView<'_, T, D>>,
    ) -> Result<LFilterResult<T, D>>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        use ndarray::{Axis, Zip};

        self.check_input(x.shape())?;
        let ax = Axis(self.axis);
        let state_len = self.coeffs.state_len();
        let (b, a) = (self.coeffs.b(), self.coeffs.a());

        log::debug!(
            "lfilter_par kind={} shape=({}) axis={} nfilt={} zi={}",
            T::KIND,
            self.shape.iter().format(","),
            self.axis,
            self.coeffs.nfilt(),
            zi.is_some()
        );

        let mut y: Array<T, D> =
            into_array(&self.shape, try_zeroed(element_count(&self.shape, "y")?, "y")?)?;
        match zi {
            None => {
                Zip::from(x.lanes(ax))
                    .and(y.lanes_mut(ax))
                    .par_for_each(|x_lane, mut y_lane| {
                        let mut delay = alloc::vec![T::zero(); state_len];
                        T::filter_lane(b, a, x_lane.iter(), y_lane.iter_mut(), &mut delay);
                    });
                Ok((y, None))
            }
            Some(zi) => {
                check_state_shape(&self.shape, zi.shape(), self.axis, state_len)?;
                let zf_shape = self.state_shape();
                let mut zf: Array<T, D> =
                    into_array(&zf_shape, try_zeroed(element_count(&zf_shape, "zf")?, "zf")?)?;
                let zi = zi.broadcast(zf.raw_dim()).ok_or_else(|| Error::InvalidArg {
                    arg: "zi".into(),
                    reason: "could not broadcast initial conditions".into(),
                })?;
                Zip::from(x.lanes(ax))
                    .and(y.lanes_mut(ax))
                    .and(zi.lanes(ax))
                    .and(zf.lanes_mut(ax))
                    .par_for_each(|x_lane, mut y_lane, zi_lane, mut zf_lane| {
                        let mut delay = zi_lane.to_vec();
                        T::filter_lane(b, a, x_lane.iter(), y_lane.iter_mut(), &mut delay);
                        zf_lane
                            .iter_mut()
                            .zip(&delay)
                            .for_each(|(dst, src)| *dst = *src);
                    });
                Ok((y, Some(zf)))
            }
        }
    }

    fn check_input(&self, shape: &[usize]) -> Result<()> {
        if shape != self.shape.as_slice() {
            return Err(Error::InvalidArg {
                arg: "x".into(),
                reason: alloc::format!(
                    "expected input of shape {:?}, found {:?}",
                    self.shape,
                    shape
                ),
            });
        }
        Ok(())
    }

    fn filter_slices(&self, x: &StridedBuf<'_, T>, y: &mut [T], delay: &mut [T]) {
        let axis = self.axis;
        let (b, a) = (self.coeffs.b(), self.coeffs.a());
        let mut y = StridedBufMut::c_order(y, &self.shape);
        let slices = SliceIter::new(&self.shape, axis, [x.strides(), y.strides()], [x.origin(), 0]);
        for [xo, yo] in slices {
            delay.fill(T::zero());
            T::filter_lane(b, a, x.lane(xo, axis), y.lane_mut(yo, axis), delay);
        }
    }

    fn filter_slices_with_state(
        &self,
        x: &StridedBuf<'_, T>,
        zi: &StridedBuf<'_, T>,
        y: &mut [T],
        zf: &mut [T],
        zf_shape: &[usize],
        delay: &mut [T],
    ) {
        let axis = self.axis;
        let (b, a) = (self.coeffs.b(), self.coeffs.a());
        let mut y = StridedBufMut::c_order(y, &self.shape);
        let mut zf = StridedBufMut::c_order(zf, zf_shape);
        let slices = SliceIter::new(
            &self.shape,
            axis,
            [x.strides(), y.strides(), zi.strides(), zf.strides()],
            [x.origin(), 0, zi.origin(), 0],
        );
        for [xo, yo, zio, zfo] in slices {
            for (d, s) in delay.iter_mut().zip(zi.lane(zio, axis)) {
                *d = *s;
            }
            T::filter_lane(b, a, x.lane(xo, axis), y.lane_mut(yo, axis), delay);
            for (d, s) in zf.lane_mut(zfo, axis).zip(delay.iter()) {
                *d = *s;
            }
        }
    }
}

fn not_contiguous(arg: &str) -> Error {
    Error::InvalidArg {
        arg: arg.into(),
        reason: "array storage is not contiguous".into(),
    }
}

fn element_count(shape: &[usize], what: &'static str) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or(Error::Allocation {
            what,
            len: usize::MAX,
        })
}

fn try_zeroed<T: FilterElement>(len: usize, what: &'static str) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { what, len })?;
    out.resize(len, T::zero());
    Ok(out)
}

fn into_array<T, D: Dimension>(shape: &[usize], data: Vec<T>) -> Result<Array<T, D>> {
    Array::from_shape_vec(IxDyn(shape), data)
        .and_then(|array| array.into_dimensionality::<D>())
        .map_err(|err| Error::InvalidArg {
            arg: "shape".into(),
            reason: alloc::format!("could not build output array: {err}"),
        })
}
