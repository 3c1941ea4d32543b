use super::arraytools::check_state_shape;
use alloc::vec::Vec;
use core::iter::{FusedIterator, StepBy, Take};
use core::slice::IterMut;
use lfilt_core::Result;
use ndarray::{ArrayBase, ArrayView, CowArray, Data, Dimension};

/// Read-only strided view over contiguous storage.
///
/// `origin` is the offset of the logical first element inside `data`; strides are in
/// elements and may be negative or zero.
#[derive(Debug, Clone)]
pub(crate) struct StridedBuf<'a, T> {
    data: &'a [T],
    origin: usize,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl<'a, T> StridedBuf<'a, T> {
    /// `None` when `array` is not contiguous in memory.
    pub(crate) fn from_array<S, D>(array: &'a ArrayBase<S, D>) -> Option<Self>
    where
        S: Data<Elem = T>,
        D: Dimension,
    {
        let data = array.as_slice_memory_order()?;
        let shape = array.shape().to_vec();
        let strides = array.strides().to_vec();
        let origin = if data.is_empty() {
            0
        } else {
            shape
                .iter()
                .zip(&strides)
                .filter(|(_, &s)| s < 0)
                .map(|(&n, &s)| (n - 1) * s.unsigned_abs())
                .sum()
        };
        Some(Self {
            data,
            origin,
            shape,
            strides,
        })
    }

    #[inline]
    pub(crate) fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub(crate) fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub(crate) fn origin(&self) -> usize {
        self.origin
    }

    /// The lane along `axis` starting at element offset `base`.
    #[inline]
    pub(crate) fn lane(&self, base: usize, axis: usize) -> Lane<'a, T> {
        Lane {
            data: self.data,
            pos: base as isize,
            stride: self.strides[axis],
            remaining: self.shape[axis],
        }
    }

    /// Stretch extent-1 axes to `target` with stride 0. The shapes must already agree on
    /// every other axis.
    fn broadcast_to(mut self, target: &[usize]) -> Self {
        for (k, &n) in target.iter().enumerate() {
            if self.shape[k] != n {
                debug_assert_eq!(self.shape[k], 1);
                self.shape[k] = n;
                self.strides[k] = 0;
            }
        }
        self
    }
}

/// Element iterator over one lane of a [StridedBuf].
#[derive(Debug, Clone)]
pub(crate) struct Lane<'a, T> {
    data: &'a [T],
    pos: isize,
    stride: isize,
    remaining: usize,
}

impl<'a, T> Iterator for Lane<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let item = &self.data[self.pos as usize];
        self.remaining -= 1;
        if self.remaining > 0 {
            self.pos += self.stride;
        }
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Lane<'_, T> {}

impl<T> FusedIterator for Lane<'_, T> {}

/// Mutable row-major view over a freshly allocated output buffer.
#[derive(Debug)]
pub(crate) struct StridedBufMut<'a, T> {
    data: &'a mut [T],
    shape: &'a [usize],
    strides: Vec<isize>,
}

impl<'a, T> StridedBufMut<'a, T> {
    /// `data` must hold exactly `shape.iter().product()` elements.
    pub(crate) fn c_order(data: &'a mut [T], shape: &'a [usize]) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        let mut strides = alloc::vec![0isize; shape.len()];
        let mut step = 1usize;
        for (k, &n) in shape.iter().enumerate().rev() {
            strides[k] = step as isize;
            step *= n;
        }
        Self {
            data,
            shape,
            strides,
        }
    }

    #[inline]
    pub(crate) fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// The lane along `axis` starting at element offset `base`.
    #[inline]
    pub(crate) fn lane_mut(&mut self, base: usize, axis: usize) -> Take<StepBy<IterMut<'_, T>>> {
        let len = self.shape[axis];
        let start = if len == 0 { self.data.len() } else { base };
        let step = (self.strides[axis] as usize).max(1);
        self.data[start..].iter_mut().step_by(step).take(len)
    }
}

/// Borrow `array` as contiguous storage, copying into standard layout only when its
/// elements are not contiguous (sliced with a step, broadcast, ...).
pub(crate) fn contiguous<'a, T, D>(array: ArrayView<'a, T, D>) -> CowArray<'a, T, D>
where
    T: Clone,
    D: Dimension,
{
    if array.as_slice_memory_order().is_some() {
        CowArray::from(array)
    } else {
        CowArray::from(array.as_standard_layout().into_owned())
    }
}

/// Validate `zi` against the input shape and view it at the full `zf` shape.
///
/// Axes where `zi` has extent 1 and `x` does not are read with stride 0, so one stored
/// state is reused for every slice along that axis.
pub(crate) fn broadcast_state<'a, T>(
    zi: StridedBuf<'a, T>,
    x_shape: &[usize],
    axis: usize,
    state_len: usize,
) -> Result<StridedBuf<'a, T>> {
    let needs_broadcast = check_state_shape(x_shape, zi.shape(), axis, state_len)?;
    if !needs_broadcast {
        return Ok(zi);
    }
    let target = super::arraytools::state_shape(x_shape, axis, state_len);
    log::trace!(
        "broadcasting zi {:?} to {:?} along axis {}",
        zi.shape(),
        target,
        axis
    );
    Ok(zi.broadcast_to(&target))
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::{vec, vec::Vec};
    use ndarray::{array, s, Array2, Axis, ShapeBuilder};

    #[test]
    fn lanes_follow_negative_strides() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let flipped = a.slice(s![.., ..;-1]);
        let buf = StridedBuf::from_array(&flipped).expect("contiguous");
        assert_eq!(buf.strides(), &[3, -1]);
        assert_eq!(buf.origin(), 2);
        let lane: Vec<f64> = buf.lane(buf.origin(), 1).copied().collect();
        assert_eq!(lane, vec![3.0, 2.0, 1.0]);
        let lane: Vec<f64> = buf.lane(buf.origin() + 3, 1).copied().collect();
        assert_eq!(lane, vec![6.0, 5.0, 4.0]);
    }

    #[test]
    fn fortran_layout_is_contiguous() {
        let a = Array2::from_shape_vec((2, 3).f(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0])
            .expect("shape");
        let buf = StridedBuf::from_array(&a).expect("contiguous");
        assert_eq!(buf.strides(), &[1, 2]);
        let col: Vec<f64> = buf.lane(2, 0).copied().collect();
        assert_eq!(col, vec![2.0, 5.0]);
    }

    #[test]
    fn stepped_views_are_copied_into_standard_layout() {
        let a = Array2::from_shape_fn((4, 3), |(i, j)| (3 * i + j) as f64);
        let stepped = a.slice(s![..;2, ..]);
        assert!(StridedBuf::from_array(&stepped).is_none());
        let owned = contiguous(stepped);
        let buf = StridedBuf::from_array(&owned).expect("contiguous copy");
        let lane: Vec<f64> = buf.lane(0, 0).copied().collect();
        assert_eq!(lane, vec![0.0, 6.0]);
    }

    #[test]
    fn output_lanes_write_in_c_order() {
        let shape = [2usize, 3];
        let mut data = vec![0.0; 6];
        let mut out = StridedBufMut::c_order(&mut data, &shape);
        assert_eq!(out.strides(), &[3, 1]);
        for (i, v) in out.lane_mut(1, 0).enumerate() {
            *v = 10.0 + i as f64;
        }
        assert_eq!(data, vec![0.0, 10.0, 0.0, 0.0, 11.0, 0.0]);
    }

    #[test]
    fn broadcast_state_uses_zero_strides() {
        let zi = array![[0.5], [0.25]];
        let buf = StridedBuf::from_array(&zi).expect("contiguous");
        let view = broadcast_state(buf, &[3, 4], 0, 2).expect("valid zi");
        assert_eq!(view.shape(), &[2, 4]);
        assert_eq!(view.strides()[1], 0);
        for base in (0..4).map(|j| j * view.strides()[1] as usize) {
            let lane: Vec<f64> = view.lane(base, 0).copied().collect();
            assert_eq!(lane, vec![0.5, 0.25]);
        }
        assert_eq!(zi.len_of(Axis(1)), 1);
    }

    #[test]
    fn empty_lanes_do_not_touch_storage() {
        let empty = Array2::<f64>::zeros((3, 0));
        let buf = StridedBuf::from_array(&empty).expect("contiguous");
        assert_eq!(buf.lane(7, 1).count(), 0);

        let shape = [3usize, 0];
        let mut data: Vec<f64> = Vec::new();
        let mut out = StridedBufMut::c_order(&mut data, &shape);
        assert_eq!(out.lane_mut(0, 1).count(), 0);
    }
}
