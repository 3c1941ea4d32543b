use super::ConfigError;
use alloc::vec::Vec;
use ndarray::{ArrayBase, Data, DataMut, Ix1};

/// Adapter trait for reading contiguous 1D input.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing contiguous 1D output.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

/// Covers `Array1`, `ArrayView1` and `ArrayViewMut1` in standard layout.
impl<T, S> Read1D<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
{
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice().ok_or(ConfigError::NonContiguous { arg: "input" })
    }
}

impl<T, S> Write1D<T> for ArrayBase<S, Ix1>
where
    S: DataMut<Elem = T>,
{
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "out" })
    }
}

#[cfg(test)]
mod test {
    use super::{ConfigError, Read1D, Write1D};
    use alloc::vec;
    use ndarray::{array, s, Array1};

    #[test]
    fn slices_vecs_and_arrays_read_in_place() {
        let fixed = [1.0f32, 2.0, 3.0];
        assert_eq!(fixed.read_slice().expect("array adapter"), &[1.0, 2.0, 3.0]);

        let v = vec![4.0f64, 5.0];
        assert_eq!(v.read_slice().expect("vec adapter")[1], 5.0);

        let arr = array![7.0f64, 8.0, 9.0];
        assert_eq!(arr.view().read_slice().expect("view adapter")[2], 9.0);
    }

    #[test]
    fn strided_views_are_rejected() {
        let arr = array![1.0f64, 2.0, 3.0, 4.0];
        let every_other = arr.slice(s![..;2]);
        assert_eq!(
            every_other.read_slice(),
            Err(ConfigError::NonContiguous { arg: "input" })
        );
    }

    #[test]
    fn owned_and_mutable_views_accept_writes() {
        let mut out = Array1::<f64>::zeros(3);
        out.write_slice_mut()
            .expect("array1 write")
            .copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(out, array![1.0, 2.0, 3.0]);

        let mut buf = vec![0.0f32; 2];
        buf.write_slice_mut().expect("vec write")[0] = 6.0;
        assert_eq!(buf, vec![6.0, 0.0]);

        let mut target = Array1::<f64>::zeros(4);
        let mut view = target.view_mut();
        view.write_slice_mut().expect("view write")[3] = 1.5;
        assert_eq!(target[3], 1.5);
    }
}
