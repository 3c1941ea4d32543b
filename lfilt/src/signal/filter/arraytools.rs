use alloc::vec::Vec;
use lfilt_core::{Result, ShapeError};

/// Resolve a possibly negative `axis` against `ndim`, defaulting to the last axis.
///
/// Valid values are `-ndim <= axis < ndim`; a zero-dimensional input has no valid axis.
#[inline]
pub(crate) fn check_and_get_axis(axis: Option<isize>, ndim: usize) -> Result<usize> {
    let requested = axis.unwrap_or(-1);
    let out_of_range = || ShapeError::AxisOutOfRange {
        axis: requested,
        ndim,
    };
    if requested < 0 {
        let back = requested.unsigned_abs();
        if back > ndim {
            return Err(out_of_range().into());
        }
        Ok(ndim - back)
    } else {
        let axis = requested.unsigned_abs();
        if axis >= ndim {
            return Err(out_of_range().into());
        }
        Ok(axis)
    }
}

/// Shape of `zi`/`zf`: `shape` with the filtered axis replaced by `state_len`.
#[inline]
pub(crate) fn state_shape(shape: &[usize], axis: usize, state_len: usize) -> Vec<usize> {
    let mut out = shape.to_vec();
    out[axis] = state_len;
    out
}

/// Checks `zi` against `x`: rank first, then every axis in order. On the filtered axis the
/// extent must be `state_len`; elsewhere it must equal `x`'s extent or be 1.
///
/// Returns whether any axis needs broadcasting.
pub(crate) fn check_state_shape(
    x_shape: &[usize],
    zi_shape: &[usize],
    axis: usize,
    state_len: usize,
) -> Result<bool> {
    if zi_shape.len() != x_shape.len() {
        return Err(ShapeError::StateRank {
            expected: x_shape.len(),
            found: zi_shape.len(),
        }
        .into());
    }

    let mut broadcast = false;
    for (k, (&xk, &zk)) in x_shape.iter().zip(zi_shape).enumerate() {
        let ok = if k == axis {
            zk == state_len
        } else if zk == xk {
            true
        } else if zk == 1 {
            broadcast = true;
            true
        } else {
            false
        };
        if !ok {
            return Err(ShapeError::StateShape {
                expected: state_shape(x_shape, axis, state_len),
                found: zi_shape.to_vec(),
            }
            .into());
        }
    }
    Ok(broadcast)
}
