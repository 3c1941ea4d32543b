//! `scipy.signal.lfilter` for [ndarray] arrays of any rank.
//!
//! The engine is split into small pieces:
//! * [PaddedCoefficients] normalizes and pads `b`/`a` to a shared length `nfilt`;
//! * the [FilterElement] registry maps every [NumericKind](lfilt_core::NumericKind) onto the
//!   real or the complex Direct-Form-II-transposed kernel;
//! * [FilterOp] validates the arguments, walks every slice orthogonal to the filtered axis
//!   and seeds/commits the per-slice delay line, broadcasting `zi` where it has extent 1.

mod arraytools;
mod coefficients;
mod dfii;
mod element;
mod kernels;
mod kinded;
mod lfilter;
mod lfilter_zi;
mod slices;
mod strided;

pub use coefficients::*;
pub use element::*;
pub use kernels::*;
pub use kinded::*;
pub use lfilter::*;
pub use lfilter_zi::*;
