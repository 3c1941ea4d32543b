//! N-dimensional linear filtering over [ndarray] arrays.
//!
//! [signal::filter::lfilter] applies a rational transfer function `B(z) / A(z)` along one axis
//! of an array of any rank using a Direct-Form-II-transposed recurrence, for real and complex
//! element kinds, optionally seeded with (and returning) per-slice filter state.
//!
//! ```
//! use lfilt::signal::filter::lfilter;
//! use ndarray::array;
//!
//! let b = array![0.5, 0.5];
//! let a = array![1.0];
//! let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
//! let (y, zf) = lfilter(b.view(), a.view(), x, None, None).unwrap();
//! assert_eq!(y, array![[0.5, 1.5, 2.5], [2.0, 4.5, 5.5]]);
//! assert!(zf.is_none());
//! ```
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use lfilt_core::{Error, NumericKind, Precision, Result, ShapeError};

/// Re-export of the [nalgebra] crate used for the steady-state solver.
pub use nalgebra as na;
/// Complex element type accepted by the complex kernel.
pub use num_complex::Complex;

/// Trait-first kernel substrate: construction lifecycle, errors and buffer adapters.
pub mod kernel;

/// Linear algebra helpers.
pub mod linalg;

/// Signal processing.
pub mod signal;
