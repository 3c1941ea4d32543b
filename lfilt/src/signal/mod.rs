/// Linear filtering along an axis of an N-dimensional array.
pub mod filter;

/// Trait interfaces for the one-dimensional kernels.
pub mod traits;
