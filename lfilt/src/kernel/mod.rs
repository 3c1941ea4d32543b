//! Trait-first kernel substrate.
//!
//! Kernels are built from a plain `*Config` struct through [KernelLifecycle::try_new], which
//! performs every check up front, and then read/write one-dimensional buffers through the
//! [Read1D] and [Write1D] adapters.

mod errors;
mod io;

pub use errors::*;
pub use io::*;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}
