//! Core types shared across the `lfilt` workspace.
//!
//! Holds the crate-wide [Error] and [Result] as well as the closed [NumericKind]
//! enumeration used to tag and unify array element kinds.
#![no_std]

extern crate alloc;

mod error;
mod kind;

pub use error::*;
pub use kind::*;

/// Result alias used throughout `lfilt`.
pub type Result<T> = core::result::Result<T, Error>;
