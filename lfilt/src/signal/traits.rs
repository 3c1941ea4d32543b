//! Trait interfaces for signal-processing capabilities.
//!
//! The kernels in [crate::signal::filter] implement these on top of the
//! [Read1D]/[Write1D] buffer adapters.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use alloc::vec::Vec;

/// Streaming 1D linear filter capability.
///
/// Implementors carry their delay line across calls, so feeding a signal in consecutive
/// chunks produces the same output as one call over the concatenation.
pub trait LFilter1D<T> {
    /// Filter `input` into a caller-provided buffer of the same length.
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Filter `input` and allocate the output.
    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Steady-state initial condition design capability.
pub trait LFilterZiDesign1D<T> {
    /// Write the initial delay line into a caller-provided buffer of length `nfilt - 1`.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Compute and allocate the initial delay line.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}
