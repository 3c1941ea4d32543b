use super::{lfilter_zi, FilterElement, PaddedCoefficients};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::{LFilter1D, LFilterZiDesign1D};
use alloc::{vec, vec::Vec};
use lfilt_core::Error;
use nalgebra::RealField;
use ndarray::ArrayView1;

/// Constructor config for [`LFilterKernel`].
#[derive(Debug, Clone)]
pub struct LFilterConfig<T> {
    /// Numerator coefficients.
    pub b: Vec<T>,
    /// Denominator coefficients.
    pub a: Vec<T>,
    /// Initial delay line of length `max(len(a), len(b)) - 1`. Zeros when `None`.
    pub zi: Option<Vec<T>>,
}

/// Streaming 1D `lfilter` kernel.
///
/// The delay line survives between calls, so a signal may be fed in chunks of any size.
#[derive(Debug, Clone)]
pub struct LFilterKernel<T> {
    coeffs: PaddedCoefficients<T>,
    state: Vec<T>,
}

impl<T: FilterElement> KernelLifecycle for LFilterKernel<T> {
    type Config = LFilterConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.b.is_empty() {
            return Err(ConfigError::EmptyCoefficients { arg: "b" });
        }
        if config.a.is_empty() {
            return Err(ConfigError::EmptyCoefficients { arg: "a" });
        }
        if config.a[0].is_zero_bits() {
            return Err(ConfigError::ZeroLeadingDenominator);
        }
        let coeffs =
            PaddedCoefficients::from_slices(&config.b, &config.a).map_err(coefficient_error)?;
        let state = match config.zi {
            Some(zi) if zi.len() != coeffs.state_len() => {
                return Err(ConfigError::StateLength {
                    expected: coeffs.state_len(),
                    got: zi.len(),
                })
            }
            Some(zi) => zi,
            None => vec![T::zero(); coeffs.state_len()],
        };
        Ok(Self { coeffs, state })
    }
}

/// Emptiness and `a[0]` are validated before padding, so only allocation can fail there.
fn coefficient_error(err: Error) -> ConfigError {
    match err {
        Error::Allocation { what, len } => ConfigError::Allocation { what, len },
        _ => ConfigError::InvalidArgument {
            arg: "b",
            reason: "coefficients could not be padded",
        },
    }
}

impl<T: FilterElement> LFilterKernel<T> {
    /// Normalized and padded coefficients.
    pub fn coefficients(&self) -> &PaddedCoefficients<T> {
        &self.coeffs
    }

    /// Current delay line.
    pub fn state(&self) -> &[T] {
        &self.state
    }

    /// Replace the delay line.
    pub fn set_state(&mut self, zi: &[T]) -> Result<(), ExecInvariantViolation> {
        if zi.len() != self.state.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "zi",
                expected: self.state.len(),
                got: zi.len(),
            });
        }
        self.state.copy_from_slice(zi);
        Ok(())
    }

    /// Return to initial rest.
    pub fn reset(&mut self) {
        self.state.fill(T::zero());
    }
}

impl<T: FilterElement> LFilter1D<T> for LFilterKernel<T> {
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice()?;
        let out = out.write_slice_mut()?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        T::filter_lane(
            self.coeffs.b(),
            self.coeffs.a(),
            input.iter(),
            out.iter_mut(),
            &mut self.state,
        );
        Ok(())
    }

    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let input = input.read_slice()?;
        let mut out = vec![T::zero(); input.len()];
        self.run_into(input, out.as_mut_slice())?;
        Ok(out)
    }
}

/// Constructor config for [`LFilterZiKernel`].
#[derive(Debug, Clone)]
pub struct LFilterZiConfig<T> {
    /// Numerator coefficients.
    pub b: Vec<T>,
    /// Denominator coefficients.
    pub a: Vec<T>,
}

/// Steady-state initial condition kernel, see [lfilter_zi].
#[derive(Debug, Clone)]
pub struct LFilterZiKernel<T> {
    b: Vec<T>,
    a: Vec<T>,
}

impl<T: RealField + Copy> KernelLifecycle for LFilterZiKernel<T> {
    type Config = LFilterZiConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.b.is_empty() {
            return Err(ConfigError::EmptyCoefficients { arg: "b" });
        }
        if config.a.iter().all(|v| v.is_zero()) {
            return Err(ConfigError::InvalidArgument {
                arg: "a",
                reason: "there must be at least one nonzero `a` coefficient",
            });
        }
        Ok(Self {
            b: config.b,
            a: config.a,
        })
    }
}

impl<T: RealField + Copy> LFilterZiDesign1D<T> for LFilterZiKernel<T> {
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized,
    {
        let zi = self.run_alloc()?;
        let out = out.write_slice_mut()?;
        if out.len() != zi.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: zi.len(),
                got: out.len(),
            });
        }
        out.copy_from_slice(&zi);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation> {
        let zi = lfilter_zi(ArrayView1::from(&self.b), ArrayView1::from(&self.a))?;
        Ok(zi.to_vec())
    }
}
