use core::fmt;
use lfilt_core::Error;

/// Validation errors raised when a kernel is constructed from its config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A coefficient vector was empty.
    EmptyCoefficients {
        /// `"b"` or `"a"`.
        arg: &'static str,
    },
    /// The leading denominator coefficient `a[0]` is the `+0.0` bit pattern.
    ZeroLeadingDenominator,
    /// The initial state does not hold `nfilt - 1` values.
    StateLength {
        /// `max(len(a), len(b)) - 1`.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// A coefficient or state buffer could not be reserved.
    Allocation {
        /// Which buffer failed.
        what: &'static str,
        /// Number of elements requested.
        len: usize,
    },
    /// Any other rejected configuration value.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCoefficients { arg } => {
                write!(f, "Coefficient vector `{arg}` was empty.")
            }
            ConfigError::ZeroLeadingDenominator => {
                write!(f, "Filter coefficient a[0] == 0 is not supported.")
            }
            ConfigError::StateLength { expected, got } => write!(
                f,
                "Initial state must hold max(len(a), len(b)) - 1 = {expected} values, got {got}."
            ),
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::Allocation { what, len } => {
                write!(f, "Could not allocate {len} elements for {what}.")
            }
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        use alloc::string::ToString;
        match value {
            ConfigError::EmptyCoefficients { arg } => Error::Configuration {
                arg: arg.into(),
                reason: value.to_string(),
            },
            ConfigError::ZeroLeadingDenominator => Error::Configuration {
                arg: "a".into(),
                reason: value.to_string(),
            },
            ConfigError::Allocation { what, len } => Error::Allocation { what, len },
            ConfigError::StateLength { .. } => Error::InvalidArg {
                arg: "zi".into(),
                reason: value.to_string(),
            },
            ConfigError::NonContiguous { arg } | ConfigError::InvalidArgument { arg, .. } => {
                Error::InvalidArg {
                    arg: arg.into(),
                    reason: value.to_string(),
                }
            }
        }
    }
}

/// Runtime failures of an already validated kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
    /// The underlying ndarray routine rejected its arguments.
    Filter(Error),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<Error> for ExecInvariantViolation {
    fn from(value: Error) -> Self {
        Self::Filter(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
            ExecInvariantViolation::Filter(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for ExecInvariantViolation {}
