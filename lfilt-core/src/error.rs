use alloc::string::String;
use alloc::vec::Vec;
use core::{error, fmt};

/// Errors raised whilst running lfilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Argument parsed into function were invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// The filter coefficients describe a recurrence that cannot be run, such as `a[0] == 0`.
    Configuration {
        /// The offending coefficient vector.
        arg: String,
        /// Explaining why the configuration is rejected.
        reason: String,
    },
    /// Axis or array shapes are incompatible.
    Shape(ShapeError),
    /// The numeric kind has no registered kernel.
    UnsupportedKind {
        /// Tag of the rejected kind.
        kind: String,
    },
    /// Scratch or output buffer could not be reserved.
    Allocation {
        /// Which buffer failed.
        what: &'static str,
        /// Number of elements requested.
        len: usize,
    },
}

/// Shape incompatibilities detected before any output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// `axis` does not lie in `[-ndim, ndim - 1]`.
    AxisOutOfRange {
        /// Axis as requested by the caller.
        axis: isize,
        /// Rank of the filtered array.
        ndim: usize,
    },
    /// Initial state does not have the rank of the input.
    StateRank {
        /// Rank of the input.
        expected: usize,
        /// Rank of the initial state.
        found: usize,
    },
    /// Initial state is neither equal nor broadcastable to the expected state shape.
    StateShape {
        /// Full shape the state must have (or broadcast to).
        expected: Vec<usize>,
        /// Shape that was supplied.
        found: Vec<usize>,
    },
}

impl From<ShapeError> for Error {
    fn from(value: ShapeError) -> Self {
        Error::Shape(value)
    }
}

/// Writes `(5,2)` for multi-dimensional shapes and `(2,)` for one-dimensional shapes.
fn write_shape(f: &mut fmt::Formatter<'_>, shape: &[usize]) -> fmt::Result {
    f.write_str("(")?;
    for (i, extent) in shape.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{extent}")?;
    }
    if shape.len() == 1 {
        f.write_str(",")?;
    }
    f.write_str(")")
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::AxisOutOfRange { axis, ndim } => {
                write!(f, "selected axis {axis} is out of range for {ndim}-dimensional input")
            }
            ShapeError::StateRank { expected, found } => write!(
                f,
                "zi must have the same number of dimensions as x: \
                 expected {expected}, found {found}"
            ),
            ShapeError::StateShape { expected, found } => {
                f.write_str("Unexpected shape for zi: expected ")?;
                write_shape(f, expected)?;
                f.write_str(", found ")?;
                write_shape(f, found)?;
                f.write_str(".")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::Configuration { arg, reason } => {
                write!(f, "Invalid filter configuration `{arg}`: {reason}")
            }
            Error::Shape(err) => write!(f, "{err}"),
            Error::UnsupportedKind { kind } => write!(f, "input type '{kind}' not supported"),
            Error::Allocation { what, len } => {
                write!(f, "Could not allocate {len} elements for {what}")
            }
        }
    }
}

impl error::Error for ShapeError {}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Shape(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn state_shape_message_lists_every_axis() {
        let err = Error::from(ShapeError::StateShape {
            expected: vec![5, 2],
            found: vec![5, 4],
        });
        assert_eq!(
            err.to_string(),
            "Unexpected shape for zi: expected (5,2), found (5,4)."
        );
    }

    #[test]
    fn state_shape_message_one_dim_has_trailing_comma() {
        let err = ShapeError::StateShape {
            expected: vec![2],
            found: vec![3],
        };
        assert_eq!(
            err.to_string(),
            "Unexpected shape for zi: expected (2,), found (3,)."
        );
    }

    #[test]
    fn shape_error_is_exposed_as_source() {
        use core::error::Error as _;
        let err = Error::Shape(ShapeError::AxisOutOfRange { axis: 3, ndim: 2 });
        assert!(err.source().is_some());
        assert!(err.to_string().contains("out of range"));
    }
}
