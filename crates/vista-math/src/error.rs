use std::fmt;

/// Error raised by the value types in this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    /// A shape, sampling or dimensionality argument was rejected.
    InvalidArgument(String),
    /// A point or index fell outside the array.
    OutOfRange(String),
}

impl MathError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::InvalidArgument(m) => write!(f, "invalid argument: {m}"),
            MathError::OutOfRange(m) => write!(f, "out of range: {m}"),
        }
    }
}

impl std::error::Error for MathError {}
