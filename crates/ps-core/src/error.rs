use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
    /// A kernel name that does not resolve to a downscale/upscale pair.
    UnknownKernel(String),
    /// Caller-supplied parameters outside their documented domain.
    Validation { op: &'static str, reason: String },
    /// Input buffers whose shape or layout the operation cannot handle.
    Precondition { op: &'static str, reason: String },
}

impl Error {
    pub fn validation(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            op,
            reason: reason.into(),
        }
    }

    pub fn precondition(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            op,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::UnknownKernel(name) => write!(f, "invalid kernel specified: {name:?}"),
            Self::Validation { op, reason } => write!(f, "{op}: {reason}"),
            Self::Precondition { op, reason } => write!(f, "{op}: precondition failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
