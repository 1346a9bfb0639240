use std::fmt;

/// Wire-level error categories delivered to the UI and script error
/// receivers. The string labels are part of the external interface and must
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvariantViolation,
    Runtime,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvariantViolation => "InvariantViolation",
            ErrorKind::Runtime => "Runtime Error",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the DSP runtime while applying an instruction batch.
///
/// Every variant leaves the prior graph unchanged: the runtime contract is
/// all-or-nothing application.
#[derive(Debug, Clone, PartialEq)]
pub enum DspError {
    /// The batch violated a graph invariant.
    InvariantViolation(String),
    /// A non-fatal internal fault surfaced while applying the batch.
    Runtime(String),
    /// Anything uncategorized at the instruction boundary.
    Other(String),
}

impl DspError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DspError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            DspError::Runtime(_) => ErrorKind::Runtime,
            DspError::Other(_) => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DspError::InvariantViolation(m) | DspError::Runtime(m) | DspError::Other(m) => m,
        }
    }
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for DspError {}
