use thiserror::Error;

/// Structural violations at the call boundary.
///
/// Missing or out-of-domain data never produces one of these; it degrades to
/// `None` instead. These mean the caller wired mismatched arrays together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("length mismatch: {what} has {actual} samples, time axis has {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("event index must have 7 or 8 slots, got {0}")]
    EventIndexShape(usize),
    #[error("event index was bound to series #{bound}, not series #{series}")]
    ForeignEventIndex { bound: u64, series: u64 },
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
