use thiserror::Error;
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("filter order must be at least 1, got {order}")]
    InvalidOrder { order: usize },
    #[error("{which} coefficients: expected {expected} values, got {actual}")]
    CoefficientLength {
        which: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("buffer dimensions must be non-zero: capacity {capacity}, channels {channels}")]
    InvalidDimensions { capacity: usize, channels: usize },
    #[error("power window of group `{group}` must be at least one sample")]
    InvalidPowerWindow { group: String },
    #[error("batch length mismatch: expected {expected} samples, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("unknown filter preset `{0}`")]
    UnknownPreset(String),
    #[error("unknown signal group `{0}`")]
    UnknownGroup(String),
    #[error("signal group `{0}` is configured more than once")]
    DuplicateGroup(String),
    #[error("failed to parse stream config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
impl StreamError {
    /// Per-batch errors leave the filter and buffer untouched; the caller may
    /// drop the batch and keep streaming. Everything else is a configuration
    /// failure and the instance must not be used.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StreamError::LengthMismatch { .. }
                | StreamError::ChannelMismatch { .. }
                | StreamError::UnknownGroup(_)
        )
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn batch_errors_are_recoverable() {
        assert!(StreamError::LengthMismatch {
            expected: 4,
            actual: 3
        }
        .is_recoverable());
        assert!(!StreamError::InvalidOrder { order: 0 }.is_recoverable());
        assert!(!StreamError::InvalidPowerWindow { group: "emg".into() }.is_recoverable());
        assert!(!StreamError::InvalidDimensions {
            capacity: 0,
            channels: 2
        }
        .is_recoverable());
    }
}
