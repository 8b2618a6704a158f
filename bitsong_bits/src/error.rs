// Error type shared by every read in the workspace.
//
// There are only two failure kinds. `Exhausted` is a runtime condition: the
// buffer does not hold enough bits right now, and the caller may feed more and
// retry. `InvalidArgument` is misuse (a zero-width signed read, a tonic out of
// range, a bad config value) and should be fixed at the call site.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// No more bits are currently available to satisfy the read.
    #[error("bitstream exhausted")]
    Exhausted,

    /// The read or lookup was asked for something it cannot do.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl BitError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BitError::InvalidArgument(msg.into())
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, BitError::Exhausted)
    }
}
