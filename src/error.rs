use smol_str::SmolStr;
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index {index} is out of bounds (length {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("Expected an array of {expected} elements, found {actual}")]
    ArraySizeMismatch { expected: usize, actual: usize },

    #[error("Effect has been closed")]
    Disposed,

    #[error("Effect graph contains a cycle through '{0}'")]
    Cycle(SmolStr),

    #[error("No property named '{0}'")]
    NotFound(SmolStr),

    #[error("Effect source #{0} is not set")]
    MissingSource(u32),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl EffectError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        EffectError::InvalidArgument(message.into())
    }

    /// True for both index and array-length bounds failures.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            EffectError::OutOfBounds { .. } | EffectError::ArraySizeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EffectError>;
