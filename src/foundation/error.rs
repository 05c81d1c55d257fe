/// Result alias used across the crate.
pub type LaserframeResult<T> = Result<T, LaserframeError>;

/// Error taxonomy for the frame-to-vector pipeline.
///
/// Degenerate geometry (a zero-area crop) is not an error; stages report it as `None`.
#[derive(thiserror::Error, Debug)]
pub enum LaserframeError {
    /// Rejected input: bad parameters, empty range, missing paths.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required external program is missing.
    #[error("unavailable dependency: {0}")]
    Unavailable(String),

    /// A single frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The external vectorizer failed, timed out, or produced unusable output.
    #[error("vectorize error: {0}")]
    Vectorize(String),

    /// Parameter file (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// I/O and other errors carrying an `anyhow` context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaserframeError {
    /// Build a [`LaserframeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LaserframeError::Unavailable`].
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Build a [`LaserframeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LaserframeError::Vectorize`].
    pub fn vectorize(msg: impl Into<String>) -> Self {
        Self::Vectorize(msg.into())
    }

    /// Build a [`LaserframeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors that only affect one frame of a batch.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
