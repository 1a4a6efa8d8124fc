/// Result alias used across the crate.
pub type MetroResult<T> = Result<T, MetroError>;

/// Everything that can go wrong between loading a line and writing its video.
#[derive(thiserror::Error, Debug)]
pub enum MetroError {
    /// The line settings are unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// A frame sink rejected a frame or the encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Settings could not be parsed or serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MetroError {
    /// Build a [`MetroError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MetroError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MetroError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MetroError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors caused by the line configuration rather than by rendering or IO.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
