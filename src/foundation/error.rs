/// Convenience result type used across shapefx.
pub type ShapeFxResult<T> = Result<T, ShapeFxError>;

/// Top-level error taxonomy used by compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShapeFxError {
    /// Invalid user-provided or layer configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while validating or sampling animated parameters.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors reported by a render device (unknown node, wrong port, failed allocation).
    #[error("device error: {0}")]
    Device(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShapeFxError {
    /// Build a [`ShapeFxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShapeFxError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ShapeFxError::Device`] value.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

impl From<serde_json::Error> for ShapeFxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
