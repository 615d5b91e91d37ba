/// Convenience result type used across flowtrail.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors raised at the I/O and surface boundary.
///
/// Conditions inside a tick (clamped knobs, empty palettes, stale field indices) are
/// recovered locally and never reach this type.
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// Invalid user-provided configuration or surface dimensions.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing or reading back a drawing surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Build a [`FlowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FlowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
