//! Mode and action errors.

/// Errors from the mode provider.
#[derive(Debug, thiserror::Error)]
pub enum ModeError {
    /// `use_mode` was called outside any provider scope.
    #[error("use_mode must be called within a ModeProvider scope")]
    NoProvider,

    /// A mode string was neither `live` nor `sandbox`.
    #[error("invalid mode: {0:?}")]
    InvalidMode(String),
}

/// Failure reported by a live or sandbox action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action failed: {message}")]
pub struct ActionError {
    /// Human-readable cause.
    pub message: String,
}

impl ActionError {
    /// Build from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
