//! Error types for Stateful.

use thiserror::Error;

use crate::state::PlaceholderKey;

/// Overlay errors - surfaced synchronously to the caller of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Transition targeted a key with no registered placeholder view.
    #[error("No placeholder view registered for '{0}'")]
    MissingPlaceholderView(PlaceholderKey),

    /// The thread owning the state machine is gone.
    #[error("Overlay runtime unavailable")]
    RuntimeUnavailable,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}
