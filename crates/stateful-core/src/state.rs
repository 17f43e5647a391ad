//! Overlay state and placeholder key types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-chosen identifier for a placeholder view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderKey(pub String);

impl PlaceholderKey {
    /// Key conventionally used for the loading indicator.
    pub const LOADING: &str = "loading";
    /// Key conventionally used for the error message.
    pub const ERROR: &str = "error";
    /// Key conventionally used for the empty-state message.
    pub const EMPTY: &str = "empty";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn loading() -> Self {
        Self::new(Self::LOADING)
    }

    pub fn error() -> Self {
        Self::new(Self::ERROR)
    }

    pub fn empty() -> Self {
        Self::new(Self::EMPTY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PlaceholderKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlaceholderKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PlaceholderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which overlay, if any, covers the content view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "key")]
pub enum OverlayState {
    /// Content is visible, no overlay attached.
    #[default]
    None,
    /// The placeholder registered under this key covers the content.
    Named(PlaceholderKey),
}

impl OverlayState {
    /// Shorthand for `OverlayState::Named(key.into())`.
    pub fn named(key: impl Into<PlaceholderKey>) -> Self {
        OverlayState::Named(key.into())
    }

    pub fn loading() -> Self {
        OverlayState::Named(PlaceholderKey::loading())
    }

    pub fn error() -> Self {
        OverlayState::Named(PlaceholderKey::error())
    }

    pub fn empty() -> Self {
        OverlayState::Named(PlaceholderKey::empty())
    }

    /// The placeholder key, if this state shows an overlay.
    pub fn key(&self) -> Option<&PlaceholderKey> {
        match self {
            OverlayState::None => None,
            OverlayState::Named(key) => Some(key),
        }
    }

    /// Check if content is uncovered.
    pub fn is_none(&self) -> bool {
        matches!(self, OverlayState::None)
    }
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayState::None => f.write_str("none"),
            OverlayState::Named(key) => write!(f, "{}", key),
        }
    }
}
