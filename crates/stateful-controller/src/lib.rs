//! Loading, error and empty placeholders for a content view.
//!
//! This crate provides:
//! - `decide`, the pure policy mapping load signals to an overlay state
//! - `ContentProvider` hooks supplied by the screen that owns the content
//! - `StatefulController`, which wires the policy to an overlay state machine

pub mod controller;
pub mod policy;
pub mod provider;

// Re-export commonly used types
pub use controller::StatefulController;
pub use policy::{decide, Decision};
pub use provider::{ContentHooks, ContentProvider, LoadError};

// Re-export lower-level types for convenience
pub use stateful_core::{AppConfig, OverlayError, OverlayState, PlaceholderKey, PolicyConfig};
pub use stateful_overlay::{OverlayStateMachine, TransitionOutcome, ViewHierarchy};
