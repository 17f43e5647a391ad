//! Overlay state machine for Stateful.
//!
//! This crate provides:
//! - `PlaceholderRegistry` mapping state keys to overlay views
//! - `OverlayStateMachine` transitions with optional cross-fade
//! - The `ViewHierarchy` seam and a headless implementation
//! - `OverlayActor` for confining a machine to one owner thread

pub mod actor;
pub mod animation;
pub mod headless;
pub mod hierarchy;
pub mod machine;
pub mod registry;

// Re-export commonly used types
pub use actor::{OverlayActor, OverlayHandle};
pub use animation::{CrossFade, FadeFrame};
pub use headless::{HeadlessHierarchy, HierarchySnapshot, LayerSnapshot, ViewId};
pub use hierarchy::ViewHierarchy;
pub use machine::{OverlayStateMachine, TransitionOutcome};
pub use registry::PlaceholderRegistry;

// Re-export stateful_core types for convenience
pub use stateful_core::{OverlayError, OverlayState, PlaceholderKey, TransitionConfig};
