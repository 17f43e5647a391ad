//! Core types for stateful placeholder overlays.
//!
//! This crate contains the data shared by every Stateful crate:
//! - Overlay states and placeholder keys
//! - Configuration types
//! - Error types

mod config;
mod error;
mod state;

pub use config::{config_dir, config_path, AppConfig, Easing, PolicyConfig, TransitionConfig};
pub use error::{ConfigError, OverlayError};
pub use state::{OverlayState, PlaceholderKey};
