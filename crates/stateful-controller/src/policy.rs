//! Load-state policy.
//!
//! A pure function from load signals to the overlay state to request:
//!
//! ```text
//! loading ─────────────────────────────▶ loading
//!                                        (None over content if
//!                                         loading_over_content = false)
//! done, content, error ────────────────▶ None + report error
//! done, content ───────────────────────▶ None
//! done, no content, error ─────────────▶ error
//! done, no content ────────────────────▶ empty
//! ```

use stateful_core::{OverlayState, PolicyConfig};

/// The state to request, and whether to notify the provider of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub state: OverlayState,
    /// Content wins over the error; the provider should show it non-blocking.
    pub report_error: bool,
}

/// Decide which overlay state a load event maps to.
pub fn decide(
    has_content: bool,
    loading: bool,
    has_error: bool,
    config: &PolicyConfig,
) -> Decision {
    if loading && (!has_content || config.loading_over_content) {
        return Decision {
            state: OverlayState::loading(),
            report_error: false,
        };
    }

    if has_content {
        return Decision {
            state: OverlayState::None,
            report_error: has_error,
        };
    }

    let state = if has_error {
        OverlayState::error()
    } else {
        OverlayState::empty()
    };

    Decision {
        state,
        report_error: false,
    }
}
