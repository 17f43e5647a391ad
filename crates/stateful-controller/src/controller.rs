//! Stateful Controller
//!
//! Wires the load-state policy to an overlay state machine for one content view.

use std::time::Duration;

use stateful_core::{AppConfig, OverlayError, OverlayState, PlaceholderKey, PolicyConfig};
use stateful_overlay::{OverlayStateMachine, TransitionOutcome, ViewHierarchy};

use crate::policy::decide;
use crate::provider::{ContentProvider, LoadError};

/// Shows loading, error and empty placeholders over a content view.
///
/// The owner reports load start and end; the controller asks the provider
/// whether content exists and requests the matching overlay state.
pub struct StatefulController<H: ViewHierarchy, P: ContentProvider> {
    machine: OverlayStateMachine<H>,
    provider: P,
    policy: PolicyConfig,
    /// State most recently requested by the policy, re-applied on appear.
    last_requested: OverlayState,
}

impl<H: ViewHierarchy, P: ContentProvider> StatefulController<H, P> {
    /// Create a controller over `base` with default configuration.
    pub fn new(host: H, base: H::View, provider: P) -> Self {
        Self::with_config(host, base, provider, &AppConfig::default())
    }

    pub fn with_config(host: H, base: H::View, provider: P, config: &AppConfig) -> Self {
        Self {
            machine: OverlayStateMachine::with_config(host, base, config.transition.clone()),
            provider,
            policy: config.policy.clone(),
            last_requested: OverlayState::None,
        }
    }

    // =========================================================================
    // Placeholder Views
    // =========================================================================

    pub fn set_loading_view(&mut self, view: H::View) -> Option<H::View> {
        self.machine.set_placeholder_view(PlaceholderKey::loading(), view)
    }

    pub fn set_error_view(&mut self, view: H::View) -> Option<H::View> {
        self.machine.set_placeholder_view(PlaceholderKey::error(), view)
    }

    pub fn set_empty_view(&mut self, view: H::View) -> Option<H::View> {
        self.machine.set_placeholder_view(PlaceholderKey::empty(), view)
    }

    /// Register a view for a custom key.
    pub fn set_placeholder_view(
        &mut self,
        key: impl Into<PlaceholderKey>,
        view: H::View,
    ) -> Option<H::View> {
        self.machine.set_placeholder_view(key, view)
    }

    pub fn loading_view(&self) -> Option<&H::View> {
        self.machine.placeholder_view(&PlaceholderKey::loading())
    }

    pub fn error_view(&self) -> Option<&H::View> {
        self.machine.placeholder_view(&PlaceholderKey::error())
    }

    pub fn empty_view(&self) -> Option<&H::View> {
        self.machine.placeholder_view(&PlaceholderKey::empty())
    }

    // =========================================================================
    // Load Events
    // =========================================================================

    /// A load began.
    pub fn start_loading(&mut self, animated: bool) -> Result<TransitionOutcome, OverlayError> {
        self.transition_view_states(true, None, animated)
    }

    /// A load finished, successfully or with `error`.
    pub fn end_loading(
        &mut self,
        animated: bool,
        error: Option<LoadError>,
    ) -> Result<TransitionOutcome, OverlayError> {
        self.transition_view_states(false, error.as_ref(), animated)
    }

    /// Request the overlay state for the given load signals.
    ///
    /// If content exists and `error` is set, the provider is notified and the
    /// content stays uncovered.
    pub fn transition_view_states(
        &mut self,
        loading: bool,
        error: Option<&LoadError>,
        animated: bool,
    ) -> Result<TransitionOutcome, OverlayError> {
        let has_content = self.provider.has_content();
        let decision = decide(has_content, loading, error.is_some(), &self.policy);

        if decision.report_error {
            if let Some(error) = error {
                self.provider.on_error_with_content_available(error);
            }
        }

        tracing::debug!(
            "Load event (loading: {}, content: {}, error: {}) -> '{}'",
            loading,
            has_content,
            error.is_some(),
            decision.state
        );

        let outcome = self.machine.transition(decision.state.clone(), animated)?;
        self.last_requested = decision.state;
        Ok(outcome)
    }

    /// The host view became visible.
    ///
    /// Re-applies the last requested state without animation to repair any
    /// hierarchy drift while off screen.
    pub fn did_appear(&mut self) -> Result<TransitionOutcome, OverlayError> {
        self.machine.transition(self.last_requested.clone(), false)
    }

    /// Advance an in-flight fade. Returns `true` while it is still running.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.machine.tick(elapsed)
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    pub fn current_state(&self) -> &OverlayState {
        self.machine.current_state()
    }

    pub fn last_requested_state(&self) -> &OverlayState {
        &self.last_requested
    }

    pub fn is_transitioning(&self) -> bool {
        self.machine.is_transitioning()
    }

    pub fn machine(&self) -> &OverlayStateMachine<H> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut OverlayStateMachine<H> {
        &mut self.machine
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
