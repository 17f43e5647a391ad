//! Overlay state machine.
//!
//! Owns the placeholder registry and the current overlay state, and applies
//! transitions to a [`ViewHierarchy`].
//!
//! ## Invariant
//!
//! Between transitions, exactly the view registered for the current state (if
//! any) is attached above the base view at full opacity. Every other registered
//! view is detached.
//!
//! ## Transition Flow
//!
//! ```text
//! transition(to, animated)
//!        │
//!        ▼
//! Resolve `to` to a view ── missing ──▶ Err, nothing touched
//!        │
//!        ▼
//! Settle any in-flight fade onto its target
//!        │
//!   ┌────┴──────────────┬──────────────────┐
//!   ▼                   ▼                  ▼
//! to == current     unanimated          animated
//! re-assert         swap now            attach at 0.0,
//! (Unchanged)       (Completed)         fade on tick()
//!                                       (Scheduled)
//! ```

use std::time::Duration;

use stateful_core::{OverlayError, OverlayState, PlaceholderKey, TransitionConfig};
use tokio::sync::watch;

use crate::animation::CrossFade;
use crate::hierarchy::ViewHierarchy;
use crate::registry::PlaceholderRegistry;

/// What a call to [`OverlayStateMachine::transition`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Target equals the current state; the invariant was re-asserted.
    Unchanged,
    /// The switch happened synchronously.
    Completed,
    /// A fade was started; the state changes when `tick` finishes it.
    Scheduled,
}

/// Coordinates which placeholder view covers a base content view.
///
/// Single-owner: every method takes `&mut self` and mutates the hierarchy
/// directly. Use [`crate::OverlayActor`] to drive a machine from other threads.
pub struct OverlayStateMachine<H: ViewHierarchy> {
    host: H,
    base: H::View,
    registry: PlaceholderRegistry<H::View>,
    current: OverlayState,
    fade: Option<CrossFade<H::View>>,
    config: TransitionConfig,
    tx: watch::Sender<OverlayState>,
}

impl<H: ViewHierarchy> OverlayStateMachine<H> {
    /// Create a machine over `base` with the default transition config.
    pub fn new(host: H, base: H::View) -> Self {
        Self::with_config(host, base, TransitionConfig::default())
    }

    pub fn with_config(host: H, base: H::View, config: TransitionConfig) -> Self {
        let (tx, _rx) = watch::channel(OverlayState::None);
        Self {
            host,
            base,
            registry: PlaceholderRegistry::new(),
            current: OverlayState::None,
            fade: None,
            config,
            tx,
        }
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// The settled overlay state.
    ///
    /// While a fade is running this is still the state being faded away from.
    pub fn current_state(&self) -> &OverlayState {
        &self.current
    }

    /// Target of the in-flight fade, or the current state when idle.
    pub fn pending_state(&self) -> &OverlayState {
        self.fade
            .as_ref()
            .map(CrossFade::target)
            .unwrap_or(&self.current)
    }

    pub fn is_transitioning(&self) -> bool {
        self.fade.is_some()
    }

    pub fn registry(&self) -> &PlaceholderRegistry<H::View> {
        &self.registry
    }

    pub fn placeholder_view(&self, key: &PlaceholderKey) -> Option<&H::View> {
        self.registry.get(key)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn base_view(&self) -> &H::View {
        &self.base
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Subscribe to changes of the settled state.
    ///
    /// The receiver sees the current state immediately and every later change.
    pub fn subscribe(&self) -> watch::Receiver<OverlayState> {
        self.tx.subscribe()
    }

    // =========================================================================
    // Mutation Methods
    // =========================================================================

    /// Register `view` as the placeholder for `key`.
    ///
    /// If `key` is the active state, the old view is detached and the new one
    /// shown in its place immediately. A fade involving `key` is settled first.
    /// Returns the previously registered view.
    pub fn set_placeholder_view(
        &mut self,
        key: impl Into<PlaceholderKey>,
        view: H::View,
    ) -> Option<H::View> {
        let key = key.into();

        if self.fade.is_some()
            && (self.pending_state().key() == Some(&key) || self.current.key() == Some(&key))
        {
            self.finish();
        }

        let previous = self.registry.set(key.clone(), view.clone());

        if self.current.key() == Some(&key) {
            if let Some(old) = previous.as_ref().filter(|old| **old != view) {
                self.host.detach(old);
            }
            self.host.attach_above(&self.base, &view);
            self.host.set_opacity(&view, 1.0);
            tracing::debug!("Swapped active placeholder view for '{}'", key);
        }

        previous
    }

    /// Move to `to`, optionally cross-fading.
    ///
    /// Fails with [`OverlayError::MissingPlaceholderView`] without touching
    /// anything if `to` names a key with no registered view. Otherwise any
    /// in-flight fade is settled onto its target and the new transition starts
    /// from there.
    pub fn transition(
        &mut self,
        to: OverlayState,
        animated: bool,
    ) -> Result<TransitionOutcome, OverlayError> {
        let incoming = self.resolve(&to)?;

        self.finish();

        if to == self.current {
            self.enforce(incoming.as_ref());
            tracing::debug!("Re-asserted overlay state '{}'", to);
            return Ok(TransitionOutcome::Unchanged);
        }

        let outgoing = self.current_view();
        let duration = self.config.duration();

        if !animated || duration.is_zero() || incoming == outgoing {
            self.enforce(incoming.as_ref());
            tracing::debug!("Transitioned '{}' -> '{}'", self.current, to);
            self.set_current(to);
            return Ok(TransitionOutcome::Completed);
        }

        let keep: Vec<&H::View> = incoming.iter().chain(outgoing.iter()).collect();
        self.detach_stale(&keep);

        if let Some(view) = &incoming {
            self.host.attach_above(&self.base, view);
            self.host.set_opacity(view, 0.0);
        }

        tracing::debug!(
            "Fading '{}' -> '{}' over {:?}",
            self.current,
            to,
            duration
        );
        self.fade = Some(CrossFade::new(
            to,
            incoming,
            outgoing,
            duration,
            self.config.easing,
        ));

        Ok(TransitionOutcome::Scheduled)
    }

    /// Advance the in-flight fade by `elapsed`.
    ///
    /// Returns `true` while a fade is still running after this frame.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let frame = match self.fade.as_mut() {
            Some(fade) => fade.advance(elapsed),
            None => return false,
        };

        if frame.finished {
            self.finish();
            return false;
        }

        if let Some(fade) = &self.fade {
            if let Some(view) = fade.incoming() {
                self.host.set_opacity(view, frame.incoming);
            }
            if let Some(view) = fade.outgoing() {
                self.host.set_opacity(view, frame.outgoing);
            }
        }

        true
    }

    /// Settle any in-flight fade onto its target immediately.
    pub fn finish(&mut self) {
        let Some(fade) = self.fade.take() else {
            return;
        };

        if !fade.is_finished() {
            tracing::debug!("Cancelled in-flight fade to '{}'", fade.target());
        }

        let incoming = fade.incoming().cloned();
        if let Some(view) = fade.outgoing().filter(|v| Some(*v) != incoming.as_ref()) {
            self.host.detach(view);
        }
        self.enforce(incoming.as_ref());

        let target = fade.target().clone();
        self.set_current(target);
    }

    /// Re-apply the pending state without animation.
    ///
    /// Repairs hierarchy drift, e.g. after the host view was off screen.
    pub fn reassert(&mut self) -> Result<TransitionOutcome, OverlayError> {
        let to = self.pending_state().clone();
        self.transition(to, false)
    }

    /// Detach every placeholder view and return to [`OverlayState::None`].
    ///
    /// Called when the base view leaves the hierarchy and on drop.
    pub fn teardown(&mut self) {
        if let Some(fade) = self.fade.take() {
            for view in fade.incoming().into_iter().chain(fade.outgoing()) {
                self.host.detach(view);
            }
        }
        self.detach_stale(&[]);
        self.set_current(OverlayState::None);
        tracing::debug!("Overlay state machine torn down");
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn resolve(&self, state: &OverlayState) -> Result<Option<H::View>, OverlayError> {
        match state {
            OverlayState::None => Ok(None),
            OverlayState::Named(key) => match self.registry.get(key) {
                Some(view) => Ok(Some(view.clone())),
                None => {
                    tracing::warn!("Rejected transition to '{}': no placeholder view", key);
                    Err(OverlayError::MissingPlaceholderView(key.clone()))
                }
            },
        }
    }

    fn current_view(&self) -> Option<H::View> {
        self.current
            .key()
            .and_then(|key| self.registry.get(key))
            .cloned()
    }

    /// Show only `target`, fully opaque, and detach every other placeholder.
    fn enforce(&mut self, target: Option<&H::View>) {
        let keep: Vec<&H::View> = target.into_iter().collect();
        self.detach_stale(&keep);

        if let Some(view) = target {
            self.host.attach_above(&self.base, view);
            self.host.set_opacity(view, 1.0);
        }
    }

    /// Detach attached placeholders not listed in `keep`.
    fn detach_stale(&mut self, keep: &[&H::View]) {
        let stale: Vec<H::View> = self
            .registry
            .views()
            .filter(|v| !keep.contains(v) && self.host.is_attached(v))
            .cloned()
            .collect();

        for view in &stale {
            self.host.detach(view);
        }
    }

    fn set_current(&mut self, state: OverlayState) {
        if self.current != state {
            self.current = state.clone();
            self.tx.send_replace(state);
        }
    }
}

impl<H: ViewHierarchy> Drop for OverlayStateMachine<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessHierarchy, ViewId};

    struct Fixture {
        host: HeadlessHierarchy,
        machine: OverlayStateMachine<HeadlessHierarchy>,
        loading: ViewId,
        error: ViewId,
        empty: ViewId,
    }

    fn bare() -> (HeadlessHierarchy, OverlayStateMachine<HeadlessHierarchy>) {
        let host = HeadlessHierarchy::new();
        let base = host.create_view("content");
        let config = TransitionConfig {
            duration_ms: 300,
            ..TransitionConfig::default()
        };
        let machine = OverlayStateMachine::with_config(host.clone(), base, config);
        (host, machine)
    }

    fn fixture() -> Fixture {
        let (host, mut machine) = bare();
        let loading = host.create_view("loading");
        let error = host.create_view("error");
        let empty = host.create_view("empty");
        machine.set_placeholder_view("loading", loading);
        machine.set_placeholder_view("error", error);
        machine.set_placeholder_view("empty", empty);
        Fixture {
            host,
            machine,
            loading,
            error,
            empty,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fresh_machine_none_is_noop() {
        let (host, mut machine) = bare();

        let outcome = machine.transition(OverlayState::None, false).unwrap();

        assert_eq!(outcome, TransitionOutcome::Unchanged);
        assert_eq!(machine.current_state(), &OverlayState::None);
        assert!(host.attached().is_empty());
        assert_eq!(host.mutation_count(), 0);
    }

    #[test]
    fn test_show_loading_then_content() {
        let mut f = fixture();

        let outcome = f.machine.transition(OverlayState::loading(), false).unwrap();
        assert_eq!(outcome, TransitionOutcome::Completed);
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.host.visible(), vec![f.loading]);
        assert_eq!(f.host.opacity(&f.loading), Some(1.0));

        f.machine.transition(OverlayState::None, false).unwrap();
        assert_eq!(f.machine.current_state(), &OverlayState::None);
        assert!(f.host.attached().is_empty());
    }

    #[test]
    fn test_unanimated_switch_leaves_single_overlay() {
        let mut f = fixture();

        f.machine.transition(OverlayState::loading(), false).unwrap();
        f.machine.transition(OverlayState::error(), false).unwrap();
        assert_eq!(f.host.attached(), vec![f.error]);

        f.machine.transition(OverlayState::empty(), false).unwrap();
        assert_eq!(f.host.attached(), vec![f.empty]);
    }

    #[test]
    fn test_missing_view_leaves_state_unchanged() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();
        let mutations = f.host.mutation_count();

        let result = f.machine.transition(OverlayState::named("offline"), true);

        assert_eq!(
            result,
            Err(OverlayError::MissingPlaceholderView("offline".into()))
        );
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.host.mutation_count(), mutations);
    }

    #[test]
    fn test_missing_view_does_not_cancel_fade() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), true).unwrap();
        f.machine.tick(ms(100));

        assert!(f.machine.transition(OverlayState::named("x"), true).is_err());
        assert!(f.machine.is_transitioning());
        assert_eq!(f.machine.pending_state(), &OverlayState::loading());
    }

    #[test]
    fn test_repeated_transition_is_idempotent() {
        let mut f = fixture();

        f.machine.transition(OverlayState::error(), false).unwrap();
        let attached = f.host.attached();
        let mutations = f.host.mutation_count();

        let outcome = f.machine.transition(OverlayState::error(), true).unwrap();

        assert_eq!(outcome, TransitionOutcome::Unchanged);
        assert!(!f.machine.is_transitioning());
        assert_eq!(f.host.attached(), attached);
        assert_eq!(f.host.mutation_count(), mutations);
    }

    #[test]
    fn test_animated_fade_in() {
        let mut f = fixture();

        let outcome = f.machine.transition(OverlayState::loading(), true).unwrap();
        assert_eq!(outcome, TransitionOutcome::Scheduled);
        assert_eq!(f.machine.current_state(), &OverlayState::None);
        assert_eq!(f.machine.pending_state(), &OverlayState::loading());
        assert_eq!(f.host.opacity(&f.loading), Some(0.0));

        assert!(f.machine.tick(ms(150)));
        let opacity = f.host.opacity(&f.loading).unwrap();
        assert!((opacity - 0.5).abs() < 1e-3);

        assert!(!f.machine.tick(ms(200)));
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.host.opacity(&f.loading), Some(1.0));
        assert!(!f.machine.is_transitioning());
    }

    #[test]
    fn test_cross_fade_between_overlays() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();

        f.machine.transition(OverlayState::error(), true).unwrap();
        assert_eq!(f.host.attached(), vec![f.loading, f.error]);

        f.machine.tick(ms(150));
        let loading = f.host.opacity(&f.loading).unwrap();
        let error = f.host.opacity(&f.error).unwrap();
        assert!((loading - 0.5).abs() < 1e-3);
        assert!((error - 0.5).abs() < 1e-3);

        f.machine.tick(ms(150));
        assert_eq!(f.host.attached(), vec![f.error]);
        assert_eq!(f.machine.current_state(), &OverlayState::error());
    }

    #[test]
    fn test_fade_out_to_content() {
        let mut f = fixture();
        f.machine.transition(OverlayState::empty(), false).unwrap();

        f.machine.transition(OverlayState::None, true).unwrap();
        f.machine.tick(ms(150));
        assert!(f.host.is_attached(&f.empty));

        f.machine.tick(ms(150));
        assert!(f.host.attached().is_empty());
        assert_eq!(f.machine.current_state(), &OverlayState::None);
    }

    #[test]
    fn test_new_request_cancels_fade() {
        let mut f = fixture();

        f.machine.transition(OverlayState::loading(), true).unwrap();
        f.machine.tick(ms(50));
        f.machine.transition(OverlayState::error(), true).unwrap();

        // The cancelled fade settled onto its target.
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.machine.pending_state(), &OverlayState::error());

        while f.machine.tick(ms(16)) {}

        assert_eq!(f.machine.current_state(), &OverlayState::error());
        assert_eq!(f.host.attached(), vec![f.error]);
        assert_eq!(f.host.opacity(&f.error), Some(1.0));
    }

    #[test]
    fn test_cancel_back_to_origin() {
        let mut f = fixture();

        f.machine.transition(OverlayState::loading(), true).unwrap();
        f.machine.tick(ms(10));
        f.machine.transition(OverlayState::None, true).unwrap();
        while f.machine.tick(ms(16)) {}

        assert_eq!(f.machine.current_state(), &OverlayState::None);
        assert!(f.host.attached().is_empty());
    }

    #[test]
    fn test_rapid_requests_end_on_latest() {
        let mut f = fixture();

        f.machine.transition(OverlayState::loading(), true).unwrap();
        f.machine.transition(OverlayState::empty(), true).unwrap();
        f.machine.transition(OverlayState::error(), true).unwrap();
        f.machine.transition(OverlayState::loading(), false).unwrap();

        assert!(!f.machine.is_transitioning());
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.host.attached(), vec![f.loading]);
    }

    #[test]
    fn test_replace_active_view_swaps_immediately() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();

        let replacement = f.host.create_view("loading v2");
        let previous = f
            .machine
            .set_placeholder_view("loading", replacement);

        assert_eq!(previous, Some(f.loading));
        assert_eq!(f.host.visible_labels(), vec!["loading v2".to_string()]);
        assert!(!f.host.is_attached(&f.loading));
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
    }

    #[test]
    fn test_replace_inactive_view_has_no_effect() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();
        let mutations = f.host.mutation_count();

        let replacement = f.host.create_view("error v2");
        f.machine.set_placeholder_view("error", replacement);

        assert_eq!(f.host.mutation_count(), mutations);
        assert_eq!(f.host.attached(), vec![f.loading]);
        assert_eq!(
            f.machine.placeholder_view(&PlaceholderKey::error()),
            Some(&replacement)
        );
    }

    #[test]
    fn test_replace_fade_target_settles_then_swaps() {
        let mut f = fixture();
        f.machine.transition(OverlayState::error(), true).unwrap();
        f.machine.tick(ms(60));

        let replacement = f.host.create_view("error v2");
        f.machine.set_placeholder_view("error", replacement);

        assert!(!f.machine.is_transitioning());
        assert_eq!(f.machine.current_state(), &OverlayState::error());
        assert_eq!(f.host.attached(), vec![replacement]);
        assert_eq!(f.host.opacity(&replacement), Some(1.0));
    }

    #[test]
    fn test_replace_outgoing_view_during_fade() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();
        f.machine.transition(OverlayState::error(), true).unwrap();
        f.machine.tick(ms(60));

        let replacement = f.host.create_view("loading v2");
        let previous = f.machine.set_placeholder_view("loading", replacement);

        assert_eq!(previous, Some(f.loading));
        assert!(!f.machine.is_transitioning());
        assert_eq!(f.machine.current_state(), &OverlayState::error());
        assert_eq!(f.host.attached(), vec![f.error]);
        assert!(!f.host.is_attached(&replacement));
        assert!(!f.host.is_attached(&f.loading));
        assert_eq!(
            f.machine.placeholder_view(&PlaceholderKey::loading()),
            Some(&replacement)
        );
    }

    #[test]
    fn test_huge_tick_finishes_fade() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), true).unwrap();
        f.machine.tick(ms(1));

        assert!(!f.machine.tick(Duration::MAX));
        assert_eq!(f.machine.current_state(), &OverlayState::loading());
        assert_eq!(f.host.opacity(&f.loading), Some(1.0));
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let host = HeadlessHierarchy::new();
        let base = host.create_view("content");
        let config = TransitionConfig {
            duration_ms: 0,
            ..TransitionConfig::default()
        };
        let mut machine = OverlayStateMachine::with_config(host.clone(), base, config);
        let loading = host.create_view("loading");
        machine.set_placeholder_view("loading", loading);

        let outcome = machine.transition(OverlayState::loading(), true).unwrap();

        assert_eq!(outcome, TransitionOutcome::Completed);
        assert_eq!(host.visible(), vec![loading]);
    }

    #[test]
    fn test_shared_view_between_keys() {
        let (host, mut machine) = bare();
        let message = host.create_view("message");
        machine.set_placeholder_view("error", message);
        machine.set_placeholder_view("empty", message);

        machine.transition(OverlayState::error(), false).unwrap();
        let outcome = machine.transition(OverlayState::empty(), true).unwrap();

        assert_eq!(outcome, TransitionOutcome::Completed);
        assert_eq!(host.visible(), vec![message]);
    }

    #[test]
    fn test_reassert_repairs_drift() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();

        // Something else rearranged the tree while the host was off screen.
        let mut drift = f.host.clone();
        let base = *f.machine.base_view();
        drift.detach(&f.loading);
        drift.attach_above(&base, &f.empty);

        let outcome = f.machine.reassert().unwrap();

        assert_eq!(outcome, TransitionOutcome::Unchanged);
        assert_eq!(f.host.attached(), vec![f.loading]);
    }

    #[test]
    fn test_subscribe_sees_settled_states() {
        let mut f = fixture();
        let mut rx = f.machine.subscribe();
        assert_eq!(*rx.borrow(), OverlayState::None);

        f.machine.transition(OverlayState::loading(), true).unwrap();
        assert!(!rx.has_changed().unwrap());

        f.machine.finish();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), OverlayState::loading());
    }

    #[test]
    fn test_teardown_detaches_everything() {
        let mut f = fixture();
        f.machine.transition(OverlayState::loading(), false).unwrap();
        f.machine.transition(OverlayState::error(), true).unwrap();

        f.machine.teardown();

        assert!(f.host.attached().is_empty());
        assert_eq!(f.machine.current_state(), &OverlayState::None);
        assert!(!f.machine.is_transitioning());
    }

    #[test]
    fn test_drop_detaches_everything() {
        let f = fixture();
        let host = f.host.clone();
        let Fixture { mut machine, .. } = f;
        machine.transition(OverlayState::empty(), false).unwrap();
        assert!(!host.attached().is_empty());

        drop(machine);

        assert!(host.attached().is_empty());
    }
}
