//! Tick-driven cross-fade between two overlay views.
//!
//! A fade does not touch the hierarchy itself. The owner advances it with the
//! time elapsed since the previous frame and applies the returned opacities.

use std::time::Duration;

use stateful_core::{Easing, OverlayState};

/// Opacities to apply for one frame of a fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeFrame {
    /// Opacity of the view becoming visible.
    pub incoming: f32,
    /// Opacity of the view going away.
    pub outgoing: f32,
    /// True on the frame that reaches the end of the fade.
    pub finished: bool,
}

/// A running fade from `outgoing` to `incoming`.
///
/// Either side may be absent: fading in from bare content has no outgoing view,
/// and fading back to content has no incoming view.
#[derive(Debug, Clone)]
pub struct CrossFade<V> {
    target: OverlayState,
    incoming: Option<V>,
    outgoing: Option<V>,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl<V> CrossFade<V> {
    pub fn new(
        target: OverlayState,
        incoming: Option<V>,
        outgoing: Option<V>,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            target,
            incoming,
            outgoing,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// State the machine reaches when this fade completes.
    pub fn target(&self) -> &OverlayState {
        &self.target
    }

    pub fn incoming(&self) -> Option<&V> {
        self.incoming.as_ref()
    }

    pub fn outgoing(&self) -> Option<&V> {
        self.outgoing.as_ref()
    }

    /// Linear progress, 0.0 (start of fade) - 1.0 (end of fade).
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Opacities for the current position without advancing.
    pub fn frame(&self) -> FadeFrame {
        let pos = self.easing.interpolate(self.progress());
        FadeFrame {
            incoming: pos,
            outgoing: 1.0 - pos,
            finished: self.is_finished(),
        }
    }

    /// Advance by `dt` and return the opacities for the new position.
    pub fn advance(&mut self, dt: Duration) -> FadeFrame {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.frame()
    }
}
