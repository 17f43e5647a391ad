//! Owner-thread confinement for an overlay state machine.
//!
//! A machine mutates a view hierarchy that is usually tied to one thread and
//! often !Send, so the actor builds the machine on a dedicated OS thread and
//! keeps it there. Other threads marshal requests through an [`OverlayHandle`].
//!
//! While a fade is in flight the thread wakes every frame interval and advances
//! it with the real elapsed time. When idle it blocks on the request channel.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use stateful_core::{OverlayError, OverlayState, PlaceholderKey};
use tokio::sync::{oneshot, watch};

use crate::hierarchy::ViewHierarchy;
use crate::machine::{OverlayStateMachine, TransitionOutcome};

type Reply<T> = oneshot::Sender<T>;

/// Request types for the owner thread.
enum Command<V> {
    Transition {
        to: OverlayState,
        animated: bool,
        resp: Reply<Result<TransitionOutcome, OverlayError>>,
    },
    SetPlaceholder {
        key: PlaceholderKey,
        view: V,
        resp: Reply<Option<V>>,
    },
    CurrentState {
        resp: Reply<OverlayState>,
    },
    PendingState {
        resp: Reply<OverlayState>,
    },
    Reassert {
        resp: Reply<Result<TransitionOutcome, OverlayError>>,
    },
    Finish {
        resp: Reply<()>,
    },
    Shutdown,
}

/// A state machine running on its own thread.
///
/// Dropping the actor shuts the thread down, which tears the machine down and
/// detaches every placeholder view.
pub struct OverlayActor<V> {
    handle: OverlayHandle<V>,
    thread: Option<JoinHandle<()>>,
}

impl<V> OverlayActor<V>
where
    V: Clone + PartialEq + std::fmt::Debug + Send + 'static,
{
    /// Spawn the owner thread and build the machine on it.
    ///
    /// `build` runs on the new thread, so the hierarchy it creates never has to
    /// cross threads. MUST use std::thread, the machine is driven by a blocking loop.
    ///
    /// Returns without waiting for `build`. Requests sent before it finishes
    /// queue on the channel, and the settled-state channel is fed by the owner
    /// thread, so this is safe to call from an async task.
    pub fn spawn<H, F>(build: F) -> Self
    where
        H: ViewHierarchy<View = V> + 'static,
        F: FnOnce() -> OverlayStateMachine<H> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Command<V>>();
        let (state_tx, state_rx) = watch::channel(OverlayState::None);

        let thread = thread::spawn(move || {
            let machine = build();
            tracing::info!("Overlay owner thread started");
            run(machine, rx, state_tx);
            tracing::info!("Overlay owner thread stopped");
        });

        Self {
            handle: OverlayHandle { tx, state_rx },
            thread: Some(thread),
        }
    }

    /// Get a cloneable handle for other threads and tasks.
    pub fn handle(&self) -> OverlayHandle<V> {
        self.handle.clone()
    }

    /// Stop the owner thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        let _ = self.handle.tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Overlay owner thread panicked");
            }
        }
    }
}

impl<V> Drop for OverlayActor<V> {
    fn drop(&mut self) {
        let _ = self.handle.tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run<H: ViewHierarchy>(
    mut machine: OverlayStateMachine<H>,
    rx: mpsc::Receiver<Command<H::View>>,
    state_tx: watch::Sender<OverlayState>,
) {
    publish(&machine, &state_tx);
    let frame_interval = machine.config().frame_interval();
    let mut last_frame = Instant::now();

    loop {
        let next = if machine.is_transitioning() {
            match rx.recv_timeout(frame_interval) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        if machine.is_transitioning() {
            let now = Instant::now();
            machine.tick(now - last_frame);
            last_frame = now;
            publish(&machine, &state_tx);
        }

        let Some(cmd) = next else {
            continue;
        };

        let was_transitioning = machine.is_transitioning();

        match cmd {
            Command::Transition { to, animated, resp } => {
                let _ = resp.send(machine.transition(to, animated));
            }
            Command::SetPlaceholder { key, view, resp } => {
                let _ = resp.send(machine.set_placeholder_view(key, view));
            }
            Command::CurrentState { resp } => {
                let _ = resp.send(machine.current_state().clone());
            }
            Command::PendingState { resp } => {
                let _ = resp.send(machine.pending_state().clone());
            }
            Command::Reassert { resp } => {
                let _ = resp.send(machine.reassert());
            }
            Command::Finish { resp } => {
                machine.finish();
                let _ = resp.send(());
            }
            Command::Shutdown => break,
        }

        publish(&machine, &state_tx);

        // A fade started by this request measures time from now.
        if machine.is_transitioning() && !was_transitioning {
            last_frame = Instant::now();
        }
    }

    machine.teardown();
    publish(&machine, &state_tx);
}

/// Forward the settled state to handle subscribers when it changed.
fn publish<H: ViewHierarchy>(
    machine: &OverlayStateMachine<H>,
    state_tx: &watch::Sender<OverlayState>,
) {
    let settled = machine.current_state();
    state_tx.send_if_modified(|state| {
        if state == settled {
            return false;
        }
        *state = settled.clone();
        true
    });
}

/// Cloneable, `Send` handle that marshals requests onto the owner thread.
pub struct OverlayHandle<V> {
    tx: mpsc::Sender<Command<V>>,
    state_rx: watch::Receiver<OverlayState>,
}

impl<V> Clone for OverlayHandle<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            state_rx: self.state_rx.clone(),
        }
    }
}

impl<V> OverlayHandle<V> {
    async fn request<T>(
        &self,
        cmd: impl FnOnce(Reply<T>) -> Command<V>,
    ) -> Result<T, OverlayError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(cmd(resp_tx))
            .map_err(|_| OverlayError::RuntimeUnavailable)?;
        resp_rx.await.map_err(|_| OverlayError::RuntimeUnavailable)
    }

    /// Request a transition. Returns once the request is applied; an animated
    /// transition is still fading when this resolves to `Scheduled`.
    pub async fn transition(
        &self,
        to: OverlayState,
        animated: bool,
    ) -> Result<TransitionOutcome, OverlayError> {
        self.request(|resp| Command::Transition { to, animated, resp })
            .await?
    }

    /// Register a placeholder view. Returns the previously registered view.
    pub async fn set_placeholder_view(
        &self,
        key: impl Into<PlaceholderKey>,
        view: V,
    ) -> Result<Option<V>, OverlayError> {
        let key = key.into();
        self.request(|resp| Command::SetPlaceholder { key, view, resp })
            .await
    }

    pub async fn current_state(&self) -> Result<OverlayState, OverlayError> {
        self.request(|resp| Command::CurrentState { resp }).await
    }

    pub async fn pending_state(&self) -> Result<OverlayState, OverlayError> {
        self.request(|resp| Command::PendingState { resp }).await
    }

    pub async fn reassert(&self) -> Result<TransitionOutcome, OverlayError> {
        self.request(|resp| Command::Reassert { resp }).await?
    }

    /// Settle any in-flight fade immediately.
    pub async fn finish(&self) -> Result<(), OverlayError> {
        self.request(|resp| Command::Finish { resp }).await
    }

    /// Subscribe to changes of the settled state.
    pub fn subscribe(&self) -> watch::Receiver<OverlayState> {
        self.state_rx.clone()
    }

    /// Wait until the settled state equals `state`.
    pub async fn wait_for(&self, state: &OverlayState) -> Result<(), OverlayError> {
        let mut rx = self.state_rx.clone();
        let reached = rx.wait_for(|s| s == state).await.map(|_| ());
        reached.map_err(|_| OverlayError::RuntimeUnavailable)
    }
}
