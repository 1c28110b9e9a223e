//! External map engine collaborator.
//!
//! Engine initialization may finish before `initialize` returns
//! ([`InitOutcome::Ready`], the fast path) or later on an arbitrary thread,
//! in which case the engine calls [`Continuation::resume`] exactly when it
//! is done. `resume` consumes the continuation, so a given engine can
//! deliver it at most once; the orchestrator separately guards against the
//! engine resuming *and* reporting `Ready`.

use crate::error::Result;
use crate::startup::runner::StartupCommand;
use tokio::sync::mpsc;
use tracing::warn;

/// How initialization finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Already complete; the continuation will not be used.
    Ready,
    /// Completion is pending; the engine will call [`Continuation::resume`].
    Deferred,
}

/// Single-shot completion signal handed to the engine.
///
/// Safe to move to and resume from any thread: resuming only posts a
/// command to the splash's serial context.
#[derive(Debug)]
pub struct Continuation {
    tx: mpsc::WeakUnboundedSender<StartupCommand>,
}

impl Continuation {
    pub(crate) fn new(tx: mpsc::WeakUnboundedSender<StartupCommand>) -> Self {
        Self { tx }
    }

    /// Signal that initialization has completed.
    ///
    /// If the splash has already been torn down the signal is dropped with a
    /// diagnostic.
    pub fn resume(self) {
        let delivered = self
            .tx
            .upgrade()
            .is_some_and(|tx| tx.send(StartupCommand::ContinuationFired).is_ok());
        if !delivered {
            warn!("ignoring late engine callback: splash is already destroyed");
        }
    }
}

/// The native map engine.
pub trait Engine: Send + Sync {
    /// Start initialization.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StartupError::Storage`] when storage is unusable;
    /// the continuation is then never resumed.
    fn initialize(&self, continuation: Continuation) -> Result<InitOutcome>;

    /// Called once after a successful initialization on the very first
    /// launch when location is already granted, so the first map opens
    /// on the user's position.
    fn enter_first_run(&self) {}

    /// Start location updates unless they are already running.
    ///
    /// Follows [`Engine::enter_first_run`] so the first-run map has a fix
    /// to center on. Must be idempotent.
    fn start_location_updates(&self) {}
}
