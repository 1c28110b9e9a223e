//! Serial execution context for the splash orchestrator.
//!
//! All orchestrator state changes happen on one spawned tokio task that
//! drains a command queue in FIFO order. Lifecycle events from the host,
//! timer expiry, permission answers and the engine's continuation all
//! arrive as [`StartupCommand`]s, so there is never concurrent mutation
//! even when the continuation is resumed from another thread.

use crate::config::StartupConfig;
use crate::error::{Result, StartupError};
use crate::startup::orchestrator::{Collaborators, Orchestrator};
use crate::startup::state::StartupState;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Commands processed on the splash's serial context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCommand {
    /// Host created.
    Create,
    /// Host became visible.
    Resume,
    /// Host hidden.
    Pause,
    /// Host torn down; stops the context.
    Destroy,
    /// Location prompt answered.
    PermissionResult { granted: bool },
    /// The delayed init task `generation` expired.
    InitDue { generation: u64 },
    /// The engine resumed its continuation.
    ContinuationFired,
    /// The user acknowledged the fatal dialog.
    AcknowledgeFatal,
}

/// Owns the orchestrator and drives it from the command queue.
pub struct SplashRunner {
    orchestrator: Orchestrator,
    rx: mpsc::UnboundedReceiver<StartupCommand>,
    state_tx: watch::Sender<StartupState>,
}

/// Cloneable handle used by the host to post lifecycle events.
#[derive(Debug, Clone)]
pub struct SplashHandle {
    tx: mpsc::UnboundedSender<StartupCommand>,
    state_rx: watch::Receiver<StartupState>,
}

impl SplashRunner {
    /// Build the runner and its handle.
    ///
    /// # Errors
    ///
    /// Fails if the configured theme is unsupported.
    pub fn new(config: &StartupConfig, collab: Collaborators) -> Result<(Self, SplashHandle)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator::new(config, collab, tx.downgrade())?;
        let (state_tx, state_rx) = watch::channel(orchestrator.state());
        Ok((
            Self {
                orchestrator,
                rx,
                state_tx,
            },
            SplashHandle { tx, state_rx },
        ))
    }

    /// Start the serial loop on a background task.
    ///
    /// The loop ends after [`StartupCommand::Destroy`] or once every
    /// [`SplashHandle`] has been dropped. Either way the orchestrator is
    /// dropped with it, which cancels any armed timer.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process commands until the host is destroyed or all handles are gone.
    pub async fn run(mut self) {
        info!(theme = %self.orchestrator.theme(), "splash context started");
        while let Some(command) = self.rx.recv().await {
            debug!(?command, state = %self.orchestrator.state(), "splash command");
            let keep_running = self.orchestrator.handle(command);
            self.state_tx.send_replace(self.orchestrator.state());
            if !keep_running {
                break;
            }
        }
        info!(state = %self.orchestrator.state(), "splash context stopped");
    }
}

impl SplashHandle {
    fn post(&self, command: StartupCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| StartupError::Channel("splash context has stopped".to_owned()))
    }

    pub fn create(&self) -> Result<()> {
        self.post(StartupCommand::Create)
    }

    pub fn resume(&self) -> Result<()> {
        self.post(StartupCommand::Resume)
    }

    pub fn pause(&self) -> Result<()> {
        self.post(StartupCommand::Pause)
    }

    pub fn destroy(&self) -> Result<()> {
        self.post(StartupCommand::Destroy)
    }

    /// Deliver the location prompt's answer from the platform side.
    pub fn permission_result(&self, granted: bool) -> Result<()> {
        self.post(StartupCommand::PermissionResult { granted })
    }

    pub fn acknowledge_fatal(&self) -> Result<()> {
        self.post(StartupCommand::AcknowledgeFatal)
    }

    /// State as of the last processed command.
    pub fn state(&self) -> StartupState {
        *self.state_rx.borrow()
    }

    /// Wait until the orchestrator reaches a state matching `pred`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Channel`] if the context stops first.
    pub async fn wait_for(&self, pred: impl FnMut(&StartupState) -> bool) -> Result<StartupState> {
        let mut rx = self.state_rx.clone();
        let state = rx
            .wait_for(pred)
            .await
            .map_err(|_| StartupError::Channel("splash context has stopped".to_owned()))?;
        Ok(*state)
    }
}
