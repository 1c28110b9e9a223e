//! The splash startup state machine.
//!
//! [`Orchestrator`] is not thread-safe by itself: every method must run on
//! the splash's serial context (see [`crate::startup::runner`]). Work that
//! completes elsewhere (the delay timer, permission answers, the engine's
//! continuation) comes back as a [`StartupCommand`] on that context.

use crate::config::StartupConfig;
use crate::engine::{Continuation, Engine, InitOutcome};
use crate::error::{Result, StartupError};
use crate::launch_state::LaunchStore;
use crate::navigation::{CAR_PLACEHOLDER, FatalDialog, Host, LaunchRequest};
use crate::permissions::{PermissionGate, PermissionKind, PermissionRequest, any_granted};
use crate::startup::runner::StartupCommand;
use crate::startup::state::StartupState;
use crate::theme::SplashTheme;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

/// External collaborators the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn Host>,
    pub engine: Arc<dyn Engine>,
    pub permissions: Arc<dyn PermissionGate>,
    pub launch_store: Arc<dyn LaunchStore>,
}

/// The armed-but-not-yet-fired initialization task.
///
/// Dropping it cancels the timer.
pub struct PendingTask {
    generation: u64,
    fire_at: Instant,
    _cancel: DropGuard,
}

impl std::fmt::Debug for PendingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTask")
            .field("generation", &self.generation)
            .field("fire_at", &self.fire_at)
            .finish_non_exhaustive()
    }
}

impl PendingTask {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fire_at(&self) -> Instant {
        self.fire_at
    }
}

/// One-shot startup handshake for a single splash screen instance.
pub struct Orchestrator {
    state: StartupState,
    theme: SplashTheme,
    init_delay: Duration,
    destination: String,
    pending: Option<PendingTask>,
    next_generation: u64,
    collab: Collaborators,
    /// Weak so that dropping every [`crate::startup::SplashHandle`] closes the queue.
    tx: mpsc::WeakUnboundedSender<StartupCommand>,
    /// Parent of every pending-task token; cancelled when the orchestrator goes away.
    lifecycle: CancellationToken,
}

impl Orchestrator {
    /// Build an orchestrator that posts its deferred work to `tx`.
    ///
    /// The orchestrator never keeps the queue open on its own: once the
    /// last strong sender is gone, deferred work is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::UnsupportedTheme`] if `config.theme` is unknown.
    pub fn new(
        config: &StartupConfig,
        collab: Collaborators,
        tx: mpsc::WeakUnboundedSender<StartupCommand>,
    ) -> Result<Self> {
        let theme = SplashTheme::resolve(&config.theme)?;
        Ok(Self {
            state: StartupState::Idle,
            theme,
            init_delay: config.init_delay(),
            destination: config.destination.clone(),
            pending: None,
            next_generation: 0,
            collab,
            tx,
            lifecycle: CancellationToken::new(),
        })
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    pub fn theme(&self) -> SplashTheme {
        self.theme
    }

    pub fn pending(&self) -> Option<&PendingTask> {
        self.pending.as_ref()
    }

    /// Apply one command. Returns `false` once the host is destroyed and
    /// the serial context should stop.
    pub fn handle(&mut self, command: StartupCommand) -> bool {
        match command {
            StartupCommand::Create => self.on_create(),
            StartupCommand::Resume => self.begin(),
            StartupCommand::Pause => self.on_pause(),
            StartupCommand::Destroy => {
                self.on_destroy();
                return false;
            }
            StartupCommand::PermissionResult { granted } => self.on_permission_result(granted),
            StartupCommand::InitDue { generation } => self.fire_init(generation),
            StartupCommand::ContinuationFired => self.process_navigation(),
            StartupCommand::AcknowledgeFatal => self.acknowledge_fatal(),
        }
        true
    }

    /// Host created: style the splash, ask for notifications, and bail out
    /// straight to the placeholder when projected on a car display.
    pub fn on_create(&mut self) {
        self.disarm();
        self.collab.host.apply_style(self.theme.style_name());
        self.ask_notification_permission();

        if self.collab.host.is_car_display() {
            info!("car display in use, skipping startup");
            self.state = StartupState::Navigating;
            self.collab
                .host
                .navigate(LaunchRequest::new(CAR_PLACEHOLDER));
            self.collab.host.finish();
        }
    }

    fn ask_notification_permission(&self) {
        if self
            .collab
            .permissions
            .is_granted(PermissionKind::Notifications)
        {
            debug!("notification permission already granted");
            return;
        }
        let (request, rx) = PermissionRequest::new(&[PermissionKind::Notifications]);
        tokio::spawn(async move {
            match rx.await {
                Ok(outcomes) if any_granted(&outcomes) => {
                    debug!("notification permission granted");
                }
                Ok(_) => info!("notification permission denied; push alerts disabled"),
                Err(_) => debug!("notification prompt dismissed without an answer"),
            }
        });
        self.collab.permissions.request(request);
    }

    /// Host became visible.
    ///
    /// Prompts for location once per install; otherwise arms the delayed
    /// initialization task.
    pub fn begin(&mut self) {
        if self.state != StartupState::Idle {
            debug!(state = %self.state, "begin ignored");
            return;
        }

        let location_requested = self.collab.launch_store.is_location_requested();
        if !location_requested
            && !self
                .collab
                .permissions
                .is_granted(PermissionKind::CoarseLocation)
        {
            info!("requesting location permissions");
            self.state = StartupState::AwaitingPermission;
            let (request, rx) = PermissionRequest::new(PermissionKind::location());
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let granted = match rx.await {
                    Ok(outcomes) => any_granted(&outcomes),
                    Err(_) => {
                        warn!("location prompt dropped without an answer, treating as denied");
                        false
                    }
                };
                post(&tx, StartupCommand::PermissionResult { granted });
            });
            self.collab.permissions.request(request);
            return;
        }

        self.arm();
    }

    /// The location prompt was answered.
    ///
    /// Startup proceeds either way: location only gates a later feature.
    pub fn on_permission_result(&mut self, granted: bool) {
        if self.state != StartupState::AwaitingPermission {
            warn!(state = %self.state, granted, "unexpected permission result ignored");
            return;
        }
        info!(granted, "location permission flow finished");
        self.collab.launch_store.set_location_requested();
        self.arm();
    }

    /// Host hidden: disarm the delayed task.
    ///
    /// Initialization that has already started is never interrupted.
    pub fn on_pause(&mut self) {
        self.disarm();
    }

    /// Drop the armed task, returning `Scheduled` to `Idle`.
    fn disarm(&mut self) {
        if let Some(task) = self.pending.take() {
            debug!(generation = task.generation, "pending init task canceled");
        }
        if self.state == StartupState::Scheduled {
            self.state = StartupState::Idle;
        }
    }

    pub fn on_destroy(&mut self) {
        self.pending = None;
        self.lifecycle.cancel();
        debug!(state = %self.state, "splash destroyed");
    }

    fn arm(&mut self) {
        self.pending = None;
        self.next_generation += 1;
        let generation = self.next_generation;
        let fire_at = Instant::now() + self.init_delay;
        let token = self.lifecycle.child_token();

        let cancel = token.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep_until(fire_at) => {
                    post(&tx, StartupCommand::InitDue { generation });
                }
            }
        });

        self.pending = Some(PendingTask {
            generation,
            fire_at,
            _cancel: token.drop_guard(),
        });
        self.state = StartupState::Scheduled;
        debug!(
            generation,
            delay_ms = self.init_delay.as_millis() as u64,
            "init task armed"
        );
    }

    /// Body of the armed task: start the engine.
    pub fn fire_init(&mut self, generation: u64) {
        let armed = self.pending.as_ref().map(PendingTask::generation);
        if self.state != StartupState::Scheduled || armed != Some(generation) {
            debug!(generation, ?armed, state = %self.state, "stale init task ignored");
            return;
        }
        self.pending = None;
        self.state = StartupState::Initializing;
        info!("initializing engine");

        let continuation = Continuation::new(self.tx.clone());
        let outcome = match self.collab.engine.initialize(continuation) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        self.maybe_enter_first_run();

        match outcome {
            InitOutcome::Ready => self.process_navigation(),
            InitOutcome::Deferred => {
                info!("engine will resume asynchronously");
                self.state = StartupState::AwaitingAsyncContinuation;
            }
        }
    }

    fn maybe_enter_first_run(&self) {
        let permissions = &self.collab.permissions;
        let location_granted = permissions.is_granted(PermissionKind::FineLocation)
            || permissions.is_granted(PermissionKind::CoarseLocation);
        if self.collab.launch_store.is_first_launch() && location_granted {
            debug!("first launch with location granted");
            self.collab.engine.enter_first_run();
            self.collab.engine.start_location_updates();
        }
    }

    fn fail(&mut self, err: StartupError) {
        error!("engine initialization failed: {err}");
        self.state = StartupState::Canceled;
        let dialog = match &err {
            StartupError::Storage(detail) => FatalDialog::storage(detail),
            other => FatalDialog::startup(&other.to_string()),
        };
        self.collab.host.show_fatal_dialog(dialog);
    }

    /// The fatal dialog's only action: close the host.
    pub fn acknowledge_fatal(&mut self) {
        if self.state != StartupState::Canceled {
            warn!(state = %self.state, "fatal acknowledgement without a fault ignored");
            return;
        }
        self.collab.host.finish();
    }

    /// Forward the inbound launch request to the follow-on screen.
    ///
    /// Runs at most once per orchestrator, whichever of the synchronous or
    /// asynchronous completion paths gets here first.
    pub fn process_navigation(&mut self) {
        if self.collab.host.is_destroyed() {
            warn!("ignoring late callback from engine: host is already destroyed");
            return;
        }
        match self.state {
            StartupState::Initializing | StartupState::AwaitingAsyncContinuation => {}
            state => {
                debug!(%state, "navigation not due, ignored");
                return;
            }
        }

        self.state = StartupState::Navigating;
        let request = self
            .collab
            .host
            .inbound_request()
            .forward_to(&self.destination);
        info!(
            destination = %request.destination,
            flags = ?request.flags,
            "forwarding launch request"
        );
        self.collab.launch_store.set_first_start_dialog_seen();
        self.collab.host.navigate(request);
        self.collab.host.finish();
    }
}

/// Post to the serial context if it is still running.
fn post(tx: &mpsc::WeakUnboundedSender<StartupCommand>, command: StartupCommand) {
    let delivered = tx.upgrade().is_some_and(|tx| tx.send(command).is_ok());
    if !delivered {
        debug!(?command, "splash context gone, command dropped");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}
