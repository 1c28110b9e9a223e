//! Drives the splash handshake against simulated collaborators.
//!
//! Usage: `coldstart-sim [--deferred] [--storage-fault] [--deny] [--car] [--persist]`
//!
//! Tracing goes to stderr; the forwarded launch request is printed to
//! stdout as JSON.

use coldstart::engine::{Continuation, Engine, InitOutcome};
use coldstart::launch_state::{FileLaunchStore, LaunchStore, MemoryLaunchStore};
use coldstart::navigation::{FatalDialog, Host, IntentFlags, LaunchRequest};
use coldstart::permissions::{AutoPermissionGate, PermissionStore};
use coldstart::startup::Collaborators;
use coldstart::{SplashRunner, StartupConfig, StartupError, StartupState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct Options {
    deferred: bool,
    storage_fault: bool,
    deny: bool,
    car: bool,
    persist: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut opts = Self::default();
        for arg in args {
            match arg.as_str() {
                "--deferred" => opts.deferred = true,
                "--storage-fault" => opts.storage_fault = true,
                "--deny" => opts.deny = true,
                "--car" => opts.car = true,
                "--persist" => opts.persist = true,
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }
        Ok(opts)
    }
}

struct SimHost {
    car: bool,
    destroyed: AtomicBool,
}

impl Host for SimHost {
    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn is_car_display(&self) -> bool {
        self.car
    }

    fn inbound_request(&self) -> LaunchRequest {
        LaunchRequest::new("Splash")
            .with_flags(
                IntentFlags::NEW_TASK
                    | IntentFlags::RESET_TASK_IF_NEEDED
                    | IntentFlags::GRANT_READ_URI_PERMISSION,
            )
            .with_data("geo:52.3731,4.8922?z=15")
    }

    fn apply_style(&self, style: &str) {
        tracing::info!(style, "splash style applied");
    }

    fn navigate(&self, request: LaunchRequest) {
        match serde_json::to_string_pretty(&request) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("cannot encode launch request: {e}"),
        }
    }

    fn finish(&self) {
        tracing::info!("splash finished");
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn show_fatal_dialog(&self, dialog: FatalDialog) {
        tracing::error!(title = %dialog.title, "{}", dialog.message);
    }
}

struct SimEngine {
    deferred: bool,
    storage_fault: bool,
}

impl Engine for SimEngine {
    fn initialize(&self, continuation: Continuation) -> coldstart::Result<InitOutcome> {
        if self.storage_fault {
            return Err(StartupError::Storage("simulated: no space left on device".to_owned()));
        }
        if !self.deferred {
            return Ok(InitOutcome::Ready);
        }
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            tracing::info!("engine finished on worker thread");
            continuation.resume();
        });
        Ok(InitOutcome::Deferred)
    }

    fn enter_first_run(&self) {
        tracing::info!("first run: centering on user");
    }

    fn start_location_updates(&self) {
        tracing::info!("location updates started");
    }
}

fn load_config() -> StartupConfig {
    let path = StartupConfig::default_config_path();
    if !path.exists() {
        return StartupConfig::default();
    }
    StartupConfig::from_file(&path).unwrap_or_else(|e| {
        eprintln!("ignoring {}: {e}", path.display());
        StartupConfig::default()
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opts = Options::parse(std::env::args().skip(1))?;
    let config = load_config();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let launch_store: Arc<dyn LaunchStore> = if opts.persist {
        Arc::new(FileLaunchStore::open_default())
    } else {
        Arc::new(MemoryLaunchStore::default())
    };
    let collab = Collaborators {
        host: Arc::new(SimHost {
            car: opts.car,
            destroyed: AtomicBool::new(false),
        }),
        engine: Arc::new(SimEngine {
            deferred: opts.deferred,
            storage_fault: opts.storage_fault,
        }),
        permissions: Arc::new(AutoPermissionGate::new(
            PermissionStore::default().into_shared(),
            !opts.deny,
        )),
        launch_store,
    };

    let (runner, handle) = SplashRunner::new(&config, collab)?;
    let task = runner.spawn();

    handle.create()?;
    handle.resume()?;
    let state = handle.wait_for(|s| s.is_terminal()).await?;
    if state == StartupState::Canceled {
        handle.acknowledge_fatal()?;
    }
    handle.destroy()?;
    task.await?;

    tracing::info!(%state, "simulation finished");
    if state == StartupState::Canceled {
        anyhow::bail!("startup canceled by a fatal fault");
    }
    Ok(())
}
