//! Coldstart: the splash-screen startup handshake of the map app shell.
//!
//! Two independent pieces live here:
//!
//! - **Startup** ([`startup`]): a per-screen state machine that debounces
//!   engine initialization, gates it on a once-per-install location prompt,
//!   and forwards the launch request to the next screen exactly once,
//!   whether the engine completes synchronously or resumes later from
//!   another thread.
//! - **Observers** ([`observers`]): a listener registry that stays
//!   consistent when listeners register or unregister during notification,
//!   used by the [`recording`] switch.
//!
//! Platform surfaces (the host screen, permission prompts, the native
//! engine, persisted flags) are traits so the shell can plug in its own.

pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch_state;
pub mod navigation;
pub mod observers;
pub mod permissions;
pub mod recording;
pub mod startup;
pub mod theme;

pub use config::StartupConfig;
pub use engine::{Continuation, Engine, InitOutcome};
pub use error::{Result, StartupError};
pub use navigation::{Host, IntentFlags, LaunchRequest};
pub use observers::Listeners;
pub use startup::{SplashHandle, SplashRunner, StartupState};
