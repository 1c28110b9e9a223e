//! Splash startup handshake.
//!
//! Delays engine initialization behind a short debounce, gates it on a
//! once-per-install location prompt, and forwards the launch request to the
//! next screen exactly once, whether the engine finishes synchronously or
//! resumes its continuation later.

pub mod orchestrator;
pub mod runner;
pub mod state;

pub use orchestrator::{Collaborators, Orchestrator, PendingTask};
pub use runner::{SplashHandle, SplashRunner, StartupCommand};
pub use state::StartupState;
