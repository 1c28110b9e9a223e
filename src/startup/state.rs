//! Lifecycle states of the splash startup handshake.
//!
//! ```text
//! Idle ─▶ AwaitingPermission ─▶ Scheduled ─▶ Initializing ─┬─▶ Navigating
//!  ▲                               │                        ├─▶ AwaitingAsyncContinuation ─▶ Navigating
//!  └────────── pause ──────────────┘                        └─▶ Canceled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a splash orchestrator is in its one-shot startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartupState {
    /// Nothing armed; waiting for the host to become visible.
    #[default]
    Idle,
    /// The location prompt is showing.
    AwaitingPermission,
    /// The delayed initialization task is armed.
    Scheduled,
    /// The engine's `initialize` is running.
    Initializing,
    /// The engine promised to resume the continuation later.
    AwaitingAsyncContinuation,
    /// Navigation has been issued. Terminal.
    Navigating,
    /// A fatal fault ended this attempt. Terminal.
    Canceled,
}

impl StartupState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Navigating | Self::Canceled)
    }

    /// Canonical wire-format string.
    ///
    /// # Examples
    ///
    /// ```
    /// use coldstart::startup::StartupState;
    ///
    /// assert_eq!(StartupState::AwaitingPermission.as_str(), "awaiting_permission");
    /// ```
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingPermission => "awaiting_permission",
            Self::Scheduled => "scheduled",
            Self::Initializing => "initializing",
            Self::AwaitingAsyncContinuation => "awaiting_async_continuation",
            Self::Navigating => "navigating",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for StartupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StartupState; 7] = [
        StartupState::Idle,
        StartupState::AwaitingPermission,
        StartupState::Scheduled,
        StartupState::Initializing,
        StartupState::AwaitingAsyncContinuation,
        StartupState::Navigating,
        StartupState::Canceled,
    ];

    #[test]
    fn only_navigating_and_canceled_are_terminal() {
        let terminal: Vec<_> = ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(
            terminal,
            vec![StartupState::Navigating, StartupState::Canceled]
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        for state in ALL {
            let json = serde_json::to_value(state).expect("serialize state");
            assert_eq!(json, serde_json::Value::String(state.as_str().to_owned()));
        }
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(StartupState::default(), StartupState::Idle);
    }
}
