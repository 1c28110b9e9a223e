//! Navigation target: the host screen and the launch requests it forwards.
//!
//! When startup completes, the splash re-uses its own inbound
//! [`LaunchRequest`] (keeping payload, action and data) and only swaps the
//! destination. Forwarded flags are masked down to
//! [`IntentFlags::FORWARDABLE`]: task-management flags such as
//! `NEW_TASK`/`RESET_TASK_IF_NEEDED` break the cold start of the
//! follow-on screen.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Launch flags carried by a [`LaunchRequest`].
    ///
    /// Values match the platform's wire constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct IntentFlags: u32 {
        const GRANT_READ_URI_PERMISSION   = 0x0000_0001;
        const GRANT_WRITE_URI_PERMISSION  = 0x0000_0002;
        const RESET_TASK_IF_NEEDED        = 0x0020_0000;
        const BROUGHT_TO_FRONT            = 0x0040_0000;
        const FORWARD_RESULT              = 0x0200_0000;
        const CLEAR_TOP                   = 0x0400_0000;
        const NEW_TASK                    = 0x1000_0000;
    }
}

impl IntentFlags {
    /// The only flags that survive forwarding out of the splash screen.
    pub const FORWARDABLE: Self =
        Self::FORWARD_RESULT.union(Self::GRANT_READ_URI_PERMISSION);
}

impl Default for IntentFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Component shown after the splash on a car display.
pub const CAR_PLACEHOLDER: &str = "MapPlaceholder";

/// A navigation request: destination component plus payload and flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Component that should handle the request.
    pub destination: String,
    pub flags: IntentFlags,
    pub action: Option<String>,
    /// Data URI (deep link, shared geo URI, ...).
    pub data: Option<String>,
    /// Arbitrary payload forwarded untouched.
    #[serde(default)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl LaunchRequest {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: IntentFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Re-target this request at `destination`, keeping the payload and
    /// only the [`IntentFlags::FORWARDABLE`] flags.
    #[must_use]
    pub fn forward_to(&self, destination: &str) -> Self {
        Self {
            destination: destination.to_owned(),
            flags: self.flags & IntentFlags::FORWARDABLE,
            ..self.clone()
        }
    }
}

/// A blocking error dialog with a single acknowledgement action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalDialog {
    pub title: String,
    pub message: String,
    /// Label of the only action; acknowledging it closes the host.
    pub action: String,
    /// Whether back/outside-tap may dismiss the dialog. Always `false` for startup faults.
    pub cancelable: bool,
}

impl FatalDialog {
    /// Dialog shown when storage is unusable during initialization.
    pub fn storage(detail: &str) -> Self {
        Self {
            title: "Storage unavailable".to_owned(),
            message: format!(
                "Map data could not be prepared ({detail}). Free up space or check storage, \
                 then restart the app."
            ),
            action: "OK".to_owned(),
            cancelable: false,
        }
    }

    /// Dialog for any other fault the engine reports while initializing.
    pub fn startup(detail: &str) -> Self {
        Self {
            title: "Startup failed".to_owned(),
            message: format!("The map engine could not start ({detail}). Restart the app."),
            action: "OK".to_owned(),
            cancelable: false,
        }
    }
}

/// The host screen the splash flow runs inside.
///
/// Issuing navigation and finishing the host are the only externally
/// observable effects of a completed startup.
pub trait Host: Send + Sync {
    /// Whether the host has been torn down and can no longer navigate.
    fn is_destroyed(&self) -> bool;

    /// Whether the app is currently projected onto a car display.
    fn is_car_display(&self) -> bool {
        false
    }

    /// The request the host was launched with.
    fn inbound_request(&self) -> LaunchRequest;

    /// Apply the splash style before the first frame.
    fn apply_style(&self, _style: &str) {}

    fn navigate(&self, request: LaunchRequest);

    /// Close the host screen.
    fn finish(&self);

    fn show_fatal_dialog(&self, dialog: FatalDialog);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarding_keeps_only_allow_listed_flags() {
        let inbound = LaunchRequest::new("Splash").with_flags(
            IntentFlags::NEW_TASK
                | IntentFlags::RESET_TASK_IF_NEEDED
                | IntentFlags::CLEAR_TOP
                | IntentFlags::FORWARD_RESULT
                | IntentFlags::GRANT_READ_URI_PERMISSION,
        );
        let outbound = inbound.forward_to("DownloadResources");
        assert_eq!(
            outbound.flags,
            IntentFlags::FORWARD_RESULT | IntentFlags::GRANT_READ_URI_PERMISSION
        );
        assert_eq!(outbound.destination, "DownloadResources");
    }

    #[test]
    fn forwarding_preserves_payload() {
        let inbound = LaunchRequest::new("Splash")
            .with_data("geo:52.37,4.89")
            .with_extra("zoom", serde_json::json!(14));
        let outbound = inbound.forward_to("DownloadResources");
        assert_eq!(outbound.data.as_deref(), Some("geo:52.37,4.89"));
        assert_eq!(outbound.extras.get("zoom"), Some(&serde_json::json!(14)));
        assert_eq!(inbound.destination, "Splash", "inbound is left untouched");
    }

    #[test]
    fn forwarding_without_flags_yields_empty_set() {
        let outbound = LaunchRequest::new("Splash")
            .with_flags(IntentFlags::NEW_TASK)
            .forward_to("DownloadResources");
        assert!(outbound.flags.is_empty());
    }

    #[test]
    fn storage_dialog_is_not_cancelable() {
        let dialog = FatalDialog::storage("disk full");
        assert!(!dialog.cancelable);
        assert!(dialog.message.contains("disk full"));
    }
}
