//! Runtime permissions consulted during startup.
//!
//! The splash flow only needs three capabilities: coarse and fine location
//! (asked for together, once per install) and notification delivery (asked
//! for opportunistically, never blocking startup). The platform side is
//! represented by the [`PermissionGate`] collaborator; its answers arrive
//! asynchronously through a [`PermissionRequest`]'s oneshot channel.
//!
//! [`PermissionStore`] plus [`AutoPermissionGate`] give an in-process gate
//! for the simulator and tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// A runtime capability the app may ask the user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    /// Approximate location.
    CoarseLocation,
    /// Precise location.
    FineLocation,
    /// Notification delivery.
    Notifications,
}

impl PermissionKind {
    /// Return all permission variants.
    pub fn all() -> &'static [PermissionKind] {
        &[
            PermissionKind::CoarseLocation,
            PermissionKind::FineLocation,
            PermissionKind::Notifications,
        ]
    }

    /// The pair requested by the location prompt.
    pub fn location() -> &'static [PermissionKind] {
        &[PermissionKind::CoarseLocation, PermissionKind::FineLocation]
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionKind::CoarseLocation => "coarse_location",
            PermissionKind::FineLocation => "fine_location",
            PermissionKind::Notifications => "notifications",
        };
        f.write_str(s)
    }
}

impl FromStr for PermissionKind {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coarse_location" => Ok(PermissionKind::CoarseLocation),
            "fine_location" => Ok(PermissionKind::FineLocation),
            "notifications" => Ok(PermissionKind::Notifications),
            _ => Err(PermissionParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown permission kind string.
#[derive(Debug, Clone)]
pub struct PermissionParseError(pub String);

impl fmt::Display for PermissionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown permission kind: {:?}", self.0)
    }
}

impl std::error::Error for PermissionParseError {}

/// The user's answer for one requested permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOutcome {
    pub kind: PermissionKind,
    pub granted: bool,
}

/// Whether any of the answers in `outcomes` was a grant.
pub fn any_granted(outcomes: &[PermissionOutcome]) -> bool {
    outcomes.iter().any(|o| o.granted)
}

/// A request for one or more permissions, answered asynchronously.
///
/// The platform side replies on `respond_to` with one outcome per kind.
/// Dropping the sender without replying is treated as a denial.
pub struct PermissionRequest {
    /// The permissions being requested, in prompt order.
    pub kinds: Vec<PermissionKind>,
    /// Oneshot channel to deliver the per-kind answers.
    pub respond_to: oneshot::Sender<Vec<PermissionOutcome>>,
}

impl PermissionRequest {
    /// Build a request together with the receiver for its answer.
    pub fn new(kinds: &[PermissionKind]) -> (Self, oneshot::Receiver<Vec<PermissionOutcome>>) {
        let (respond_to, rx) = oneshot::channel();
        (
            Self {
                kinds: kinds.to_vec(),
                respond_to,
            },
            rx,
        )
    }
}

impl fmt::Debug for PermissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionRequest")
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Platform permission collaborator.
pub trait PermissionGate: Send + Sync {
    /// Whether `kind` is currently granted.
    fn is_granted(&self, kind: PermissionKind) -> bool;

    /// Show the system prompt for `request.kinds`.
    ///
    /// Must not block; the answer is delivered later on `request.respond_to`.
    fn request(&self, request: PermissionRequest);
}

/// Thread-safe handle to a [`PermissionStore`].
pub type SharedPermissionStore = Arc<Mutex<PermissionStore>>;

/// In-memory record of which permissions are granted.
#[derive(Debug, Clone, Default)]
pub struct PermissionStore {
    granted: Vec<PermissionKind>,
}

impl PermissionStore {
    /// Check whether a specific permission is currently granted.
    pub fn is_granted(&self, kind: PermissionKind) -> bool {
        self.granted.contains(&kind)
    }

    /// Grant a permission. Granting twice does not duplicate.
    pub fn grant(&mut self, kind: PermissionKind) {
        if !self.granted.contains(&kind) {
            self.granted.push(kind);
        }
    }

    /// Deny (revoke) a permission.
    pub fn deny(&mut self, kind: PermissionKind) {
        self.granted.retain(|k| *k != kind);
    }

    /// Return all currently granted permission kinds.
    pub fn all_granted(&self) -> &[PermissionKind] {
        &self.granted
    }

    #[must_use]
    pub fn into_shared(self) -> SharedPermissionStore {
        Arc::new(Mutex::new(self))
    }
}

/// Gate that answers every prompt immediately with a fixed decision.
///
/// Answers are recorded in the backing store so later `is_granted` checks
/// see them.
#[derive(Debug, Clone)]
pub struct AutoPermissionGate {
    store: SharedPermissionStore,
    answer: bool,
}

impl AutoPermissionGate {
    pub fn new(store: SharedPermissionStore, answer: bool) -> Self {
        Self { store, answer }
    }

    pub fn store(&self) -> &SharedPermissionStore {
        &self.store
    }
}

impl PermissionGate for AutoPermissionGate {
    fn is_granted(&self, kind: PermissionKind) -> bool {
        self.store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_granted(kind)
    }

    fn request(&self, request: PermissionRequest) {
        let outcomes: Vec<PermissionOutcome> = {
            let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
            request
                .kinds
                .iter()
                .map(|&kind| {
                    if self.answer {
                        store.grant(kind);
                    } else {
                        store.deny(kind);
                    }
                    PermissionOutcome {
                        kind,
                        granted: self.answer,
                    }
                })
                .collect()
        };
        // Receiver gone means the requester was torn down; nothing to do.
        let _ = request.respond_to.send(outcomes);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn display_fromstr_roundtrip() {
        for kind in PermissionKind::all() {
            let parsed: PermissionKind = kind.to_string().parse().unwrap();
            assert_eq!(*kind, parsed, "round-trip failed for {kind}");
        }
    }

    #[test]
    fn fromstr_unknown_returns_error() {
        assert!("microphone".parse::<PermissionKind>().is_err());
    }

    #[test]
    fn store_grant_and_deny() {
        let mut store = PermissionStore::default();
        store.grant(PermissionKind::FineLocation);
        store.grant(PermissionKind::FineLocation);
        assert_eq!(store.all_granted(), &[PermissionKind::FineLocation]);

        store.deny(PermissionKind::FineLocation);
        assert!(!store.is_granted(PermissionKind::FineLocation));
    }

    #[test]
    fn any_granted_checks_each_outcome() {
        let outcomes = [
            PermissionOutcome {
                kind: PermissionKind::CoarseLocation,
                granted: true,
            },
            PermissionOutcome {
                kind: PermissionKind::FineLocation,
                granted: false,
            },
        ];
        assert!(any_granted(&outcomes));
        assert!(!any_granted(&outcomes[1..]));
        assert!(!any_granted(&[]));
    }

    #[tokio::test]
    async fn auto_gate_answers_and_records() {
        let gate = AutoPermissionGate::new(PermissionStore::default().into_shared(), true);
        let (request, rx) = PermissionRequest::new(PermissionKind::location());
        gate.request(request);

        let outcomes = rx.await.expect("gate must answer");
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.granted));
        assert!(gate.is_granted(PermissionKind::CoarseLocation));
        assert!(!gate.is_granted(PermissionKind::Notifications));
    }

    #[tokio::test]
    async fn auto_gate_denial_is_delivered() {
        let gate = AutoPermissionGate::new(PermissionStore::default().into_shared(), false);
        let (request, rx) = PermissionRequest::new(&[PermissionKind::Notifications]);
        gate.request(request);

        let outcomes = rx.await.expect("gate must answer");
        assert!(!any_granted(&outcomes));
        assert!(gate.store().lock().unwrap().all_granted().is_empty());
    }
}
