//! GPS track recording switch and its listeners.
//!
//! The recording flag itself lives in the native engine
//! ([`RecordingToggle`]); [`TrackRecorder`] only flips it on real
//! transitions and tells registered listeners. One recorder is constructed
//! by whoever owns the recording session and handed out by reference.

use crate::observers::Listeners;
use std::sync::Arc;
use tracing::{debug, info};

/// Observer of recording start/stop.
pub trait TrackRecordingListener: Send + Sync {
    fn on_track_recording_started(&self);
    fn on_track_recording_stopped(&self);
}

/// Native recording flag.
pub trait RecordingToggle: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Maximum track length kept, in hours.
    fn set_duration_hours(&self, hours: u32);
    fn duration_hours(&self) -> u32;
}

pub struct TrackRecorder {
    toggle: Arc<dyn RecordingToggle>,
    listeners: Listeners<dyn TrackRecordingListener>,
}

impl TrackRecorder {
    pub fn new(toggle: Arc<dyn RecordingToggle>) -> Self {
        Self {
            toggle,
            listeners: Listeners::new(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.toggle.is_enabled()
    }

    /// Enable recording (if not already) and notify listeners.
    pub fn start_track_recording(&self) {
        if !self.toggle.is_enabled() {
            info!("track recording enabled");
            self.toggle.set_enabled(true);
        }
        self.listeners.for_each(|l| l.on_track_recording_started());
    }

    /// Disable recording (if enabled) and notify listeners.
    pub fn stop_track_recording(&self) {
        if self.toggle.is_enabled() {
            info!("track recording disabled");
            self.toggle.set_enabled(false);
        }
        self.listeners.for_each(|l| l.on_track_recording_stopped());
    }

    pub fn add_listener(&self, listener: Arc<dyn TrackRecordingListener>) {
        self.listeners.register(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn TrackRecordingListener>) {
        self.listeners.unregister(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn set_duration_hours(&self, hours: u32) {
        debug!(hours, "track duration updated");
        self.toggle.set_duration_hours(hours);
    }

    pub fn duration_hours(&self) -> u32 {
        self.toggle.duration_hours()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeToggle {
        enabled: AtomicBool,
        flips: AtomicUsize,
        hours: AtomicU32,
    }

    impl RecordingToggle for FakeToggle {
        fn set_enabled(&self, enabled: bool) {
            self.flips.fetch_add(1, Ordering::SeqCst);
            self.enabled.store(enabled, Ordering::SeqCst);
        }
        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
        fn set_duration_hours(&self, hours: u32) {
            self.hours.store(hours, Ordering::SeqCst);
        }
        fn duration_hours(&self) -> u32 {
            self.hours.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct Log {
        events: Mutex<Vec<&'static str>>,
    }

    impl TrackRecordingListener for Log {
        fn on_track_recording_started(&self) {
            self.events.lock().unwrap().push("started");
        }
        fn on_track_recording_stopped(&self) {
            self.events.lock().unwrap().push("stopped");
        }
    }

    fn recorder() -> (TrackRecorder, Arc<FakeToggle>) {
        let toggle = Arc::new(FakeToggle::default());
        (TrackRecorder::new(toggle.clone()), toggle)
    }

    #[test]
    fn redundant_start_flips_toggle_once() {
        let (rec, toggle) = recorder();
        let log = Arc::new(Log::default());
        rec.add_listener(log.clone());

        rec.start_track_recording();
        rec.start_track_recording();
        assert!(rec.is_recording());
        assert_eq!(toggle.flips.load(Ordering::SeqCst), 1);
        assert_eq!(*log.events.lock().unwrap(), vec!["started", "started"]);
    }

    #[test]
    fn stop_when_idle_does_not_touch_toggle() {
        let (rec, toggle) = recorder();
        rec.stop_track_recording();
        assert_eq!(toggle.flips.load(Ordering::SeqCst), 0);

        rec.start_track_recording();
        rec.stop_track_recording();
        rec.stop_track_recording();
        assert!(!rec.is_recording());
        assert_eq!(toggle.flips.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let (rec, _toggle) = recorder();
        let log = Arc::new(Log::default());
        let handle: Arc<dyn TrackRecordingListener> = log.clone();
        rec.add_listener(handle.clone());
        rec.remove_listener(&handle);
        assert_eq!(rec.listener_count(), 0);

        rec.start_track_recording();
        assert!(log.events.lock().unwrap().is_empty());
    }

    #[test]
    fn duration_is_forwarded_to_toggle() {
        let (rec, toggle) = recorder();
        rec.set_duration_hours(24);
        assert_eq!(rec.duration_hours(), 24);
        assert_eq!(toggle.hours.load(Ordering::SeqCst), 24);
    }
}
