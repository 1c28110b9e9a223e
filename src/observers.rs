//! Listener registry that tolerates mutation during notification.
//!
//! A notification pass ([`Listeners::for_each`]) works on a snapshot taken
//! when the pass starts:
//!
//! - listeners registered mid-pass are not visited until the next pass;
//! - listeners unregistered mid-pass are skipped if their turn has not come
//!   yet and are purged when the outermost pass ends.
//!
//! Callbacks may freely call [`Listeners::register`] and
//! [`Listeners::unregister`], including on themselves. The internal lock
//! is never held while a callback runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct Entry<L: ?Sized> {
    listener: Arc<L>,
    removed: AtomicBool,
}

impl<L: ?Sized> Entry<L> {
    fn is(&self, listener: &Arc<L>) -> bool {
        same(&self.listener, listener)
    }
}

/// Pointer identity, ignoring vtable metadata for trait objects.
fn same<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

struct Inner<L: ?Sized> {
    entries: Vec<Arc<Entry<L>>>,
    /// Depth of nested notification passes in progress.
    passes: usize,
}

/// Registry of listeners keyed by `Arc` identity.
pub struct Listeners<L: ?Sized> {
    inner: Mutex<Inner<L>>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                passes: 0,
            }),
        }
    }
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<L>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add `listener` unless it is already registered.
    ///
    /// Re-registering a listener that is pending removal keeps it.
    pub fn register(&self, listener: Arc<L>) {
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.iter().find(|e| e.is(&listener)) {
            entry.removed.store(false, Ordering::Release);
            return;
        }
        inner.entries.push(Arc::new(Entry {
            listener,
            removed: AtomicBool::new(false),
        }));
    }

    /// Remove `listener`; deferred to the end of the pass if one is running.
    pub fn unregister(&self, listener: &Arc<L>) {
        let mut inner = self.lock();
        if inner.passes == 0 {
            inner.entries.retain(|e| !e.is(listener));
        } else if let Some(entry) = inner.entries.iter().find(|e| e.is(listener)) {
            entry.removed.store(true, Ordering::Release);
        }
    }

    /// Number of registered listeners not pending removal.
    pub fn len(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|e| !e.removed.load(Ordering::Acquire))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.lock()
            .entries
            .iter()
            .any(|e| e.is(listener) && !e.removed.load(Ordering::Acquire))
    }

    /// Run one notification pass, calling `visit` on each listener in
    /// registration order.
    pub fn for_each(&self, mut visit: impl FnMut(&L)) {
        let snapshot: Vec<Arc<Entry<L>>> = {
            let mut inner = self.lock();
            inner.passes += 1;
            inner
                .entries
                .iter()
                .filter(|e| !e.removed.load(Ordering::Acquire))
                .cloned()
                .collect()
        };

        let _end = PassGuard { owner: self };
        for entry in &snapshot {
            if entry.removed.load(Ordering::Acquire) {
                continue;
            }
            visit(&*entry.listener);
        }
    }

    fn finish_pass(&self) {
        let mut inner = self.lock();
        inner.passes = inner.passes.saturating_sub(1);
        if inner.passes == 0 {
            inner.entries.retain(|e| !e.removed.load(Ordering::Acquire));
        }
    }
}

/// Ends the pass even if a callback panics.
struct PassGuard<'a, L: ?Sized> {
    owner: &'a Listeners<L>,
}

impl<L: ?Sized> Drop for PassGuard<'_, L> {
    fn drop(&mut self) {
        self.owner.finish_pass();
    }
}
