//! Leak-safe listener registration.
//!
//! Skins observe their control through the [`PropertyWatchBridge`]. Every
//! registration is recorded under the owning skin, so disposal can remove
//! all of them with one [`unwatch_all`](PropertyWatchBridge::unwatch_all)
//! call. The bridge keeps only weak handles to the observed signals; it never
//! extends the lifetime of a control.
//!
//! Registered and unregistered totals are counted, which makes leak audits
//! deterministic: after every skin is disposed, both totals match.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_veneer_core::{ConnectionId, Property, Signal, SlotResult};
use parking_lot::Mutex;

use crate::skin::SkinId;

type Detach = Box<dyn Fn() -> bool + Send + Sync>;

struct Registration {
    name: &'static str,
    connection: ConnectionId,
    detach: Detach,
}

/// Registered and unregistered listener totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchStats {
    /// Listeners ever registered.
    pub registered: usize,
    /// Listeners removed again.
    pub unregistered: usize,
}

impl WatchStats {
    /// Listeners still registered.
    pub fn active(&self) -> usize {
        self.registered - self.unregistered
    }
}

/// Records listener registrations per owning skin.
#[derive(Default)]
pub struct PropertyWatchBridge {
    registrations: Mutex<HashMap<SkinId, Vec<Registration>>>,
    registered: AtomicUsize,
    unregistered: AtomicUsize,
}

impl PropertyWatchBridge {
    /// Create an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a property on behalf of `owner`.
    pub fn watch<T, F>(&self, owner: SkinId, property: &Property<T>, callback: F) -> ConnectionId
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> SlotResult + Send + Sync + 'static,
    {
        self.watch_signal(owner, property.name(), property.changed(), callback)
    }

    /// Observe a signal on behalf of `owner`.
    pub fn watch_signal<A, F>(
        &self,
        owner: SkinId,
        name: &'static str,
        signal: &Signal<A>,
        callback: F,
    ) -> ConnectionId
    where
        A: 'static,
        F: Fn(&A) -> SlotResult + Send + Sync + 'static,
    {
        let connection = signal.connect(callback);
        let weak = signal.downgrade();
        let registration = Registration {
            name,
            connection,
            detach: Box::new(move || weak.disconnect(connection)),
        };

        self.registrations
            .lock()
            .entry(owner)
            .or_default()
            .push(registration);
        self.registered.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(target: "horizon_veneer::watch", ?owner, property = name, "listener registered");
        connection
    }

    /// Remove one registration. Returns whether it existed.
    pub fn unwatch(&self, owner: SkinId, connection: ConnectionId) -> bool {
        let registration = {
            let mut registrations = self.registrations.lock();
            let Some(list) = registrations.get_mut(&owner) else {
                return false;
            };
            let Some(position) = list.iter().position(|r| r.connection == connection) else {
                return false;
            };
            let registration = list.remove(position);
            if list.is_empty() {
                registrations.remove(&owner);
            }
            registration
        };
        (registration.detach)();
        self.unregistered.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Remove every registration of `owner`, returning how many there were.
    pub fn unwatch_all(&self, owner: SkinId) -> usize {
        let removed = self.registrations.lock().remove(&owner).unwrap_or_default();
        let count = removed.len();
        // Detach outside the lock: a signal may be emitting right now.
        for registration in removed {
            (registration.detach)();
        }
        self.unregistered.fetch_add(count, Ordering::SeqCst);
        if count > 0 {
            tracing::debug!(target: "horizon_veneer::watch", ?owner, count, "listeners unregistered");
        }
        count
    }

    /// Registrations held by `owner`.
    pub fn active_count(&self, owner: SkinId) -> usize {
        self.registrations.lock().get(&owner).map_or(0, Vec::len)
    }

    /// Registrations held by every owner.
    pub fn total_active(&self) -> usize {
        self.registrations.lock().values().map(Vec::len).sum()
    }

    /// Names of the properties and signals `owner` observes.
    pub fn watched(&self, owner: SkinId) -> Vec<&'static str> {
        self.registrations
            .lock()
            .get(&owner)
            .map(|list| list.iter().map(|r| r.name).collect())
            .unwrap_or_default()
    }

    /// Registration totals.
    pub fn stats(&self) -> WatchStats {
        WatchStats {
            registered: self.registered.load(Ordering::SeqCst),
            unregistered: self.unregistered.load(Ordering::SeqCst),
        }
    }
}

impl fmt::Debug for PropertyWatchBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyWatchBridge")
            .field("owners", &self.registrations.lock().len())
            .field("stats", &self.stats())
            .finish()
    }
}

static_assertions::assert_impl_all!(PropertyWatchBridge: Send, Sync);
