//! Signal/slot system for Horizon Veneer.
//!
//! Signals notify connected slots (callbacks) synchronously on the emitting
//! thread. Unlike a fire-and-forget observer list, every slot returns a
//! [`SlotResult`]: emission runs all slots even when some fail and returns the
//! collected failures to the caller as an [`EmitError`].
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`WeakSignal<Args>`] - Non-owning handle used to disconnect later
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Reentrancy
//!
//! The connection table is snapshotted before slots run and no lock is held
//! while they execute, so a slot may connect, disconnect, or emit other
//! signals without deadlocking.
//!
//! # Example
//!
//! ```
//! use horizon_veneer_core::Signal;
//!
//! let text_changed = Signal::<String>::new("text");
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text is now: {text}");
//!     Ok(())
//! });
//!
//! text_changed.emit("Hello".to_string()).unwrap();
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{EmitError, EmitResult, SlotResult};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`] or [`WeakSignal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) -> SlotResult + Send + Sync>;

struct SignalShared<Args> {
    name: &'static str,
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync` when `Args` is `Send + Sync`. Slots are
/// always invoked directly on the emitting thread.
pub struct Signal<Args> {
    shared: Arc<SignalShared<Args>>,
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    ///
    /// The name shows up in logs and in [`EmitError`]s.
    pub fn new(name: &'static str) -> Self {
        Self {
            shared: Arc::new(SignalShared {
                name,
                connections: Mutex::new(SlotMap::with_key()),
                blocked: AtomicBool::new(false),
            }),
        }
    }

    /// The signal's name.
    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Connect a slot to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) -> SlotResult + Send + Sync + 'static,
    {
        let id = self.shared.connections.lock().insert(Arc::new(slot));
        tracing::trace!(target: "horizon_veneer_core::signal", signal = self.shared.name, ?id, "connected slot");
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.shared.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.shared.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.lock().len()
    }

    /// Check whether a connection is still live.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.shared.connections.lock().contains_key(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing and succeed.
    pub fn set_blocked(&self, blocked: bool) {
        self.shared.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.shared.blocked.load(Ordering::SeqCst)
    }

    /// Create a non-owning handle to this signal.
    pub fn downgrade(&self) -> WeakSignal<Args> {
        WeakSignal {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Every slot runs even if an earlier one fails. If any slot fails, the
    /// failures are returned together; the connection table is not modified
    /// by a failing slot.
    #[tracing::instrument(skip_all, target = "horizon_veneer_core::signal", level = "trace", fields(signal = self.shared.name))]
    pub fn emit(&self, args: Args) -> EmitResult<()> {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_veneer_core::signal", "signal blocked, skipping emit");
            return Ok(());
        }

        let slots: Vec<(ConnectionId, Slot<Args>)> = {
            let connections = self.shared.connections.lock();
            connections
                .iter()
                .map(|(id, slot)| (id, Arc::clone(slot)))
                .collect()
        };
        tracing::trace!(target: "horizon_veneer_core::signal", connection_count = slots.len(), "emitting signal");

        let mut failures = Vec::new();
        for (id, slot) in slots {
            if let Err(err) = slot(&args) {
                tracing::debug!(target: "horizon_veneer_core::signal", ?id, error = %err, "slot failed");
                failures.push((id, err));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EmitError {
                signal: self.shared.name,
                failures,
            })
        }
    }

    /// Connect a slot with automatic disconnection when the guard is dropped.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) -> SlotResult + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: self.downgrade(),
            id,
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.shared.name)
            .field("connections", &self.shared.connections.lock().len())
            .finish()
    }
}

/// A non-owning handle to a [`Signal`].
///
/// Holding a `WeakSignal` never keeps the signal (or the slots it stores)
/// alive. Disconnecting through a dead handle is a no-op.
pub struct WeakSignal<Args> {
    shared: Weak<SignalShared<Args>>,
}

impl<Args> WeakSignal<Args> {
    /// Disconnect a slot if the signal is still alive.
    ///
    /// Returns `true` if the connection existed and was removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.connections.lock().remove(id).is_some())
    }

    /// Whether the signal has been dropped.
    pub fn is_dropped(&self) -> bool {
        self.shared.strong_count() == 0
    }
}

impl<Args> Clone for WeakSignal<Args> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// An RAII guard that disconnects a slot when dropped.
///
/// The guard holds only a weak handle, so it may outlive the signal.
///
/// # Example
///
/// ```
/// use horizon_veneer_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new("value");
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///         Ok(())
///     });
///     signal.emit(42).unwrap();
/// }
/// signal.emit(43).unwrap();  // connection was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args> {
    signal: WeakSignal<Args>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(WeakSignal<String>: Send, Sync);
