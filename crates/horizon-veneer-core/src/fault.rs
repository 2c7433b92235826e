//! Fault sinks for errors that cannot be returned to a caller.
//!
//! Some paths must not fail: disposing a skin, for instance, is idempotent
//! and infallible. Listener failures raised on such a path are handed to an
//! injected [`FaultSink`] instead of being dropped or panicking.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_veneer_core::{CollectingFaultSink, FaultSink};
//!
//! let sink = Arc::new(CollectingFaultSink::new());
//! let injected: Arc<dyn FaultSink> = sink.clone();
//! // ... pass `injected` to the component under test ...
//! assert!(sink.is_empty());
//! ```

use parking_lot::Mutex;

use crate::error::EmitError;

/// A failure reported on an infallible path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// The operation that observed the failure (e.g. `"dispose"`).
    pub operation: &'static str,
    /// The listener failures.
    pub error: EmitError,
}

impl Fault {
    /// Create a fault for an operation.
    pub fn new(operation: &'static str, error: EmitError) -> Self {
        Self { operation, error }
    }
}

/// Receives faults that could not be propagated to a caller.
pub trait FaultSink: Send + Sync {
    /// Report a fault.
    fn report(&self, fault: Fault);
}

impl<F> FaultSink for F
where
    F: Fn(Fault) + Send + Sync,
{
    fn report(&self, fault: Fault) {
        self(fault)
    }
}

/// The default sink: logs faults at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn report(&self, fault: Fault) {
        tracing::error!(
            target: "horizon_veneer_core::fault",
            operation = fault.operation,
            signal = fault.error.signal,
            failures = fault.error.failure_count(),
            error = %fault.error,
            "fault on infallible path"
        );
    }
}

/// A sink that records every fault, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingFaultSink {
    faults: Mutex<Vec<Fault>>,
}

impl CollectingFaultSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the faults recorded so far.
    pub fn faults(&self) -> Vec<Fault> {
        self.faults.lock().clone()
    }

    /// Take and clear the recorded faults.
    pub fn take(&self) -> Vec<Fault> {
        std::mem::take(&mut *self.faults.lock())
    }

    /// Number of recorded faults.
    pub fn len(&self) -> usize {
        self.faults.lock().len()
    }

    /// Whether no fault was recorded.
    pub fn is_empty(&self) -> bool {
        self.faults.lock().is_empty()
    }
}

impl FaultSink for CollectingFaultSink {
    fn report(&self, fault: Fault) {
        self.faults.lock().push(fault);
    }
}
