//! Error types for Horizon Veneer core.

use crate::signal::ConnectionId;

/// An error returned by a slot (listener callback).
///
/// Slots report failures instead of panicking so that emission can keep
/// running the remaining slots and hand every failure back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SlotError {
    message: String,
}

impl SlotError {
    /// Create a slot error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type returned by slots.
pub type SlotResult = std::result::Result<(), SlotError>;

/// One or more slots failed during a signal emission.
///
/// All slots still ran; `failures` lists each failing connection in the
/// order the slots were invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} slot(s) failed during emission of '{signal}': {}", failures.len(), first_message(failures))]
pub struct EmitError {
    /// Name of the emitting signal (the property name for property signals).
    pub signal: &'static str,
    /// The failing connections and their errors.
    pub failures: Vec<(ConnectionId, SlotError)>,
}

impl EmitError {
    /// The first failure, which is what most callers report.
    pub fn first(&self) -> Option<&SlotError> {
        self.failures.first().map(|(_, err)| err)
    }

    /// Number of failed slots.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

fn first_message(failures: &[(ConnectionId, SlotError)]) -> &str {
    failures
        .first()
        .map(|(_, err)| err.message())
        .unwrap_or("")
}

/// A specialized Result type for emissions.
pub type EmitResult<T> = std::result::Result<T, EmitError>;
