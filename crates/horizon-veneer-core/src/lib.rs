//! Core systems for Horizon Veneer.
//!
//! This crate provides the reactive foundation the skin layer is built on:
//!
//! - **Signal/Slot System**: Synchronous notifications whose slots report
//!   failures instead of panicking
//! - **Property System**: Values with change notification
//! - **Fault Sinks**: Injected receivers for failures on infallible paths
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_veneer_core::Signal;
//!
//! let value_changed = Signal::<i32>::new("value");
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {value}");
//!     Ok(())
//! });
//!
//! value_changed.emit(42).unwrap();
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Property Example
//!
//! ```
//! use horizon_veneer_core::{Property, SlotError};
//!
//! let progress = Property::new("progress", 0.0_f64);
//! progress.changed().connect(|&value| {
//!     if value > 1.0 {
//!         return Err(SlotError::new("progress out of range"));
//!     }
//!     Ok(())
//! });
//!
//! assert!(progress.set(0.5).unwrap());
//! assert!(progress.set(2.0).is_err());
//! ```

mod error;
pub mod fault;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::{EmitError, EmitResult, SlotError, SlotResult};
pub use fault::{CollectingFaultSink, Fault, FaultSink, TracingFaultSink};
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal, WeakSignal};
