//! Logging facilities for Horizon Veneer.
//!
//! Horizon Veneer uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_veneer=debug")
//!     .init();
//! ```
//!
//! Every event is emitted under one of the [`targets`], so a filter can
//! isolate a single subsystem (for example only the virtual flow).

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_veneer_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_veneer_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_veneer_core::property";
    /// Fault reporting target.
    pub const FAULT: &str = "horizon_veneer_core::fault";
    /// Skin registry (install / replace / dispose).
    pub const REGISTRY: &str = "horizon_veneer::registry";
    /// Skin capability modules.
    pub const SKIN: &str = "horizon_veneer::skin";
    /// Virtual flow (cell window) target.
    pub const FLOW: &str = "horizon_veneer::flow";
    /// Property watch bridge target.
    pub const WATCH: &str = "horizon_veneer::watch";
    /// Performance spans.
    pub const PERF: &str = "horizon_veneer::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time whole operations such as a layout pulse.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_veneer::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_prefixes() {
        for target in [targets::SIGNAL, targets::PROPERTY, targets::FAULT] {
            assert!(target.starts_with(targets::CORE));
        }
        for target in [targets::REGISTRY, targets::SKIN, targets::FLOW, targets::WATCH] {
            assert!(target.starts_with("horizon_veneer::"));
        }
    }

    #[test]
    fn test_perf_span_with_subscriber() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new("pulse");
            tracing::info!(target: "horizon_veneer::perf", "inside span");
        });
    }
}
