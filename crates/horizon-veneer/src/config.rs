//! Skin configuration.
//!
//! [`SkinConfig`] carries every metric the built-in skins measure with. It is
//! built in code with `with_*` methods or loaded from TOML; missing keys fall
//! back to the defaults.
//!
//! ```
//! use horizon_veneer::config::SkinConfig;
//!
//! let config = SkinConfig::from_toml_str(
//!     r#"
//!     fixed_cell_size = 20.0
//!
//!     [reclaim]
//!     attempts = 3
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.fixed_cell_size, 20.0);
//! assert_eq!(config.reclaim.attempts, 3);
//! assert_eq!(config.reclaim.interval_ms, 500);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SkinResult;

/// Monospace text measurement used by the labeled and text skins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    /// Advance width of one character.
    pub char_width: f64,
    /// Height of one line of text.
    pub line_height: f64,
    /// String shown when text is truncated.
    pub ellipsis: String,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            ellipsis: "...".to_string(),
        }
    }
}

impl TextMetrics {
    /// Width of `text` laid out on one line.
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    /// Width of the ellipsis string.
    pub fn ellipsis_width(&self) -> f64 {
        self.text_width(&self.ellipsis)
    }
}

/// Bounded polling used when waiting for a skin to be reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimPolicy {
    /// Number of checks before giving up.
    pub attempts: u32,
    /// Pause between checks, in milliseconds.
    pub interval_ms: u64,
}

impl Default for ReclaimPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval_ms: 500,
        }
    }
}

impl ReclaimPolicy {
    /// Create a policy.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts,
            interval_ms: interval.as_millis() as u64,
        }
    }

    /// Pause between checks.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Metrics and policies shared by every skin a registry creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Text measurement.
    pub text: TextMetrics,
    /// Height of one row in a virtual flow.
    pub fixed_cell_size: f64,
    /// Indentation per tree level.
    pub tree_indent: f64,
    /// Width reserved for a tree row's disclosure arrow.
    pub disclosure_width: f64,
    /// Gap between tool bar items.
    pub toolbar_spacing: f64,
    /// Height of a table's column header row.
    pub table_header_height: f64,
    /// Rows shown at most by a combo box popup.
    pub popup_rows: usize,
    /// Caret blink half-period, in milliseconds.
    pub caret_blink_ms: u64,
    /// Time one pulse represents, in milliseconds.
    pub pulse_interval_ms: u64,
    /// Reclamation polling.
    pub reclaim: ReclaimPolicy,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            text: TextMetrics::default(),
            fixed_cell_size: 24.0,
            tree_indent: 10.0,
            disclosure_width: 18.0,
            toolbar_spacing: 4.0,
            table_header_height: 24.0,
            popup_rows: 10,
            caret_blink_ms: 500,
            pulse_interval_ms: 16,
            reclaim: ReclaimPolicy::default(),
        }
    }
}

impl SkinConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> SkinResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Set the text metrics.
    pub fn with_text_metrics(mut self, text: TextMetrics) -> Self {
        self.text = text;
        self
    }

    /// Set the row height of virtual flows.
    pub fn with_fixed_cell_size(mut self, size: f64) -> Self {
        self.fixed_cell_size = size;
        self
    }

    /// Set the per-level tree indentation.
    pub fn with_tree_indent(mut self, indent: f64) -> Self {
        self.tree_indent = indent;
        self
    }

    /// Set the disclosure arrow width.
    pub fn with_disclosure_width(mut self, width: f64) -> Self {
        self.disclosure_width = width;
        self
    }

    /// Set the tool bar item spacing.
    pub fn with_toolbar_spacing(mut self, spacing: f64) -> Self {
        self.toolbar_spacing = spacing;
        self
    }

    /// Set the table header height.
    pub fn with_table_header_height(mut self, height: f64) -> Self {
        self.table_header_height = height;
        self
    }

    /// Set the number of rows a popup list shows.
    pub fn with_popup_rows(mut self, rows: usize) -> Self {
        self.popup_rows = rows;
        self
    }

    /// Set the caret blink half-period.
    pub fn with_caret_blink(mut self, blink: Duration) -> Self {
        self.caret_blink_ms = blink.as_millis() as u64;
        self
    }

    /// Set the time one pulse represents.
    pub fn with_pulse_interval(mut self, interval: Duration) -> Self {
        self.pulse_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the reclamation polling policy.
    pub fn with_reclaim_policy(mut self, policy: ReclaimPolicy) -> Self {
        self.reclaim = policy;
        self
    }
}
