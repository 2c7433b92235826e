//! Backing collections for virtualized controls.
//!
//! - [`ItemList`] - an ordered list of items
//! - [`ItemTree`] - expandable nodes with an optionally hidden root
//! - [`TableColumns`] - ordered columns with per-column visibility
//!
//! Every edit that changes the visible rows or the visible columns emits a
//! [`StructuralChange`] carrying the authoritative new count, so observers
//! never have to recount.

mod columns;
mod list;
mod tree;

pub use columns::{ColumnId, DEFAULT_COLUMN_WIDTH, TableColumns};
pub use list::ItemList;
pub use tree::{ItemTree, NodeId};

/// A change to the visible shape of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralChange {
    /// `count` rows were inserted starting at row `at`.
    RowsInserted {
        /// First inserted row.
        at: usize,
        /// Number of inserted rows.
        count: usize,
        /// Visible rows after the change.
        row_count: usize,
    },
    /// `count` rows starting at row `at` were removed.
    RowsRemoved {
        /// First removed row.
        at: usize,
        /// Number of removed rows.
        count: usize,
        /// Visible rows after the change.
        row_count: usize,
    },
    /// Every row may have changed.
    RowsReset {
        /// Visible rows after the change.
        row_count: usize,
    },
    /// The set of visible columns changed.
    ColumnsChanged {
        /// Visible columns in declaration order.
        visible: Vec<ColumnId>,
    },
}

impl StructuralChange {
    /// The visible row count after a row change, or `None` for column changes.
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::RowsInserted { row_count, .. }
            | Self::RowsRemoved { row_count, .. }
            | Self::RowsReset { row_count } => Some(*row_count),
            Self::ColumnsChanged { .. } => None,
        }
    }
}

/// Anything a virtual flow can be sized from.
pub trait RowSource {
    /// Number of rows currently visible.
    fn visible_row_count(&self) -> usize;

    /// Visible columns in declaration order. Empty for single-column rows.
    fn visible_columns(&self) -> Vec<ColumnId> {
        Vec::new()
    }
}
