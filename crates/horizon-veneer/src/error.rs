//! Error types for the skin layer.

use horizon_veneer_core::EmitError;

use crate::control::ControlId;
use crate::flow::CellId;
use crate::model::{ColumnId, NodeId};
use crate::skin::SkinId;

/// Errors raised by skin lifecycle and input operations.
#[derive(Debug, thiserror::Error)]
pub enum SkinError {
    /// The skin has been disposed and cannot be installed or receive input.
    #[error("skin {skin:?} is disposed")]
    Disposed {
        /// The disposed skin.
        skin: SkinId,
    },

    /// The skin was created for a different control.
    #[error("skin {skin:?} belongs to control {owner}, not {target}")]
    ForeignSkin {
        /// The skin being installed.
        skin: SkinId,
        /// The control the skin was created for.
        owner: ControlId,
        /// The control it was offered to.
        target: ControlId,
    },

    /// The control has no installed skin.
    #[error("control {control} has no installed skin")]
    NotInstalled {
        /// The control.
        control: ControlId,
    },

    /// One or more listeners failed while a property or collection changed.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// A backing model rejected an edit.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The skin configuration could not be parsed.
    #[error("invalid skin configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// A specialized Result type for skin operations.
pub type SkinResult<T> = std::result::Result<T, SkinError>;

/// Errors raised by backing collections.
///
/// An [`ModelError::Emit`] is returned after the edit has been applied: the
/// collection changed, but some listener failed to observe it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A list index was out of bounds.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The collection length.
        len: usize,
    },

    /// The tree node does not exist.
    #[error("unknown tree node {node:?}")]
    UnknownNode {
        /// The missing node.
        node: NodeId,
    },

    /// The column does not exist.
    #[error("unknown column {column:?}")]
    UnknownColumn {
        /// The missing column.
        column: ColumnId,
    },

    /// Listeners failed while observing the change.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// A specialized Result type for model edits.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// A virtual flow has diverged from its backing source.
///
/// This always indicates a defect in change propagation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// The flow's cell count differs from the source's visible row count.
    #[error("cell count {actual} does not match source row count {expected}")]
    CellCountMismatch {
        /// Rows reported by the source.
        expected: usize,
        /// The flow's cell count.
        actual: usize,
    },

    /// A materialized cell points past the last row.
    #[error("materialized row {index} is outside 0..{cell_count}")]
    IndexOutOfRange {
        /// The cell's row.
        index: usize,
        /// The flow's cell count.
        cell_count: usize,
    },

    /// A materialized cell shows no row.
    #[error("materialized cell {cell:?} shows no row")]
    Unassigned {
        /// The cell.
        cell: CellId,
    },

    /// Materialized cells are not in ascending row order.
    #[error("materialized rows out of order at row {index}")]
    OutOfOrder {
        /// The first row found out of order.
        index: usize,
    },

    /// A row's column cells differ from the visible columns.
    #[error("row {index} has columns {actual:?}, expected {expected:?}")]
    ColumnMismatch {
        /// The row.
        index: usize,
        /// Visible columns in declaration order.
        expected: Vec<ColumnId>,
        /// Columns carried by the row.
        actual: Vec<ColumnId>,
    },
}
