//! Materialized cells.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::ColumnId;

/// Identifies a materialized cell or column cell.
///
/// Identity survives recycling: a cell moved to the pile and reused for
/// another row keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_cell_id() -> CellId {
    CellId(CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// The part of a row cell that shows one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCell {
    id: CellId,
    column: ColumnId,
}

impl ColumnCell {
    /// The column cell's identity.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The column it shows.
    pub fn column(&self) -> ColumnId {
        self.column
    }
}

/// A row cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    id: CellId,
    index: Option<usize>,
    columns: Vec<ColumnCell>,
}

impl Cell {
    pub(crate) fn new() -> Self {
        Self {
            id: next_cell_id(),
            index: None,
            columns: Vec::new(),
        }
    }

    /// The cell's identity.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The row shown, or `None` for a cell that no longer shows one.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    /// Column cells in column declaration order.
    pub fn columns(&self) -> &[ColumnCell] {
        &self.columns
    }

    /// The columns shown, in order.
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(ColumnCell::column).collect()
    }

    /// The column cell showing `column`.
    pub fn column_cell(&self, column: ColumnId) -> Option<&ColumnCell> {
        self.columns.iter().find(|cell| cell.column == column)
    }

    /// Rebuild the column cells to exactly `visible`, keeping the identity
    /// of column cells whose column survives.
    pub(crate) fn rebuild_columns(&mut self, visible: &[ColumnId]) {
        if self.column_ids() == visible {
            return;
        }
        let mut old = std::mem::take(&mut self.columns);
        self.columns = visible
            .iter()
            .map(|&column| match old.iter().position(|cell| cell.column == column) {
                Some(position) => old.swap_remove(position),
                None => ColumnCell {
                    id: next_cell_id(),
                    column,
                },
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableColumns;

    #[test]
    fn test_rebuild_keeps_surviving_identity() {
        let columns = TableColumns::new();
        let a = columns.add("A").unwrap();
        let b = columns.add("B").unwrap();
        let c = columns.add("C").unwrap();

        let mut cell = Cell::new();
        cell.rebuild_columns(&[a, b, c]);
        let a_id = cell.column_cell(a).map(ColumnCell::id);
        let c_id = cell.column_cell(c).map(ColumnCell::id);

        cell.rebuild_columns(&[a, c]);
        assert_eq!(cell.column_ids(), vec![a, c]);
        assert_eq!(cell.column_cell(a).map(ColumnCell::id), a_id);
        assert_eq!(cell.column_cell(c).map(ColumnCell::id), c_id);

        cell.rebuild_columns(&[a, b, c]);
        assert_eq!(cell.column_ids(), vec![a, b, c]);
        assert_eq!(cell.column_cell(c).map(ColumnCell::id), c_id);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Cell::new().id(), Cell::new().id());
    }
}
