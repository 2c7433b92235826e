//! Virtualized row container.
//!
//! A [`VirtualFlow`] represents a scrollable column of fixed-height rows of
//! which only the rows intersecting the viewport are materialized as
//! [`Cell`]s. The flow's `cell_count` is taken from the backing source when
//! the flow is initialized and from every [`StructuralChange`] afterwards, so
//! it is never stale, even before the first layout.
//!
//! # Windowing
//!
//! [`VirtualFlow::layout`] reconciles the materialized window with the
//! visible range: cells that left the range move to a pile, and missing rows
//! are filled from the pile before new cells are created. A pile cell that
//! last showed the requested row is preferred.
//!
//! ```
//! use horizon_veneer::flow::VirtualFlow;
//! use horizon_veneer::model::ItemList;
//!
//! let items = ItemList::from_vec((0..100).map(|i| i.to_string()).collect());
//! let mut flow = VirtualFlow::new(24.0);
//! flow.initialize(&items);
//! assert_eq!(flow.cell_count(), 100);
//!
//! flow.set_viewport_length(240.0);
//! flow.layout();
//! assert_eq!(flow.visible_range(), 0..10);
//!
//! flow.scroll_to(50);
//! assert!(flow.index_to_cell(50).is_some());
//! assert!(flow.index_to_cell(0).is_none());
//! ```

mod cell;

pub use cell::{Cell, CellId, ColumnCell};

use std::ops::Range;

use crate::error::StructureError;
use crate::model::{ColumnId, RowSource, StructuralChange};

/// A windowed view over a row source.
#[derive(Debug, Clone)]
pub struct VirtualFlow {
    cell_count: usize,
    fixed_cell_size: f64,
    viewport_length: f64,
    offset: f64,
    columns: Vec<ColumnId>,
    cells: Vec<Cell>,
    pile: Vec<Cell>,
    created: usize,
    needs_layout: bool,
}

impl VirtualFlow {
    /// Create an empty flow whose rows are `fixed_cell_size` tall.
    pub fn new(fixed_cell_size: f64) -> Self {
        Self {
            cell_count: 0,
            fixed_cell_size: fixed_cell_size.max(1.0),
            viewport_length: 0.0,
            offset: 0.0,
            columns: Vec::new(),
            cells: Vec::new(),
            pile: Vec::new(),
            created: 0,
            needs_layout: true,
        }
    }

    /// Size the flow from `source`, dropping every materialized row.
    pub fn initialize(&mut self, source: &dyn RowSource) {
        self.cell_count = source.visible_row_count();
        self.columns = source.visible_columns();
        self.recycle_all();
        self.clamp_offset();
        self.needs_layout = true;
        tracing::debug!(
            target: "horizon_veneer::flow",
            cell_count = self.cell_count,
            columns = self.columns.len(),
            "flow initialized"
        );
    }

    /// Number of logical rows.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Row height.
    pub fn fixed_cell_size(&self) -> f64 {
        self.fixed_cell_size
    }

    /// Change the row height. Non-positive sizes are ignored.
    pub fn set_fixed_cell_size(&mut self, size: f64) {
        if size > 0.0 && size != self.fixed_cell_size {
            self.fixed_cell_size = size;
            self.clamp_offset();
            self.needs_layout = true;
        }
    }

    /// Length of the visible region.
    pub fn viewport_length(&self) -> f64 {
        self.viewport_length
    }

    /// Resize the visible region.
    pub fn set_viewport_length(&mut self, length: f64) {
        let length = length.max(0.0);
        if length != self.viewport_length {
            self.viewport_length = length;
            self.clamp_offset();
            self.needs_layout = true;
        }
    }

    /// Visible columns in declaration order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// Length of all rows laid end to end.
    pub fn total_length(&self) -> f64 {
        self.cell_count as f64 * self.fixed_cell_size
    }

    /// Largest valid scroll offset.
    pub fn max_offset(&self) -> f64 {
        (self.total_length() - self.viewport_length).max(0.0)
    }

    /// Scroll offset in pixels from the first row.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scroll to a pixel offset, clamped to the valid range.
    pub fn set_offset(&mut self, offset: f64) {
        self.apply_offset(offset);
    }

    /// Scroll position as a fraction of the scrollable range.
    pub fn position(&self) -> f64 {
        let max = self.max_offset();
        if max <= 0.0 { 0.0 } else { self.offset / max }
    }

    /// Scroll to a fraction of the scrollable range.
    pub fn set_position(&mut self, position: f64) {
        let max = self.max_offset();
        self.apply_offset(position.clamp(0.0, 1.0) * max);
    }

    /// Rows intersecting the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        if self.cell_count == 0 || self.viewport_length <= 0.0 {
            return 0..0;
        }
        let size = self.fixed_cell_size;
        let end = (((self.offset + self.viewport_length) / size).ceil() as usize).min(self.cell_count);
        let start = ((self.offset / size).floor() as usize).min(end);
        start..end
    }

    /// Row under a point `y` pixels below the top of the viewport.
    pub fn index_at(&self, y: f64) -> Option<usize> {
        if y < 0.0 || y >= self.viewport_length {
            return None;
        }
        let index = ((self.offset + y) / self.fixed_cell_size).floor() as usize;
        (index < self.cell_count).then_some(index)
    }

    /// Whether the window is out of date.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Mark the window out of date.
    pub fn request_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Materialize exactly the visible rows.
    pub fn layout(&mut self) {
        let range = self.visible_range();

        let mut kept = Vec::with_capacity(range.len());
        for cell in self.cells.drain(..) {
            match cell.index() {
                Some(index) if range.contains(&index) => kept.push(cell),
                _ => self.pile.push(cell),
            }
        }

        let mut kept = kept.into_iter().peekable();
        let mut window = Vec::with_capacity(range.len());
        for index in range.clone() {
            match kept.next_if(|cell| cell.index() == Some(index)) {
                Some(cell) => window.push(cell),
                None => {
                    let cell = self.get_available_cell(index);
                    window.push(cell);
                }
            }
        }
        self.pile.extend(kept);

        self.cells = window;
        self.needs_layout = false;
        tracing::trace!(
            target: "horizon_veneer::flow",
            start = range.start,
            end = range.end,
            pile = self.pile.len(),
            created = self.created,
            "flow laid out"
        );
    }

    /// Take a cell for `index`: a pile cell that last showed `index`, then
    /// any pile cell, then a new cell.
    fn get_available_cell(&mut self, index: usize) -> Cell {
        let mut cell = match self
            .pile
            .iter()
            .position(|cell| cell.index() == Some(index))
        {
            Some(position) => self.pile.swap_remove(position),
            None => match self.pile.pop() {
                Some(cell) => cell,
                None => {
                    self.created += 1;
                    Cell::new()
                }
            },
        };
        cell.set_index(Some(index));
        cell.rebuild_columns(&self.columns);
        cell
    }

    /// The cell materialized for a row, or `None` if the row is not
    /// materialized.
    pub fn index_to_cell(&self, index: usize) -> Option<CellId> {
        self.cell(index).map(Cell::id)
    }

    /// The row a materialized cell shows.
    pub fn cell_to_index(&self, id: CellId) -> Option<usize> {
        self.cells
            .iter()
            .find(|cell| cell.id() == id)
            .and_then(Cell::index)
    }

    /// The materialized cell for a row.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells
            .binary_search_by_key(&Some(index), Cell::index)
            .ok()
            .map(|position| &self.cells[position])
    }

    /// Materialized cells in row order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// First row intersecting the viewport, if materialized.
    pub fn first_visible_cell(&self) -> Option<&Cell> {
        let range = self.visible_range();
        if range.is_empty() {
            return None;
        }
        self.cell(range.start)
    }

    /// Last row intersecting the viewport, if materialized.
    pub fn last_visible_cell(&self) -> Option<&Cell> {
        let range = self.visible_range();
        if range.is_empty() {
            return None;
        }
        self.cell(range.end - 1)
    }

    /// Number of materialized cells.
    pub fn materialized_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells waiting for reuse.
    pub fn pile_len(&self) -> usize {
        self.pile.len()
    }

    /// Number of cells ever created by this flow.
    pub fn created_cell_count(&self) -> usize {
        self.created
    }

    /// Scroll the least distance that shows `index` entirely.
    ///
    /// Returns whether the offset changed. The window is laid out afterwards.
    pub fn scroll_to(&mut self, index: usize) -> bool {
        if index >= self.cell_count {
            return false;
        }
        let top = index as f64 * self.fixed_cell_size;
        let bottom = top + self.fixed_cell_size;
        let target = if top < self.offset {
            top
        } else if bottom > self.offset + self.viewport_length {
            (bottom - self.viewport_length).min(top)
        } else {
            self.offset
        };
        let moved = self.apply_offset(target) != 0.0;
        self.layout();
        moved
    }

    /// Scroll so `index` is the first row. Returns whether the offset changed.
    pub fn scroll_to_top(&mut self, index: usize) -> bool {
        if index >= self.cell_count {
            return false;
        }
        let moved = self.apply_offset(index as f64 * self.fixed_cell_size) != 0.0;
        self.layout();
        moved
    }

    /// Scroll by `delta` pixels, returning the distance actually scrolled.
    pub fn scroll_pixels(&mut self, delta: f64) -> f64 {
        let applied = self.apply_offset(self.offset + delta);
        if applied != 0.0 {
            self.layout();
        }
        applied
    }

    /// Apply a change of the backing source.
    pub fn on_structural_change(&mut self, change: &StructuralChange) {
        match change {
            StructuralChange::RowsInserted { at, count, row_count } => {
                for cell in &mut self.cells {
                    if let Some(index) = cell.index().filter(|index| index >= at) {
                        cell.set_index(Some(index + count));
                    }
                }
                self.cell_count = *row_count;
            }
            StructuralChange::RowsRemoved { at, count, row_count } => {
                let removed = *at..at + count;
                let (gone, kept): (Vec<Cell>, Vec<Cell>) = std::mem::take(&mut self.cells)
                    .into_iter()
                    .partition(|cell| cell.index().is_some_and(|index| removed.contains(&index)));
                for mut cell in gone {
                    cell.set_index(None);
                    self.pile.push(cell);
                }
                self.cells = kept;
                for cell in &mut self.cells {
                    if let Some(index) = cell.index().filter(|&index| index >= removed.end) {
                        cell.set_index(Some(index - count));
                    }
                }
                self.cell_count = *row_count;
            }
            StructuralChange::RowsReset { row_count } => {
                self.recycle_all();
                self.cell_count = *row_count;
            }
            StructuralChange::ColumnsChanged { visible } => {
                self.columns = visible.clone();
                for cell in self.cells.iter_mut().chain(self.pile.iter_mut()) {
                    cell.rebuild_columns(visible);
                }
            }
        }
        self.release_past_end();
        self.clamp_offset();
        self.needs_layout = true;
        tracing::debug!(
            target: "horizon_veneer::flow",
            ?change,
            cell_count = self.cell_count,
            materialized = self.cells.len(),
            "structural change applied"
        );
    }

    /// Drop every materialized and piled cell. Returns how many were dropped.
    pub fn release_all(&mut self) -> usize {
        let released = self.cells.len() + self.pile.len();
        self.cells.clear();
        self.pile.clear();
        self.needs_layout = true;
        tracing::trace!(target: "horizon_veneer::flow", released, "cells released");
        released
    }

    /// Check the flow against its source.
    pub fn verify(&self, source: &dyn RowSource) -> Result<(), StructureError> {
        let expected = source.visible_row_count();
        if self.cell_count != expected {
            return Err(StructureError::CellCountMismatch {
                expected,
                actual: self.cell_count,
            });
        }

        let columns = source.visible_columns();
        let mut previous = None;
        for cell in &self.cells {
            let index = cell
                .index()
                .ok_or(StructureError::Unassigned { cell: cell.id() })?;
            if index >= self.cell_count {
                return Err(StructureError::IndexOutOfRange {
                    index,
                    cell_count: self.cell_count,
                });
            }
            if previous.is_some_and(|previous| previous >= index) {
                return Err(StructureError::OutOfOrder { index });
            }
            previous = Some(index);

            let actual = cell.column_ids();
            if actual != columns {
                return Err(StructureError::ColumnMismatch {
                    index,
                    expected: columns,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn recycle_all(&mut self) {
        for mut cell in self.cells.drain(..) {
            cell.set_index(None);
            self.pile.push(cell);
        }
    }

    fn release_past_end(&mut self) {
        let cell_count = self.cell_count;
        let (past, kept): (Vec<Cell>, Vec<Cell>) = std::mem::take(&mut self.cells)
            .into_iter()
            .partition(|cell| cell.index().is_some_and(|index| index >= cell_count));
        self.cells = kept;
        for mut cell in past {
            cell.set_index(None);
            self.pile.push(cell);
        }
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    /// Move to a clamped offset, returning the applied delta.
    fn apply_offset(&mut self, target: f64) -> f64 {
        let target = target.clamp(0.0, self.max_offset());
        let delta = target - self.offset;
        if delta != 0.0 {
            self.offset = target;
            self.needs_layout = true;
        }
        delta
    }
}
