//! Table columns.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_veneer_core::Signal;
use parking_lot::RwLock;

use super::StructuralChange;
use crate::error::{ModelError, ModelResult};

/// Identifies a column in [`TableColumns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(u64);

static COLUMN_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Column {
    id: ColumnId,
    title: String,
    width: f64,
    visible: bool,
}

/// Default width of a new column.
pub const DEFAULT_COLUMN_WIDTH: f64 = 80.0;

/// Ordered table columns with per-column visibility.
///
/// Any edit that changes which columns are visible emits
/// [`StructuralChange::ColumnsChanged`] with the visible columns in
/// declaration order.
pub struct TableColumns {
    columns: RwLock<Vec<Column>>,
    changed: Signal<StructuralChange>,
}

impl TableColumns {
    /// Create an empty column set.
    pub fn new() -> Self {
        Self {
            columns: RwLock::new(Vec::new()),
            changed: Signal::new("columns"),
        }
    }

    /// Append a visible column.
    pub fn add(&self, title: impl Into<String>) -> ModelResult<ColumnId> {
        let id = ColumnId(COLUMN_ID_COUNTER.fetch_add(1, Ordering::Relaxed));
        let visible = {
            let mut columns = self.columns.write();
            columns.push(Column {
                id,
                title: title.into(),
                width: DEFAULT_COLUMN_WIDTH,
                visible: true,
            });
            Self::visible_of(&columns)
        };
        self.changed.emit(StructuralChange::ColumnsChanged { visible })?;
        Ok(id)
    }

    /// Remove a column.
    pub fn remove(&self, id: ColumnId) -> ModelResult<()> {
        let visible = {
            let mut columns = self.columns.write();
            let position = columns
                .iter()
                .position(|column| column.id == id)
                .ok_or(ModelError::UnknownColumn { column: id })?;
            let removed = columns.remove(position);
            if !removed.visible {
                return Ok(());
            }
            Self::visible_of(&columns)
        };
        self.changed.emit(StructuralChange::ColumnsChanged { visible })?;
        Ok(())
    }

    /// Show or hide a column. Returns whether visibility changed.
    pub fn set_visible(&self, id: ColumnId, visible: bool) -> ModelResult<bool> {
        let visible_ids = {
            let mut columns = self.columns.write();
            let column = columns
                .iter_mut()
                .find(|column| column.id == id)
                .ok_or(ModelError::UnknownColumn { column: id })?;
            if column.visible == visible {
                return Ok(false);
            }
            column.visible = visible;
            Self::visible_of(&columns)
        };
        self.changed.emit(StructuralChange::ColumnsChanged {
            visible: visible_ids,
        })?;
        Ok(true)
    }

    /// Whether a column is visible.
    pub fn is_visible(&self, id: ColumnId) -> bool {
        self.columns
            .read()
            .iter()
            .any(|column| column.id == id && column.visible)
    }

    /// Set a column's width. Widths do not change the visible column set.
    pub fn set_width(&self, id: ColumnId, width: f64) -> ModelResult<()> {
        let mut columns = self.columns.write();
        let column = columns
            .iter_mut()
            .find(|column| column.id == id)
            .ok_or(ModelError::UnknownColumn { column: id })?;
        column.width = width.max(0.0);
        Ok(())
    }

    /// A column's width.
    pub fn width(&self, id: ColumnId) -> Option<f64> {
        self.columns
            .read()
            .iter()
            .find(|column| column.id == id)
            .map(|column| column.width)
    }

    /// A column's title.
    pub fn title(&self, id: ColumnId) -> Option<String> {
        self.columns
            .read()
            .iter()
            .find(|column| column.id == id)
            .map(|column| column.title.clone())
    }

    /// Every column in declaration order.
    pub fn ids(&self) -> Vec<ColumnId> {
        self.columns.read().iter().map(|column| column.id).collect()
    }

    /// Visible columns in declaration order.
    pub fn visible_ids(&self) -> Vec<ColumnId> {
        Self::visible_of(&self.columns.read())
    }

    /// Sum of visible column widths.
    pub fn visible_width(&self) -> f64 {
        self.columns
            .read()
            .iter()
            .filter(|column| column.visible)
            .map(|column| column.width)
            .sum()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.read().len()
    }

    /// Whether there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }

    /// The structural change signal.
    pub fn changed(&self) -> &Signal<StructuralChange> {
        &self.changed
    }

    fn visible_of(columns: &[Column]) -> Vec<ColumnId> {
        columns
            .iter()
            .filter(|column| column.visible)
            .map(|column| column.id)
            .collect()
    }
}

impl Default for TableColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TableColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns.read();
        f.debug_struct("TableColumns")
            .field("columns", &columns.len())
            .field("visible", &columns.iter().filter(|c| c.visible).count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn last_visible(columns: &TableColumns) -> Arc<Mutex<Option<Vec<ColumnId>>>> {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        columns.changed().connect(move |change| {
            if let StructuralChange::ColumnsChanged { visible } = change {
                *seen_clone.lock() = Some(visible.clone());
            }
            Ok(())
        });
        seen
    }

    #[test]
    fn test_add_and_hide() {
        let columns = TableColumns::new();
        let seen = last_visible(&columns);

        let a = columns.add("Name").unwrap();
        let b = columns.add("Size").unwrap();
        let c = columns.add("Date").unwrap();
        assert_eq!(seen.lock().clone(), Some(vec![a, b, c]));

        assert!(columns.set_visible(b, false).unwrap());
        assert!(!columns.set_visible(b, false).unwrap());
        assert_eq!(seen.lock().clone(), Some(vec![a, c]));
        assert_eq!(columns.visible_ids(), vec![a, c]);
        assert_eq!(columns.len(), 3);
    }

    #[test]
    fn test_remove_hidden_column_is_silent() {
        let columns = TableColumns::new();
        let a = columns.add("Name").unwrap();
        let b = columns.add("Size").unwrap();
        columns.set_visible(b, false).unwrap();

        let seen = last_visible(&columns);
        columns.remove(b).unwrap();
        assert_eq!(*seen.lock(), None);

        columns.remove(a).unwrap();
        assert_eq!(seen.lock().clone(), Some(vec![]));
        assert!(columns.is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let columns = TableColumns::new();
        let a = columns.add("Name").unwrap();
        columns.remove(a).unwrap();
        assert_eq!(
            columns.set_visible(a, true).unwrap_err(),
            ModelError::UnknownColumn { column: a }
        );
    }

    #[test]
    fn test_visible_width() {
        let columns = TableColumns::new();
        let a = columns.add("Name").unwrap();
        let b = columns.add("Size").unwrap();
        columns.set_width(a, 120.0).unwrap();
        assert_eq!(columns.visible_width(), 120.0 + DEFAULT_COLUMN_WIDTH);
        columns.set_visible(b, false).unwrap();
        assert_eq!(columns.visible_width(), 120.0);
        assert_eq!(columns.title(a).as_deref(), Some("Name"));
    }
}
