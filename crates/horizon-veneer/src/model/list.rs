//! Flat item list.

use std::fmt;

use horizon_veneer_core::Signal;
use parking_lot::RwLock;

use super::{RowSource, StructuralChange};
use crate::error::{ModelError, ModelResult};

/// An ordered list of items with structural change notification.
///
/// # Example
///
/// ```
/// use horizon_veneer::model::{ItemList, StructuralChange};
///
/// let items = ItemList::new();
/// items.changed().connect(|change| {
///     println!("{change:?}");
///     Ok(())
/// });
///
/// items.push("Apple".to_string()).unwrap();
/// items.push("Banana".to_string()).unwrap();
/// assert_eq!(items.len(), 2);
/// ```
pub struct ItemList<T> {
    items: RwLock<Vec<T>>,
    changed: Signal<StructuralChange>,
}

impl<T: Clone + Send + Sync + 'static> ItemList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changed: Signal::new("items"),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A copy of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// A copy of every item.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Access the items through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        f(&self.items.read())
    }

    /// Append an item.
    pub fn push(&self, item: T) -> ModelResult<()> {
        let at = {
            let mut items = self.items.write();
            items.push(item);
            items.len() - 1
        };
        self.emit_inserted(at, 1, at + 1)
    }

    /// Append several items as one change.
    pub fn extend<I: IntoIterator<Item = T>>(&self, new_items: I) -> ModelResult<()> {
        let (at, count, row_count) = {
            let mut items = self.items.write();
            let at = items.len();
            items.extend(new_items);
            (at, items.len() - at, items.len())
        };
        if count == 0 {
            return Ok(());
        }
        self.emit_inserted(at, count, row_count)
    }

    /// Insert an item before `index`.
    pub fn insert(&self, index: usize, item: T) -> ModelResult<()> {
        let row_count = {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(ModelError::IndexOutOfRange {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, item);
            items.len()
        };
        self.emit_inserted(index, 1, row_count)
    }

    /// Remove and return the item at `index`.
    pub fn remove(&self, index: usize) -> ModelResult<T> {
        let (item, row_count) = {
            let mut items = self.items.write();
            if index >= items.len() {
                return Err(ModelError::IndexOutOfRange {
                    index,
                    len: items.len(),
                });
            }
            let item = items.remove(index);
            (item, items.len())
        };
        self.changed.emit(StructuralChange::RowsRemoved {
            at: index,
            count: 1,
            row_count,
        })?;
        Ok(item)
    }

    /// Remove `count` items starting at `index`.
    pub fn remove_range(&self, index: usize, count: usize) -> ModelResult<()> {
        let row_count = {
            let mut items = self.items.write();
            let end = index.saturating_add(count);
            if end > items.len() {
                return Err(ModelError::IndexOutOfRange {
                    index: end,
                    len: items.len(),
                });
            }
            items.drain(index..end);
            items.len()
        };
        if count == 0 {
            return Ok(());
        }
        self.changed.emit(StructuralChange::RowsRemoved {
            at: index,
            count,
            row_count,
        })?;
        Ok(())
    }

    /// Replace every item.
    pub fn set_all(&self, items: Vec<T>) -> ModelResult<()> {
        let row_count = items.len();
        *self.items.write() = items;
        self.changed.emit(StructuralChange::RowsReset { row_count })?;
        Ok(())
    }

    /// Remove every item.
    pub fn clear(&self) -> ModelResult<()> {
        self.set_all(Vec::new())
    }

    /// Replace the item at `index`. The row count is unchanged, so no
    /// structural change is emitted.
    pub fn set(&self, index: usize, item: T) -> ModelResult<T> {
        let mut items = self.items.write();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(ModelError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, item))
    }

    /// The structural change signal.
    pub fn changed(&self) -> &Signal<StructuralChange> {
        &self.changed
    }

    fn emit_inserted(&self, at: usize, count: usize, row_count: usize) -> ModelResult<()> {
        self.changed.emit(StructuralChange::RowsInserted {
            at,
            count,
            row_count,
        })?;
        Ok(())
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ItemList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> RowSource for ItemList<T> {
    fn visible_row_count(&self) -> usize {
        self.len()
    }
}

impl<T> fmt::Debug for ItemList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemList")
            .field("len", &self.items.read().len())
            .field("listeners", &self.changed.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder(list: &ItemList<String>) -> Arc<Mutex<Vec<StructuralChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        list.changed().connect(move |change| {
            seen_clone.lock().push(change.clone());
            Ok(())
        });
        seen
    }

    fn item(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_push_and_insert_emit_counts() {
        let list = ItemList::new();
        let seen = recorder(&list);

        list.push(item("a")).unwrap();
        list.insert(0, item("b")).unwrap();

        assert_eq!(list.to_vec(), vec![item("b"), item("a")]);
        assert_eq!(
            *seen.lock(),
            vec![
                StructuralChange::RowsInserted {
                    at: 0,
                    count: 1,
                    row_count: 1
                },
                StructuralChange::RowsInserted {
                    at: 0,
                    count: 1,
                    row_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let list = ItemList::from_vec(vec![item("a")]);
        let seen = recorder(&list);

        let err = list.remove(3).unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfRange { index: 3, len: 1 });
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_remove_range_and_reset() {
        let list = ItemList::from_vec((0..10).map(|i| i.to_string()).collect());
        let seen = recorder(&list);

        list.remove_range(2, 3).unwrap();
        assert_eq!(list.len(), 7);
        list.clear().unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                StructuralChange::RowsRemoved {
                    at: 2,
                    count: 3,
                    row_count: 7
                },
                StructuralChange::RowsReset { row_count: 0 },
            ]
        );
    }

    #[test]
    fn test_set_replaces_without_structural_change() {
        let list = ItemList::from_vec(vec![item("a"), item("b")]);
        let seen = recorder(&list);

        assert_eq!(list.set(1, item("c")).unwrap(), item("b"));
        assert_eq!(list.get(1), Some(item("c")));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_extend_empty_is_silent() {
        let list = ItemList::<String>::new();
        let seen = recorder(&list);
        list.extend(Vec::new()).unwrap();
        assert!(seen.lock().is_empty());
    }
}
