//! Controls: the widgets skins are installed on.
//!
//! A [`Control`] owns its state as reactive [`Property`] values and backing
//! collections, and holds at most one [`Skin`] in a single slot. Size queries
//! resolve the control's explicit size values first and ask the installed
//! skin only for [`USE_COMPUTED_SIZE`](crate::geometry::USE_COMPUTED_SIZE).
//!
//! # Example
//!
//! ```
//! use horizon_veneer::control::{Control, ControlKind};
//! use horizon_veneer::registry::SkinRegistry;
//!
//! let registry = SkinRegistry::new();
//! let button = Control::new(ControlKind::Button);
//! button.text().set(Some("OK".to_string())).unwrap();
//!
//! let skin = registry.create_skin(&button);
//! registry.install(&button, skin).unwrap();
//!
//! // "OK" is two characters of 7px plus 8px padding on each side.
//! assert_eq!(button.pref_width(-1.0), 30.0);
//! ```

mod kind;

pub use kind::ControlKind;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_veneer_core::{Property, Signal};
use parking_lot::RwLock;

use crate::geometry::{Insets, Size, USE_COMPUTED_SIZE, resolve_bound, resolve_pref};
use crate::model::{ColumnId, ItemList, ItemTree, RowSource, TableColumns};
use crate::skin::Skin;

/// Identifies a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

static CONTROL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Emitted through [`Control::action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    /// A button, check box, or link was activated.
    Fired,
    /// A popup entry was committed.
    ItemChosen {
        /// The committed entry.
        index: usize,
    },
}

/// A widget paired with at most one skin.
pub struct Control {
    id: ControlId,
    kind: ControlKind,
    skin: RwLock<Option<Arc<Skin>>>,

    text: Property<Option<String>>,
    selected: Property<bool>,
    indeterminate: Property<bool>,
    progress: Property<f64>,
    focused: Property<bool>,
    showing: Property<bool>,
    value: Property<Option<String>>,
    selected_index: Property<Option<usize>>,
    padding: Property<Insets>,
    size: Property<Size>,

    min_width: Property<f64>,
    pref_width: Property<f64>,
    max_width: Property<f64>,
    min_height: Property<f64>,
    pref_height: Property<f64>,
    max_height: Property<f64>,

    items: ItemList<String>,
    tree: ItemTree<String>,
    columns: TableColumns,
    action: Signal<ActionEvent>,
}

impl Control {
    /// Create a control of `kind` with no skin.
    pub fn new(kind: ControlKind) -> Arc<Self> {
        Arc::new(Self {
            id: ControlId(CONTROL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            kind,
            skin: RwLock::new(None),
            text: Property::with_default("text"),
            selected: Property::with_default("selected"),
            indeterminate: Property::with_default("indeterminate"),
            progress: Property::new("progress", 0.0),
            focused: Property::with_default("focused"),
            showing: Property::with_default("showing"),
            value: Property::with_default("value"),
            selected_index: Property::with_default("selected_index"),
            padding: Property::new("padding", kind.default_padding()),
            size: Property::with_default("size"),
            min_width: Property::new("min_width", USE_COMPUTED_SIZE),
            pref_width: Property::new("pref_width", USE_COMPUTED_SIZE),
            max_width: Property::new("max_width", USE_COMPUTED_SIZE),
            min_height: Property::new("min_height", USE_COMPUTED_SIZE),
            pref_height: Property::new("pref_height", USE_COMPUTED_SIZE),
            max_height: Property::new("max_height", USE_COMPUTED_SIZE),
            items: ItemList::new(),
            tree: ItemTree::new(),
            columns: TableColumns::new(),
            action: Signal::new("action"),
        })
    }

    /// The control's identity.
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The control's kind.
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// The skin in the control's slot.
    pub fn skin(&self) -> Option<Arc<Skin>> {
        self.skin.read().clone()
    }

    /// Whether the slot holds a skin.
    pub fn has_skin(&self) -> bool {
        self.skin.read().is_some()
    }

    pub(crate) fn swap_skin(&self, skin: Option<Arc<Skin>>) -> Option<Arc<Skin>> {
        std::mem::replace(&mut *self.skin.write(), skin)
    }

    /// Displayed text. `None` is treated as empty.
    pub fn text(&self) -> &Property<Option<String>> {
        &self.text
    }

    /// Check box state.
    pub fn selected(&self) -> &Property<bool> {
        &self.selected
    }

    /// Check box or progress bar indeterminate state.
    pub fn indeterminate(&self) -> &Property<bool> {
        &self.indeterminate
    }

    /// Progress from 0 to 1.
    pub fn progress(&self) -> &Property<f64> {
        &self.progress
    }

    /// Keyboard focus.
    pub fn focused(&self) -> &Property<bool> {
        &self.focused
    }

    /// Whether the control's popup is showing.
    pub fn showing(&self) -> &Property<bool> {
        &self.showing
    }

    /// Committed value of a combo box or color picker.
    pub fn value(&self) -> &Property<Option<String>> {
        &self.value
    }

    /// Selected row or entry.
    pub fn selected_index(&self) -> &Property<Option<usize>> {
        &self.selected_index
    }

    /// Space between the border and the content.
    pub fn padding(&self) -> &Property<Insets> {
        &self.padding
    }

    /// Size assigned by the parent layout.
    pub fn size(&self) -> &Property<Size> {
        &self.size
    }

    /// Explicit minimum width.
    pub fn min_width_property(&self) -> &Property<f64> {
        &self.min_width
    }

    /// Explicit preferred width.
    pub fn pref_width_property(&self) -> &Property<f64> {
        &self.pref_width
    }

    /// Explicit maximum width.
    pub fn max_width_property(&self) -> &Property<f64> {
        &self.max_width
    }

    /// Explicit minimum height.
    pub fn min_height_property(&self) -> &Property<f64> {
        &self.min_height
    }

    /// Explicit preferred height.
    pub fn pref_height_property(&self) -> &Property<f64> {
        &self.pref_height
    }

    /// Explicit maximum height.
    pub fn max_height_property(&self) -> &Property<f64> {
        &self.max_height
    }

    /// Flat items of lists, tables, combo boxes, menus, and tool bars.
    pub fn items(&self) -> &ItemList<String> {
        &self.items
    }

    /// Hierarchy shown by a tree view.
    pub fn tree(&self) -> &ItemTree<String> {
        &self.tree
    }

    /// Table columns.
    pub fn columns(&self) -> &TableColumns {
        &self.columns
    }

    /// Activation signal.
    pub fn action(&self) -> &Signal<ActionEvent> {
        &self.action
    }

    /// Resolved minimum width for a given height.
    pub fn min_width(&self, height: f64) -> f64 {
        resolve_bound(
            self.min_width.get(),
            || self.computed(|skin| skin.compute_min_width(self, height)),
            || self.pref_width(height),
        )
    }

    /// Resolved preferred width for a given height.
    pub fn pref_width(&self, height: f64) -> f64 {
        resolve_pref(self.pref_width.get(), || {
            self.computed(|skin| skin.compute_pref_width(self, height))
        })
    }

    /// Resolved maximum width for a given height.
    pub fn max_width(&self, height: f64) -> f64 {
        resolve_bound(
            self.max_width.get(),
            || self.computed(|skin| skin.compute_max_width(self, height)),
            || self.pref_width(height),
        )
    }

    /// Resolved minimum height for a given width.
    pub fn min_height(&self, width: f64) -> f64 {
        resolve_bound(
            self.min_height.get(),
            || self.computed(|skin| skin.compute_min_height(self, width)),
            || self.pref_height(width),
        )
    }

    /// Resolved preferred height for a given width.
    pub fn pref_height(&self, width: f64) -> f64 {
        resolve_pref(self.pref_height.get(), || {
            self.computed(|skin| skin.compute_pref_height(self, width))
        })
    }

    /// Resolved maximum height for a given width.
    pub fn max_height(&self, width: f64) -> f64 {
        resolve_bound(
            self.max_height.get(),
            || self.computed(|skin| skin.compute_max_height(self, width)),
            || self.pref_height(width),
        )
    }

    /// Ask the installed skin, or answer zero without one.
    fn computed(&self, f: impl FnOnce(&Skin) -> f64) -> f64 {
        self.skin().map_or(0.0, |skin| f(&skin))
    }
}

impl RowSource for Control {
    fn visible_row_count(&self) -> usize {
        match self.kind {
            ControlKind::TreeView => self.tree.visible_row_count(),
            _ => self.items.len(),
        }
    }

    fn visible_columns(&self) -> Vec<ColumnId> {
        match self.kind {
            ControlKind::TableView => self.columns.visible_ids(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("skin", &self.skin.read().as_ref().map(|skin| skin.id()))
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Control: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::USE_PREF_SIZE;

    #[test]
    fn test_ids_are_unique() {
        let a = Control::new(ControlKind::Label);
        let b = Control::new(ControlKind::Label);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_unskinned_sizes() {
        let control = Control::new(ControlKind::Button);
        assert!(!control.has_skin());
        assert_eq!(control.pref_width(-1.0), 0.0);
        assert_eq!(control.max_height(-1.0), 0.0);
    }

    #[test]
    fn test_explicit_sizes_win() {
        let control = Control::new(ControlKind::Label);
        control.pref_width_property().set(120.0).unwrap();
        control.min_width_property().set(USE_PREF_SIZE).unwrap();
        control.max_width_property().set(300.0).unwrap();

        assert_eq!(control.pref_width(-1.0), 120.0);
        assert_eq!(control.min_width(-1.0), 120.0);
        assert_eq!(control.max_width(-1.0), 300.0);
    }

    #[test]
    fn test_row_source_by_kind() {
        let list = Control::new(ControlKind::ListView);
        list.items().extend(["a", "b"].map(String::from)).unwrap();
        assert_eq!(list.visible_row_count(), 2);
        assert!(list.visible_columns().is_empty());

        let table = Control::new(ControlKind::TableView);
        let name = table.columns().add("Name").unwrap();
        assert_eq!(table.visible_columns(), vec![name]);

        let tree = Control::new(ControlKind::TreeView);
        tree.tree().set_root("root".to_string()).unwrap();
        assert_eq!(tree.visible_row_count(), 1);
    }

    #[test]
    fn test_default_padding() {
        let button = Control::new(ControlKind::Button);
        assert_eq!(button.padding().get(), Insets::symmetric(4.0, 8.0));
    }
}
