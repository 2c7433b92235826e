//! List, table, and tree views over a [`VirtualFlow`].
//!
//! The flow is initialized from the control as soon as the skin is built, so
//! a view that already holds items never starts out empty. Structural
//! changes of the items, the tree, or the table columns reach the flow
//! through weak listeners; the viewport follows the control's size.

use std::sync::{Arc, Weak};

use horizon_veneer_core::Signal;
use parking_lot::Mutex;

use crate::config::SkinConfig;
use crate::control::{ActionEvent, Control, ControlKind};
use crate::error::SkinResult;
use crate::flow::VirtualFlow;
use crate::geometry::{Insets, Size};
use crate::input::{InputEvent, Key};
use crate::model::StructuralChange;

use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

const MIN_PREF_WIDTH: f64 = 100.0;
const PREF_HEIGHT: f64 = 400.0;
const CELL_PADDING: f64 = 8.0;

fn viewport_length(kind: ControlKind, size: Size, padding: Insets, config: &SkinConfig) -> f64 {
    let header = match kind {
        ControlKind::TableView => config.table_header_height,
        _ => 0.0,
    };
    (size.height - padding.vertical() - header).max(0.0)
}

/// Horizontal offset of a tree row's content.
pub(super) fn row_indent(control: &Control, config: &SkinConfig, row: usize) -> Option<f64> {
    let tree = control.tree();
    let level = tree.indent_level(tree.node_at_row(row)?)?;
    Some(config.disclosure_width + level as f64 * config.tree_indent)
}

#[derive(Debug)]
struct VirtualLayout {
    kind: ControlKind,
}

impl VirtualLayout {
    fn content_width(&self, cx: &LayoutCx<'_>) -> f64 {
        let metrics = &cx.config.text;
        match self.kind {
            ControlKind::TableView => cx.control.columns().visible_width(),
            ControlKind::TreeView => {
                let tree = cx.control.tree();
                tree.visible_rows()
                    .into_iter()
                    .filter_map(|node| {
                        let level = tree.indent_level(node)?;
                        let text = tree.get(node)?;
                        Some(
                            cx.config.disclosure_width
                                + level as f64 * cx.config.tree_indent
                                + metrics.text_width(&text),
                        )
                    })
                    .fold(0.0, f64::max)
                    + CELL_PADDING
            }
            _ => {
                cx.control.items().with(|items| {
                    items.iter().map(|item| metrics.text_width(item)).fold(0.0, f64::max)
                }) + CELL_PADDING
            }
        }
    }
}

impl SkinLayout for VirtualLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        CELL_PADDING + cx.control.padding().get().horizontal()
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        let content = match self.kind {
            ControlKind::TableView => self.content_width(cx).max(CELL_PADDING),
            _ => self.content_width(cx).max(MIN_PREF_WIDTH),
        };
        content + cx.control.padding().get().horizontal()
    }

    fn max_width(&self, _cx: &LayoutCx<'_>, _height: f64) -> f64 {
        f64::MAX
    }

    fn min_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        let header = match self.kind {
            ControlKind::TableView => cx.config.table_header_height,
            _ => 0.0,
        };
        header + cx.config.fixed_cell_size + cx.control.padding().get().vertical()
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        PREF_HEIGHT + cx.control.padding().get().vertical()
    }

    fn max_height(&self, _cx: &LayoutCx<'_>, _width: f64) -> f64 {
        f64::MAX
    }
}

pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    let control = cx.control;
    let kind = control.kind();

    let mut flow = VirtualFlow::new(cx.config.fixed_cell_size);
    flow.initialize(control.as_ref());
    flow.set_viewport_length(viewport_length(kind, control.size().get(), control.padding().get(), cx.config));
    let flow = Arc::new(Mutex::new(flow));

    match kind {
        ControlKind::TreeView => follow_rows(cx, "tree", control.tree().changed(), &flow),
        _ => follow_rows(cx, "items", control.items().changed(), &flow),
    }
    if kind == ControlKind::TableView {
        follow_rows(cx, "columns", control.columns().changed(), &flow);
    }

    let config = cx.config.clone();
    let weak_flow = Arc::downgrade(&flow);
    let weak_control = Arc::downgrade(control);
    cx.bridge.watch(cx.id, control.size(), move |&size| {
        resize(&weak_flow, &weak_control, |control| {
            viewport_length(kind, size, control.padding().get(), &config)
        });
        Ok(())
    });

    let config = cx.config.clone();
    let weak_flow = Arc::downgrade(&flow);
    let weak_control = Arc::downgrade(control);
    cx.bridge.watch(cx.id, control.padding(), move |&padding| {
        resize(&weak_flow, &weak_control, |control| {
            viewport_length(kind, control.size().get(), padding, &config)
        });
        Ok(())
    });

    cx.relayout_on(control.selected_index());
    SkinParts::new(VirtualLayout { kind }).with_flow(flow)
}

fn follow_rows(
    cx: &SkinContext<'_>,
    name: &'static str,
    signal: &Signal<StructuralChange>,
    flow: &Arc<Mutex<VirtualFlow>>,
) {
    let weak = Arc::downgrade(flow);
    cx.bridge.watch_signal(cx.id, name, signal, move |change| {
        if let Some(flow) = weak.upgrade() {
            flow.lock().on_structural_change(change);
        }
        Ok(())
    });
}

fn resize(
    flow: &Weak<Mutex<VirtualFlow>>,
    control: &Weak<Control>,
    length: impl FnOnce(&Control) -> f64,
) {
    if let (Some(flow), Some(control)) = (flow.upgrade(), control.upgrade()) {
        let length = length(&control);
        flow.lock().set_viewport_length(length);
    }
}

/// Selection follows clicks and arrow keys and is scrolled into view. Tree
/// rows expand and collapse with Right and Left.
pub(super) fn handle_input(
    flow: &Mutex<VirtualFlow>,
    control: &Control,
    event: &InputEvent,
) -> SkinResult<bool> {
    match event {
        InputEvent::MousePressed { y, .. } => {
            let Some(index) = flow.lock().index_at(*y) else {
                return Ok(false);
            };
            control.selected_index().set(Some(index))?;
            Ok(true)
        }
        InputEvent::KeyPressed(key @ (Key::Up | Key::Down | Key::Home | Key::End)) => {
            let count = flow.lock().cell_count();
            if count == 0 {
                return Ok(false);
            }
            let current = control.selected_index().get();
            let next = match key {
                Key::Down => current.map_or(0, |i| (i + 1).min(count - 1)),
                Key::Up => current.map_or(0, |i| i.saturating_sub(1).min(count - 1)),
                Key::Home => 0,
                _ => count - 1,
            };
            let result = control.selected_index().set(Some(next));
            flow.lock().scroll_to(next);
            result?;
            Ok(true)
        }
        InputEvent::KeyPressed(key @ (Key::Left | Key::Right)) if control.kind() == ControlKind::TreeView => {
            let tree = control.tree();
            let Some(node) = control.selected_index().get().and_then(|row| tree.node_at_row(row)) else {
                return Ok(false);
            };
            Ok(tree.set_expanded(node, *key == Key::Right)?)
        }
        InputEvent::KeyPressed(Key::Enter) => {
            let Some(index) = control.selected_index().get() else {
                return Ok(false);
            };
            control.action().emit(ActionEvent::ItemChosen { index })?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SkinRegistry;
    use crate::skin::Skin;

    fn view(kind: ControlKind, rows: usize, height: f64) -> (SkinRegistry, Arc<Control>, Arc<Skin>) {
        let registry = SkinRegistry::new();
        let control = Control::new(kind);
        control.items().extend((0..rows).map(|i| format!("row {i}"))).unwrap();
        control.size().set(Size::new(200.0, height)).unwrap();
        let skin = registry.create_skin(&control);
        registry.install(&control, skin.clone()).unwrap();
        registry.pulse();
        (registry, control, skin)
    }

    #[test]
    fn test_initialized_from_existing_items() {
        // 98 px of viewport after 1 px padding on each side: five rows of 24.
        let (_registry, _list, skin) = view(ControlKind::ListView, 1000, 100.0);
        assert_eq!(skin.cell_count(), Some(1000));
        assert_eq!(skin.with_flow(|flow| flow.materialized_count()), Some(5));
        skin.verify().unwrap();
    }

    #[test]
    fn test_items_change_reaches_flow() {
        let (registry, list, skin) = view(ControlKind::ListView, 3, 100.0);
        list.items().insert(0, "new".to_string()).unwrap();
        assert_eq!(skin.cell_count(), Some(4));
        registry.pulse();
        skin.verify().unwrap();
    }

    #[test]
    fn test_resize_changes_window() {
        let (registry, list, skin) = view(ControlKind::ListView, 100, 100.0);
        list.size().set(Size::new(200.0, 242.0)).unwrap();
        registry.pulse();
        assert_eq!(skin.with_flow(|flow| flow.materialized_count()), Some(10));
    }

    #[test]
    fn test_keyboard_selection_scrolls() {
        let (registry, list, skin) = view(ControlKind::ListView, 100, 98.0);
        registry.dispatch(&list, InputEvent::KeyPressed(Key::End)).unwrap();
        assert_eq!(list.selected_index().get(), Some(99));
        assert_eq!(skin.with_flow(|flow| flow.last_visible_cell().and_then(|c| c.index())), Some(Some(99)));

        registry.dispatch(&list, InputEvent::KeyPressed(Key::Down)).unwrap();
        assert_eq!(list.selected_index().get(), Some(99));
        registry.dispatch(&list, InputEvent::KeyPressed(Key::Up)).unwrap();
        assert_eq!(list.selected_index().get(), Some(98));
    }

    #[test]
    fn test_click_selects_row() {
        let (registry, list, _skin) = view(ControlKind::ListView, 10, 100.0);
        assert!(registry.dispatch(&list, InputEvent::MousePressed { x: 5.0, y: 50.0 }).unwrap());
        assert_eq!(list.selected_index().get(), Some(2));
        assert!(!registry.dispatch(&list, InputEvent::MousePressed { x: 5.0, y: 500.0 }).unwrap());
    }

    #[test]
    fn test_table_columns_follow_visibility() {
        let registry = SkinRegistry::new();
        let table = Control::new(ControlKind::TableView);
        let name = table.columns().add("Name").unwrap();
        let size = table.columns().add("Size").unwrap();
        table.items().extend(["a", "b"].map(String::from)).unwrap();
        table.size().set(Size::new(300.0, 200.0)).unwrap();
        let skin = registry.create_skin(&table);
        registry.install(&table, skin.clone()).unwrap();
        registry.pulse();

        table.columns().set_visible(size, false).unwrap();
        assert_eq!(skin.with_flow(|flow| flow.columns().to_vec()), Some(vec![name]));
        registry.pulse();
        skin.verify().unwrap();
        assert_eq!(table.pref_width(-1.0), 80.0 + 2.0);
    }

    #[test]
    fn test_tree_expand_and_indent() {
        let registry = SkinRegistry::new();
        let tree_view = Control::new(ControlKind::TreeView);
        let tree = tree_view.tree();
        let root = tree.set_root("root".to_string()).unwrap();
        tree.add_child(root, "a".to_string()).unwrap();
        tree.add_child(root, "b".to_string()).unwrap();
        tree_view.size().set(Size::new(200.0, 200.0)).unwrap();
        let skin = registry.create_skin(&tree_view);
        registry.install(&tree_view, skin.clone()).unwrap();
        assert_eq!(skin.cell_count(), Some(1));

        tree_view.selected_index().set(Some(0)).unwrap();
        assert!(registry.dispatch(&tree_view, InputEvent::KeyPressed(Key::Right)).unwrap());
        assert_eq!(skin.cell_count(), Some(3));
        assert_eq!(skin.row_indent(0), Some(18.0));
        assert_eq!(skin.row_indent(1), Some(28.0));
        assert_eq!(skin.row_indent(3), None);

        registry.pulse();
        skin.verify().unwrap();
        registry.dispatch(&tree_view, InputEvent::KeyPressed(Key::Left)).unwrap();
        assert_eq!(skin.cell_count(), Some(1));
    }
}
