//! Drop-down popups for combo boxes, menu buttons, and color pickers.
//!
//! The control's `showing` property is the source of truth: the popup opens
//! and closes by listening to it. Key and mouse handling only ever write
//! `showing`, never the popup directly.
//!
//! A combo box lists its items through a [`VirtualFlow`] sized to at most
//! [`SkinConfig::popup_rows`] rows, materialized only while open.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::SkinConfig;
use crate::control::{ActionEvent, Control, ControlKind};
use crate::error::SkinResult;
use crate::flow::VirtualFlow;
use crate::input::{InputEvent, Key};
use crate::model::StructuralChange;

use super::labeled::{Graphic, LabeledLayout};
use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

/// Colors offered by a color picker, as `#rrggbb`.
pub const PALETTE: [&str; 12] = [
    "#000000", "#ffffff", "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#00ffff", "#ff00ff",
    "#808080", "#800000", "#008000", "#000080",
];

const ARROW_BUTTON_WIDTH: f64 = 20.0;
const SWATCH: f64 = 16.0;
const SWATCH_GAP: f64 = 4.0;

/// Open state and keyboard highlight of a popup.
#[derive(Debug)]
pub(crate) struct Popup {
    kind: ControlKind,
    open: AtomicBool,
    highlighted: Mutex<Option<usize>>,
}

impl Popup {
    fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            open: AtomicBool::new(false),
            highlighted: Mutex::new(None),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub(crate) fn highlighted(&self) -> Option<usize> {
        *self.highlighted.lock()
    }

    fn show(&self, highlight: Option<usize>) {
        *self.highlighted.lock() = highlight;
        self.open.store(true, Ordering::Release);
        tracing::trace!(target: "horizon_veneer::skin", kind = %self.kind, ?highlight, "popup shown");
    }

    /// Close the popup. Returns whether it was open.
    pub(crate) fn hide(&self) -> bool {
        *self.highlighted.lock() = None;
        self.open.swap(false, Ordering::AcqRel)
    }

    fn move_highlight(&self, down: bool, count: usize) -> Option<usize> {
        let mut highlighted = self.highlighted.lock();
        if count == 0 {
            *highlighted = None;
            return None;
        }
        let next = match (*highlighted, down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(count - 1),
            (Some(i), false) => i.saturating_sub(1).min(count - 1),
        };
        *highlighted = Some(next);
        Some(next)
    }
}

fn entry_count(control: &Control) -> usize {
    match control.kind() {
        ControlKind::ColorPicker => PALETTE.len(),
        _ => control.items().len(),
    }
}

/// Where the highlight starts when the popup opens.
fn initial_highlight(control: &Control) -> Option<usize> {
    let count = entry_count(control);
    let current = match control.kind() {
        ControlKind::ComboBox => control.selected_index().get(),
        ControlKind::ColorPicker => control
            .value()
            .with(|value| value.as_deref().and_then(|v| PALETTE.iter().position(|c| c.eq_ignore_ascii_case(v)))),
        _ => None,
    };
    current.filter(|&i| i < count).or((count > 0).then_some(0))
}

fn list_viewport(config: &SkinConfig, open: bool, rows: usize) -> f64 {
    if open {
        rows.min(config.popup_rows) as f64 * config.fixed_cell_size
    } else {
        0.0
    }
}

/// Open and close the popup with the control's `showing` property.
fn attach(cx: &SkinContext<'_>) -> Arc<Popup> {
    let popup = Arc::new(Popup::new(cx.control.kind()));
    if cx.control.showing().get() {
        popup.show(initial_highlight(cx.control));
    }

    let weak_popup = Arc::downgrade(&popup);
    let weak_control = Arc::downgrade(cx.control);
    cx.bridge.watch(cx.id, cx.control.showing(), move |&showing| {
        let (Some(popup), Some(control)) = (weak_popup.upgrade(), weak_control.upgrade()) else {
            return Ok(());
        };
        if showing {
            popup.show(initial_highlight(&control));
        } else {
            popup.hide();
        }
        Ok(())
    });
    cx.relayout_on(cx.control.showing());
    popup
}

/// Combo box and color picker.
pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    let kind = cx.control.kind();
    let popup = attach(cx);
    cx.relayout_on(cx.control.value());
    let parts = SkinParts::new(PopupLayout { kind }).with_popup(popup.clone());
    if kind != ControlKind::ComboBox {
        return parts;
    }

    cx.relayout_on_signal("items", cx.control.items().changed());
    let list = Arc::new(Mutex::new(popup_list(cx.control, cx.config, popup.is_open())));

    let config = cx.config.clone();
    let weak_list = Arc::downgrade(&list);
    let weak_popup = Arc::downgrade(&popup);
    cx.bridge.watch_signal(cx.id, "items", cx.control.items().changed(), move |change: &StructuralChange| {
        let (Some(list), Some(popup)) = (weak_list.upgrade(), weak_popup.upgrade()) else {
            return Ok(());
        };
        let mut list = list.lock();
        list.on_structural_change(change);
        let rows = list.cell_count();
        list.set_viewport_length(list_viewport(&config, popup.is_open(), rows));
        Ok(())
    });

    let config = cx.config.clone();
    let weak_list = Arc::downgrade(&list);
    cx.bridge.watch(cx.id, cx.control.showing(), move |&showing| {
        if let Some(list) = weak_list.upgrade() {
            let mut list = list.lock();
            let rows = list.cell_count();
            list.set_viewport_length(list_viewport(&config, showing, rows));
        }
        Ok(())
    });

    parts.with_flow(list)
}

fn popup_list(control: &Control, config: &SkinConfig, open: bool) -> VirtualFlow {
    let mut list = VirtualFlow::new(config.fixed_cell_size);
    list.initialize(control);
    let rows = list.cell_count();
    list.set_viewport_length(list_viewport(config, open, rows));
    list
}

/// Menu button: a labeled face with an arrow over a popup menu.
pub(super) fn build_menu_button(cx: &SkinContext<'_>) -> SkinParts {
    cx.relayout_on(cx.control.text());
    let popup = attach(cx);
    SkinParts::new(LabeledLayout::new(Graphic::Arrow)).with_popup(popup)
}

#[derive(Debug)]
struct PopupLayout {
    kind: ControlKind,
}

impl PopupLayout {
    fn content_width(&self, cx: &LayoutCx<'_>) -> f64 {
        let metrics = &cx.config.text;
        let value = cx.control.value().with(|value| metrics.text_width(value.as_deref().unwrap_or("")));
        match self.kind {
            ControlKind::ColorPicker => SWATCH + SWATCH_GAP + value,
            _ => cx.control.items().with(|items| {
                items
                    .iter()
                    .map(|item| metrics.text_width(item))
                    .fold(value, f64::max)
            }),
        }
    }
}

impl SkinLayout for PopupLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        let content = match self.kind {
            ControlKind::ColorPicker => SWATCH,
            _ => self.content_width(cx).min(cx.config.text.ellipsis_width()),
        };
        content + ARROW_BUTTON_WIDTH + cx.control.padding().get().horizontal()
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        self.content_width(cx) + ARROW_BUTTON_WIDTH + cx.control.padding().get().horizontal()
    }

    fn min_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64 {
        self.pref_height(cx, width)
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        cx.config.text.line_height.max(SWATCH) + cx.control.padding().get().vertical()
    }
}

pub(super) fn handle_input(
    popup: &Popup,
    list: Option<&Mutex<VirtualFlow>>,
    control: &Control,
    event: &InputEvent,
) -> SkinResult<bool> {
    let open = popup.is_open();
    match event {
        InputEvent::MousePressed { .. } => {
            control.showing().set(!open)?;
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Escape) if open => {
            control.showing().set(false)?;
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Down | Key::Space) if !open => {
            control.showing().set(true)?;
            Ok(true)
        }
        InputEvent::KeyPressed(key @ (Key::Up | Key::Down)) if open => {
            let highlight = popup.move_highlight(*key == Key::Down, entry_count(control));
            if let (Some(index), Some(list)) = (highlight, list) {
                let mut list = list.lock();
                list.scroll_to(index);
            }
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Enter | Key::Space) if open => commit(popup, control),
        _ => Ok(false),
    }
}

/// Apply the highlighted entry and close.
fn commit(popup: &Popup, control: &Control) -> SkinResult<bool> {
    let Some(index) = popup.highlighted() else {
        control.showing().set(false)?;
        return Ok(true);
    };
    match control.kind() {
        ControlKind::ComboBox => {
            let item = control.items().get(index);
            control.selected_index().set(Some(index))?;
            control.value().set(item)?;
        }
        ControlKind::ColorPicker => {
            control.value().set(PALETTE.get(index).map(|color| color.to_string()))?;
        }
        _ => {}
    }
    control.showing().set(false)?;
    control.action().emit(ActionEvent::ItemChosen { index })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SkinRegistry;
    use crate::skin::Skin;

    fn popup_control(kind: ControlKind, items: &[&str]) -> (SkinRegistry, Arc<Control>, Arc<Skin>) {
        let registry = SkinRegistry::new();
        let control = Control::new(kind);
        control.items().extend(items.iter().map(|item| item.to_string())).unwrap();
        let skin = registry.create_skin(&control);
        registry.install(&control, skin.clone()).unwrap();
        (registry, control, skin)
    }

    #[test]
    fn test_showing_drives_popup() {
        let (_registry, combo, skin) = popup_control(ControlKind::ComboBox, &["a", "b"]);
        assert!(!skin.popup_open());
        combo.showing().set(true).unwrap();
        assert!(skin.popup_open());
        assert_eq!(skin.popup_highlight(), Some(0));
        combo.showing().set(false).unwrap();
        assert!(!skin.popup_open());
        assert_eq!(skin.popup_highlight(), None);
    }

    #[test]
    fn test_combo_box_commit() {
        let (registry, combo, skin) = popup_control(ControlKind::ComboBox, &["red", "green", "blue"]);
        registry.dispatch(&combo, InputEvent::KeyPressed(Key::Down)).unwrap();
        assert!(skin.popup_open());
        registry.dispatch(&combo, InputEvent::KeyPressed(Key::Down)).unwrap();
        registry.dispatch(&combo, InputEvent::KeyPressed(Key::Down)).unwrap();
        registry.dispatch(&combo, InputEvent::KeyPressed(Key::Down)).unwrap();
        assert_eq!(skin.popup_highlight(), Some(2));

        registry.dispatch(&combo, InputEvent::KeyPressed(Key::Enter)).unwrap();
        assert!(!skin.popup_open());
        assert!(!combo.showing().get());
        assert_eq!(combo.selected_index().get(), Some(2));
        assert_eq!(combo.value().get().as_deref(), Some("blue"));
    }

    #[test]
    fn test_combo_box_list_is_virtualized() {
        let items: Vec<String> = (0..50).map(|i| format!("item {i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let (registry, combo, skin) = popup_control(ControlKind::ComboBox, &refs);

        registry.pulse();
        assert_eq!(skin.with_flow(|flow| flow.materialized_count()), Some(0));

        combo.showing().set(true).unwrap();
        registry.pulse();
        assert_eq!(skin.cell_count(), Some(50));
        assert_eq!(skin.with_flow(|flow| flow.materialized_count()), Some(10));
        skin.verify().unwrap();
    }

    #[test]
    fn test_color_picker_palette() {
        let (registry, picker, skin) = popup_control(ControlKind::ColorPicker, &[]);
        picker.value().set(Some("#FF0000".to_string())).unwrap();
        registry.dispatch(&picker, InputEvent::MousePressed { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(skin.popup_highlight(), Some(2));

        registry.dispatch(&picker, InputEvent::KeyPressed(Key::Down)).unwrap();
        registry.dispatch(&picker, InputEvent::KeyPressed(Key::Enter)).unwrap();
        assert_eq!(picker.value().get().as_deref(), Some("#00ff00"));
        assert!(skin.cell_count().is_none());
    }

    #[test]
    fn test_escape_closes() {
        let (registry, menu, skin) = popup_control(ControlKind::MenuButton, &["Open", "Save"]);
        registry.dispatch(&menu, InputEvent::MousePressed { x: 0.0, y: 0.0 }).unwrap();
        assert!(skin.popup_open());
        assert!(registry.dispatch(&menu, InputEvent::KeyPressed(Key::Escape)).unwrap());
        assert!(!skin.popup_open());
        assert!(!registry.dispatch(&menu, InputEvent::KeyPressed(Key::Escape)).unwrap());
    }

    #[test]
    fn test_menu_button_layout_has_arrow() {
        let (_registry, menu, _skin) = popup_control(ControlKind::MenuButton, &[]);
        menu.text().set(Some("File".to_string())).unwrap();
        assert_eq!(menu.pref_width(-1.0), 28.0 + 12.0 + 16.0);
    }
}
