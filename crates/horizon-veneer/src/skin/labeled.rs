//! Text with an optional graphic: buttons, check boxes, labels, links, and
//! the face of a menu button.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::control::{ActionEvent, Control, ControlKind};
use crate::error::SkinResult;
use crate::input::{InputEvent, Key};

use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

const GRAPHIC_GAP: f64 = 4.0;

/// What sits beside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Graphic {
    None,
    /// Check box mark.
    CheckMark,
    /// Drop-down arrow.
    Arrow,
}

impl Graphic {
    fn width(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::CheckMark => 16.0 + GRAPHIC_GAP,
            Self::Arrow => 8.0 + GRAPHIC_GAP,
        }
    }

    fn height(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::CheckMark => 16.0,
            Self::Arrow => 8.0,
        }
    }
}

#[derive(Debug)]
pub(super) struct LabeledLayout {
    graphic: Graphic,
}

impl LabeledLayout {
    pub(super) fn new(graphic: Graphic) -> Self {
        Self { graphic }
    }

    fn text_width(cx: &LayoutCx<'_>) -> f64 {
        cx.control
            .text()
            .with(|text| cx.config.text.text_width(text.as_deref().unwrap_or("")))
    }
}

impl SkinLayout for LabeledLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        // The text may shrink down to its ellipsis, never further.
        let text = Self::text_width(cx).min(cx.config.text.ellipsis_width());
        text + self.graphic.width() + cx.control.padding().get().horizontal()
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        Self::text_width(cx) + self.graphic.width() + cx.control.padding().get().horizontal()
    }

    fn min_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64 {
        self.pref_height(cx, width)
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        cx.config.text.line_height.max(self.graphic.height()) + cx.control.padding().get().vertical()
    }
}

pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    cx.relayout_on(cx.control.text());
    let graphic = match cx.control.kind() {
        ControlKind::CheckBox => {
            cx.relayout_on(cx.control.selected());
            cx.relayout_on(cx.control.indeterminate());
            Graphic::CheckMark
        }
        _ => Graphic::None,
    };
    SkinParts::new(LabeledLayout::new(graphic))
}

/// Press and release over the control fires it, as do Space and Enter.
pub(super) fn handle_input(
    pressed: &AtomicBool,
    control: &Control,
    event: &InputEvent,
) -> SkinResult<bool> {
    match event {
        InputEvent::MousePressed { .. } => {
            pressed.store(true, Ordering::Release);
            Ok(true)
        }
        InputEvent::MouseReleased { .. } => {
            if pressed.swap(false, Ordering::AcqRel) {
                fire(control)?;
            }
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Space | Key::Enter) => {
            fire(control)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn fire(control: &Control) -> SkinResult<()> {
    if control.kind() == ControlKind::CheckBox {
        if control.indeterminate().get() {
            control.indeterminate().set(false)?;
            control.selected().set(true)?;
        } else {
            control.selected().set(!control.selected().get())?;
        }
    }
    control.action().emit(ActionEvent::Fired)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SkinRegistry;
    use std::sync::Arc;

    fn installed(kind: ControlKind, text: &str) -> (SkinRegistry, Arc<Control>) {
        let registry = SkinRegistry::new();
        let control = Control::new(kind);
        control.text().set(Some(text.to_string())).unwrap();
        let skin = registry.create_skin(&control);
        registry.install(&control, skin).unwrap();
        (registry, control)
    }

    #[test]
    fn test_label_sizes() {
        let (_registry, label) = installed(ControlKind::Label, "Hello");
        assert_eq!(label.pref_width(-1.0), 35.0);
        // Ellipsis is three characters.
        assert_eq!(label.min_width(-1.0), 21.0);
        assert_eq!(label.pref_height(-1.0), 16.0);
        assert_eq!(label.max_width(-1.0), 35.0);
    }

    #[test]
    fn test_short_text_min_is_text() {
        let (_registry, label) = installed(ControlKind::Label, "A");
        assert_eq!(label.min_width(-1.0), 7.0);
    }

    #[test]
    fn test_check_box_graphic() {
        let (_registry, check) = installed(ControlKind::CheckBox, "On");
        assert_eq!(check.pref_width(-1.0), 14.0 + 20.0);
        assert_eq!(check.pref_height(-1.0), 16.0);
    }

    #[test]
    fn test_check_box_toggle_clears_indeterminate() {
        let (registry, check) = installed(ControlKind::CheckBox, "On");
        check.indeterminate().set(true).unwrap();

        assert!(registry.dispatch(&check, InputEvent::KeyPressed(Key::Space)).unwrap());
        assert!(!check.indeterminate().get());
        assert!(check.selected().get());

        registry.dispatch(&check, InputEvent::KeyPressed(Key::Space)).unwrap();
        assert!(!check.selected().get());
    }

    #[test]
    fn test_button_fires_on_release() {
        let (registry, button) = installed(ControlKind::Button, "Go");
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        button.action().connect(move |event| {
            assert_eq!(*event, ActionEvent::Fired);
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        registry.dispatch(&button, InputEvent::MouseReleased { x: 1.0, y: 1.0 }).unwrap();
        assert!(!fired.load(Ordering::SeqCst));

        registry.dispatch(&button, InputEvent::MousePressed { x: 1.0, y: 1.0 }).unwrap();
        registry.dispatch(&button, InputEvent::MouseReleased { x: 1.0, y: 1.0 }).unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_label_ignores_input() {
        let (registry, label) = installed(ControlKind::Label, "x");
        assert!(!registry.dispatch(&label, InputEvent::KeyPressed(Key::Enter)).unwrap());
    }
}
