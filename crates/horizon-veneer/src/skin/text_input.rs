//! Single-line text entry with a blinking caret.
//!
//! The caret blinks only while the control is focused. Focus listeners start
//! and stop the animation synchronously, so a field that loses focus never
//! leaves a running animation behind.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::control::{ActionEvent, Control, ControlKind};
use crate::error::SkinResult;
use crate::input::{InputEvent, Key};

use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

/// Columns a text field asks room for.
const PREF_COLUMNS: f64 = 12.0;

/// Character shown in place of each masked character.
pub(crate) const MASK: char = '\u{2022}';

/// Caret position and blink state.
#[derive(Debug, Default)]
pub(crate) struct CaretAnimation {
    animating: AtomicBool,
    visible: AtomicBool,
    position: AtomicUsize,
    elapsed_ms: AtomicU64,
}

impl CaretAnimation {
    pub(crate) fn start(&self) {
        self.elapsed_ms.store(0, Ordering::Release);
        self.visible.store(true, Ordering::Release);
        self.animating.store(true, Ordering::Release);
    }

    pub(crate) fn stop(&self) {
        self.animating.store(false, Ordering::Release);
        self.visible.store(false, Ordering::Release);
        self.elapsed_ms.store(0, Ordering::Release);
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.animating.load(Ordering::Acquire)
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub(crate) fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    fn set_position(&self, position: usize) {
        self.position.store(position, Ordering::Release);
        // Moving the caret shows it immediately.
        if self.is_animating() {
            self.elapsed_ms.store(0, Ordering::Release);
            self.visible.store(true, Ordering::Release);
        }
    }

    fn clamp_to(&self, len: usize) {
        self.position.fetch_min(len, Ordering::AcqRel);
    }

    /// Advance the blink clock by one pulse.
    pub(crate) fn tick(&self, step_ms: u64, blink_ms: u64) {
        if !self.is_animating() || blink_ms == 0 {
            return;
        }
        let elapsed = self.elapsed_ms.fetch_add(step_ms, Ordering::AcqRel) + step_ms;
        if elapsed >= blink_ms {
            self.elapsed_ms.store(elapsed % blink_ms, Ordering::Release);
            self.visible.fetch_xor(true, Ordering::AcqRel);
        }
    }
}

fn char_len(text: &Option<String>) -> usize {
    text.as_deref().map_or(0, |text| text.chars().count())
}

/// The text an assistive technology may read for `control`.
pub(crate) fn accessible_text(control: &Control) -> String {
    let text = control.text().get().unwrap_or_default();
    match control.kind() {
        ControlKind::PasswordField => text.chars().map(|_| MASK).collect(),
        _ => text,
    }
}

#[derive(Debug)]
struct TextInputLayout;

impl SkinLayout for TextInputLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        cx.config.text.char_width + cx.control.padding().get().horizontal()
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        PREF_COLUMNS * cx.config.text.char_width + cx.control.padding().get().horizontal()
    }

    fn min_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64 {
        self.pref_height(cx, width)
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        cx.config.text.line_height + cx.control.padding().get().vertical()
    }
}

pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    let caret = Arc::new(CaretAnimation::default());
    caret.set_position(char_len(&cx.control.text().get()));
    if cx.control.focused().get() {
        caret.start();
    }

    let weak = Arc::downgrade(&caret);
    cx.bridge.watch(cx.id, cx.control.focused(), move |&focused| {
        if let Some(caret) = weak.upgrade() {
            if focused {
                caret.start();
            } else {
                caret.stop();
            }
        }
        Ok(())
    });

    let weak = Arc::downgrade(&caret);
    cx.bridge.watch(cx.id, cx.control.text(), move |text| {
        if let Some(caret) = weak.upgrade() {
            caret.clamp_to(char_len(text));
        }
        Ok(())
    });

    SkinParts::new(TextInputLayout).with_caret(caret)
}

pub(super) fn handle_input(
    caret: &CaretAnimation,
    control: &Control,
    event: &InputEvent,
) -> SkinResult<bool> {
    let len = char_len(&control.text().get());
    let at = caret.position().min(len);
    match event {
        InputEvent::MousePressed { .. } => {
            control.focused().set(true)?;
            Ok(true)
        }
        InputEvent::KeyTyped(c) if !c.is_control() => {
            edit(control, caret, |chars| {
                chars.insert(at, *c);
                Some(at + 1)
            })
        }
        InputEvent::KeyPressed(Key::Backspace) => edit(control, caret, |chars| {
            (at > 0).then(|| {
                chars.remove(at - 1);
                at - 1
            })
        }),
        InputEvent::KeyPressed(Key::Delete) => edit(control, caret, |chars| {
            (at < chars.len()).then(|| {
                chars.remove(at);
                at
            })
        }),
        InputEvent::KeyPressed(Key::Left) => {
            caret.set_position(at.saturating_sub(1));
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Right) => {
            caret.set_position((at + 1).min(len));
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Home) => {
            caret.set_position(0);
            Ok(true)
        }
        InputEvent::KeyPressed(Key::End) => {
            caret.set_position(len);
            Ok(true)
        }
        InputEvent::KeyPressed(Key::Enter) => {
            control.action().emit(ActionEvent::Fired)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Apply `f` to the text's characters; `f` returns the new caret position,
/// or `None` when nothing changed.
fn edit(
    control: &Control,
    caret: &CaretAnimation,
    f: impl FnOnce(&mut Vec<char>) -> Option<usize>,
) -> SkinResult<bool> {
    let mut chars: Vec<char> = control.text().get().unwrap_or_default().chars().collect();
    let Some(position) = f(&mut chars) else {
        return Ok(false);
    };
    let result = control.text().set(Some(chars.into_iter().collect()));
    caret.set_position(position);
    result?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SkinRegistry;
    use crate::skin::Skin;

    fn field(kind: ControlKind) -> (SkinRegistry, Arc<Control>, Arc<Skin>) {
        let registry = SkinRegistry::new();
        let control = Control::new(kind);
        let skin = registry.create_skin(&control);
        registry.install(&control, skin.clone()).unwrap();
        (registry, control, skin)
    }

    #[test]
    fn test_caret_follows_focus() {
        let (_registry, control, skin) = field(ControlKind::TextField);
        assert!(!skin.caret_animating());

        control.focused().set(true).unwrap();
        assert!(skin.caret_animating());
        assert!(skin.caret_visible());

        control.focused().set(false).unwrap();
        assert!(!skin.caret_animating());
        assert!(!skin.caret_visible());
    }

    #[test]
    fn test_caret_blinks_on_pulse() {
        let registry = SkinRegistry::with_config(
            crate::config::SkinConfig::new()
                .with_caret_blink(std::time::Duration::from_millis(32))
                .with_pulse_interval(std::time::Duration::from_millis(16)),
        );
        let control = Control::new(ControlKind::TextField);
        control.focused().set(true).unwrap();
        let skin = registry.create_skin(&control);
        registry.install(&control, skin.clone()).unwrap();
        assert!(skin.caret_animating());

        registry.pulse();
        assert!(skin.caret_visible());
        registry.pulse();
        assert!(!skin.caret_visible());
        registry.pulse();
        registry.pulse();
        assert!(skin.caret_visible());
    }

    #[test]
    fn test_typing_and_deleting() {
        let (registry, control, skin) = field(ControlKind::TextField);
        for c in "abc".chars() {
            registry.dispatch(&control, InputEvent::KeyTyped(c)).unwrap();
        }
        assert_eq!(control.text().get().as_deref(), Some("abc"));
        assert_eq!(skin.caret_position(), Some(3));

        registry.dispatch(&control, InputEvent::KeyPressed(Key::Left)).unwrap();
        registry.dispatch(&control, InputEvent::KeyPressed(Key::Backspace)).unwrap();
        assert_eq!(control.text().get().as_deref(), Some("ac"));
        assert_eq!(skin.caret_position(), Some(1));

        registry.dispatch(&control, InputEvent::KeyPressed(Key::Home)).unwrap();
        assert!(!registry.dispatch(&control, InputEvent::KeyPressed(Key::Backspace)).unwrap());
        registry.dispatch(&control, InputEvent::KeyPressed(Key::Delete)).unwrap();
        assert_eq!(control.text().get().as_deref(), Some("c"));
    }

    #[test]
    fn test_external_text_change_clamps_caret() {
        let (registry, control, skin) = field(ControlKind::TextField);
        control.text().set(Some("hello".to_string())).unwrap();
        registry.dispatch(&control, InputEvent::KeyPressed(Key::End)).unwrap();
        assert_eq!(skin.caret_position(), Some(5));

        control.text().set(None).unwrap();
        assert_eq!(skin.caret_position(), Some(0));
    }

    #[test]
    fn test_password_is_masked() {
        let (_registry, control, _skin) = field(ControlKind::PasswordField);
        control.text().set(Some("secret".to_string())).unwrap();
        assert_eq!(accessible_text(&control), "\u{2022}".repeat(6));
    }

    #[test]
    fn test_pref_width_in_columns() {
        let (_registry, control, _skin) = field(ControlKind::TextField);
        assert_eq!(control.pref_width(-1.0), 12.0 * 7.0 + 14.0);
        assert_eq!(control.pref_height(-1.0), 24.0);
    }
}
