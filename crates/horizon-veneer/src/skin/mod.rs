//! Skins: swappable visual delegates for controls.
//!
//! A [`Skin`] is assembled from capability modules chosen by the control's
//! kind through an explicit constructor table:
//!
//! | Capability | Kinds |
//! |------------|-------|
//! | labeled layout | Button, CheckBox, Label, Hyperlink, MenuButton |
//! | progress layout | ProgressBar |
//! | text input + caret animation | TextField, PasswordField |
//! | popup | ComboBox, MenuButton, ColorPicker |
//! | tool bar layout | ToolBar |
//! | virtual flow | ListView, TableView, TreeView, ComboBox (popup list) |
//!
//! Skins observe their control only through the
//! [`PropertyWatchBridge`], and every listener closure holds weak handles to
//! the capability state it updates. Once the control's slot and the caller's
//! handles are gone, nothing keeps a disposed skin alive.
//!
//! # Lifecycle
//!
//! ```text
//! Uninstalled ──install──▶ Installed ──dispose──▶ Disposed
//!      │                      │                      ▲
//!      │                      └──uninstall/replace───┤ (detached first)
//!      └──────────────────dispose────────────────────┘
//! ```
//!
//! `Disposed` is terminal. Disposing again is a no-op that returns `false`.

mod labeled;
mod popup;
mod progress;
mod text_input;
mod toolbar;
mod virtualized;

pub use popup::PALETTE;
pub(crate) use text_input::accessible_text;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_veneer_core::{Fault, FaultSink, Property, Signal};
use parking_lot::Mutex;
use slotmap::new_key_type;

use crate::config::SkinConfig;
use crate::control::{Control, ControlId, ControlKind};
use crate::error::{SkinError, SkinResult, StructureError};
use crate::flow::VirtualFlow;
use crate::input::InputEvent;
use crate::watch::PropertyWatchBridge;

use popup::Popup;
use text_input::CaretAnimation;

new_key_type! {
    /// Identifies a skin. Keys are never reused while the registry lives.
    pub struct SkinId;
}

/// Where a skin is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinState {
    /// Created, not in a control's slot.
    Uninstalled,
    /// In its control's slot.
    Installed,
    /// Torn down. Terminal.
    Disposed,
}

/// What a layout capability measures with.
pub struct LayoutCx<'a> {
    /// The control being measured.
    pub control: &'a Control,
    /// Shared metrics.
    pub config: &'a SkinConfig,
}

/// Size computation of a skin.
///
/// The `max_*` defaults track the control's resolved preferred size, so an
/// explicit preferred width also caps the computed maximum width.
pub trait SkinLayout: Send + Sync {
    /// Computed minimum width.
    fn min_width(&self, cx: &LayoutCx<'_>, height: f64) -> f64;

    /// Computed preferred width.
    fn pref_width(&self, cx: &LayoutCx<'_>, height: f64) -> f64;

    /// Computed maximum width.
    fn max_width(&self, cx: &LayoutCx<'_>, height: f64) -> f64 {
        cx.control.pref_width(height)
    }

    /// Computed minimum height.
    fn min_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64;

    /// Computed preferred height.
    fn pref_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64;

    /// Computed maximum height.
    fn max_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64 {
        cx.control.pref_height(width)
    }
}

/// The capabilities a constructor assembles.
pub(crate) struct SkinParts {
    layout: Box<dyn SkinLayout>,
    flow: Option<Arc<Mutex<VirtualFlow>>>,
    caret: Option<Arc<CaretAnimation>>,
    popup: Option<Arc<Popup>>,
}

impl SkinParts {
    fn new(layout: impl SkinLayout + 'static) -> Self {
        Self {
            layout: Box::new(layout),
            flow: None,
            caret: None,
            popup: None,
        }
    }

    fn with_flow(mut self, flow: Arc<Mutex<VirtualFlow>>) -> Self {
        self.flow = Some(flow);
        self
    }

    fn with_caret(mut self, caret: Arc<CaretAnimation>) -> Self {
        self.caret = Some(caret);
        self
    }

    fn with_popup(mut self, popup: Arc<Popup>) -> Self {
        self.popup = Some(popup);
        self
    }
}

/// Everything a constructor may use while assembling a skin.
pub(crate) struct SkinContext<'a> {
    id: SkinId,
    control: &'a Arc<Control>,
    config: &'a SkinConfig,
    bridge: &'a PropertyWatchBridge,
    dirty: &'a Arc<AtomicBool>,
}

impl SkinContext<'_> {
    /// Request a layout pass whenever `property` changes.
    fn relayout_on<T>(&self, property: &Property<T>)
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let dirty = Arc::downgrade(self.dirty);
        self.bridge.watch(self.id, property, move |_| {
            if let Some(dirty) = dirty.upgrade() {
                dirty.store(true, Ordering::Release);
            }
            Ok(())
        });
    }

    /// Request a layout pass whenever `signal` fires.
    fn relayout_on_signal<A: 'static>(&self, name: &'static str, signal: &Signal<A>) {
        let dirty = Arc::downgrade(self.dirty);
        self.bridge.watch_signal(self.id, name, signal, move |_| {
            if let Some(dirty) = dirty.upgrade() {
                dirty.store(true, Ordering::Release);
            }
            Ok(())
        });
    }
}

type SkinConstructor = fn(&SkinContext<'_>) -> SkinParts;

/// The kind-to-constructor table.
fn constructor_for(kind: ControlKind) -> SkinConstructor {
    match kind {
        ControlKind::Button | ControlKind::CheckBox | ControlKind::Label | ControlKind::Hyperlink => {
            labeled::build
        }
        ControlKind::MenuButton => popup::build_menu_button,
        ControlKind::ProgressBar => progress::build,
        ControlKind::TextField | ControlKind::PasswordField => text_input::build,
        ControlKind::ComboBox | ControlKind::ColorPicker => popup::build,
        ControlKind::ToolBar => toolbar::build,
        ControlKind::ListView | ControlKind::TableView | ControlKind::TreeView => {
            virtualized::build
        }
    }
}

/// The visual delegate of one control.
pub struct Skin {
    id: SkinId,
    kind: ControlKind,
    control: Weak<Control>,
    control_id: ControlId,
    state: Mutex<SkinState>,
    config: Arc<SkinConfig>,
    bridge: Arc<PropertyWatchBridge>,
    faults: Arc<dyn FaultSink>,
    dirty: Arc<AtomicBool>,
    pressed: AtomicBool,
    parts: SkinParts,
}

impl Skin {
    pub(crate) fn build(
        id: SkinId,
        control: &Arc<Control>,
        config: Arc<SkinConfig>,
        bridge: Arc<PropertyWatchBridge>,
        faults: Arc<dyn FaultSink>,
    ) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let parts = {
            let cx = SkinContext {
                id,
                control,
                config: &config,
                bridge: &bridge,
                dirty: &dirty,
            };
            cx.relayout_on(control.padding());
            cx.relayout_on(control.focused());
            constructor_for(control.kind())(&cx)
        };

        Self {
            id,
            kind: control.kind(),
            control: Arc::downgrade(control),
            control_id: control.id(),
            state: Mutex::new(SkinState::Uninstalled),
            config,
            bridge,
            faults,
            dirty,
            pressed: AtomicBool::new(false),
            parts,
        }
    }

    /// The skin's identity.
    pub fn id(&self) -> SkinId {
        self.id
    }

    /// The kind of control the skin was built for.
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// The control the skin was built for.
    pub fn control_id(&self) -> ControlId {
        self.control_id
    }

    /// The control, if it is still alive.
    pub fn control(&self) -> Option<Arc<Control>> {
        self.control.upgrade()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SkinState {
        *self.state.lock()
    }

    /// Whether the skin has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.state() == SkinState::Disposed
    }

    /// Whether the skin sits in its control's slot.
    pub fn is_installed(&self) -> bool {
        self.state() == SkinState::Installed
    }

    /// The metrics the skin measures with.
    pub fn config(&self) -> &SkinConfig {
        &self.config
    }

    pub(crate) fn mark_installed(&self) -> SkinResult<()> {
        let mut state = self.state.lock();
        match *state {
            SkinState::Disposed => Err(SkinError::Disposed { skin: self.id }),
            _ => {
                *state = SkinState::Installed;
                self.dirty.store(true, Ordering::Release);
                Ok(())
            }
        }
    }

    pub(crate) fn mark_detached(&self) {
        let mut state = self.state.lock();
        if *state == SkinState::Installed {
            *state = SkinState::Uninstalled;
        }
    }

    /// Tear the skin down: unregister every listener, hide a showing popup,
    /// stop the caret, and release every cell.
    ///
    /// Returns `false` if the skin was already disposed. Never fails:
    /// listener errors raised while hiding the popup go to the fault sink.
    pub fn dispose(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == SkinState::Disposed {
                tracing::trace!(target: "horizon_veneer::skin", skin = ?self.id, "already disposed");
                return false;
            }
            *state = SkinState::Disposed;
        }

        let listeners = self.bridge.unwatch_all(self.id);

        if let Some(popup) = &self.parts.popup {
            popup.hide();
            // `showing` belongs to whichever skin holds the slot now.
            if let Some(control) = self.control.upgrade().filter(|control| self.owns_slot(control)) {
                if control.showing().get() {
                    if let Err(error) = control.showing().set(false) {
                        self.faults.report(Fault::new("dispose", error));
                    }
                }
            }
        }
        if let Some(caret) = &self.parts.caret {
            caret.stop();
        }
        let cells = self
            .parts
            .flow
            .as_ref()
            .map_or(0, |flow| flow.lock().release_all());

        tracing::debug!(
            target: "horizon_veneer::skin",
            skin = ?self.id,
            kind = %self.kind,
            listeners,
            cells,
            "skin disposed"
        );
        true
    }

    /// Whether the control's slot holds this skin or nothing.
    fn owns_slot(&self, control: &Control) -> bool {
        control.skin().is_none_or(|installed| installed.id == self.id)
    }

    /// Whether a layout pass is pending.
    pub fn needs_layout(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
            || self
                .parts
                .flow
                .as_ref()
                .is_some_and(|flow| flow.lock().needs_layout())
    }

    /// Run one layout pass. Returns `false` for a disposed skin.
    pub(crate) fn pulse(&self) -> bool {
        if self.is_disposed() {
            return false;
        }
        if let Some(caret) = &self.parts.caret {
            caret.tick(self.config.pulse_interval_ms, self.config.caret_blink_ms);
        }
        if let Some(flow) = &self.parts.flow {
            flow.lock().layout();
        }
        self.dirty.store(false, Ordering::Release);
        true
    }

    /// Route an input event to the capability that handles it.
    pub(crate) fn handle_input(&self, control: &Control, event: &InputEvent) -> SkinResult<bool> {
        if let Some(popup) = &self.parts.popup {
            let flow = self.parts.flow.as_deref();
            return popup::handle_input(popup, flow, control, event);
        }
        if let Some(caret) = &self.parts.caret {
            return text_input::handle_input(caret, control, event);
        }
        if let Some(flow) = &self.parts.flow {
            return virtualized::handle_input(flow, control, event);
        }
        match self.kind {
            ControlKind::Button | ControlKind::CheckBox | ControlKind::Hyperlink => {
                labeled::handle_input(&self.pressed, control, event)
            }
            _ => Ok(false),
        }
    }

    /// Computed minimum width.
    pub fn compute_min_width(&self, control: &Control, height: f64) -> f64 {
        self.measure(control, |layout, cx| layout.min_width(cx, height))
    }

    /// Computed preferred width.
    pub fn compute_pref_width(&self, control: &Control, height: f64) -> f64 {
        self.measure(control, |layout, cx| layout.pref_width(cx, height))
    }

    /// Computed maximum width.
    pub fn compute_max_width(&self, control: &Control, height: f64) -> f64 {
        self.measure(control, |layout, cx| layout.max_width(cx, height))
    }

    /// Computed minimum height.
    pub fn compute_min_height(&self, control: &Control, width: f64) -> f64 {
        self.measure(control, |layout, cx| layout.min_height(cx, width))
    }

    /// Computed preferred height.
    pub fn compute_pref_height(&self, control: &Control, width: f64) -> f64 {
        self.measure(control, |layout, cx| layout.pref_height(cx, width))
    }

    /// Computed maximum height.
    pub fn compute_max_height(&self, control: &Control, width: f64) -> f64 {
        self.measure(control, |layout, cx| layout.max_height(cx, width))
    }

    fn measure(&self, control: &Control, f: impl FnOnce(&dyn SkinLayout, &LayoutCx<'_>) -> f64) -> f64 {
        if self.is_disposed() {
            return 0.0;
        }
        let cx = LayoutCx {
            control,
            config: &self.config,
        };
        f(self.parts.layout.as_ref(), &cx)
    }

    /// Logical rows of the skin's virtual flow, or `None` without one.
    pub fn cell_count(&self) -> Option<usize> {
        self.with_flow(VirtualFlow::cell_count)
    }

    /// Read the skin's virtual flow.
    pub fn with_flow<R>(&self, f: impl FnOnce(&VirtualFlow) -> R) -> Option<R> {
        self.parts.flow.as_ref().map(|flow| f(&flow.lock()))
    }

    /// Modify the skin's virtual flow, for scrolling and viewport changes.
    pub fn with_flow_mut<R>(&self, f: impl FnOnce(&mut VirtualFlow) -> R) -> Option<R> {
        self.parts.flow.as_ref().map(|flow| f(&mut flow.lock()))
    }

    /// Check the skin's virtual flow against the control's rows and columns.
    pub fn verify(&self) -> Result<(), StructureError> {
        match (&self.parts.flow, self.control.upgrade()) {
            (Some(flow), Some(control)) => flow.lock().verify(&*control),
            _ => Ok(()),
        }
    }

    /// Whether the caret is blinking (text inputs only).
    pub fn caret_animating(&self) -> bool {
        self.parts.caret.as_ref().is_some_and(|caret| caret.is_animating())
    }

    /// Whether the caret is currently drawn.
    pub fn caret_visible(&self) -> bool {
        self.parts.caret.as_ref().is_some_and(|caret| caret.is_visible())
    }

    /// Caret position in characters.
    pub fn caret_position(&self) -> Option<usize> {
        self.parts.caret.as_ref().map(|caret| caret.position())
    }

    /// Whether the skin's popup is open.
    pub fn popup_open(&self) -> bool {
        self.parts.popup.as_ref().is_some_and(|popup| popup.is_open())
    }

    /// The highlighted popup entry.
    pub fn popup_highlight(&self) -> Option<usize> {
        self.parts.popup.as_ref().and_then(|popup| popup.highlighted())
    }

    /// Tool bar items that do not fit in `width` (tool bars only).
    pub fn overflow_count(&self, width: f64) -> Option<usize> {
        if self.kind != ControlKind::ToolBar {
            return None;
        }
        let control = self.control.upgrade()?;
        Some(toolbar::overflow_count(&control, &self.config, width))
    }

    /// Horizontal offset of a tree row's content (tree views only).
    pub fn row_indent(&self, row: usize) -> Option<f64> {
        if self.kind != ControlKind::TreeView {
            return None;
        }
        let control = self.control.upgrade()?;
        virtualized::row_indent(&control, &self.config, row)
    }
}

impl Drop for Skin {
    fn drop(&mut self) {
        // A skin dropped without dispose must not leave listeners behind.
        let listeners = self.bridge.unwatch_all(self.id);
        if listeners > 0 {
            tracing::trace!(
                target: "horizon_veneer::skin",
                skin = ?self.id,
                listeners,
                "undisposed skin dropped"
            );
        }
    }
}

impl fmt::Debug for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skin")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("control", &self.control_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Skin: Send, Sync);
