//! Creating, installing, replacing, and disposing skins.
//!
//! The [`SkinRegistry`] owns what every skin shares: the configuration, the
//! [`PropertyWatchBridge`], and the [`FaultSink`]. It keeps only weak
//! handles to skins and controls, so its bookkeeping never causes a leak.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_veneer::control::{Control, ControlKind};
//! use horizon_veneer::registry::SkinRegistry;
//!
//! let registry = SkinRegistry::new();
//! let list = Control::new(ControlKind::ListView);
//!
//! let first = registry.create_skin(&list);
//! registry.install(&list, first).unwrap();
//!
//! let second = registry.create_skin(&list);
//! let old = registry.replace(&list, second).unwrap().unwrap();
//!
//! // The control's slot held the last strong handle.
//! assert!(registry.await_reclaimed(&old));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use horizon_veneer_core::{FaultSink, PerfSpan, TracingFaultSink};
use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::config::SkinConfig;
use crate::control::{Control, ControlId, ControlKind};
use crate::error::{SkinError, SkinResult};
use crate::input::InputEvent;
use crate::reclaim;
use crate::skin::{Skin, SkinId};
use crate::watch::PropertyWatchBridge;

struct SkinEntry {
    /// `None` while the skin is being built.
    skin: Option<Weak<Skin>>,
    kind: ControlKind,
    control: ControlId,
}

impl SkinEntry {
    fn is_live(&self) -> bool {
        self.skin.as_ref().is_some_and(|skin| skin.strong_count() > 0)
    }

    fn is_reclaimed(&self) -> bool {
        self.skin.as_ref().is_some_and(|skin| skin.strong_count() == 0)
    }
}

/// Forget entries whose skin is gone. Returns how many were removed.
fn prune(skins: &mut SlotMap<SkinId, SkinEntry>) -> usize {
    let before = skins.len();
    skins.retain(|_, entry| !entry.is_reclaimed());
    let pruned = before - skins.len();
    if pruned > 0 {
        tracing::trace!(target: "horizon_veneer::registry", pruned, "forgot reclaimed skins");
    }
    pruned
}

/// Creates skins and moves them in and out of control slots.
pub struct SkinRegistry {
    config: Arc<SkinConfig>,
    bridge: Arc<PropertyWatchBridge>,
    faults: Arc<dyn FaultSink>,
    skins: Mutex<SlotMap<SkinId, SkinEntry>>,
    installed: Mutex<HashMap<ControlId, Weak<Control>>>,
}

impl SkinRegistry {
    /// Create a registry with default configuration that logs faults.
    pub fn new() -> Self {
        Self::with_config(SkinConfig::default())
    }

    /// Create a registry with the given configuration.
    pub fn with_config(config: SkinConfig) -> Self {
        Self {
            config: Arc::new(config),
            bridge: Arc::new(PropertyWatchBridge::new()),
            faults: Arc::new(TracingFaultSink),
            skins: Mutex::new(SlotMap::with_key()),
            installed: Mutex::new(HashMap::new()),
        }
    }

    /// Send faults to `sink` instead of the log.
    pub fn with_fault_sink(mut self, sink: Arc<dyn FaultSink>) -> Self {
        self.faults = sink;
        self
    }

    /// The configuration skins measure with.
    pub fn config(&self) -> &SkinConfig {
        &self.config
    }

    /// The bridge every skin registers its listeners with.
    pub fn bridge(&self) -> &PropertyWatchBridge {
        &self.bridge
    }

    /// Build a skin for `control`, chosen by its kind.
    ///
    /// The skin starts [`Uninstalled`](crate::skin::SkinState::Uninstalled)
    /// but already observes the control.
    #[tracing::instrument(
        skip_all,
        target = "horizon_veneer::registry",
        level = "debug",
        fields(control = %control.id(), kind = %control.kind())
    )]
    pub fn create_skin(&self, control: &Arc<Control>) -> Arc<Skin> {
        let id = {
            let mut skins = self.skins.lock();
            prune(&mut skins);
            skins.insert(SkinEntry {
                skin: None,
                kind: control.kind(),
                control: control.id(),
            })
        };
        let skin = Arc::new(Skin::build(
            id,
            control,
            self.config.clone(),
            self.bridge.clone(),
            self.faults.clone(),
        ));
        if let Some(entry) = self.skins.lock().get_mut(id) {
            entry.skin = Some(Arc::downgrade(&skin));
        }
        tracing::debug!(
            target: "horizon_veneer::registry",
            skin = ?id,
            listeners = self.bridge.active_count(id),
            "skin created"
        );
        skin
    }

    /// Put `skin` into the control's slot.
    ///
    /// Returns the skin that was in the slot before. It is detached but not
    /// disposed; the caller decides whether to dispose it, reinstall it, or
    /// drop it. Installing the skin already in the slot returns `None`.
    ///
    /// # Errors
    ///
    /// [`SkinError::Disposed`] for a disposed skin and
    /// [`SkinError::ForeignSkin`] for a skin built for another control.
    pub fn install(&self, control: &Arc<Control>, skin: Arc<Skin>) -> SkinResult<Option<Arc<Skin>>> {
        if skin.control_id() != control.id() {
            return Err(SkinError::ForeignSkin {
                skin: skin.id(),
                owner: skin.control_id(),
                target: control.id(),
            });
        }
        skin.mark_installed()?;

        let previous = control
            .swap_skin(Some(skin.clone()))
            .filter(|previous| !Arc::ptr_eq(previous, &skin));
        if let Some(previous) = &previous {
            previous.mark_detached();
        }
        self.installed.lock().insert(control.id(), Arc::downgrade(control));

        tracing::debug!(
            target: "horizon_veneer::registry",
            control = %control.id(),
            skin = ?skin.id(),
            previous = ?previous.as_ref().map(|previous| previous.id()),
            "skin installed"
        );
        Ok(previous)
    }

    /// Empty the control's slot, returning the detached skin.
    pub fn uninstall(&self, control: &Control) -> Option<Arc<Skin>> {
        let previous = control.swap_skin(None)?;
        previous.mark_detached();
        self.installed.lock().remove(&control.id());
        tracing::debug!(target: "horizon_veneer::registry", control = %control.id(), skin = ?previous.id(), "skin uninstalled");
        Some(previous)
    }

    /// Dispose `skin`. Returns `false` if it was already disposed.
    pub fn dispose(&self, skin: &Skin) -> bool {
        skin.dispose()
    }

    /// Install `skin` and dispose the skin it displaces.
    ///
    /// Returns a weak handle to the displaced skin, which a leak check can
    /// pass to [`await_reclaimed`](Self::await_reclaimed).
    pub fn replace(&self, control: &Arc<Control>, skin: Arc<Skin>) -> SkinResult<Option<Weak<Skin>>> {
        let previous = self.install(control, skin)?;
        Ok(previous.map(|previous| {
            previous.dispose();
            Arc::downgrade(&previous)
        }))
    }

    /// The skin in the control's slot.
    pub fn skin_of(&self, control: &Control) -> Option<Arc<Skin>> {
        control.skin()
    }

    /// Controls that are alive and hold a skin installed here.
    pub fn installed_count(&self) -> usize {
        self.installed
            .lock()
            .values()
            .filter_map(Weak::upgrade)
            .filter(|control| control.has_skin())
            .count()
    }

    /// Skins created here that are still alive, disposed or not.
    pub fn live_skin_count(&self) -> usize {
        self.skins
            .lock()
            .values()
            .filter(|entry| entry.is_live())
            .count()
    }

    /// Live skins built for controls of `kind`.
    pub fn live_skins_of_kind(&self, kind: ControlKind) -> usize {
        self.skins
            .lock()
            .values()
            .filter(|entry| entry.kind == kind && entry.is_live())
            .count()
    }

    /// Wait until nothing keeps the skin behind `weak` alive, polling as
    /// configured by [`SkinConfig::reclaim`].
    pub fn await_reclaimed(&self, weak: &Weak<Skin>) -> bool {
        reclaim::await_release(weak, &self.config.reclaim)
    }

    /// Run one layout pass over every installed skin.
    ///
    /// Returns how many skins were laid out. Controls and skins that no
    /// longer exist are forgotten.
    pub fn pulse(&self) -> usize {
        let _span = PerfSpan::new("pulse");
        let controls: Vec<Arc<Control>> = {
            let mut installed = self.installed.lock();
            installed.retain(|_, control| control.strong_count() > 0);
            installed.values().filter_map(Weak::upgrade).collect()
        };

        let laid_out = controls
            .iter()
            .filter_map(|control| control.skin())
            .filter(|skin| skin.pulse())
            .count();

        prune(&mut self.skins.lock());
        laid_out
    }

    /// Deliver `event` to the control's installed skin.
    ///
    /// Returns whether the skin handled the event.
    ///
    /// # Errors
    ///
    /// [`SkinError::NotInstalled`] without a skin, [`SkinError::Disposed`]
    /// if the installed skin was disposed, or the failure of a listener the
    /// event triggered.
    pub fn dispatch(&self, control: &Control, event: InputEvent) -> SkinResult<bool> {
        let skin = control
            .skin()
            .ok_or(SkinError::NotInstalled { control: control.id() })?;
        if skin.is_disposed() {
            return Err(SkinError::Disposed { skin: skin.id() });
        }
        skin.handle_input(control, &event)
    }
}

impl Default for SkinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkinRegistry")
            .field("config", &self.config)
            .field("skins", &self.skins.lock().len())
            .field("installed", &self.installed.lock().len())
            .field("bridge", &self.bridge)
            .finish()
    }
}

static_assertions::assert_impl_all!(SkinRegistry: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skin::SkinState;
    use horizon_veneer_core::CollectingFaultSink;

    #[test]
    fn test_create_and_install() {
        let registry = SkinRegistry::new();
        let button = Control::new(ControlKind::Button);
        let skin = registry.create_skin(&button);
        assert_eq!(skin.state(), SkinState::Uninstalled);
        assert_eq!(registry.live_skin_count(), 1);

        assert!(registry.install(&button, skin.clone()).unwrap().is_none());
        assert_eq!(skin.state(), SkinState::Installed);
        assert_eq!(registry.installed_count(), 1);
        assert!(Arc::ptr_eq(&registry.skin_of(&button).unwrap(), &skin));

        // Reinstalling the same skin is a no-op.
        assert!(registry.install(&button, skin.clone()).unwrap().is_none());
    }

    #[test]
    fn test_install_over_detaches_previous() {
        let registry = SkinRegistry::new();
        let label = Control::new(ControlKind::Label);
        let first = registry.create_skin(&label);
        let second = registry.create_skin(&label);
        registry.install(&label, first.clone()).unwrap();

        let previous = registry.install(&label, second.clone()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert_eq!(first.state(), SkinState::Uninstalled);
        assert_eq!(second.state(), SkinState::Installed);
    }

    #[test]
    fn test_disposed_skin_is_rejected() {
        let registry = SkinRegistry::new();
        let label = Control::new(ControlKind::Label);
        let skin = registry.create_skin(&label);
        assert!(registry.dispose(&skin));
        assert!(!registry.dispose(&skin));

        let err = registry.install(&label, skin.clone()).unwrap_err();
        assert!(matches!(err, SkinError::Disposed { skin: id } if id == skin.id()));
        assert!(!label.has_skin());
    }

    #[test]
    fn test_foreign_skin_is_rejected() {
        let registry = SkinRegistry::new();
        let a = Control::new(ControlKind::Button);
        let b = Control::new(ControlKind::Button);
        let skin = registry.create_skin(&a);
        let err = registry.install(&b, skin).unwrap_err();
        assert!(matches!(err, SkinError::ForeignSkin { owner, target, .. } if owner == a.id() && target == b.id()));
    }

    #[test]
    fn test_replace_disposes_and_reclaims() {
        let registry = SkinRegistry::new();
        let field = Control::new(ControlKind::TextField);
        registry.install(&field, registry.create_skin(&field)).unwrap();

        let weak = registry
            .replace(&field, registry.create_skin(&field))
            .unwrap()
            .unwrap();
        assert!(registry.await_reclaimed(&weak));
        assert_eq!(registry.live_skin_count(), 1);
    }

    #[test]
    fn test_uninstall() {
        let registry = SkinRegistry::new();
        let bar = Control::new(ControlKind::ProgressBar);
        let skin = registry.create_skin(&bar);
        registry.install(&bar, skin.clone()).unwrap();

        let removed = registry.uninstall(&bar).unwrap();
        assert!(Arc::ptr_eq(&removed, &skin));
        assert_eq!(skin.state(), SkinState::Uninstalled);
        assert_eq!(registry.installed_count(), 0);
        assert!(registry.uninstall(&bar).is_none());
    }

    #[test]
    fn test_dispatch_errors() {
        let registry = SkinRegistry::new();
        let button = Control::new(ControlKind::Button);
        let err = registry.dispatch(&button, InputEvent::KeyPressed(crate::input::Key::Enter)).unwrap_err();
        assert!(matches!(err, SkinError::NotInstalled { .. }));

        let skin = registry.create_skin(&button);
        registry.install(&button, skin.clone()).unwrap();
        skin.dispose();
        let err = registry.dispatch(&button, InputEvent::KeyPressed(crate::input::Key::Enter)).unwrap_err();
        assert!(matches!(err, SkinError::Disposed { .. }));
    }

    #[test]
    fn test_pulse_forgets_dropped_controls() {
        let registry = SkinRegistry::new();
        let label = Control::new(ControlKind::Label);
        registry.install(&label, registry.create_skin(&label)).unwrap();
        assert_eq!(registry.pulse(), 1);

        drop(label);
        assert_eq!(registry.pulse(), 0);
        assert_eq!(registry.live_skin_count(), 0);
    }

    #[test]
    fn test_create_skin_forgets_reclaimed_skins() {
        let registry = SkinRegistry::new();
        let label = Control::new(ControlKind::Label);
        for _ in 0..100 {
            drop(registry.create_skin(&label));
        }
        let kept = registry.create_skin(&label);
        assert_eq!(registry.skins.lock().len(), 1);
        assert_eq!(registry.live_skin_count(), 1);
        assert_eq!(registry.live_skins_of_kind(ControlKind::Label), 1);
        drop(kept);
        assert_eq!(registry.live_skin_count(), 0);
    }

    #[test]
    fn test_dispose_reports_listener_failure() {
        let sink = Arc::new(CollectingFaultSink::new());
        let registry = SkinRegistry::new().with_fault_sink(sink.clone());
        let combo = Control::new(ControlKind::ComboBox);
        let skin = registry.create_skin(&combo);
        registry.install(&combo, skin.clone()).unwrap();
        combo.showing().set(true).unwrap();
        combo.showing().changed().connect(|&showing| {
            if showing {
                Ok(())
            } else {
                Err(horizon_veneer_core::SlotError::new("closing refused"))
            }
        });

        assert!(skin.dispose());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.faults()[0].operation, "dispose");
        assert!(!skin.popup_open());
        assert!(!combo.showing().get());
    }
}
