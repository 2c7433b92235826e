//! Progress bar layout.

use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

const PREF_WIDTH: f64 = 200.0;
const PREF_HEIGHT: f64 = 24.0;
const MIN_WIDTH: f64 = 40.0;
const MIN_HEIGHT: f64 = 16.0;

#[derive(Debug)]
struct ProgressLayout;

impl SkinLayout for ProgressLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        MIN_WIDTH.max(cx.control.padding().get().horizontal())
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        PREF_WIDTH.max(cx.control.padding().get().horizontal())
    }

    fn min_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        MIN_HEIGHT.max(cx.control.padding().get().vertical())
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        PREF_HEIGHT.max(cx.control.padding().get().vertical())
    }
}

pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    cx.relayout_on(cx.control.progress());
    cx.relayout_on(cx.control.indeterminate());
    SkinParts::new(ProgressLayout)
}

#[cfg(test)]
mod tests {
    use crate::control::{Control, ControlKind};
    use crate::geometry::Insets;
    use crate::registry::SkinRegistry;

    #[test]
    fn test_sizes() {
        let registry = SkinRegistry::new();
        let bar = Control::new(ControlKind::ProgressBar);
        registry.install(&bar, registry.create_skin(&bar)).unwrap();

        assert_eq!(bar.pref_width(-1.0), 200.0);
        assert_eq!(bar.min_width(-1.0), 40.0);
        assert_eq!(bar.pref_height(-1.0), 24.0);
        assert_eq!(bar.max_width(-1.0), 200.0);
    }

    #[test]
    fn test_progress_requests_layout() {
        let registry = SkinRegistry::new();
        let bar = Control::new(ControlKind::ProgressBar);
        let skin = registry.create_skin(&bar);
        registry.install(&bar, skin.clone()).unwrap();
        registry.pulse();
        assert!(!skin.needs_layout());

        bar.progress().set(0.5).unwrap();
        assert!(skin.needs_layout());
    }

    #[test]
    fn test_padding_floors_size() {
        let registry = SkinRegistry::new();
        let bar = Control::new(ControlKind::ProgressBar);
        bar.padding().set(Insets::uniform(20.0)).unwrap();
        registry.install(&bar, registry.create_skin(&bar)).unwrap();
        assert_eq!(bar.min_height(-1.0), 40.0);
    }
}
