//! Tool bar layout with overflow.
//!
//! Items are laid out left to right. When the assigned width cannot hold all
//! of them, trailing items move into an overflow menu whose button takes the
//! last slot.

use crate::config::SkinConfig;
use crate::control::Control;

use super::{LayoutCx, SkinContext, SkinLayout, SkinParts};

const ITEM_PADDING: f64 = 16.0;
const ITEM_VERTICAL_PADDING: f64 = 8.0;
const OVERFLOW_BUTTON: f64 = 24.0;

fn item_widths(control: &Control, config: &SkinConfig) -> Vec<f64> {
    control.items().with(|items| {
        items
            .iter()
            .map(|item| config.text.text_width(item) + ITEM_PADDING)
            .collect()
    })
}

fn row_width(widths: &[f64], spacing: f64) -> f64 {
    let gaps = widths.len().saturating_sub(1) as f64;
    widths.iter().sum::<f64>() + gaps * spacing
}

/// Items that do not fit in `width`.
pub(super) fn overflow_count(control: &Control, config: &SkinConfig, width: f64) -> usize {
    let widths = item_widths(control, config);
    let spacing = config.toolbar_spacing;
    let available = width - control.padding().get().horizontal();
    if row_width(&widths, spacing) <= available {
        return 0;
    }

    let available = available - OVERFLOW_BUTTON - spacing;
    let mut used = 0.0;
    let mut fitted = 0;
    for width in &widths {
        let gap = if fitted > 0 { spacing } else { 0.0 };
        if used + gap + width > available {
            break;
        }
        used += gap + width;
        fitted += 1;
    }
    widths.len() - fitted
}

#[derive(Debug)]
struct ToolBarLayout;

impl SkinLayout for ToolBarLayout {
    fn min_width(&self, cx: &LayoutCx<'_>, height: f64) -> f64 {
        let overflow = OVERFLOW_BUTTON + cx.control.padding().get().horizontal();
        overflow.min(self.pref_width(cx, height))
    }

    fn pref_width(&self, cx: &LayoutCx<'_>, _height: f64) -> f64 {
        let widths = item_widths(cx.control, cx.config);
        row_width(&widths, cx.config.toolbar_spacing) + cx.control.padding().get().horizontal()
    }

    fn min_height(&self, cx: &LayoutCx<'_>, width: f64) -> f64 {
        self.pref_height(cx, width)
    }

    fn pref_height(&self, cx: &LayoutCx<'_>, _width: f64) -> f64 {
        cx.config.text.line_height + ITEM_VERTICAL_PADDING + cx.control.padding().get().vertical()
    }

    fn max_width(&self, _cx: &LayoutCx<'_>, _height: f64) -> f64 {
        f64::MAX
    }
}

pub(super) fn build(cx: &SkinContext<'_>) -> SkinParts {
    cx.relayout_on_signal("items", cx.control.items().changed());
    cx.relayout_on(cx.control.size());
    SkinParts::new(ToolBarLayout)
}
