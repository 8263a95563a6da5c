use egui::{Color32, Context, Visuals};

use crate::engine::{Choice, WidgetStyle};
use crate::settings::ColorEntry;

// === Layout ===
pub const WINDOW_SIZE: [f32; 2] = [572.0, 518.0];
pub const GRID_SPACING: egui::Vec2 = egui::vec2(40.0, 12.0);
pub const CONTROL_WIDTH: f32 = 180.0;
pub const SWATCH_SIZE: egui::Vec2 = egui::vec2(98.0, 24.0);
pub const TAB_SIZE: egui::Vec2 = egui::vec2(80.0, 28.0);
/// Half the tab height, for the pill shape
pub const TAB_ROUNDING: f32 = 14.0;

/// Live-apply the widget style to every viewport
pub fn apply_widget_style(ctx: &Context, style: WidgetStyle) {
    let visuals = match style {
        WidgetStyle::Light => Visuals::light(),
        WidgetStyle::Dark => Visuals::dark(),
    };
    ctx.set_visuals(visuals);
    tracing::debug!("[Theme] Widget style: {}", style.label());
}

/// Highlight used by the tab pills
pub fn accent(ctx: &Context) -> Color32 {
    ctx.style().visuals.selection.bg_fill
}

/// Stored color to egui's (premultiplied) color
pub fn to_egui_color(color: ColorEntry) -> Color32 {
    let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_color_converts_exactly() {
        let c = to_egui_color(ColorEntry::new(53, 132, 228, 1.0));
        assert_eq!(c, Color32::from_rgb(53, 132, 228));
    }

    #[test]
    fn test_transparent_color_has_zero_alpha() {
        let c = to_egui_color(ColorEntry::new(255, 0, 0, 0.0));
        assert_eq!(c.a(), 0);
    }
}
