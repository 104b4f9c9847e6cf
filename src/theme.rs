use eframe::egui::{self, Color32, Visuals};

/// Fill of a button under the mouse ("lightblue").
pub const HOVER_FILL: Color32 = Color32::from_rgb(173, 216, 230);

/// Base light/dark visuals with the light-blue hover highlight on buttons.
pub fn apply_theme(ctx: &egui::Context, dark_mode: bool) {
    let mut visuals = if dark_mode { Visuals::dark() } else { Visuals::light() };
    let hovered = &mut visuals.widgets.hovered;
    hovered.bg_fill = HOVER_FILL;
    hovered.weak_bg_fill = HOVER_FILL;
    // keep button text readable on the light fill
    hovered.fg_stroke.color = Color32::BLACK;
    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovered_buttons_turn_light_blue() {
        for dark_mode in [true, false] {
            let ctx = egui::Context::default();
            apply_theme(&ctx, dark_mode);
            let style = ctx.style();
            let hovered = &style.visuals.widgets.hovered;
            assert_eq!(hovered.weak_bg_fill, HOVER_FILL);
            assert_eq!(hovered.bg_fill, HOVER_FILL);
            assert_eq!(hovered.fg_stroke.color, Color32::BLACK);
            assert_eq!(style.visuals.dark_mode, dark_mode);
        }
    }
}
