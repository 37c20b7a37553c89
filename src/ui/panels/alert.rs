use egui::{Align2, Context, RichText};

use crate::ui::theme::ACCENT_ERROR;

use super::AppState;

/// Error window for failed rating and color saves. The other panels are
/// disabled until it is dismissed.
pub(super) fn render(state: &mut AppState, ctx: &Context) {
    let Some(message) = state.session.alert.clone() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(RichText::new(message).color(ACCENT_ERROR));
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    if dismissed {
        state.session.alert = None;
    }
}
