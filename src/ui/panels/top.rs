use egui::{Align, Color32, Context, Frame, Layout, Margin, RichText, TextEdit};

use crate::cards::StatusKind;
use crate::ui::theme::{ACCENT_ERROR, ACCENT_REFRESH, ACCENT_SAVE, PANEL_FILL, STATUS_ACCENT};

use super::AppState;

pub(super) fn render(state: &mut AppState, ctx: &Context) {
    let mut refresh_requested = false;

    egui::TopBottomPanel::top("top")
        .resizable(false)
        .show(ctx, |ui| {
            if state.session.alert.is_some() {
                ui.disable();
            }
            Frame::default()
                .fill(PANEL_FILL)
                .inner_margin(Margin::symmetric(16, 12))
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            ui.heading(
                                RichText::new("YTChannels").color(Color32::from_rgb(229, 231, 235)),
                            );
                            ui.add_space(12.0);
                            if let Some(status) = &state.session.status {
                                let color = match status.kind {
                                    StatusKind::Pending => STATUS_ACCENT,
                                    StatusKind::Success => ACCENT_SAVE,
                                    StatusKind::Error => ACCENT_ERROR,
                                };
                                ui.colored_label(color, RichText::new(&status.text).strong());
                            }
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                let refresh_button = egui::Button::new(
                                    RichText::new("Refresh from YouTube")
                                        .strong()
                                        .color(Color32::WHITE),
                                )
                                .fill(ACCENT_REFRESH)
                                .min_size(egui::vec2(180.0, 32.0));
                                if ui
                                    .add_enabled(!state.session.is_refreshing, refresh_button)
                                    .on_hover_text("Re-import subscriptions and tags from the server")
                                    .clicked()
                                {
                                    refresh_requested = true;
                                }
                            });
                        });
                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            ui.label("Search:");
                            let response = ui.add(
                                TextEdit::singleline(state.session.page.text_search.query_mut())
                                    .hint_text("Title or tag")
                                    .desired_width(320.0),
                            );
                            if response.changed() {
                                state.session.page.text_search.sync();
                                state.session.page.refresh_visibility();
                            }
                            ui.add_space(12.0);
                            ui.label(format!(
                                "Showing {} of {}",
                                state.session.page.visible_count(),
                                state.session.page.cards.len()
                            ));
                        });
                    });
                });
        });

    if refresh_requested {
        state.launch_refresh();
    }
}
