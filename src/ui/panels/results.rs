use egui::{
    Align2, Color32, Context, CornerRadius, FontId, Frame, Image, Margin, RichText, Sense, Stroke,
    StrokeKind,
};

use crate::autocomplete::AutocompleteEngine;
use crate::cards::{Card, StatusKind, StatusMessage, Thumbnail};
use crate::page::PageState;
use crate::session::Session;
use crate::ui::panels::helpers::{star_row, tag_chip, tag_input_with_autocomplete};
use crate::ui::theme::{
    ACCENT_ERROR, ACCENT_OPEN, ACCENT_SAVE, CARD_BG, CARD_BORDER, STATUS_ACCENT,
};
use crate::ui::thumbnails::{
    MAX_THUMB_HEIGHT, MAX_THUMB_WIDTH, ThumbnailCache, ThumbnailStatus, display_size,
};
use crate::ui::utils::open_in_browser;

use super::AppState;

enum CardAction {
    Open(String),
    SaveTags(String),
    Rate(String, Option<u8>),
}

pub(super) fn render(state: &mut AppState, ctx: &Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if state.session.alert.is_some() {
            ui.disable();
        }
        ui.horizontal(|ui| {
            ui.heading("Channels");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Visible: {}", state.session.page.visible_count()));
            });
        });
        if let Some(message) = state.session.page.empty_state() {
            ui.label(message);
            return;
        }
        if state.session.page.visible_count() == 0 {
            ui.label("No channels match the current filters.");
        }

        let mut actions: Vec<CardAction> = Vec::new();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let AppState {
                    session: Session { page, .. },
                    thumbnail_cache,
                    runtime,
                    ..
                } = &mut *state;
                let PageState {
                    cards,
                    autocomplete,
                    ..
                } = page;
                for card in cards.cards_mut().iter_mut().filter(|card| card.visible) {
                    thumbnail_cache.request(&card.channel_id, card.thumbnail.url(), runtime);
                    render_card(ui, card, autocomplete, thumbnail_cache, &mut actions);
                    ui.add_space(6.0);
                }
            });

        for action in actions {
            match action {
                CardAction::Open(url) => {
                    if let Err(err) = open_in_browser(&url) {
                        tracing::warn!(%url, %err, "failed to open browser");
                        state.session.status = Some(StatusMessage::error(
                            format!("Failed to open browser: {err}"),
                            state.session.refresh_status_ttl(),
                        ));
                    }
                }
                CardAction::SaveTags(channel_id) => state.launch_save_tags(&channel_id),
                CardAction::Rate(channel_id, rating) => {
                    state.launch_save_rating(&channel_id, rating)
                }
            }
        }
    });
}

fn render_card(
    ui: &mut egui::Ui,
    card: &mut Card,
    autocomplete: &AutocompleteEngine,
    thumbnails: &ThumbnailCache,
    actions: &mut Vec<CardAction>,
) {
    let thumbnail = thumbnails.status(&card.channel_id);

    Frame::default()
        .fill(CARD_BG)
        .stroke(Stroke::new(1.0, CARD_BORDER))
        .corner_radius(CornerRadius::same(8))
        .inner_margin(Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_min_width(MAX_THUMB_WIDTH);
                    render_thumbnail(ui, &card.thumbnail, thumbnail);
                    ui.add_space(6.0);
                    let open_button =
                        egui::Button::new(RichText::new("Open").strong().color(Color32::WHITE))
                            .fill(ACCENT_OPEN);
                    if ui
                        .add_sized(egui::vec2(MAX_THUMB_WIDTH, 26.0), open_button)
                        .on_hover_text(card.channel_url.as_str())
                        .clicked()
                    {
                        actions.push(CardAction::Open(card.channel_url.clone()));
                    }
                });
                ui.add_space(12.0);
                ui.vertical(|ui| {
                    // Titles are plain text; markup in them is never interpreted.
                    let title = RichText::new(&card.title)
                        .heading()
                        .color(Color32::from_rgb(229, 231, 235));
                    ui.add(egui::Label::new(title).wrap());
                    ui.add_space(4.0);
                    if !card.chips.is_empty() {
                        ui.horizontal_wrapped(|ui| {
                            for chip in &card.chips {
                                tag_chip(ui, chip);
                            }
                        });
                        ui.add_space(4.0);
                    }
                    ui.horizontal(|ui| {
                        let submitted = tag_input_with_autocomplete(
                            ui,
                            autocomplete,
                            &mut card.tag_input,
                            &card.channel_id,
                            !card.saving_tags,
                        );
                        let save_button = egui::Button::new(
                            RichText::new("Save Tags").strong().color(Color32::WHITE),
                        )
                        .fill(ACCENT_SAVE);
                        let clicked = ui
                            .add_enabled(!card.saving_tags, save_button)
                            .on_hover_text("Send these tags to the server")
                            .clicked();
                        if (submitted || clicked) && !card.saving_tags {
                            actions.push(CardAction::SaveTags(card.channel_id.clone()));
                        }
                        if let Some(status) = &card.status {
                            let color = match status.kind {
                                StatusKind::Pending => STATUS_ACCENT,
                                StatusKind::Success => ACCENT_SAVE,
                                StatusKind::Error => ACCENT_ERROR,
                            };
                            ui.colored_label(color, status.text.as_str());
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Rating:");
                        if let Some(rating) = star_row(ui, card.rating, !card.saving_rating) {
                            actions.push(CardAction::Rate(card.channel_id.clone(), rating));
                        }
                    });
                });
            });
        });
}

fn render_thumbnail(ui: &mut egui::Ui, source: &Thumbnail, status: Option<&ThumbnailStatus>) {
    let message = match (source, status) {
        (Thumbnail::Remote(_), Some(ThumbnailStatus::Ready { texture, size })) => {
            let image = Image::new((texture.id(), display_size(*size)))
                .corner_radius(CornerRadius::same(6));
            ui.add(image);
            return;
        }
        (Thumbnail::Placeholder, _) => "No thumbnail",
        (Thumbnail::Remote(_), Some(ThumbnailStatus::Failed(_))) => "Failed to load",
        (Thumbnail::Remote(_), _) => "Loading...",
    };

    let desired = egui::vec2(MAX_THUMB_WIDTH, MAX_THUMB_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());
    let rounding = CornerRadius::same(6);
    ui.painter()
        .rect_filled(rect, rounding, Color32::from_rgb(30, 34, 42));
    ui.painter().rect_stroke(
        rect,
        rounding,
        Stroke::new(1.0, CARD_BORDER),
        StrokeKind::Inside,
    );
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(12.0),
        Color32::from_gray(180),
    );
    if let Some(ThumbnailStatus::Failed(reason)) = status {
        response.on_hover_text(reason.as_str());
    }
}
