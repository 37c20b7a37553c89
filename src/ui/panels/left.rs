use std::collections::HashMap;

use egui::{Color32, Context, Frame, Id, Margin, Order, Rect, RichText, Stroke};

use crate::cards::TagChip;
use crate::filters::FilterToken;
use crate::palette::{ClickTarget, swatches};
use crate::ui::theme::{PANEL_FILL, contrast_text, tag_color, tinted_toggle_button};

use super::AppState;
use super::helpers::tag_chip;

pub(super) fn render(state: &mut AppState, ctx: &Context) {
    egui::SidePanel::left("left")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            if state.session.alert.is_some() {
                ui.disable();
            }
            Frame::default()
                .fill(PANEL_FILL)
                .inner_margin(Margin::symmetric(14, 12))
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |scroll_ui| {
                            scroll_ui.heading("Filter by tag");
                            scroll_ui.separator();
                            render_filter_toggles(state, scroll_ui);
                            scroll_ui.add_space(12.0);
                            scroll_ui.separator();
                            scroll_ui.add_space(12.0);
                            scroll_ui.heading("Tag colors");
                            scroll_ui.label("Click a tag to pick its color.");
                            scroll_ui.add_space(4.0);
                            render_palette(state, scroll_ui);
                        });
                });
        });
}

fn render_filter_toggles(state: &mut AppState, ui: &mut egui::Ui) {
    let filter = &state.session.page.tag_filter;
    let toggles: Vec<(FilterToken, String, bool, Color32)> = filter
        .toggles()
        .iter()
        .map(|toggle| {
            let label = if filter.is_marked_multi(&toggle.token) {
                format!("● {}", toggle.label)
            } else {
                toggle.label.clone()
            };
            let selected = filter.selection().is_selected(&toggle.token);
            (toggle.token.clone(), label, selected, tag_color(&toggle.color))
        })
        .collect();

    let mut clicked: Option<FilterToken> = None;
    ui.horizontal_wrapped(|ui| {
        for (token, label, selected, color) in toggles {
            if tinted_toggle_button(ui, selected, &label, color) {
                clicked = Some(token);
            }
            ui.add_space(4.0);
        }
    });
    if let Some(token) = clicked {
        state.session.page.select_filter(token);
    }
}

fn render_palette(state: &mut AppState, ui: &mut egui::Ui) {
    let entries: Vec<TagChip> = state.session.page.palette.entries().to_vec();
    if entries.is_empty() {
        ui.label("(no tags yet)");
        return;
    }

    let mut anchors: HashMap<String, Rect> = HashMap::new();
    let mut toggled: Option<String> = None;
    ui.horizontal_wrapped(|ui| {
        for entry in &entries {
            let response = tag_chip(ui, entry).on_hover_text("Change color");
            if response.clicked() {
                toggled = Some(entry.tag.clone());
            }
            anchors.insert(entry.tag.clone(), response.rect);
        }
    });
    if let Some(tag) = toggled {
        state.session.page.palette.toggle(&tag);
    }

    let Some(open) = state.session.page.palette.open_tag().map(str::to_owned) else {
        return;
    };
    let Some(anchor) = anchors.get(&open).copied() else {
        state.session.page.palette.close();
        return;
    };

    let ctx = ui.ctx().clone();
    let saving = state.session.pending_colors.contains(&open);
    let mut chosen: Option<String> = None;
    let popover = egui::Area::new(Id::new(("tag-palette", open.as_str())))
        .order(Order::Foreground)
        .fixed_pos(anchor.left_bottom() + egui::vec2(0.0, 4.0))
        .show(&ctx, |ui| {
            Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(RichText::new(open.as_str()).strong());
                ui.add_enabled_ui(!saving, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.set_max_width(200.0);
                        for swatch in swatches(state.session.page.registry.default_color()) {
                            let color = tag_color(&swatch.color);
                            let text = match swatch.label {
                                Some(label) => RichText::new(label).color(contrast_text(color)),
                                None => RichText::new(" "),
                            };
                            let button = egui::Button::new(text)
                                .fill(color)
                                .stroke(Stroke::new(1.0, Color32::from_gray(90)))
                                .min_size(egui::vec2(24.0, 24.0));
                            if ui.add(button).on_hover_text(swatch.color.as_str()).clicked() {
                                chosen = Some(swatch.color.clone());
                            }
                        }
                    });
                });
            });
        });

    if let Some(color) = chosen {
        let request = state
            .session.page
            .palette
            .choose(&open, &color, &state.session.page.registry);
        if let Some(request) = request {
            state.launch_save_color(&request.tag, &request.color);
        }
        return;
    }

    // One global click check per frame against the open popover only.
    let click_pos = ctx.input(|i| {
        if i.pointer.any_click() {
            i.pointer.interact_pos()
        } else {
            None
        }
    });
    if let Some(pos) = click_pos {
        let target = if popover.response.rect.contains(pos) {
            ClickTarget::Popover
        } else if anchor.contains(pos) {
            ClickTarget::Anchor
        } else {
            ClickTarget::Elsewhere
        };
        state.session.page.palette.handle_click(target);
    }
}
