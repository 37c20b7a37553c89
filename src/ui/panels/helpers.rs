use egui::text::{CCursor, CCursorRange};
use egui::{Align2, Key, Modifiers, Response, RichText, Sense, TextEdit, TextStyle};

use crate::autocomplete::{AutocompleteEngine, TagInput};
use crate::cards::{MAX_RATING, TagChip};
use crate::ui::theme::{STAR_COLOR, contrast_text, tag_chip_frame, tag_color};

pub(super) fn tag_chip(ui: &mut egui::Ui, chip: &TagChip) -> Response {
    let color = tag_color(&chip.color);
    tag_chip_frame(color)
        .show(ui, |ui| {
            ui.label(RichText::new(&chip.tag).color(contrast_text(color)));
        })
        .response
        .interact(Sense::click())
}

/// Single-line tag editor with inline completion. The remainder of the
/// suggestion is drawn as ghost text after the cursor; Tab accepts it.
/// Returns `true` when Enter was pressed.
pub(super) fn tag_input_with_autocomplete(
    ui: &mut egui::Ui,
    engine: &AutocompleteEngine,
    input: &mut TagInput,
    channel_id: &str,
    enabled: bool,
) -> bool {
    let id = ui.make_persistent_id(("tag-input", channel_id));
    let has_suggestion = input.suggestion().is_some();

    // Tab is taken out of the input queue before the editor sees it.
    let accepted = has_suggestion
        && ui.memory(|mem| mem.has_focus(id))
        && ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Tab))
        && engine.accept(input);

    let mut output = TextEdit::singleline(&mut input.value)
        .id(id)
        .hint_text("tag1, tag2, ...")
        .desired_width(280.0)
        .lock_focus(has_suggestion)
        .interactive(enabled)
        .show(ui);

    if accepted {
        let end = CCursor::new(input.value.chars().count());
        output
            .state
            .cursor
            .set_char_range(Some(CCursorRange::one(end)));
        output.state.store(ui.ctx(), id);
    } else if output.response.changed() {
        engine.on_input(input);
    }

    if let Some(suggestion) = input.suggestion() {
        if output.response.has_focus() {
            let (text, offset) = match suggestion.strip_prefix(input.value.as_str()) {
                Some(rest) => (rest.to_owned(), 0.0),
                None => (format!("→ {suggestion}"), 8.0),
            };
            let pos = output.galley_pos + egui::vec2(output.galley.size().x + offset, 0.0);
            ui.painter().text(
                pos,
                Align2::LEFT_TOP,
                text,
                TextStyle::Body.resolve(ui.style()),
                ui.visuals().weak_text_color(),
            );
        }
    }

    output.response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter))
}

/// What the star row asked for: `Some(None)` clears the rating.
pub(super) fn star_row(ui: &mut egui::Ui, rating: Option<u8>, enabled: bool) -> Option<Option<u8>> {
    let mut requested = None;
    ui.add_enabled_ui(enabled, |ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        let current = rating.unwrap_or(0);
        for star in 1..=MAX_RATING {
            let filled = star <= current;
            let glyph = if filled { "★" } else { "☆" };
            let response = ui
                .add(egui::Button::new(RichText::new(glyph).size(18.0).color(STAR_COLOR)).frame(false))
                .on_hover_text(format!("Rate {star}"));
            if response.clicked() {
                requested = Some(Some(star));
            }
        }
        if rating.is_some() {
            ui.add_space(6.0);
            if ui
                .small_button("✕")
                .on_hover_text("Clear rating")
                .clicked()
            {
                requested = Some(None);
            }
        }
    });
    requested
}
