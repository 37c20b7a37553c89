use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use tracing::debug;

use crate::api::Channel;
use crate::api::types::TagsSaved;
use crate::autocomplete::AutocompleteEngine;
use crate::cache::CachedSnapshot;
use crate::cards::{CardList, EMPTY_LIST_MESSAGE};
use crate::filters::{self, FilterToken, TagFilterEngine, TextSearch};
use crate::palette::TagPalette;
use crate::tag_colors::{ColorChange, TagColorRegistry};

/// Everything drawn on the channel page, independent of the widget toolkit.
pub struct PageState {
    pub registry: TagColorRegistry,
    color_rx: Receiver<ColorChange>,
    unique_tags: Vec<String>,
    pub autocomplete: AutocompleteEngine,
    pub cards: CardList,
    pub tag_filter: TagFilterEngine,
    pub text_search: TextSearch,
    pub palette: TagPalette,
    visible_count: usize,
}

impl PageState {
    pub fn new(default_color: &str) -> Self {
        let mut registry = TagColorRegistry::new(default_color);
        let color_rx = registry.subscribe();
        let tag_filter = TagFilterEngine::new(&[], &registry);
        Self {
            registry,
            color_rx,
            unique_tags: Vec::new(),
            autocomplete: AutocompleteEngine::default(),
            cards: CardList::default(),
            tag_filter,
            text_search: TextSearch::default(),
            palette: TagPalette::default(),
            visible_count: 0,
        }
    }

    pub fn unique_tags(&self) -> &[String] {
        &self.unique_tags
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Message shown in place of the list when there are no channels at all.
    pub fn empty_state(&self) -> Option<&'static str> {
        self.cards.is_empty().then_some(EMPTY_LIST_MESSAGE)
    }

    /// Full rebuild from server data: colors, tag lists, every card. The tag
    /// filter goes back to showing everything.
    pub fn load(
        &mut self,
        channels: &[Channel],
        unique_tags: Vec<String>,
        tag_colors: HashMap<String, String>,
    ) {
        self.registry.replace_all(tag_colors);
        self.discard_color_changes();
        self.set_unique_tags(unique_tags);
        self.cards
            .render(channels, &self.registry, &mut self.autocomplete);
        self.tag_filter.reset();
        self.refresh_visibility();
    }

    pub fn load_snapshot(&mut self, snapshot: CachedSnapshot) {
        let CachedSnapshot {
            channels,
            unique_tags,
            tag_colors,
            ..
        } = snapshot;
        self.load(&channels, unique_tags, tag_colors);
    }

    pub fn snapshot(&self) -> CachedSnapshot {
        CachedSnapshot::new(
            self.cards.to_channels(),
            self.unique_tags.clone(),
            self.registry.colors().clone(),
        )
    }

    /// Applies a successful tag save: the server's tag list and colors win
    /// over whatever was typed.
    pub fn apply_tags_saved(&mut self, channel_id: &str, saved: TagsSaved) {
        let TagsSaved {
            tags,
            unique_tags,
            tag_colors,
        } = saved;
        self.registry.replace_all(tag_colors);
        self.apply_color_changes();
        if !self
            .cards
            .apply_saved_tags(channel_id, &tags, &self.registry)
        {
            debug!(channel_id, "saved tags for a channel no longer on the page");
        }
        self.set_unique_tags(unique_tags);
        self.refresh_visibility();
    }

    pub fn apply_rating(&mut self, channel_id: &str, rating: Option<u8>) {
        self.cards.apply_rating(channel_id, rating);
    }

    /// Applies a successful color save and recolors every chip, toggle and
    /// sidebar entry in place.
    pub fn apply_colors(&mut self, all_colors: HashMap<String, String>) {
        self.registry.replace_all(all_colors);
        self.apply_color_changes();
    }

    /// Drains registry notifications into the widgets already on the page.
    pub fn apply_color_changes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(change) = self.color_rx.try_recv() {
            self.cards.recolor(&change.tag, &change.color);
            self.tag_filter.recolor(&change.tag, &change.color);
            self.palette.recolor(&change.tag, &change.color);
            applied += 1;
        }
        applied
    }

    pub fn select_filter(&mut self, token: FilterToken) {
        self.tag_filter.select(token);
        self.refresh_visibility();
    }

    pub fn set_search(&mut self, query: &str) {
        self.text_search.set_query(query);
        self.refresh_visibility();
    }

    pub fn refresh_visibility(&mut self) -> usize {
        self.visible_count =
            filters::apply_visibility(&mut self.cards, &self.tag_filter, &self.text_search);
        self.visible_count
    }

    fn set_unique_tags(&mut self, unique_tags: Vec<String>) {
        self.tag_filter.rebuild_toggles(&unique_tags, &self.registry);
        self.palette.rebuild(&unique_tags, &self.registry);
        self.autocomplete.set_unique_tags(unique_tags.clone());
        self.unique_tags = unique_tags;
    }

    // Full rebuilds resolve colors fresh, so queued notifications are stale.
    fn discard_color_changes(&mut self) {
        while self.color_rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn colors(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn channel(id: &str, card_tags: &[&str]) -> Channel {
        Channel {
            channel_id: id.into(),
            title: format!("Channel {id}"),
            thumbnail_url: None,
            tags: tags(card_tags),
            rating: None,
        }
    }

    fn loaded() -> PageState {
        let mut page = PageState::new("#cccccc");
        page.load(
            &[
                channel("UC1", &["music", "live"]),
                channel("UC2", &["music"]),
                channel("UC3", &[]),
            ],
            tags(&["live", "music"]),
            colors(&[("music", "#ffadad")]),
        );
        page
    }

    #[test]
    fn empty_load_has_zero_visible() {
        let mut page = PageState::new("#cccccc");
        page.load(&[], vec![], HashMap::new());
        assert!(page.cards.is_empty());
        assert_eq!(page.visible_count(), 0);
        assert_eq!(page.empty_state(), Some("No channels found."));
    }

    #[test]
    fn loaded_page_has_no_empty_state() {
        let page = loaded();
        assert_eq!(page.empty_state(), None);
    }

    #[test]
    fn load_wires_autocomplete_with_unique_tags() {
        let mut page = loaded();
        assert_eq!(page.visible_count(), 3);
        let card = page.cards.get_mut("UC3").unwrap();
        card.tag_input.value = "mu".into();
        page.autocomplete.on_input(&mut card.tag_input);
        assert_eq!(card.tag_input.suggestion(), Some("music"));
    }

    #[test]
    fn color_change_reaches_every_occurrence() {
        let mut page = loaded();
        page.apply_colors(colors(&[("music", "#a0c4ff")]));

        let card_chips: Vec<_> = page
            .cards
            .cards()
            .iter()
            .flat_map(|card| card.chips.iter())
            .filter(|chip| chip.tag == "music")
            .collect();
        assert_eq!(card_chips.len(), 2);
        assert!(card_chips.iter().all(|chip| chip.color == "#a0c4ff"));

        let toggle = page
            .tag_filter
            .toggles()
            .iter()
            .find(|t| t.token == FilterToken::from_key("music"))
            .unwrap();
        assert_eq!(toggle.color, "#a0c4ff");

        let entry = page
            .palette
            .entries()
            .iter()
            .find(|entry| entry.tag == "music")
            .unwrap();
        assert_eq!(entry.color, "#a0c4ff");
    }

    #[test]
    fn tag_save_uses_server_list_and_keeps_filters() {
        let mut page = loaded();
        page.select_filter(FilterToken::from_key("music"));
        assert_eq!(page.visible_count(), 2);

        page.apply_tags_saved(
            "UC3",
            TagsSaved {
                tags: tags(&["x", "y"]),
                unique_tags: tags(&["live", "music", "x", "y"]),
                tag_colors: colors(&[("music", "#ffadad"), ("x", "#caffbf")]),
            },
        );

        let card = page.cards.get("UC3").unwrap();
        assert_eq!(card.tag_input.value, "x, y");
        assert_eq!(card.chips[0].color, "#caffbf");
        assert!(page.tag_filter.selection().is_selected(&FilterToken::from_key("music")));
        assert_eq!(page.visible_count(), 2);
        assert_eq!(page.autocomplete.unique_tags().len(), 4);
        assert_eq!(page.tag_filter.toggles().len(), 6);
    }

    #[test]
    fn reload_resets_filter_to_all() {
        let mut page = loaded();
        page.select_filter(FilterToken::NoTag);
        assert_eq!(page.visible_count(), 1);
        page.load(&[channel("UC9", &["x"])], tags(&["x"]), HashMap::new());
        assert!(page.tag_filter.selection().is_selected(&FilterToken::All));
        assert_eq!(page.visible_count(), 1);
    }

    #[test]
    fn search_and_filter_publish_one_count() {
        let mut page = loaded();
        page.select_filter(FilterToken::from_key("music"));
        page.set_search("channel uc2");
        assert_eq!(page.visible_count(), 1);
        page.set_search("");
        assert_eq!(page.visible_count(), 2);
    }

    #[test]
    fn snapshot_round_trips_page_data() {
        let page = loaded();
        let snapshot = page.snapshot();
        assert_eq!(snapshot.channels.len(), 3);
        assert_eq!(snapshot.channels[0].tags, tags(&["music", "live"]));

        let mut restored = PageState::new("#cccccc");
        restored.load_snapshot(snapshot);
        assert_eq!(restored.cards.len(), 3);
        assert_eq!(restored.registry.resolve("music"), "#ffadad");
    }
}
