use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use crate::cards::{Card, CardList};
use crate::tag_colors::TagColorRegistry;

pub const ALL_KEY: &str = "all";
pub const NO_TAG_KEY: &str = "no-tag";
pub const ALL_COLOR: &str = "#e0e0e0";
pub const NO_TAG_COLOR: &str = "#ff6b6b";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterToken {
    All,
    NoTag,
    Tag(String),
}

impl FilterToken {
    pub fn from_key(key: &str) -> Self {
        match key {
            ALL_KEY => FilterToken::All,
            NO_TAG_KEY => FilterToken::NoTag,
            tag => FilterToken::Tag(tag.to_owned()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FilterToken::All => ALL_KEY,
            FilterToken::NoTag => NO_TAG_KEY,
            FilterToken::Tag(tag) => tag.as_str(),
        }
    }

    fn matches(&self, tags: &HashSet<&str>) -> bool {
        match self {
            FilterToken::All => true,
            FilterToken::NoTag => tags.is_empty(),
            FilterToken::Tag(tag) => tags.contains(tag.as_str()),
        }
    }
}

/// Selected filter toggles. `All` never shares the set with anything else,
/// and an empty set means the same as `{All}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    tokens: BTreeSet<FilterToken>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        let mut tokens = BTreeSet::new();
        tokens.insert(FilterToken::All);
        Self { tokens }
    }
}

impl FilterSelection {
    pub fn empty() -> Self {
        Self {
            tokens: BTreeSet::new(),
        }
    }

    pub fn select(&mut self, token: FilterToken) {
        if token == FilterToken::All {
            self.tokens.clear();
            self.tokens.insert(FilterToken::All);
            return;
        }
        self.tokens.remove(&FilterToken::All);
        if !self.tokens.remove(&token) {
            self.tokens.insert(token);
        }
    }

    pub fn is_selected(&self, token: &FilterToken) -> bool {
        self.tokens.contains(token)
    }

    pub fn shows_everything(&self) -> bool {
        self.tokens.is_empty() || (self.tokens.len() == 1 && self.tokens.contains(&FilterToken::All))
    }

    /// More than one toggle is on; drawn as a multi-selection.
    pub fn is_multi(&self) -> bool {
        self.tokens.len() > 1
    }

    pub fn tokens(&self) -> impl Iterator<Item = &FilterToken> {
        self.tokens.iter()
    }

    /// Drops tags that no longer exist anywhere.
    pub fn retain_known(&mut self, unique_tags: &[String]) {
        let known: HashSet<&str> = unique_tags.iter().map(String::as_str).collect();
        self.tokens.retain(|token| match token {
            FilterToken::Tag(tag) => known.contains(tag.as_str()),
            _ => true,
        });
        if self.tokens.is_empty() {
            self.tokens.insert(FilterToken::All);
        }
    }

    pub fn matches(&self, tags: &[String]) -> bool {
        if self.shows_everything() {
            return true;
        }
        let tags: HashSet<&str> = tags.iter().map(String::as_str).collect();
        self.tokens.iter().all(|token| token.matches(&tags))
    }
}

/// Reads a card's tag cache. Anything that is not a JSON array of strings
/// counts as no tags.
pub fn parse_tags_cache(channel_id: &str, raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags,
        Err(err) => {
            warn!(channel_id, raw, %err, "unreadable tag cache, treating card as untagged");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToggle {
    pub token: FilterToken,
    pub label: String,
    pub color: String,
}

pub struct TagFilterEngine {
    selection: FilterSelection,
    toggles: Vec<FilterToggle>,
}

impl TagFilterEngine {
    pub fn new(unique_tags: &[String], registry: &TagColorRegistry) -> Self {
        let mut engine = Self {
            selection: FilterSelection::default(),
            toggles: Vec::new(),
        };
        engine.rebuild_toggles(unique_tags, registry);
        engine
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn toggles(&self) -> &[FilterToggle] {
        &self.toggles
    }

    /// Rebuilds the toggle row for a new tag list, keeping the selections
    /// that still make sense.
    pub fn rebuild_toggles(&mut self, unique_tags: &[String], registry: &TagColorRegistry) {
        let mut toggles = Vec::with_capacity(unique_tags.len() + 2);
        toggles.push(FilterToggle {
            token: FilterToken::All,
            label: "Show All".into(),
            color: ALL_COLOR.into(),
        });
        toggles.push(FilterToggle {
            token: FilterToken::NoTag,
            label: "No Tags".into(),
            color: NO_TAG_COLOR.into(),
        });
        toggles.extend(unique_tags.iter().map(|tag| FilterToggle {
            token: FilterToken::Tag(tag.clone()),
            label: tag.clone(),
            color: registry.resolve(tag).to_owned(),
        }));
        self.toggles = toggles;
        self.selection.retain_known(unique_tags);
    }

    pub fn select(&mut self, token: FilterToken) {
        self.selection.select(token);
    }

    pub fn reset(&mut self) {
        self.selection = FilterSelection::default();
    }

    pub fn is_marked_multi(&self, token: &FilterToken) -> bool {
        self.selection.is_multi() && self.selection.is_selected(token)
    }

    pub fn recolor(&mut self, tag: &str, color: &str) -> bool {
        let mut changed = false;
        for toggle in &mut self.toggles {
            if matches!(&toggle.token, FilterToken::Tag(t) if t == tag) && toggle.color != color {
                toggle.color = color.to_owned();
                changed = true;
            }
        }
        changed
    }

    pub fn card_matches(&self, card: &Card) -> bool {
        if self.selection.shows_everything() {
            return true;
        }
        let tags = parse_tags_cache(&card.channel_id, &card.tags_cache);
        self.selection.matches(&tags)
    }
}

/// Case-insensitive substring search over a card's title and tag text.
#[derive(Debug, Clone, Default)]
pub struct TextSearch {
    query: String,
    lowered: String,
}

impl TextSearch {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    /// Re-derives the lowercase needle after `query_mut` edits.
    pub fn sync(&mut self) {
        self.lowered = self.query.to_lowercase();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_owned();
        self.sync();
    }

    pub fn card_matches(&self, card: &Card) -> bool {
        if self.lowered.is_empty() {
            return true;
        }
        card.title.to_lowercase().contains(&self.lowered)
            || card.tag_text().to_lowercase().contains(&self.lowered)
    }
}

/// Single source of card visibility: a card shows when both the tag filter
/// and the text search accept it. Returns the visible count.
pub fn apply_visibility(cards: &mut CardList, tags: &TagFilterEngine, text: &TextSearch) -> usize {
    let mut visible = 0;
    for card in cards.cards_mut() {
        card.visible = tags.card_matches(card) && text.card_matches(card);
        if card.visible {
            visible += 1;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Channel;
    use crate::autocomplete::AutocompleteEngine;
    use test_case::test_case;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn selection(keys: &[&str]) -> FilterSelection {
        let mut selection = FilterSelection::empty();
        for key in keys {
            selection.select(FilterToken::from_key(key));
        }
        selection
    }

    #[test_case(&[], &["a"], true ; "empty_selection_shows_all")]
    #[test_case(&["all"], &[], true ; "all_shows_untagged")]
    #[test_case(&["a"], &["a", "b"], true ; "single_tag_member")]
    #[test_case(&["a"], &["b"], false ; "single_tag_missing")]
    #[test_case(&["a", "b"], &["a", "b", "c"], true ; "and_semantics_all_present")]
    #[test_case(&["a", "b"], &["a"], false ; "and_semantics_one_missing")]
    #[test_case(&["no-tag"], &[], true ; "no_tag_matches_untagged")]
    #[test_case(&["no-tag"], &["a"], false ; "no_tag_rejects_tagged")]
    #[test_case(&["no-tag", "a"], &["a"], false ; "no_tag_and_tag_never_both")]
    fn visibility_rule(keys: &[&str], card_tags: &[&str], expected: bool) {
        assert_eq!(selection(keys).matches(&tags(card_tags)), expected);
    }

    #[test]
    fn selecting_all_clears_others_and_is_idempotent() {
        let mut selection = selection(&["a", "b"]);
        selection.select(FilterToken::All);
        assert_eq!(selection.tokens().collect::<Vec<_>>(), vec![&FilterToken::All]);
        selection.select(FilterToken::All);
        assert_eq!(selection.tokens().collect::<Vec<_>>(), vec![&FilterToken::All]);
        assert!(selection.shows_everything());
    }

    #[test]
    fn selecting_a_tag_deselects_all() {
        let mut selection = FilterSelection::default();
        selection.select(FilterToken::from_key("music"));
        assert!(!selection.is_selected(&FilterToken::All));
        assert!(selection.is_selected(&FilterToken::Tag("music".into())));

        selection.select(FilterToken::from_key("music"));
        assert!(selection.shows_everything());
        assert!(!selection.is_selected(&FilterToken::All));
    }

    #[test]
    fn multi_selection_marks_every_selected_toggle() {
        let registry = TagColorRegistry::default();
        let mut engine = TagFilterEngine::new(&tags(&["a", "b", "c"]), &registry);
        engine.select(FilterToken::from_key("a"));
        assert!(!engine.is_marked_multi(&FilterToken::from_key("a")));
        engine.select(FilterToken::from_key("b"));
        assert!(engine.is_marked_multi(&FilterToken::from_key("a")));
        assert!(engine.is_marked_multi(&FilterToken::from_key("b")));
        assert!(!engine.is_marked_multi(&FilterToken::from_key("c")));
    }

    #[test]
    fn toggles_list_reserved_tokens_first() {
        let registry = TagColorRegistry::default();
        let engine = TagFilterEngine::new(&tags(&["music"]), &registry);
        let keys: Vec<&str> = engine.toggles().iter().map(|t| t.token.key()).collect();
        assert_eq!(keys, vec!["all", "no-tag", "music"]);
        assert_eq!(engine.toggles()[2].color, registry.default_color());
    }

    #[test]
    fn rebuilding_toggles_drops_vanished_tags() {
        let registry = TagColorRegistry::default();
        let mut engine = TagFilterEngine::new(&tags(&["a", "b"]), &registry);
        engine.select(FilterToken::from_key("a"));
        engine.select(FilterToken::from_key("b"));
        engine.rebuild_toggles(&tags(&["b"]), &registry);
        assert!(!engine.selection().is_selected(&FilterToken::from_key("a")));
        assert!(engine.selection().is_selected(&FilterToken::from_key("b")));
    }

    #[test]
    fn recolor_updates_the_matching_toggle() {
        let registry = TagColorRegistry::default();
        let mut engine = TagFilterEngine::new(&tags(&["a"]), &registry);
        assert!(engine.recolor("a", "#9bf6ff"));
        assert!(!engine.recolor("a", "#9bf6ff"));
        assert_eq!(engine.toggles()[2].color, "#9bf6ff");
    }

    #[test_case("" ; "empty")]
    #[test_case("not json" ; "garbage")]
    #[test_case(r#"{"a": 1}"# ; "object")]
    #[test_case("[1, 2]" ; "numbers")]
    fn unreadable_caches_mean_no_tags(raw: &str) {
        assert!(parse_tags_cache("UC1", raw).is_empty());
    }

    fn card_list(channels: &[(&str, &str, &[&str])]) -> CardList {
        let registry = TagColorRegistry::default();
        let channels: Vec<Channel> = channels
            .iter()
            .map(|(id, title, card_tags)| Channel {
                channel_id: id.to_string(),
                title: title.to_string(),
                thumbnail_url: None,
                tags: tags(card_tags),
                rating: None,
            })
            .collect();
        let mut list = CardList::default();
        list.render(&channels, &registry, &mut AutocompleteEngine::default());
        list
    }

    #[test]
    fn malformed_cache_does_not_spoil_the_batch() {
        let mut list = card_list(&[
            ("UC1", "One", &["a"]),
            ("UC2", "Two", &["a"]),
            ("UC3", "Three", &[]),
        ]);
        list.get_mut("UC1").unwrap().tags_cache = "{broken".into();

        let registry = TagColorRegistry::default();
        let mut engine = TagFilterEngine::new(&tags(&["a"]), &registry);
        let text = TextSearch::default();

        engine.select(FilterToken::from_key("a"));
        assert_eq!(apply_visibility(&mut list, &engine, &text), 1);
        assert!(list.get("UC2").unwrap().visible);

        engine.select(FilterToken::from_key("a"));
        engine.select(FilterToken::NoTag);
        assert_eq!(apply_visibility(&mut list, &engine, &text), 2);
        assert!(list.get("UC1").unwrap().visible);
        assert!(list.get("UC3").unwrap().visible);
    }

    #[test]
    fn text_search_matches_title_or_tag_text() {
        let mut list = card_list(&[
            ("UC1", "Rust Talks", &["programming"]),
            ("UC2", "Cooking Daily", &["food"]),
            ("UC3", "Misc", &["lofi", "music"]),
        ]);
        let registry = TagColorRegistry::default();
        let engine = TagFilterEngine::new(&tags(&["food", "lofi", "music", "programming"]), &registry);
        let mut text = TextSearch::default();

        text.set_query("RUST");
        assert_eq!(apply_visibility(&mut list, &engine, &text), 1);

        text.set_query("food");
        assert_eq!(apply_visibility(&mut list, &engine, &text), 1);
        assert!(list.get("UC2").unwrap().visible);

        text.set_query("fimu");
        assert_eq!(apply_visibility(&mut list, &engine, &text), 1);
        assert!(list.get("UC3").unwrap().visible);

        text.set_query("");
        assert_eq!(apply_visibility(&mut list, &engine, &text), 3);
    }

    #[test]
    fn tag_filter_and_text_search_compose() {
        let mut list = card_list(&[
            ("UC1", "Rust Talks", &["programming"]),
            ("UC2", "Rusty Cars", &["cars"]),
            ("UC3", "Go Time", &["programming"]),
        ]);
        let registry = TagColorRegistry::default();
        let mut engine = TagFilterEngine::new(&tags(&["cars", "programming"]), &registry);
        let mut text = TextSearch::default();

        engine.select(FilterToken::from_key("programming"));
        text.set_query("rust");
        assert_eq!(apply_visibility(&mut list, &engine, &text), 1);
        assert!(list.get("UC1").unwrap().visible);
        assert!(!list.get("UC2").unwrap().visible);
        assert!(!list.get("UC3").unwrap().visible);
    }
}
