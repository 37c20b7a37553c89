use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::Channel;
use crate::api::types::channel_url;
use crate::autocomplete::{AutocompleteEngine, TagInput};
use crate::tag_colors::TagColorRegistry;

pub const EMPTY_LIST_MESSAGE: &str = "No channels found.";
pub const MAX_RATING: u8 = 5;

/// Called once for every tag input the card list creates.
pub trait MountHook {
    fn tag_input_mounted(&mut self, channel_id: &str, input: &mut TagInput);
}

impl MountHook for AutocompleteEngine {
    fn tag_input_mounted(&mut self, _channel_id: &str, input: &mut TagInput) {
        self.mount(input);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Remote(String),
    /// Drawn as a neutral box with a "No thumbnail" caption.
    Placeholder,
}

impl Thumbnail {
    fn for_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => Thumbnail::Remote(url.to_owned()),
            _ => Thumbnail::Placeholder,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Thumbnail::Remote(url) => Some(url.as_str()),
            Thumbnail::Placeholder => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
    pub tag: String,
    pub color: String,
}

impl TagChip {
    pub fn resolved(tag: &str, registry: &TagColorRegistry) -> Self {
        Self {
            tag: tag.to_owned(),
            color: registry.resolve(tag).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Pending,
    Success,
    Error,
}

/// Inline message next to a control. Success and error messages expire.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    expires_at: Option<Instant>,
}

impl StatusMessage {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Pending,
            expires_at: None,
        }
    }

    pub fn success(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub fn error(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
            expires_at: Some(Instant::now() + ttl),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// One rendered channel.
#[derive(Debug, Clone)]
pub struct Card {
    pub channel_id: String,
    pub title: String,
    pub channel_url: String,
    pub thumbnail: Thumbnail,
    pub chips: Vec<TagChip>,
    pub tag_input: TagInput,
    /// JSON array of the channel's tags; the only thing tag filtering reads.
    pub tags_cache: String,
    pub rating: Option<u8>,
    pub visible: bool,
    pub saving_tags: bool,
    pub saving_rating: bool,
    pub status: Option<StatusMessage>,
}

impl Card {
    fn build(channel: &Channel, registry: &TagColorRegistry) -> Self {
        let mut card = Self {
            channel_id: channel.channel_id.clone(),
            title: channel.title.clone(),
            channel_url: channel_url(&channel.channel_id),
            thumbnail: Thumbnail::for_url(channel.thumbnail_url.as_deref()),
            chips: Vec::new(),
            tag_input: TagInput::default(),
            tags_cache: String::new(),
            rating: channel.rating.filter(|r| (1..=MAX_RATING).contains(r)),
            visible: true,
            saving_tags: false,
            saving_rating: false,
            status: None,
        };
        card.set_tags(&channel.tags, registry);
        card
    }

    /// Replaces chips, input value and cache in one step.
    pub fn set_tags(&mut self, tags: &[String], registry: &TagColorRegistry) {
        self.chips = tags
            .iter()
            .map(|tag| TagChip::resolved(tag, registry))
            .collect();
        self.tag_input.set_value(tags.join(", "));
        self.tags_cache = serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_owned());
    }

    /// Tag text as drawn on the card, used by text search.
    pub fn tag_text(&self) -> String {
        self.chips.iter().map(|chip| chip.tag.as_str()).collect()
    }

    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
    }
}

#[derive(Debug, Default)]
pub struct CardList {
    cards: Vec<Card>,
}

impl CardList {
    /// Drops every card and builds new ones from `channels`, handing each
    /// fresh tag input to `hook`. Returns the number of cards.
    pub fn render<H: MountHook>(
        &mut self,
        channels: &[Channel],
        registry: &TagColorRegistry,
        hook: &mut H,
    ) -> usize {
        self.cards.clear();
        self.cards.reserve(channels.len());
        for channel in channels {
            let mut card = Card::build(channel, registry);
            hook.tag_input_mounted(&card.channel_id, &mut card.tag_input);
            self.cards.push(card);
        }
        debug!(cards = self.cards.len(), "card list rebuilt");
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn get(&self, channel_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.channel_id == channel_id)
    }

    pub fn get_mut(&mut self, channel_id: &str) -> Option<&mut Card> {
        self.cards
            .iter_mut()
            .find(|card| card.channel_id == channel_id)
    }

    /// Writes the server's tag list for one channel into its card.
    pub fn apply_saved_tags(
        &mut self,
        channel_id: &str,
        tags: &[String],
        registry: &TagColorRegistry,
    ) -> bool {
        match self.get_mut(channel_id) {
            Some(card) => {
                card.set_tags(tags, registry);
                true
            }
            None => false,
        }
    }

    pub fn apply_rating(&mut self, channel_id: &str, rating: Option<u8>) -> bool {
        match self.get_mut(channel_id) {
            Some(card) => {
                card.rating = rating.filter(|r| (1..=MAX_RATING).contains(r));
                true
            }
            None => false,
        }
    }

    /// Recolors every chip showing `tag`. Returns how many chips changed.
    pub fn recolor(&mut self, tag: &str, color: &str) -> usize {
        let mut touched = 0;
        for chip in self
            .cards
            .iter_mut()
            .flat_map(|card| card.chips.iter_mut())
            .filter(|chip| chip.tag == tag)
        {
            if chip.color != color {
                chip.color = color.to_owned();
                touched += 1;
            }
        }
        touched
    }

    pub fn expire_statuses(&mut self, now: Instant) {
        for card in &mut self.cards {
            card.expire_status(now);
        }
    }

    /// Channels as currently shown, for the on-disk snapshot.
    pub fn to_channels(&self) -> Vec<Channel> {
        self.cards
            .iter()
            .map(|card| Channel {
                channel_id: card.channel_id.clone(),
                title: card.title.clone(),
                thumbnail_url: card.thumbnail.url().map(str::to_owned),
                tags: card.chips.iter().map(|chip| chip.tag.clone()).collect(),
                rating: card.rating,
            })
            .collect()
    }
}
