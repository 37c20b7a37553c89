use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Channel {
    pub fn channel_url(&self) -> String {
        channel_url(&self.channel_id)
    }
}

pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{}", channel_id)
}

#[derive(Serialize)]
pub struct TagsBody<'a> {
    pub tags: &'a str,
}

#[derive(Serialize)]
pub struct RatingBody {
    pub rating: Option<u8>,
}

#[derive(Serialize)]
pub struct ColorBody<'a> {
    pub color: &'a str,
}

/// Fields every response carries, checked before the payload is decoded.
#[derive(Deserialize)]
pub(crate) struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsSaved {
    pub tags: Vec<String>,
    pub unique_tags: Vec<String>,
    pub tag_colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingSaved {
    #[serde(deserialize_with = "present_or_null")]
    pub rating: Option<u8>,
}

// Key must be present; null means the rating was cleared.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<u8>::deserialize(deserializer)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorSaved {
    pub all_colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshOutcome {
    #[serde(default)]
    pub message: String,
    pub channels: Vec<Channel>,
    pub unique_tags: Vec<String>,
    pub tag_colors: HashMap<String, String>,
}
