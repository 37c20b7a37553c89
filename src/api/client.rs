use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::ApiError;
use super::types::{
    ColorBody, ColorSaved, Envelope, RatingBody, RatingSaved, RefreshOutcome, TagsBody, TagsSaved,
};

/// Thin typed wrapper over the channel server's JSON endpoints.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tags_url(&self, channel_id: &str) -> String {
        format!(
            "{}/api/tags/{}",
            self.base_url,
            urlencoding::encode(channel_id)
        )
    }

    pub fn rating_url(&self, channel_id: &str) -> String {
        format!(
            "{}/api/rating/{}",
            self.base_url,
            urlencoding::encode(channel_id)
        )
    }

    pub fn color_url(&self, tag: &str) -> String {
        format!("{}/api/tags/color/{}", self.base_url, urlencoding::encode(tag))
    }

    pub fn refresh_url(&self) -> String {
        format!("{}/refresh_from_youtube", self.base_url)
    }

    /// Sends the raw comma-separated input; the server owns splitting,
    /// trimming and deduplication.
    pub async fn save_tags(&self, channel_id: &str, raw_tags: &str) -> Result<TagsSaved, ApiError> {
        let url = self.tags_url(channel_id);
        let saved: TagsSaved = self
            .post("tags", &url, Some(&TagsBody { tags: raw_tags }))
            .await?;
        info!(channel_id, tags = saved.tags.len(), "tags saved");
        Ok(saved)
    }

    pub async fn save_rating(
        &self,
        channel_id: &str,
        rating: Option<u8>,
    ) -> Result<RatingSaved, ApiError> {
        let url = self.rating_url(channel_id);
        let saved: RatingSaved = self.post("rating", &url, Some(&RatingBody { rating })).await?;
        info!(channel_id, rating = ?saved.rating, "rating saved");
        Ok(saved)
    }

    pub async fn save_color(&self, tag: &str, color: &str) -> Result<ColorSaved, ApiError> {
        let url = self.color_url(tag);
        let saved: ColorSaved = self.post("tag color", &url, Some(&ColorBody { color })).await?;
        info!(tag, color, "tag color saved");
        Ok(saved)
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, ApiError> {
        let url = self.refresh_url();
        let outcome: RefreshOutcome = self.post::<(), _>("refresh", &url, None).await?;
        info!(channels = outcome.channels.len(), "refresh complete");
        Ok(outcome)
    }

    async fn post<B, T>(&self, endpoint: &'static str, url: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(endpoint, url, "POST");
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        decode_response(endpoint, status.as_u16(), &bytes)
    }
}

/// Applies the response contract shared by every endpoint: a 2xx status, a
/// `success: true` envelope, then the endpoint's payload fields.
pub fn decode_response<T: DeserializeOwned>(
    endpoint: &'static str,
    status: u16,
    body: &[u8],
) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Envelope>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
        return Err(ApiError::Status {
            endpoint,
            status,
            message,
        });
    }

    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|source| ApiError::Decode { endpoint, source })?;
    if !envelope.success {
        let message = envelope
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("Failed to update {endpoint}."));
        return Err(ApiError::Rejected { message });
    }

    serde_json::from_slice(body).map_err(|source| ApiError::Decode { endpoint, source })
}
