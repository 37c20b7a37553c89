//! Channel avatars, downloaded once per (channel, URL) and kept as textures.
//!
//! A failed download stays failed until the channel's thumbnail URL changes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use egui::{ColorImage, Context, TextureHandle, TextureOptions, Vec2};
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

pub const MAX_THUMB_WIDTH: f32 = 88.0;
pub const MAX_THUMB_HEIGHT: f32 = 88.0;

const MAX_CONCURRENT_DOWNLOADS: usize = 4;
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub enum ThumbnailStatus {
    Downloading,
    Ready { texture: TextureHandle, size: Vec2 },
    Failed(String),
}

struct ThumbnailEntry {
    url: String,
    status: ThumbnailStatus,
}

struct ThumbnailLoaded {
    channel_id: String,
    url: String,
    result: Result<ColorImage, String>,
}

pub struct ThumbnailCache {
    entries: HashMap<String, ThumbnailEntry>,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    tx: Sender<ThumbnailLoaded>,
    rx: Receiver<ThumbnailLoaded>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(%err, "thumbnail client without timeout");
                reqwest::Client::new()
            });
        let (tx, rx) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            client,
            permits: Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS)),
            tx,
            rx,
        }
    }

    /// Called every frame for every visible card; starts a download only the
    /// first time a channel shows up with a given URL.
    pub fn request(&mut self, channel_id: &str, url: Option<&str>, runtime: &Runtime) {
        let Some(url) = self.claim(channel_id, url) else {
            return;
        };
        debug!(channel_id, %url, "fetching thumbnail");
        let client = self.client.clone();
        let permits = Arc::clone(&self.permits);
        let tx = self.tx.clone();
        let channel_id = channel_id.to_owned();
        runtime.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => fetch_thumbnail(&client, &url).await,
                Err(err) => Err(err.to_string()),
            };
            let _ = tx.send(ThumbnailLoaded {
                channel_id,
                url,
                result,
            });
        });
    }

    /// Records `url` for `channel_id` and returns it when a download is due.
    fn claim(&mut self, channel_id: &str, url: Option<&str>) -> Option<String> {
        let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
            self.entries.remove(channel_id);
            return None;
        };
        if self
            .entries
            .get(channel_id)
            .is_some_and(|entry| entry.url == url)
        {
            return None;
        }
        self.entries.insert(
            channel_id.to_owned(),
            ThumbnailEntry {
                url: url.to_owned(),
                status: ThumbnailStatus::Downloading,
            },
        );
        Some(url.to_owned())
    }

    /// Turns finished downloads into textures.
    pub fn update(&mut self, ctx: &Context) {
        while let Ok(loaded) = self.rx.try_recv() {
            if self.settle(loaded, ctx) {
                ctx.request_repaint();
            }
        }
    }

    // Results for a channel that is gone, or whose URL changed meanwhile,
    // are dropped.
    fn settle(&mut self, loaded: ThumbnailLoaded, ctx: &Context) -> bool {
        let Some(entry) = self.entries.get_mut(&loaded.channel_id) else {
            return false;
        };
        if entry.url != loaded.url {
            return false;
        }
        entry.status = match loaded.result {
            Ok(image) => {
                let [w, h] = image.size;
                let texture = ctx.load_texture(
                    format!("thumbnail://{}", loaded.channel_id),
                    image,
                    TextureOptions::LINEAR,
                );
                ThumbnailStatus::Ready {
                    texture,
                    size: Vec2::new(w as f32, h as f32),
                }
            }
            Err(err) => {
                warn!(channel_id = %loaded.channel_id, url = %loaded.url, %err, "thumbnail unavailable");
                ThumbnailStatus::Failed(err)
            }
        };
        true
    }

    /// Forgets channels that are no longer on the page.
    pub fn retain_ids<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = ids.into_iter().collect();
        self.entries.retain(|id, _| keep.contains(id.as_str()));
    }

    pub fn status(&self, channel_id: &str) -> Option<&ThumbnailStatus> {
        self.entries.get(channel_id).map(|entry| &entry.status)
    }
}

/// Fits an image inside the thumbnail box, never upscaling.
pub fn display_size(original: Vec2) -> Vec2 {
    if original.x <= MAX_THUMB_WIDTH && original.y <= MAX_THUMB_HEIGHT {
        return original;
    }
    let scale = (MAX_THUMB_WIDTH / original.x).min(MAX_THUMB_HEIGHT / original.y);
    original * scale
}

async fn fetch_thumbnail(client: &reqwest::Client, url: &str) -> Result<ColorImage, String> {
    let bytes = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|err| err.to_string())?
        .bytes()
        .await
        .map_err(|err| err.to_string())?;
    decode_image(&bytes)
}

fn decode_image(bytes: &[u8]) -> Result<ColorImage, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| err.to_string())?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}
