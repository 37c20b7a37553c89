//! Server round-trips. Each launch asks the session to disable its control,
//! then spawns the call on the runtime; the [`Completion`] reports back even
//! if the task dies.
//!
//! [`Completion`]: crate::session::Completion

use crate::session::ApiEvent;

use super::AppState;

impl AppState {
    pub fn launch_save_tags(&mut self, channel_id: &str) {
        let Some((raw, done)) = self.session.begin_save_tags(channel_id) else {
            return;
        };
        let client = self.client.clone();
        let channel_id = channel_id.to_owned();
        self.runtime.spawn(async move {
            let result = client.save_tags(&channel_id, &raw).await;
            done.send(ApiEvent::TagsSaved { channel_id, result });
        });
    }

    /// `None` clears the rating.
    pub fn launch_save_rating(&mut self, channel_id: &str, rating: Option<u8>) {
        let Some(done) = self.session.begin_save_rating(channel_id) else {
            return;
        };
        let client = self.client.clone();
        let channel_id = channel_id.to_owned();
        self.runtime.spawn(async move {
            let result = client.save_rating(&channel_id, rating).await;
            done.send(ApiEvent::RatingSaved { channel_id, result });
        });
    }

    pub fn launch_save_color(&mut self, tag: &str, color: &str) {
        let Some(done) = self.session.begin_save_color(tag) else {
            return;
        };
        let client = self.client.clone();
        let tag = tag.to_owned();
        let color = color.to_owned();
        self.runtime.spawn(async move {
            let result = client.save_color(&tag, &color).await;
            done.send(ApiEvent::ColorSaved { tag, result });
        });
    }

    pub fn launch_refresh(&mut self) {
        let Some(done) = self.session.begin_refresh() else {
            return;
        };
        let client = self.client.clone();
        self.runtime.spawn(async move {
            let result = client.refresh().await;
            done.send(ApiEvent::Refreshed(result));
        });
    }

    /// Applies finished requests, then the side effects outside the page
    /// model. Returns `true` if anything arrived.
    pub fn drain_events(&mut self) -> bool {
        let applied = self.session.drain();
        if let Some(ids) = &applied.channel_ids {
            self.thumbnail_cache.retain_ids(ids.iter().map(String::as_str));
        }
        if applied.snapshot_changed {
            self.save_snapshot();
        }
        applied.events > 0
    }
}
