//! Request bookkeeping for the channel page, independent of the widget
//! toolkit. A `begin_*` call disables its control and hands out a
//! [`Completion`]; [`Session::drain`] applies finished requests in arrival
//! order and always re-enables the control.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{error, warn};

use crate::api::ApiError;
use crate::api::types::{ColorSaved, RatingSaved, RefreshOutcome, TagsSaved};
use crate::cards::StatusMessage;
use crate::page::PageState;
use crate::settings::Settings;

pub enum ApiEvent {
    TagsSaved {
        channel_id: String,
        result: Result<TagsSaved, ApiError>,
    },
    RatingSaved {
        channel_id: String,
        result: Result<RatingSaved, ApiError>,
    },
    ColorSaved {
        tag: String,
        result: Result<ColorSaved, ApiError>,
    },
    Refreshed(Result<RefreshOutcome, ApiError>),
}

/// Delivers exactly one event per request. Dropping it unsent (the task
/// panicked or was cancelled) delivers an `Interrupted` error instead.
pub struct Completion {
    tx: Sender<ApiEvent>,
    fallback: Option<ApiEvent>,
}

impl Completion {
    pub fn send(mut self, event: ApiEvent) {
        self.fallback = None;
        let _ = self.tx.send(event);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(event) = self.fallback.take() {
            warn!("request ended without a result");
            let _ = self.tx.send(event);
        }
    }
}

/// What a [`Session::drain`] call changed.
#[derive(Debug, Default)]
pub struct Applied {
    pub events: usize,
    /// Server data changed; the on-disk snapshot is stale.
    pub snapshot_changed: bool,
    /// Channel ids after a successful refresh.
    pub channel_ids: Option<Vec<String>>,
}

pub struct Session {
    pub page: PageState,
    /// Status line next to the refresh button.
    pub status: Option<StatusMessage>,
    pub is_refreshing: bool,
    /// Tags whose color save is in flight; their swatches are disabled.
    pub pending_colors: HashSet<String>,
    /// Blocking error window for rating and color failures.
    pub alert: Option<String>,
    tag_status_ttl: Duration,
    refresh_status_ttl: Duration,
    events_tx: Sender<ApiEvent>,
    events_rx: Receiver<ApiEvent>,
    in_flight: usize,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            page: PageState::new(&settings.default_tag_color),
            status: None,
            is_refreshing: false,
            pending_colors: HashSet::new(),
            alert: None,
            tag_status_ttl: settings.tag_status_ttl(),
            refresh_status_ttl: settings.refresh_status_ttl(),
            events_tx,
            events_rx,
            in_flight: 0,
        }
    }

    pub fn has_pending_requests(&self) -> bool {
        self.in_flight > 0
    }

    pub fn refresh_status_ttl(&self) -> Duration {
        self.refresh_status_ttl
    }

    pub fn expire_statuses(&mut self, now: Instant) {
        self.page.cards.expire_statuses(now);
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
    }

    /// Returns the trimmed tag input to send, or `None` when the card is
    /// gone or already saving.
    pub fn begin_save_tags(&mut self, channel_id: &str) -> Option<(String, Completion)> {
        let card = self.page.cards.get_mut(channel_id)?;
        if card.saving_tags {
            return None;
        }
        card.saving_tags = true;
        card.status = Some(StatusMessage::pending("Saving..."));
        let raw = card.tag_input.value.trim().to_owned();
        let done = self.completion(ApiEvent::TagsSaved {
            channel_id: channel_id.to_owned(),
            result: Err(ApiError::Interrupted { endpoint: "tags" }),
        });
        Some((raw, done))
    }

    pub fn begin_save_rating(&mut self, channel_id: &str) -> Option<Completion> {
        let card = self.page.cards.get_mut(channel_id)?;
        if card.saving_rating {
            return None;
        }
        card.saving_rating = true;
        Some(self.completion(ApiEvent::RatingSaved {
            channel_id: channel_id.to_owned(),
            result: Err(ApiError::Interrupted { endpoint: "rating" }),
        }))
    }

    pub fn begin_save_color(&mut self, tag: &str) -> Option<Completion> {
        if !self.pending_colors.insert(tag.to_owned()) {
            return None;
        }
        Some(self.completion(ApiEvent::ColorSaved {
            tag: tag.to_owned(),
            result: Err(ApiError::Interrupted {
                endpoint: "tag color",
            }),
        }))
    }

    pub fn begin_refresh(&mut self) -> Option<Completion> {
        if self.is_refreshing {
            return None;
        }
        self.is_refreshing = true;
        self.status = Some(StatusMessage::pending("Refreshing... please wait."));
        Some(self.completion(ApiEvent::Refreshed(Err(ApiError::Interrupted {
            endpoint: "refresh",
        }))))
    }

    fn completion(&mut self, fallback: ApiEvent) -> Completion {
        self.in_flight += 1;
        Completion {
            tx: self.events_tx.clone(),
            fallback: Some(fallback),
        }
    }

    /// Applies every completion that has arrived.
    pub fn drain(&mut self) -> Applied {
        let mut applied = Applied::default();
        while let Ok(event) = self.events_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            applied.events += 1;
            self.apply(event, &mut applied);
        }
        applied
    }

    fn apply(&mut self, event: ApiEvent, applied: &mut Applied) {
        match event {
            ApiEvent::TagsSaved { channel_id, result } => {
                let status = match result {
                    Ok(saved) => {
                        self.page.apply_tags_saved(&channel_id, saved);
                        applied.snapshot_changed = true;
                        StatusMessage::success("Saved!", self.tag_status_ttl)
                    }
                    Err(err) => {
                        error!(%channel_id, %err, "saving tags failed");
                        StatusMessage::error(
                            format!("Error: {}", err.user_message()),
                            self.tag_status_ttl,
                        )
                    }
                };
                if let Some(card) = self.page.cards.get_mut(&channel_id) {
                    card.status = Some(status);
                    card.saving_tags = false;
                }
            }
            ApiEvent::RatingSaved { channel_id, result } => {
                match result {
                    Ok(saved) => {
                        self.page.apply_rating(&channel_id, saved.rating);
                        applied.snapshot_changed = true;
                    }
                    Err(err) => {
                        error!(%channel_id, %err, "saving rating failed");
                        self.alert = Some(format!("Error saving rating: {}", err.user_message()));
                    }
                }
                if let Some(card) = self.page.cards.get_mut(&channel_id) {
                    card.saving_rating = false;
                }
            }
            ApiEvent::ColorSaved { tag, result } => {
                self.pending_colors.remove(&tag);
                match result {
                    Ok(saved) => {
                        self.page.apply_colors(saved.all_colors);
                        applied.snapshot_changed = true;
                    }
                    Err(err) => {
                        error!(%tag, %err, "saving tag color failed");
                        self.alert = Some(format!("Error saving color: {}", err.user_message()));
                    }
                }
            }
            ApiEvent::Refreshed(result) => {
                self.is_refreshing = false;
                let ttl = self.refresh_status_ttl;
                self.status = Some(match result {
                    Ok(outcome) => {
                        let RefreshOutcome {
                            message,
                            channels,
                            unique_tags,
                            tag_colors,
                        } = outcome;
                        self.page.load(&channels, unique_tags, tag_colors);
                        applied.snapshot_changed = true;
                        applied.channel_ids =
                            Some(channels.into_iter().map(|c| c.channel_id).collect());
                        let text = if message.trim().is_empty() {
                            "Refresh complete.".to_owned()
                        } else {
                            message
                        };
                        StatusMessage::success(text, ttl)
                    }
                    Err(err) => {
                        error!(%err, "refresh failed");
                        StatusMessage::error(format!("Error: {}", err.user_message()), ttl)
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::api::Channel;
    use crate::cards::StatusKind;

    fn channel(id: &str, tags: &[&str]) -> Channel {
        Channel {
            channel_id: id.into(),
            title: format!("Channel {id}"),
            thumbnail_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rating: None,
        }
    }

    fn session() -> Session {
        let mut session = Session::new(&Settings::default());
        session.page.load(
            &[channel("UC1", &["music"]), channel("UC2", &[])],
            vec!["music".into()],
            HashMap::new(),
        );
        session
    }

    fn rejected() -> ApiError {
        ApiError::Rejected {
            message: "Channel not found".into(),
        }
    }

    fn card_status(session: &Session, channel_id: &str) -> Option<(StatusKind, String)> {
        let status = session.page.cards.get(channel_id)?.status.as_ref()?;
        Some((status.kind, status.text.clone()))
    }

    #[test]
    fn rejected_tag_save_reenables_and_shows_error() {
        let mut session = session();
        session.page.cards.get_mut("UC1").unwrap().tag_input.value = "  music, live ".into();
        let (raw, done) = session.begin_save_tags("UC1").unwrap();
        assert_eq!(raw, "music, live");
        assert!(session.page.cards.get("UC1").unwrap().saving_tags);
        assert!(session.has_pending_requests());

        done.send(ApiEvent::TagsSaved {
            channel_id: "UC1".into(),
            result: Err(rejected()),
        });
        let applied = session.drain();

        assert_eq!(applied.events, 1);
        assert!(!applied.snapshot_changed);
        assert!(!session.page.cards.get("UC1").unwrap().saving_tags);
        assert!(!session.has_pending_requests());
        assert_eq!(
            card_status(&session, "UC1"),
            Some((StatusKind::Error, "Error: Channel not found".into()))
        );
        assert!(session.alert.is_none());
    }

    #[test]
    fn rejected_rating_save_reenables_and_alerts() {
        let mut session = session();
        let done = session.begin_save_rating("UC2").unwrap();
        assert!(session.begin_save_rating("UC2").is_none());

        done.send(ApiEvent::RatingSaved {
            channel_id: "UC2".into(),
            result: Err(rejected()),
        });
        session.drain();

        assert!(!session.page.cards.get("UC2").unwrap().saving_rating);
        assert_eq!(
            session.alert.as_deref(),
            Some("Error saving rating: Channel not found")
        );
    }

    #[test]
    fn rejected_color_save_releases_swatches_and_alerts() {
        let mut session = session();
        let done = session.begin_save_color("music").unwrap();
        assert!(session.pending_colors.contains("music"));
        assert!(session.begin_save_color("music").is_none());

        done.send(ApiEvent::ColorSaved {
            tag: "music".into(),
            result: Err(rejected()),
        });
        session.drain();

        assert!(session.pending_colors.is_empty());
        assert_eq!(
            session.alert.as_deref(),
            Some("Error saving color: Channel not found")
        );
    }

    #[test]
    fn rejected_refresh_reenables_and_shows_error() {
        let mut session = session();
        let done = session.begin_refresh().unwrap();
        assert!(session.begin_refresh().is_none());
        assert_eq!(
            session.status.as_ref().map(|s| s.kind),
            Some(StatusKind::Pending)
        );

        done.send(ApiEvent::Refreshed(Err(rejected())));
        let applied = session.drain();

        assert!(!session.is_refreshing);
        assert!(applied.channel_ids.is_none());
        let status = session.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Error: Channel not found");
        // The page keeps what it had.
        assert_eq!(session.page.cards.len(), 2);
    }

    #[test]
    fn saved_tags_come_from_the_server() {
        let mut session = session();
        let (_, done) = session.begin_save_tags("UC2").unwrap();
        done.send(ApiEvent::TagsSaved {
            channel_id: "UC2".into(),
            result: Ok(TagsSaved {
                tags: vec!["live".into()],
                unique_tags: vec!["live".into(), "music".into()],
                tag_colors: HashMap::new(),
            }),
        });
        let applied = session.drain();

        assert!(applied.snapshot_changed);
        let card = session.page.cards.get("UC2").unwrap();
        assert_eq!(card.tag_text(), "live");
        assert_eq!(
            card_status(&session, "UC2"),
            Some((StatusKind::Success, "Saved!".into()))
        );
    }

    #[test]
    fn refresh_rebuilds_page_and_reports_channels() {
        let mut session = session();
        let done = session.begin_refresh().unwrap();
        done.send(ApiEvent::Refreshed(Ok(RefreshOutcome {
            message: "  ".into(),
            channels: vec![channel("UC9", &[])],
            unique_tags: vec![],
            tag_colors: HashMap::new(),
        })));
        let applied = session.drain();

        assert_eq!(applied.channel_ids, Some(vec!["UC9".to_string()]));
        assert_eq!(session.page.cards.len(), 1);
        assert_eq!(
            session.status.as_ref().map(|s| s.text.as_str()),
            Some("Refresh complete.")
        );
    }

    #[test]
    fn unsent_completion_still_reenables_control() {
        let mut session = session();
        let done = session.begin_save_rating("UC1").unwrap();
        drop(done);
        let applied = session.drain();

        assert_eq!(applied.events, 1);
        assert!(!session.page.cards.get("UC1").unwrap().saving_rating);
        assert!(!session.has_pending_requests());
        assert_eq!(
            session.alert.as_deref(),
            Some("Error saving rating: rating request was interrupted")
        );
    }

    #[test]
    fn panicking_request_task_still_reenables_refresh() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut session = session();
        let done = session.begin_refresh().unwrap();
        let handle = runtime.spawn(async move {
            let _done = done;
            let outcome: Option<RefreshOutcome> = None;
            outcome.expect("request task blew up");
        });
        assert!(runtime.block_on(handle).is_err());

        session.drain();
        assert!(!session.is_refreshing);
        assert!(!session.has_pending_requests());
        assert_eq!(
            session.status.as_ref().map(|s| s.text.as_str()),
            Some("Error: refresh request was interrupted")
        );
    }

    struct InfoCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for InfoCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    // Success is logged once by the API client; applying it adds nothing.
    #[test]
    fn applying_a_success_logs_nothing_at_info() {
        let mut session = session();
        let done = session.begin_save_rating("UC1").unwrap();
        done.send(ApiEvent::RatingSaved {
            channel_id: "UC1".into(),
            result: Ok(RatingSaved { rating: Some(4) }),
        });

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(InfoCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, || {
            session.drain();
        });

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(session.page.cards.get("UC1").unwrap().rating, Some(4));
    }

    #[test]
    fn completion_for_a_vanished_card_is_harmless() {
        let mut session = session();
        let (_, done) = session.begin_save_tags("UC1").unwrap();
        session.page.load(&[], vec![], HashMap::new());
        done.send(ApiEvent::TagsSaved {
            channel_id: "UC1".into(),
            result: Err(rejected()),
        });
        assert_eq!(session.drain().events, 1);
        assert!(!session.has_pending_requests());
    }
}
