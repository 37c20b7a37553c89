use std::io;
use std::time::Instant;

use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cache;
use crate::session::Session;
use crate::settings::Settings;
use crate::ui::thumbnails::ThumbnailCache;

mod requests;

/// Command-line switches that only matter at startup.
#[derive(Debug, Clone, Copy)]
pub struct StartupOptions {
    pub use_cache: bool,
    pub refresh: bool,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            refresh: false,
        }
    }
}

pub struct AppState {
    pub settings: Settings,
    pub client: ApiClient,
    pub runtime: Runtime,
    /// Page model plus request bookkeeping.
    pub session: Session,
    pub thumbnail_cache: ThumbnailCache,
}

impl AppState {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        options: StartupOptions,
    ) -> io::Result<Self> {
        super::theme::apply_theme(&cc.egui_ctx);

        let runtime = Builder::new_multi_thread().enable_all().build()?;
        let client = ApiClient::new(&settings.server_url);
        let mut session = Session::new(&settings);
        if options.use_cache {
            match cache::load_snapshot() {
                Some(snapshot) => {
                    info!(
                        channels = snapshot.channels.len(),
                        generated_at = %snapshot.generated_at,
                        "loaded cached snapshot"
                    );
                    session.page.load_snapshot(snapshot);
                }
                None => info!("no cached snapshot; starting empty"),
            }
        }

        let mut state = Self {
            settings,
            client,
            runtime,
            session,
            thumbnail_cache: ThumbnailCache::new(),
        };
        if options.refresh || state.settings.refresh_on_start {
            state.launch_refresh();
        }
        Ok(state)
    }

    pub fn has_pending_requests(&self) -> bool {
        self.session.has_pending_requests()
    }

    pub fn expire_statuses(&mut self) {
        self.session.expire_statuses(Instant::now());
    }

    /// Persists what the page currently shows so the next start has data.
    fn save_snapshot(&self) {
        if let Err(err) = cache::save_snapshot(&self.session.page.snapshot()) {
            warn!(%err, "failed to write snapshot cache");
        }
    }
}
