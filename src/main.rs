use clap::Parser;
use tracing::{info, warn};

use YTChannels::ui::{self, StartupOptions};
use YTChannels::{logging, settings};

#[derive(Parser, Debug)]
#[command(about = "Tag, rate and filter your YouTube subscriptions")]
struct Args {
    /// Server base URL (overrides the settings file and YTCHANNELS_SERVER)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Start empty instead of replaying the cached snapshot
    #[arg(long)]
    no_cache: bool,

    /// Refresh from the server right after startup
    #[arg(long)]
    refresh: bool,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    let mut settings = settings::load_or_default();
    settings::apply_env_overrides(&mut settings, args.server);
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    settings::normalize(&mut settings);
    logging::init(&settings.log_level);

    if args.save_settings {
        if let Err(err) = settings::save(&settings) {
            warn!("saving settings failed: {err:#}");
        }
    }
    info!(server = %settings.server_url, "starting YTChannels");

    let options = StartupOptions {
        use_cache: !args.no_cache,
        refresh: args.refresh,
    };
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 760.0])
        .with_min_inner_size([900.0, 560.0]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "YTChannels",
        native_options,
        Box::new(move |cc| Ok(Box::new(ui::AppState::new(cc, settings, options)?))),
    )
}
