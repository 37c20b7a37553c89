use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use YTChannels::api::ApiClient;
use YTChannels::cache;
use YTChannels::filters::FilterToken;
use YTChannels::page::PageState;
use YTChannels::settings::{self, Settings};
use YTChannels::logging;

#[derive(Parser, Debug)]
#[command(about = "Talk to the YTChannels server from the terminal")]
struct Args {
    /// Server base URL (overrides the settings file)
    #[arg(long, value_name = "URL", global = true)]
    server: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a channel's comma-separated tags
    Tags { channel_id: String, tags: String },

    /// Rate a channel 1-5; omit the rating to clear it
    Rating {
        channel_id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
    },

    /// Set a tag's color (#rgb or #rrggbb)
    Color { tag: String, color: String },

    /// Re-import subscriptions on the server and cache the result
    Refresh,

    /// Show the cached snapshot as the page would
    Snapshot {
        /// Tag filter keys, comma separated ("all", "no-tag" or a tag)
        #[arg(long, value_delimiter = ',')]
        filter: Vec<String>,

        /// Text search over titles and tags
        #[arg(long)]
        search: Option<String>,

        /// Delete the cached snapshot instead
        #[arg(long)]
        clear: bool,
    },
}

fn cached_page(settings: &Settings) -> PageState {
    let mut page = PageState::new(&settings.default_tag_color);
    if let Some(snapshot) = cache::load_snapshot() {
        page.load_snapshot(snapshot);
    }
    page
}

fn store(page: &PageState) -> anyhow::Result<()> {
    cache::save_snapshot(&page.snapshot()).context("writing snapshot cache")
}

fn print_page(page: &PageState) {
    for card in page.cards.cards().iter().filter(|card| card.visible) {
        let stars = card
            .rating
            .map(|r| "*".repeat(usize::from(r)))
            .unwrap_or_else(|| "-".into());
        let tags: Vec<&str> = card.chips.iter().map(|chip| chip.tag.as_str()).collect();
        println!(
            "{:<26} | {:<5} | {} | {}",
            card.channel_id,
            stars,
            tags.join(", "),
            card.title
        );
    }
    println!(
        "visible: {} of {}",
        page.visible_count(),
        page.cards.len()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let mut settings = settings::load_or_default();
    settings::apply_env_overrides(&mut settings, args.server);
    settings::normalize(&mut settings);
    let client = ApiClient::new(&settings.server_url);

    match args.command {
        Command::Tags { channel_id, tags } => {
            let saved = client.save_tags(&channel_id, tags.trim()).await?;
            println!("tags: {}", saved.tags.join(", "));
            println!("unique tags: {}", saved.unique_tags.join(", "));
            let mut page = cached_page(&settings);
            page.apply_tags_saved(&channel_id, saved);
            store(&page)?;
        }
        Command::Rating { channel_id, rating } => {
            let saved = client.save_rating(&channel_id, rating).await?;
            match saved.rating {
                Some(rating) => println!("rating: {rating}"),
                None => println!("rating cleared"),
            }
            let mut page = cached_page(&settings);
            page.apply_rating(&channel_id, saved.rating);
            store(&page)?;
        }
        Command::Color { tag, color } => {
            let color = color.trim().to_ascii_lowercase();
            if !settings::is_hex_color(&color) {
                bail!("{color} is not a hex color");
            }
            let saved = client.save_color(&tag, &color).await?;
            let mut colors: Vec<_> = saved.all_colors.iter().collect();
            colors.sort();
            for (tag, color) in colors {
                println!("{tag}: {color}");
            }
            let mut page = cached_page(&settings);
            page.apply_colors(saved.all_colors);
            store(&page)?;
        }
        Command::Refresh => {
            let outcome = client.refresh().await?;
            if !outcome.message.is_empty() {
                println!("{}", outcome.message);
            }
            let mut page = PageState::new(&settings.default_tag_color);
            page.load(&outcome.channels, outcome.unique_tags, outcome.tag_colors);
            store(&page)?;
            println!(
                "channels: {} tags: {}",
                page.cards.len(),
                page.unique_tags().len()
            );
        }
        Command::Snapshot {
            filter,
            search,
            clear,
        } => {
            if clear {
                cache::clear_snapshot().context("removing snapshot cache")?;
                println!("snapshot cleared");
                return Ok(());
            }
            let Some(snapshot) = cache::load_snapshot() else {
                bail!("no cached snapshot; run `probe refresh` first");
            };
            println!("generated at {}", snapshot.generated_at);
            let mut page = PageState::new(&settings.default_tag_color);
            page.load_snapshot(snapshot);
            for key in filter.iter().map(|key| key.trim()).filter(|key| !key.is_empty()) {
                page.select_filter(FilterToken::from_key(key));
            }
            if let Some(search) = search {
                page.set_search(&search);
            }
            print_page(&page);
        }
    }

    Ok(())
}
