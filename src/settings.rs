use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::tag_colors::DEFAULT_TAG_COLOR;

pub const SERVER_ENV: &str = "YTCHANNELS_SERVER";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub default_tag_color: String,
    pub tag_status_secs: u64,
    pub refresh_status_secs: u64,
    pub refresh_on_start: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            default_tag_color: DEFAULT_TAG_COLOR.into(),
            tag_status_secs: 3,
            refresh_status_secs: 5,
            refresh_on_start: false,
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub fn tag_status_ttl(&self) -> Duration {
        Duration::from_secs(self.tag_status_secs)
    }

    pub fn refresh_status_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_status_secs)
    }
}

pub fn load_or_default() -> Settings {
    let mut settings = settings_path()
        .and_then(|path| fs::read(path).ok())
        .and_then(|bytes| serde_json::from_slice::<Settings>(&bytes).ok())
        .unwrap_or_default();
    apply_env_overrides(&mut settings, env::var(SERVER_ENV).ok());
    normalize(&mut settings);
    settings
}

pub fn save(settings: &Settings) -> Result<()> {
    let path = settings_path().context("no config directory available")?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(&path, serde_json::to_vec_pretty(settings)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "yourname", "YTChannels")
}

fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.config_dir().join("settings.json"))
}

pub fn apply_env_overrides(settings: &mut Settings, server: Option<String>) {
    if let Some(server) = server {
        let server = server.trim();
        if !server.is_empty() {
            settings.server_url = server.to_owned();
        }
    }
}

pub fn normalize(settings: &mut Settings) {
    let url = settings.server_url.trim().trim_end_matches('/');
    settings.server_url = if url.is_empty() {
        DEFAULT_SERVER_URL.to_owned()
    } else {
        url.to_owned()
    };
    let color = settings.default_tag_color.trim();
    settings.default_tag_color = if is_hex_color(color) {
        color.to_ascii_lowercase()
    } else {
        DEFAULT_TAG_COLOR.to_owned()
    };
    if settings.tag_status_secs == 0 {
        settings.tag_status_secs = 3;
    }
    if settings.refresh_status_secs == 0 {
        settings.refresh_status_secs = 5;
    }
    if settings.log_level.trim().is_empty() {
        settings.log_level = "info".into();
    }
}

/// `#rgb` or `#rrggbb`, the formats the server accepts for tag colors.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
