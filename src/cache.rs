use std::collections::HashMap;
use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::api::Channel;
use crate::settings::project_dirs;

/// Last page data the server handed us, replayed at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub generated_at: String,
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub unique_tags: Vec<String>,
    #[serde(default)]
    pub tag_colors: HashMap<String, String>,
    #[serde(default = "default_saved_at")]
    pub saved_at_unix: i64,
}

fn default_saved_at() -> i64 {
    0
}

impl CachedSnapshot {
    pub fn new(
        channels: Vec<Channel>,
        unique_tags: Vec<String>,
        tag_colors: HashMap<String, String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            generated_at: now.format(&Rfc3339).unwrap_or_default(),
            channels,
            unique_tags,
            tag_colors,
            saved_at_unix: now.unix_timestamp(),
        }
    }
}

fn cache_path() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.cache_dir().join("last_snapshot.json"))
}

pub fn load_snapshot() -> Option<CachedSnapshot> {
    let bytes = fs::read(cache_path()?).ok()?;
    serde_json::from_slice::<CachedSnapshot>(&bytes).ok()
}

pub fn save_snapshot(snapshot: &CachedSnapshot) -> io::Result<()> {
    let path = cache_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no cache directory"))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_vec_pretty(snapshot)?)
}

pub fn clear_snapshot() -> io::Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
