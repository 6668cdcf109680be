use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::settings::AppSettings;

const APP_DIR: &str = "mehfil";

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push("settings.json");
    path
}

/// Store directory: the configured override, else the platform data dir.
pub fn data_dir(settings: &AppSettings) -> PathBuf {
    settings.data_dir.clone().unwrap_or_else(|| {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path
    })
}

/// Settings from disk. A malformed file yields the defaults together with
/// the parse error, so the caller can report it once logging is up.
pub fn load_settings() -> (AppSettings, Option<anyhow::Error>) {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &AppSettings) -> anyhow::Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub(crate) fn load_settings_from(path: &Path) -> (AppSettings, Option<anyhow::Error>) {
    let Ok(raw) = fs::read_to_string(path) else {
        return (AppSettings::default(), None);
    };
    match serde_json::from_str::<AppSettings>(&raw)
        .with_context(|| format!("malformed settings in {}", path.display()))
    {
        Ok(settings) => (settings, None),
        Err(err) => (AppSettings::default(), Some(err)),
    }
}

pub(crate) fn save_settings_to(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
