use std::{fs, num::NonZeroU32, path::Path};

use anyhow::{anyhow, Context};
use client_core::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "feeds.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub collection: String,
    pub page_size: NonZeroU32,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".into(),
            collection: "saved-searches".into(),
            page_size: DEFAULT_PAGE_SIZE,
            api_token: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    collection: Option<String>,
    page_size: Option<u32>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then the environment.
///
/// An explicitly named file must exist; `feeds.toml` in the working directory
/// is picked up only when present.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.collection {
        settings.collection = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size =
            NonZeroU32::new(v).ok_or_else(|| anyhow!("page_size must be greater than zero"))?;
    }
    if let Some(v) = file_cfg.api_token {
        settings.api_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

/// `APP__*` variables take precedence over their `FEEDS_*` counterparts.
/// Unparseable numbers are ignored.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["FEEDS_API_URL", "APP__API_URL"] {
        if let Some(v) = lookup(key) {
            settings.api_url = v;
        }
    }

    for key in ["FEEDS_COLLECTION", "APP__COLLECTION"] {
        if let Some(v) = lookup(key) {
            settings.collection = v;
        }
    }

    for key in ["FEEDS_PAGE_SIZE", "APP__PAGE_SIZE"] {
        if let Some(v) = lookup(key) {
            match v.parse::<NonZeroU32>() {
                Ok(parsed) => settings.page_size = parsed,
                Err(_) => warn!(key, value = %v, "ignoring invalid page size"),
            }
        }
    }

    for key in ["FEEDS_API_TOKEN", "APP__API_TOKEN"] {
        if let Some(v) = lookup(key) {
            settings.api_token = Some(v);
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid request timeout"),
        }
    }
}
