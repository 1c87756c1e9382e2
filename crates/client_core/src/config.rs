use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::ITEMS_PER_PAGE;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_CONFIG_FILE: &str = "conference.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub items_per_page: u32,
    pub auth_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            items_per_page: ITEMS_PER_PAGE,
            auth_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    items_per_page: Option<u32>,
    auth_token: Option<String>,
}

/// Defaults, then the TOML file, then the process environment.
///
/// An explicitly named file must exist; the default `conference.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw).context("failed to parse config file")?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.items_per_page {
        settings.items_per_page = v;
    }
    if let Some(v) = file_cfg.auth_token {
        settings.auth_token = Some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CONFERENCE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__ITEMS_PER_PAGE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.items_per_page = parsed;
        }
    }

    if let Some(v) = var("CONFERENCE_TOKEN") {
        settings.auth_token = Some(v);
    }
    if let Some(v) = var("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }
}

/// Trims the url and drops trailing slashes so `/api/...` can be appended.
pub fn normalize_server_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| ClientError::InvalidServerUrl {
        url: raw.to_string(),
        source,
    })?;
    Ok(trimmed.to_string())
}
