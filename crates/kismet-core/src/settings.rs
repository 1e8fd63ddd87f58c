//! User settings in `~/.kismet/settings.json`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::data_dir;
use crate::render::RenderOptions;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

impl AiSettings {
    /// Whether a generation request can be attempted at all.
    pub fn is_configured(&self) -> bool {
        !self.provider.is_empty()
            && !self.model.is_empty()
            && (self.provider == "ollama" || !self.api_key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerSettings {
    pub port: u16,
    /// Endpoint the poller fetches and the MCP tool pushes to.
    pub sync_url: String,
    /// Values under 100 ms are raised to 100 ms by the poller.
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub status_hold_ms: u64,
    pub report_skipped_edges: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            port: 5173,
            sync_url: "http://localhost:5173/api/sync".to_string(),
            poll_interval_ms: 2000,
            settle_delay_ms: 50,
            status_hold_ms: 1500,
            report_skipped_edges: false,
        }
    }
}

impl ViewerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn status_hold(&self) -> Duration {
        Duration::from_millis(self.status_hold_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            report_skipped: self.report_skipped_edges,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub ai: AiSettings,
    pub viewer: ViewerSettings,
}

pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Read settings from the default location, then apply env overrides.
pub fn read_settings() -> Settings {
    let mut settings = read_settings_from(&settings_path());
    settings.apply_env();
    settings
}

/// Missing or unreadable files fall back to defaults.
pub fn read_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match fs::read_to_string(path).map(|s| serde_json::from_str(&s)) {
        Ok(Ok(settings)) => settings,
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            Settings::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read settings file");
            Settings::default()
        }
    }
}

pub fn write_settings(settings: &Settings) -> Result<(), SettingsError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    crate::write_atomic(path, &json).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok().filter(|v| !v.is_empty()));
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("KISMET_API_KEY").or_else(|| lookup("API_KEY")) {
            self.ai.api_key = key;
        }
        if let Some(provider) = lookup("KISMET_PROVIDER") {
            self.ai.provider = provider;
        }
        if let Some(model) = lookup("KISMET_MODEL") {
            self.ai.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"viewer":{"port":8080},"ai":{"provider":"openai"}}"#).unwrap();

        let settings = read_settings_from(&path);
        assert_eq!(settings.viewer.port, 8080);
        assert_eq!(settings.viewer.poll_interval(), Duration::from_secs(2));
        assert_eq!(settings.ai.provider, "openai");
        assert!(!settings.ai.is_configured());
    }

    #[test]
    fn corrupt_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings_from(&path), Settings::default());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.ai.provider = "ollama".into();
        settings.ai.model = "llama3".into();
        write_settings_to(&path, &settings).unwrap();

        let back = read_settings_from(&path);
        assert_eq!(back, settings);
        assert!(back.ai.is_configured());
    }

    #[test]
    fn prefixed_key_wins_over_generic() {
        let env: HashMap<&str, &str> = [("API_KEY", "generic"), ("KISMET_API_KEY", "specific"), ("KISMET_MODEL", "m")]
            .into_iter()
            .collect();
        let mut settings = Settings::default();
        settings.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.ai.api_key, "specific");
        assert_eq!(settings.ai.model, "m");
        assert_eq!(settings.ai.provider, "");
    }
}
