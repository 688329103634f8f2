use adw::Application;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const URL_ENV: &str = "CAMPAIGN_DASHBOARD_URL";

fn default_reconnect_delay() -> u64 {
    3
}

fn default_poll_interval() -> u64 {
    25
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            reconnect_delay_secs: default_reconnect_delay(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("campaign-dashboard.toml"))
    }

    /// Settings from the user config file, with the URL env override applied.
    pub fn load() -> Self {
        let mut settings = Self::toml_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        if let Ok(url) = std::env::var(URL_ENV) {
            settings.apply_url_override(&url);
        }
        settings
    }

    /// Blank values are ignored; others are normalized like the connect window input.
    pub fn apply_url_override(&mut self, raw: &str) {
        let url = crate::utils::normalize_url(raw);
        if !url.is_empty() {
            self.base_url = url;
        }
    }

    /// Missing or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
                log::warn!("ignoring malformed settings in {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::toml_path() {
            Some(path) => self.save_to(&path),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "No config dir")),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, toml)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

pub fn build_ui(app: &Application) {
    let settings = Settings::load();
    if settings.is_configured() {
        crate::ui::main_window::show_main_window(app, settings);
    } else {
        crate::ui::connect::show_connect_window(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("none.toml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(settings.poll_interval_secs, 25);
        assert!(!settings.is_configured());
    }

    #[test]
    fn url_override_is_normalized() {
        let mut settings = Settings::default();
        settings.apply_url_override("  ");
        assert!(!settings.is_configured());

        settings.apply_url_override(" localhost:8000/ ");
        assert_eq!(settings.base_url, "https://localhost:8000");
        assert!(crate::api::client::ApiClient::new(&settings.base_url).is_ok());

        settings.apply_url_override("http://10.0.0.2:8000");
        assert_eq!(settings.base_url, "http://10.0.0.2:8000");
    }

    #[test]
    fn round_trip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("campaign-dashboard.toml");
        let settings = Settings {
            base_url: "http://localhost:8000".into(),
            reconnect_delay_secs: 5,
            poll_interval_secs: 30,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);

        fs::write(&path, "base_url = \"http://10.0.0.2:8000\"\n").unwrap();
        let partial = Settings::load_from(&path);
        assert_eq!(partial.base_url, "http://10.0.0.2:8000");
        assert_eq!(partial.reconnect_delay_secs, 3);

        fs::write(&path, "base_url = [").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
