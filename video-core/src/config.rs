use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Variable d'environnement qui fournit la clé d'API (prioritaire sur le fichier).
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
/// Valeur du modèle de configuration, traitée comme une clé absente.
pub const API_KEY_TEMPLATE: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub channel_id: String,
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout_seconds: u64,
    pub placeholder_delay_ms: u64,
}

/// How a pressed video card starts playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Hand the video id to the host, which opens an external player.
    #[default]
    External,
    /// Expand the card in place into a player panel.
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub playback: PlaybackMode,
    /// Fraction of the viewport height from the end of the list that triggers a page load.
    pub end_reached_threshold: f32,
    pub max_list_width: f32,
    pub warmup_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background_color: [u8; 3],
    pub header_color: [u8; 3],
    pub accent_color: [u8; 3],
    pub link_color: [u8; 3],
    pub title_color: [u8; 3],
    pub secondary_text_color: [u8; 3],
    pub card_color: [u8; 3],
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            channel_id: "UCocL2wWxYJAYbrWMNgvRYfA".to_string(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            page_size: 20,
            request_timeout_seconds: 10,
            placeholder_delay_ms: 1000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackMode::External,
            end_reached_threshold: 0.5,
            max_list_width: 800.0,
            warmup_ms: 1200,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_color: [245, 247, 250],
            header_color: [11, 44, 91],
            accent_color: [225, 27, 34],
            link_color: [33, 150, 243],
            title_color: [11, 44, 91],
            secondary_text_color: [100, 116, 139],
            card_color: [255, 255, 255],
        }
    }
}

impl ApiConfig {
    /// Returns the credential if one is really configured.
    ///
    /// Blank values and the template placeholder count as "no credential".
    /// A whitespace-only key counts as blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_TEMPLATE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn placeholder_delay(&self) -> Duration {
        Duration::from_millis(self.placeholder_delay_ms)
    }

    pub fn search_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&format!("{}/search", self.base_url.trim_end_matches('/')))
    }
}

impl AppConfig {
    /// Dossier de configuration de l'application (ex: ~/.config/videofeed)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("videofeed"))
    }

    /// Récupère le chemin du fichier de configuration
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Charge la configuration, applique la clé d'environnement, ou retombe sur les valeurs par défaut
    pub fn load() -> Self {
        let mut config = match Self::config_file_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "could not load config, using defaults");
                let config = Self::default();
                if let Err(save_err) = config.save() {
                    warn!(error = %save_err, "could not write default config");
                }
                config
            }
        };
        let _ = dotenvy::dotenv();
        config.apply_env_key(std::env::var(API_KEY_ENV).ok());
        config
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Une clé fournie par l'environnement remplace celle du fichier
    pub fn apply_env_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            info!("using API key from {API_KEY_ENV}");
            self.api.api_key = Some(key);
        }
    }

    /// Sauvegarde la configuration dans le fichier
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_file_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
