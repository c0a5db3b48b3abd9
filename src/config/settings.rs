//! Configuration settings for Skive.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub musicbrainz: MusicBrainzSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where finished music files land.
    pub music_dir: String,
    /// Directory for application data (known artist/tag lists).
    pub data_dir: String,
    /// Directory for temporary working files.
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            music_dir: "~/Music".to_string(),
            data_dir: "~/.skive".to_string(),
            temp_dir: "/tmp/skive".to_string(),
        }
    }
}

/// Download and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Target audio format passed to yt-dlp (--audio-format).
    pub audio_format: String,
    /// File extension of the finished files, including the dot.
    pub file_extension: String,
    /// Preferred cover art pixel size requested from the image archive.
    pub default_cover_size: u32,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            audio_format: "opus".to_string(),
            file_extension: ".opus".to_string(),
            default_cover_size: 1200,
        }
    }
}

/// MusicBrainz contact settings, used to build a polite User-Agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzSettings {
    /// Application name sent in the User-Agent header.
    pub app_name: String,
    /// Contact email sent in the User-Agent header.
    pub contact_email: String,
}

impl Default for MusicBrainzSettings {
    fn default() -> Self {
        Self {
            app_name: "skive".to_string(),
            contact_email: "".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkiveError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skive")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded music directory path.
    pub fn music_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.music_dir)
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Path of the persisted canonical artist list.
    pub fn artists_file(&self) -> PathBuf {
        self.data_dir().join("artists.json")
    }

    /// Path of the persisted canonical tag list.
    pub fn tags_file(&self) -> PathBuf {
        self.data_dir().join("tags.json")
    }

    /// User-Agent string for MusicBrainz / Cover Art Archive requests.
    pub fn user_agent(&self) -> String {
        if self.musicbrainz.contact_email.is_empty() {
            format!("{}/{}", self.musicbrainz.app_name, env!("CARGO_PKG_VERSION"))
        } else {
            format!(
                "{}/{} ({})",
                self.musicbrainz.app_name,
                env!("CARGO_PKG_VERSION"),
                self.musicbrainz.contact_email
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.download.audio_format, "opus");
        assert_eq!(settings.download.file_extension, ".opus");
        assert_eq!(settings.download.default_cover_size, 1200);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            music_dir = "/srv/music"
            "#,
        )
        .unwrap();
        assert_eq!(settings.general.music_dir, "/srv/music");
        assert_eq!(settings.general.temp_dir, "/tmp/skive");
        assert_eq!(settings.download.audio_format, "opus");
    }

    #[test]
    fn test_user_agent_includes_contact() {
        let mut settings = Settings::default();
        settings.musicbrainz.contact_email = "me@example.com".to_string();
        assert!(settings.user_agent().contains("me@example.com"));
    }
}
