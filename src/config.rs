use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Directory name used under the per-user config and data directories.
pub const APP_DIR: &str = "yt-mp3-downloader";

/// Settings loaded from `<config dir>/yt-mp3-downloader/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Extension given to the downloaded file (without the dot).
    pub audio_extension: String,
    /// Explicit yt-dlp binary; when set, no lookup or install happens.
    pub ytdlp_path: Option<PathBuf>,
    /// Fetch the yt-dlp release binary into the data dir when none is found.
    pub auto_install_ytdlp: bool,
    /// Folder preselected at startup.
    pub default_folder: Option<PathBuf>,
    /// Show the video thumbnail under the URL box.
    pub show_thumbnail: bool,
    pub dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio_extension: "mp3".to_string(),
            ytdlp_path: None,
            auto_install_ytdlp: true,
            default_folder: None,
            show_thumbnail: true,
            dark_mode: true,
        }
    }
}

impl AppConfig {
    /// Extension with any leading dot removed; falls back to `mp3` when blank.
    pub fn extension(&self) -> &str {
        let ext = self.audio_extension.trim().trim_start_matches('.');
        if ext.is_empty() { "mp3" } else { ext }
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join(APP_DIR).join("config.toml"))
}

/// Load configuration from `path`, writing a default file if none exists.
pub fn load_or_init_at(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Load the user's configuration. Never fails: problems are logged and the
/// defaults are used.
pub fn load() -> AppConfig {
    let loaded = config_path().and_then(|path| load_or_init_at(&path));
    match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("using default config: {e}");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.audio_extension, "mp3");
        assert!(cfg.ytdlp_path.is_none());
        assert!(cfg.auto_install_ytdlp);
        assert!(cfg.default_folder.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let toml = r#"
            audio_extension = ".m4a"
            ytdlp_path = "/opt/bin/yt-dlp"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.extension(), "m4a");
        assert_eq!(cfg.ytdlp_path, Some(PathBuf::from("/opt/bin/yt-dlp")));
        assert!(cfg.show_thumbnail);
        assert!(cfg.dark_mode);
    }

    #[test]
    fn blank_extension_falls_back_to_mp3() {
        let cfg = AppConfig {
            audio_extension: "  ".into(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.extension(), "mp3");
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists());

        let again = load_or_init_at(&path).unwrap();
        assert_eq!(again, cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dark_mode = \"sometimes\"").unwrap();
        assert!(matches!(
            load_or_init_at(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
