//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::utils::platform;

const DEFAULT_VERSION_URL: &str =
    "https://raw.githubusercontent.com/sauyamara/YouTube_Videodwonloader/main/VERSION";
const DEFAULT_BINARY_URL: &str =
    "https://github.com/sauyamara/YouTube_Videodwonloader/releases/latest/download/ytgrab";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Download location
    pub download_location: PathBuf,

    /// Folder removed from the working directory after a single-video download
    pub cleanup_folder: String,

    /// Explicit yt-dlp binary, skips discovery when set
    pub ytdlp_path: Option<PathBuf>,

    /// Container used when yt-dlp merges audio and video
    pub merge_output_format: String,

    /// Run the update check before the first prompt. Off until the release
    /// feed in `update` is published.
    pub check_updates_on_start: bool,

    pub update: UpdateSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_location: PathBuf::from("."),
            cleanup_folder: "downloads".to_string(),
            ytdlp_path: None,
            merge_output_format: "mp4".to_string(),
            check_updates_on_start: false,
            update: UpdateSettings::default(),
        }
    }
}

/// Where new releases are published
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// Plain-text file holding the latest version string
    pub version_url: String,

    /// Latest executable for this platform
    pub binary_url: String,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            version_url: DEFAULT_VERSION_URL.to_string(),
            binary_url: format!("{}{}", DEFAULT_BINARY_URL, platform::exe_extension()),
        }
    }
}

impl AppSettings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        platform::config_dir().join("settings.json")
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults. A file that fails to parse is
    /// reported and also yields the defaults.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
