//! Platform-specific utilities for ytgrab
//!
//! This module provides cross-platform abstractions for:
//! - Configuration directory lookup
//! - Locating the yt-dlp executable
//! - Safe folder names for downloaded playlists

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/ytgrab
/// - Windows: %APPDATA%\ytgrab
/// - Linux: ~/.config/ytgrab
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytgrab")
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}

fn ytdlp_binary_name() -> String {
    format!("yt-dlp{}", exe_extension())
}

/// Find yt-dlp binary with priority:
/// 1. Explicit path from settings
/// 2. Next to the running executable
/// 3. System PATH
/// 4. Common installation paths
pub fn find_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            info!("Using configured yt-dlp: {}", path.display());
            return Some(path.to_path_buf());
        }
        warn!(
            "Configured yt-dlp {} is not executable, searching elsewhere",
            path.display()
        );
    }

    if let Some(adjacent) = find_adjacent() {
        info!("Using bundled yt-dlp: {}", adjacent.display());
        return Some(adjacent);
    }

    if let Ok(path) = which::which(ytdlp_binary_name()) {
        info!("Using system yt-dlp: {}", path.display());
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        info!("Using yt-dlp from common path: {}", common.display());
        return Some(common);
    }

    warn!("yt-dlp not found anywhere");
    None
}

fn find_adjacent() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    let candidate = exe_dir.join(ytdlp_binary_name());
    debug!("Checking adjacent path: {}", candidate.display());
    is_executable(&candidate).then_some(candidate)
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    common_paths
        .into_iter()
        .map(|path_str| match path_str.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(path_str)),
            None => PathBuf::from(path_str),
        })
        .find(|path| is_executable(path))
}

/// Check if a file is executable
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(path) {
            Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Turn an arbitrary title into a single path component.
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "playlist".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_dir_naming() {
        let dir = config_dir();
        assert_eq!(dir.file_name().and_then(|n| n.to_str()), Some("ytgrab"));
    }

    #[test]
    fn test_discovered_ytdlp_is_executable() {
        // yt-dlp may be missing on the test machine
        if let Some(path) = find_ytdlp(None) {
            assert!(is_executable(&path));
        }
    }

    #[test]
    fn test_unusable_configured_path_is_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("yt-dlp");
        assert_ne!(find_ytdlp(Some(&missing)), Some(missing));
    }

    #[cfg(unix)]
    #[test]
    fn test_configured_path_wins() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("yt-dlp");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(find_ytdlp(Some(&fake)), Some(fake));
    }

    #[test]
    fn test_is_executable_rejects_directories() {
        let temp = TempDir::new().unwrap();
        assert!(!is_executable(temp.path()));
        assert!(!is_executable(&temp.path().join("missing")));
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("Mix: Best/Worst?"), "Mix_ Best_Worst_");
        assert_eq!(sanitize_folder_name("  ..  "), "playlist");
        assert_eq!(sanitize_folder_name("Lo-fi beats"), "Lo-fi beats");
    }
}
