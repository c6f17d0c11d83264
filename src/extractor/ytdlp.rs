//! yt-dlp wrapper for metadata extraction
//!
//! Runs `yt-dlp --dump-single-json --flat-playlist` and maps the output onto
//! typed records. Playlists come back flat, so member formats are fetched
//! one entry at a time.

use crate::extractor::models::{Metadata, RawInfo};
use crate::extractor::traits::MetadataProvider;
use crate::utils::error::YtgrabError;
use crate::utils::platform::find_ytdlp;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error};

/// Metadata provider backed by the yt-dlp executable
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
}

impl YtDlpExtractor {
    /// Locate yt-dlp, preferring `configured` when it points at an executable
    pub fn new(configured: Option<&Path>) -> Result<Self> {
        let ytdlp_path = find_ytdlp(configured).ok_or(YtgrabError::YtDlpNotFound)?;
        Ok(Self::with_path(ytdlp_path))
    }

    pub fn with_path(ytdlp_path: PathBuf) -> Self {
        Self { ytdlp_path }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }
}

#[async_trait]
impl MetadataProvider for YtDlpExtractor {
    async fn fetch(&self, url: &str) -> Result<Metadata> {
        if url.trim().is_empty() {
            return Err(YtgrabError::InvalidUrl(url.to_string()).into());
        }
        debug!("Extracting metadata for URL: {}", url);

        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--dump-single-json")
            .arg("--flat-playlist")
            .arg("--no-download")
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", error_msg);
            return Err(YtgrabError::ExtractionError(error_msg.trim().to_string()).into());
        }

        let raw: RawInfo =
            serde_json::from_slice(&output.stdout).map_err(YtgrabError::SerializationError)?;
        Ok(raw.into_metadata(url))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_ytdlp(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_fetch_parses_single_video() {
        let temp = TempDir::new().unwrap();
        let bin = fake_ytdlp(
            temp.path(),
            r#"echo '{"id":"v1","title":"Clip","formats":[{"format_id":"18","ext":"mp4","resolution":"640x360","filesize":10485760}]}'"#,
        );
        let extractor = YtDlpExtractor::with_path(bin);

        let formats = extractor.get_formats("https://example.com/v1").await.unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].filesize, Some(10_485_760));
    }

    #[tokio::test]
    async fn test_fetch_reports_stderr_on_failure() {
        let temp = TempDir::new().unwrap();
        let bin = fake_ytdlp(temp.path(), "echo 'ERROR: Video unavailable' >&2; exit 1");
        let extractor = YtDlpExtractor::with_path(bin);

        let err = extractor.fetch("https://example.com/gone").await.unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
    }

    #[tokio::test]
    async fn test_playlist_is_not_a_format_list() {
        let temp = TempDir::new().unwrap();
        let bin = fake_ytdlp(
            temp.path(),
            r#"echo '{"_type":"playlist","id":"PL","title":"Mix","entries":[]}'"#,
        );
        let extractor = YtDlpExtractor::with_path(bin);

        assert!(extractor.get_formats("https://example.com/pl").await.is_err());
    }

    #[tokio::test]
    async fn test_url_follows_end_of_options() {
        let temp = TempDir::new().unwrap();
        let bin = fake_ytdlp(
            temp.path(),
            r#"printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
echo '{"id":"v1","title":"Clip","formats":[]}'"#,
        );
        let extractor = YtDlpExtractor::with_path(bin);

        extractor.fetch("--exec=rm").await.unwrap();

        let args = std::fs::read_to_string(temp.path().join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(&args[args.len() - 2..], ["--", "--exec=rm"]);
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected() {
        let extractor = YtDlpExtractor::with_path(PathBuf::from("/nonexistent/yt-dlp"));
        let err = extractor.fetch("   ").await.unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }
}
