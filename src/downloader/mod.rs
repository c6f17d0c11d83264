//! Download module

pub mod progress;
pub mod ytdlp;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use progress::DownloadProgress;
pub use ytdlp::YtDlpDownloader;

/// Fetches one video in one format and returns where it landed
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        target_dir: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> Result<PathBuf>;
}
