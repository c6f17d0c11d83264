//! Interactive session
//!
//! One run of the prompt flow: optional update check, a URL, then either a
//! single video or a batch from a playlist. All collaborators are borrowed so
//! the same flow runs against yt-dlp in production and against fakes in tests.

use crate::console::Console;
use crate::downloader::{DownloadProgress, Downloader};
use crate::extractor::{Metadata, MetadataProvider, PlaylistEntry, VideoInfo};
use crate::formats::{resolve_common_formats, select_format};
use crate::render;
use crate::selection::parse_selection;
use crate::updater::{run_update, ReleaseSource, UpdateOutcome, CURRENT_VERSION};
use crate::utils::config::AppSettings;
use crate::utils::platform::sanitize_folder_name;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const URL_PROMPT: &str = "Enter the YouTube video URL (or 'update'): ";
const SELECTION_PROMPT: &str = "\nSelect videos to download (e.g. 1,3-5): ";
const UPDATE_COMMAND: &str = "update";

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    /// Stopped after reporting a problem to the user
    Abandoned(String),
    /// The executable was replaced by this version
    RestartRequired(String),
}

pub struct Session<'a> {
    console: &'a mut dyn Console,
    provider: &'a dyn MetadataProvider,
    downloader: &'a dyn Downloader,
    releases: &'a dyn ReleaseSource,
    settings: &'a AppSettings,
    exe_path: Option<PathBuf>,
    work_dir: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        provider: &'a dyn MetadataProvider,
        downloader: &'a dyn Downloader,
        releases: &'a dyn ReleaseSource,
        settings: &'a AppSettings,
    ) -> Self {
        Self {
            console,
            provider,
            downloader,
            releases,
            settings,
            exe_path: None,
            work_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Executable replaced by an update, defaults to the running one
    pub fn with_exe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.exe_path = Some(path.into());
        self
    }

    /// Directory searched for the cleanup folder, defaults to the current one
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub async fn run(&mut self) -> Result<SessionEnd> {
        if self.settings.check_updates_on_start {
            if let UpdateOutcome::UpdateApplied(version) = self.update().await {
                return Ok(SessionEnd::RestartRequired(version));
            }
        }

        self.console.plain(&render::panel(
            "Welcome",
            &format!("YouTube Video Downloader - Version: {}", CURRENT_VERSION),
        ));

        let url = self.read_url()?;
        if url.eq_ignore_ascii_case(UPDATE_COMMAND) {
            return Ok(match self.update().await {
                UpdateOutcome::UpdateApplied(version) => SessionEnd::RestartRequired(version),
                _ => SessionEnd::Finished,
            });
        }

        let metadata = match self.provider.fetch(&url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("Metadata fetch for {} failed: {:#}", url, e);
                self.console
                    .error(&format!("Error fetching video information: {}", e));
                return Ok(SessionEnd::Abandoned(e.to_string()));
            }
        };

        let end = match metadata {
            Metadata::Video(info) => self.single_video(info).await?,
            Metadata::Playlist { id, title, entries } => {
                debug!("Playlist {} has {} entries", id, entries.len());
                self.playlist(&title, &entries).await?
            }
        };

        if end == SessionEnd::Finished {
            self.console.plain(&render::panel(
                "Done",
                "Thank you for using the YouTube Video Downloader!",
            ));
        }
        Ok(end)
    }

    fn read_url(&mut self) -> Result<String> {
        loop {
            let url = self.console.prompt(URL_PROMPT)?;
            let url = url.trim();
            if !url.is_empty() {
                return Ok(url.to_string());
            }
            self.console.warn("Please enter a URL.");
        }
    }

    async fn update(&mut self) -> UpdateOutcome {
        let exe_path = match self.exe_path.clone() {
            Some(path) => path,
            None => match std::env::current_exe() {
                Ok(path) => path,
                Err(e) => {
                    self.console
                        .error(&format!("Cannot locate the running executable: {}", e));
                    return UpdateOutcome::UpdateFailed(e.to_string());
                }
            },
        };
        run_update(&mut *self.console, self.releases, CURRENT_VERSION, &exe_path).await
    }

    async fn single_video(&mut self, info: VideoInfo) -> Result<SessionEnd> {
        let valid = info.valid_formats();
        if valid.is_empty() {
            self.console
                .error("No formats with a known file size are available.");
            return Ok(SessionEnd::Abandoned(format!(
                "no sized formats for {}",
                info.url
            )));
        }

        self.console
            .plain(&format!("\nAvailable formats for {}:\n", info.title));
        let format_id = select_format(&mut *self.console, &valid)?;

        let target = self.settings.download_location.clone();
        let path = match self.download_one(&info.url, &format_id, &target).await {
            Ok(path) => path,
            Err(e) => {
                error!("Download of {} failed: {:#}", info.url, e);
                self.console.error(&format!("Error downloading video: {}", e));
                return Ok(SessionEnd::Abandoned(e.to_string()));
            }
        };
        self.console
            .success(&format!("\nDownloaded: {}", path.display()));

        self.remove_cleanup_folder(&path).await;
        Ok(SessionEnd::Finished)
    }

    async fn playlist(&mut self, title: &str, entries: &[PlaylistEntry]) -> Result<SessionEnd> {
        if entries.is_empty() {
            self.console
                .warn(&format!("Playlist '{}' has no entries.", title));
            return Ok(SessionEnd::Abandoned(format!("empty playlist {}", title)));
        }

        self.console.plain(&format!(
            "\nPlaylist: {} ({} videos)\n",
            title,
            entries.len()
        ));
        self.console.plain(&render::playlist_table(entries));

        let answer = self.console.prompt(SELECTION_PROMPT)?;
        let indices = match parse_selection(&answer, entries.len()) {
            Ok(indices) => indices,
            Err(e) => {
                self.console.error(&e.to_string());
                return Ok(SessionEnd::Abandoned(e.to_string()));
            }
        };
        let selected: Vec<PlaylistEntry> = indices.iter().map(|&i| entries[i].clone()).collect();
        debug!("Selected playlist indices: {:?}", indices);

        let common = resolve_common_formats(self.provider, &selected, &mut *self.console).await;
        if common.formats.is_empty() {
            self.console
                .error("No common formats found for the selected videos.");
            return Ok(SessionEnd::Abandoned("no common formats".into()));
        }

        self.console.plain(&format!(
            "\nFormats available for all {} videos:\n",
            common.used.len()
        ));
        let format_id = select_format(&mut *self.console, &common.formats)?;

        let target = self
            .settings
            .download_location
            .join(sanitize_folder_name(title));
        let total = common.used.len();
        let mut failed = Vec::new();
        for (n, entry) in common.used.iter().enumerate() {
            self.console
                .info(&format!("[{}/{}] {}", n + 1, total, entry.title));
            match self.download_one(&entry.url, &format_id, &target).await {
                Ok(path) => self
                    .console
                    .success(&format!("Downloaded: {}", path.display())),
                Err(e) => {
                    error!("Download of {} failed: {:#}", entry.url, e);
                    self.console
                        .error(&format!("Failed to download '{}': {}", entry.title, e));
                    failed.push(entry.title.as_str());
                }
            }
        }

        self.console.info(&format!(
            "\nDownloaded {} of {} videos into {}",
            total - failed.len(),
            selected.len(),
            target.display()
        ));
        if !failed.is_empty() {
            self.console.warn(&format!("Failed: {}", failed.join(", ")));
        }
        if !common.skipped.is_empty() {
            let skipped: Vec<&str> = common.skipped.iter().map(|e| e.title.as_str()).collect();
            self.console
                .warn(&format!("Skipped: {}", skipped.join(", ")));
        }
        Ok(SessionEnd::Finished)
    }

    async fn download_one(&mut self, url: &str, format_id: &str, dir: &Path) -> Result<PathBuf> {
        info!("Downloading {} as format {}", url, format_id);
        let console = &mut *self.console;
        let result = self
            .downloader
            .download(url, format_id, dir, &mut |p: DownloadProgress| {
                console.progress(&p)
            })
            .await;
        console.finish_progress();
        result
    }

    /// Remove the leftover cleanup folder from the working directory, unless
    /// the download just landed inside it.
    async fn remove_cleanup_folder(&mut self, downloaded: &Path) {
        let folder = self.work_dir.join(&self.settings.cleanup_folder);
        let name = &self.settings.cleanup_folder;

        if !folder.is_dir() {
            self.console.warn(&format!(
                "\nNo '{}' folder found in the current directory.",
                name
            ));
            return;
        }
        if is_inside(downloaded, &folder) {
            debug!("Keeping {}: it holds {}", folder.display(), downloaded.display());
            self.console.info(&format!(
                "\nKeeping the '{}' folder: it holds the downloaded file.",
                name
            ));
            return;
        }

        match tokio::fs::remove_dir_all(&folder).await {
            Ok(()) => self
                .console
                .success(&format!("\nDeleted the '{}' folder.", name)),
            Err(e) => {
                warn!("Failed to remove {}: {}", folder.display(), e);
                self.console
                    .error(&format!("Error deleting the '{}' folder: {}", name, e));
            }
        }
    }
}

fn is_inside(path: &Path, dir: &Path) -> bool {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    path.starts_with(dir)
}
