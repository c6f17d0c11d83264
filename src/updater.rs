//! Self-update from a published release
//!
//! A plain-text file holds the latest version string. When it differs from
//! ours, the user is offered the new executable, which replaces the running
//! one in place. Restarting is left to the caller.

use crate::console::Console;
use crate::utils::config::UpdateSettings;
use crate::utils::error::YtgrabError;
use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version of the running executable
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const USER_AGENT: &str = concat!("ytgrab/", env!("CARGO_PKG_VERSION"));
const UPDATE_PROMPT: &str = "Do you want to update to the latest version? (y/n): ";

/// Where the latest version and executable are published
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_version(&self) -> Result<String>;

    async fn fetch_binary(&self) -> Result<Vec<u8>>;
}

/// Release source reached over HTTP(S)
pub struct HttpReleaseSource {
    client: reqwest::Client,
    version_url: String,
    binary_url: String,
}

impl HttpReleaseSource {
    pub fn new(settings: &UpdateSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            version_url: settings.version_url.clone(),
            binary_url: settings.binary_url.clone(),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(YtgrabError::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(YtgrabError::UpdateError(format!(
                "Failed to check for updates. Status code: {}",
                status.as_u16()
            ))
            .into());
        }
        Ok(response)
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn latest_version(&self) -> Result<String> {
        let body = self
            .get(&self.version_url)
            .await?
            .text()
            .await
            .map_err(YtgrabError::NetworkError)?;
        Ok(body.trim().to_string())
    }

    async fn fetch_binary(&self) -> Result<Vec<u8>> {
        let bytes = self
            .get(&self.binary_url)
            .await?
            .bytes()
            .await
            .map_err(YtgrabError::NetworkError)?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Available(String),
}

/// What happened when an update was offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    /// The executable was replaced; the caller should ask for a restart
    UpdateApplied(String),
    /// A newer version exists but the user kept the current one
    UpdateDeclined(String),
    UpdateFailed(String),
}

/// Compare the published version with `current`. Any difference counts as newer.
pub async fn check_for_update(source: &dyn ReleaseSource, current: &str) -> Result<UpdateStatus> {
    let remote = source.latest_version().await?;
    let remote = remote.trim();
    if remote.is_empty() {
        return Err(YtgrabError::UpdateError("published version is empty".into()).into());
    }

    if remote == current.trim() {
        Ok(UpdateStatus::UpToDate)
    } else {
        Ok(UpdateStatus::Available(remote.to_string()))
    }
}

/// Check for a newer version and, if the user agrees, install it over `exe_path`.
pub async fn run_update(
    console: &mut dyn Console,
    source: &dyn ReleaseSource,
    current: &str,
    exe_path: &Path,
) -> UpdateOutcome {
    let latest = match check_for_update(source, current).await {
        Ok(UpdateStatus::UpToDate) => {
            console.success("You are using the latest version.");
            return UpdateOutcome::UpToDate;
        }
        Ok(UpdateStatus::Available(latest)) => latest,
        Err(e) => {
            warn!("Update check failed: {:#}", e);
            console.error(&format!("Error checking for updates: {}", e));
            return UpdateOutcome::UpdateFailed(e.to_string());
        }
    };

    console.warn(&format!("New version available! ({} -> {})", current, latest));
    let accepted = match console.prompt(UPDATE_PROMPT) {
        Ok(answer) => answer.trim().eq_ignore_ascii_case("y"),
        Err(e) => {
            debug!("No answer to update prompt: {}", e);
            false
        }
    };
    if !accepted {
        console.warn("Update skipped.");
        return UpdateOutcome::UpdateDeclined(latest);
    }

    match apply_update(source, exe_path).await {
        Ok(()) => {
            info!("Updated {} to {}", exe_path.display(), latest);
            console.success("Updated successfully! Please restart the application.");
            UpdateOutcome::UpdateApplied(latest)
        }
        Err(e) => {
            warn!("Update failed: {:#}", e);
            console.error(&format!("Error applying update: {}", e));
            UpdateOutcome::UpdateFailed(e.to_string())
        }
    }
}

/// Download the published executable and swap it in for `exe_path`.
pub async fn apply_update(source: &dyn ReleaseSource, exe_path: &Path) -> Result<()> {
    let bytes = source.fetch_binary().await?;
    if bytes.is_empty() {
        return Err(YtgrabError::UpdateError("downloaded executable is empty".into()).into());
    }
    replace_executable(exe_path, &bytes).await
}

/// Stage next to the target, move the old file to `.old`, then rename into place.
async fn replace_executable(exe_path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = with_suffix(exe_path, ".new");
    let backup = with_suffix(exe_path, ".old");

    tokio::fs::write(&staged, bytes).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755)).await?;
    }

    if tokio::fs::try_exists(exe_path).await? {
        tokio::fs::rename(exe_path, &backup).await?;
    }
    if let Err(e) = tokio::fs::rename(&staged, exe_path).await {
        if let Err(restore) = tokio::fs::rename(&backup, exe_path).await {
            warn!("Failed to restore {}: {}", exe_path.display(), restore);
        }
        return Err(e.into());
    }
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
