//! yt-dlp driven downloader
//!
//! yt-dlp fetches the chosen format plus the best audio track and merges
//! them with ffmpeg. We only watch its output for progress and for the
//! final file path.

use crate::downloader::progress::DownloadProgress;
use crate::downloader::Downloader;
use crate::utils::error::YtgrabError;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info};

/// File name inside the `-P` directory, which yt-dlp takes literally
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Downloader backed by the yt-dlp executable
pub struct YtDlpDownloader {
    ytdlp_path: PathBuf,
    merge_output_format: String,
}

impl YtDlpDownloader {
    pub fn with_path(ytdlp_path: PathBuf, merge_output_format: &str) -> Self {
        Self {
            ytdlp_path,
            merge_output_format: merge_output_format.to_string(),
        }
    }

    fn command(&self, url: &str, format_id: &str, target_dir: &Path) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.arg("-f")
            .arg(format_selector(format_id))
            .arg("-P")
            .arg(target_dir)
            .arg("-o")
            .arg(OUTPUT_TEMPLATE)
            .arg("--merge-output-format")
            .arg(&self.merge_output_format)
            .arg("--recode-video")
            .arg(&self.merge_output_format)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--progress")
            .arg("--newline") // one progress line per update, needed without a TTY
            .arg("--no-warnings")
            .arg("--")
            .arg(url);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }
}

/// The chosen stream merged with the best audio, or the stream alone when
/// there is nothing to merge.
fn format_selector(format_id: &str) -> String {
    format!("{format_id}+bestaudio/{format_id}")
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        target_dir: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(target_dir).await?;

        let mut cmd = self.command(url, format_id, target_dir);
        debug!("Spawning yt-dlp: {:?}", cmd.as_std());
        let mut child = cmd.spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| YtgrabError::DownloadError("yt-dlp stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| YtgrabError::DownloadError("yt-dlp stderr unavailable".into()))?;
        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let (mut out_done, mut err_done) = (false, false);

        let mut final_path: Option<PathBuf> = None;
        let mut last_error: Option<String> = None;

        while !(out_done && err_done) {
            tokio::select! {
                line = out_lines.next_line(), if !out_done => match line? {
                    Some(line) => {
                        if let Some(progress) = DownloadProgress::parse(&line) {
                            on_progress(progress);
                        } else if is_output_path(&line) {
                            final_path = Some(PathBuf::from(line.trim()));
                        }
                    }
                    None => out_done = true,
                },
                line = err_lines.next_line(), if !err_done => match line? {
                    Some(line) => {
                        if let Some(progress) = DownloadProgress::parse(&line) {
                            on_progress(progress);
                        } else if line.contains("ERROR:") {
                            error!("yt-dlp: {}", line);
                            last_error = Some(line);
                        } else {
                            debug!("yt-dlp: {}", line);
                        }
                    }
                    None => err_done = true,
                },
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let reason = last_error
                .unwrap_or_else(|| format!("yt-dlp exited with {:?}", status.code()));
            return Err(YtgrabError::DownloadError(reason).into());
        }

        let path = final_path.ok_or_else(|| {
            YtgrabError::DownloadError("yt-dlp did not report an output file".into())
        })?;
        info!("Downloaded {} to {}", url, path.display());
        Ok(path)
    }
}

/// `--print after_move:filepath` is the only plain line yt-dlp writes to stdout
fn is_output_path(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with('[') && !line.starts_with("ERROR:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selector_merges_best_audio() {
        assert_eq!(format_selector("137"), "137+bestaudio/137");
    }

    #[test]
    fn test_is_output_path() {
        assert!(is_output_path("/home/me/Clip.mp4\n"));
        assert!(!is_output_path("[Merger] Merging formats into \"Clip.mp4\""));
        assert!(!is_output_path("   "));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn fake_ytdlp(dir: &Path, script: &str) -> PathBuf {
            let path = dir.join("yt-dlp");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_download_reports_progress_and_path() {
            let temp = TempDir::new().unwrap();
            let bin = fake_ytdlp(
                temp.path(),
                "echo '[download]  50.0% of 2.00MiB at 1.00MiB/s ETA 00:01'\n\
                 echo '[download] 100% of 2.00MiB in 00:00:02' >&2\n\
                 echo '/videos/Clip.mp4'",
            );
            let downloader = YtDlpDownloader::with_path(bin, "mp4");
            let target = temp.path().join("out");

            let mut seen = Vec::new();
            let path = downloader
                .download("https://example.com/v", "18", &target, &mut |p: DownloadProgress| {
                    seen.push(p.percentage)
                })
                .await
                .unwrap();

            assert_eq!(path, PathBuf::from("/videos/Clip.mp4"));
            // stdout and stderr are read concurrently
            seen.sort_by(|a, b| a.total_cmp(b));
            assert_eq!(seen, vec![50.0, 100.0]);
            assert!(target.is_dir());
        }

        #[tokio::test]
        async fn test_download_failure_carries_error_line() {
            let temp = TempDir::new().unwrap();
            let bin = fake_ytdlp(
                temp.path(),
                "echo 'ERROR: Requested format is not available' >&2; exit 1",
            );
            let downloader = YtDlpDownloader::with_path(bin, "mp4");

            let err = downloader
                .download(
                    "https://example.com/v",
                    "999",
                    temp.path(),
                    &mut |_: DownloadProgress| {},
                )
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Requested format is not available"));
        }

        #[tokio::test]
        async fn test_target_dir_and_url_are_passed_literally() {
            let temp = TempDir::new().unwrap();
            let bin = fake_ytdlp(
                temp.path(),
                "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n\
                 echo '/videos/Clip.mp4'",
            );
            let downloader = YtDlpDownloader::with_path(bin, "mp4");
            let target = temp.path().join("100% Hits");

            downloader
                .download("-not-a-flag", "18", &target, &mut |_: DownloadProgress| {})
                .await
                .unwrap();

            let args = std::fs::read_to_string(temp.path().join("args.txt")).unwrap();
            let args: Vec<&str> = args.lines().collect();
            let after = |flag: &str| args[args.iter().position(|a| *a == flag).unwrap() + 1];
            assert_eq!(after("-P"), target.to_str().unwrap());
            assert_eq!(after("-o"), "%(title)s.%(ext)s");
            assert_eq!(&args[args.len() - 2..], ["--", "-not-a-flag"]);
        }
    }
}
