//! Progress tracking for downloads

use std::time::Duration;

/// Progress snapshot parsed from a yt-dlp status line
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    /// 0.0 ..= 100.0
    pub percentage: f64,
    pub speed: f64, // bytes per second
    pub total_bytes: u64,
    pub eta: Option<Duration>,
}

impl DownloadProgress {
    /// Parse a line such as
    /// `[download]  42.5% of ~ 150.00MiB at  5.20MiB/s ETA 00:15`.
    ///
    /// Returns `None` for anything that isn't a progress line.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim_start().strip_prefix("[download]")?;
        let pct_pos = rest.find('%')?;
        let percentage = rest[..pct_pos].trim().parse::<f64>().ok()?;

        let total_bytes = rest
            .find(" of ")
            .map(|idx| rest[idx + 4..].trim_start().trim_start_matches('~'))
            .and_then(|after| after.split_whitespace().next())
            .and_then(parse_size)
            .map(|bytes| bytes as u64)
            .unwrap_or(0);

        let speed = rest
            .find(" at ")
            .map(|idx| rest[idx + 4..].trim_start())
            .and_then(|after| after.split_whitespace().next())
            .and_then(|token| token.strip_suffix("/s"))
            .and_then(parse_size)
            .unwrap_or(0.0);

        let eta = rest
            .find("ETA ")
            .and_then(|idx| rest[idx + 4..].split_whitespace().next())
            .and_then(parse_clock);

        Some(Self {
            percentage: percentage.clamp(0.0, 100.0),
            speed,
            total_bytes,
            eta,
        })
    }
}

/// `150.00MiB` -> bytes
fn parse_size(token: &str) -> Option<f64> {
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let num = token[..split].parse::<f64>().ok()?;
    let multiplier = match &token[split..] {
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "KB" => 1000.0,
        "MB" => 1000.0 * 1000.0,
        "GB" => 1000.0 * 1000.0 * 1000.0,
        _ => 1.0,
    };
    Some(num * multiplier)
}

/// `01:02:03` or `02:03` -> duration
fn parse_clock(token: &str) -> Option<Duration> {
    let mut seconds = 0u64;
    for part in token.split(':') {
        seconds = seconds * 60 + part.parse::<u64>().ok()?;
    }
    Some(Duration::from_secs(seconds))
}
