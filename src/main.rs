//! ytgrab - interactive video and playlist downloader
//!
//! Fetches metadata through yt-dlp, lets the user pick a format, and
//! downloads single videos or whole playlist selections.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ytgrab::app::Session;
use ytgrab::console::{Console, TerminalConsole};
use ytgrab::downloader::YtDlpDownloader;
use ytgrab::extractor::YtDlpExtractor;
use ytgrab::updater::HttpReleaseSource;
use ytgrab::utils::{AppSettings, YtgrabError};

#[derive(Parser)]
#[command(name = "ytgrab", version, about)]
struct Args {
    /// Save downloads here instead of the configured location
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Check for a newer release before the first prompt
    #[arg(long)]
    check_updates: bool,

    /// Read settings from this file
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);

    let config_path = args.config.unwrap_or_else(AppSettings::default_path);
    let mut settings = AppSettings::load(&config_path);
    if let Some(dir) = args.output_dir {
        settings.download_location = dir;
    }
    if args.check_updates {
        settings.check_updates_on_start = true;
    }
    debug!("Settings: {:?}", settings);

    let mut console = TerminalConsole::new();

    let extractor = match YtDlpExtractor::new(settings.ytdlp_path.as_deref()) {
        Ok(extractor) => extractor,
        Err(e) => {
            console.error("yt-dlp not found. Please install yt-dlp:");
            console.plain("  pip install yt-dlp");
            console.plain("  or: brew install yt-dlp");
            console.plain("  or visit: https://github.com/yt-dlp/yt-dlp");
            return Err(e);
        }
    };
    let downloader = YtDlpDownloader::with_path(
        extractor.ytdlp_path().to_path_buf(),
        &settings.merge_output_format,
    );
    let releases = HttpReleaseSource::new(&settings.update);

    let mut session = Session::new(&mut console, &extractor, &downloader, &releases, &settings);
    match session.run().await {
        Ok(end) => {
            debug!("Session ended: {:?}", end);
            Ok(())
        }
        // Ctrl-D at a prompt
        Err(e) if matches!(e.downcast_ref::<YtgrabError>(), Some(YtgrabError::InputClosed)) => {
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
