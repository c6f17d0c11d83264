//! ytgrab library

pub mod app;
pub mod console;
pub mod downloader;
pub mod extractor;
pub mod formats;
pub mod render;
pub mod selection;
pub mod updater;
pub mod utils;

// Re-export main types for easier use
pub use app::{Session, SessionEnd};
pub use console::{Console, ScriptedConsole, TerminalConsole, Tone};
pub use downloader::{DownloadProgress, Downloader, YtDlpDownloader};
pub use extractor::{
    FormatDescriptor, Metadata, MetadataProvider, PlaylistEntry, VideoInfo, YtDlpExtractor,
};
pub use formats::{resolve_common_formats, select_format, CommonFormats};
pub use selection::{parse_selection, SelectionError};
pub use updater::{ReleaseSource, UpdateOutcome, CURRENT_VERSION};
pub use utils::{AppSettings, YtgrabError};
