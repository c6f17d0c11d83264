pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::{valid_formats, FormatDescriptor, Metadata, PlaylistEntry, VideoInfo};
pub use traits::MetadataProvider;
pub use ytdlp::YtDlpExtractor;
