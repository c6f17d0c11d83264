use crate::extractor::models::{FormatDescriptor, Metadata};
use crate::utils::error::YtgrabError;
use anyhow::Result;
use async_trait::async_trait;

/// Source of video and playlist metadata
///
/// This trait isolates the application from the specific extraction method
/// so the interactive flow can run against a scripted provider in tests.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolve a URL to either a single video or a playlist
    async fn fetch(&self, url: &str) -> Result<Metadata>;

    /// Gets all formats of a single video, valid or not
    async fn get_formats(&self, url: &str) -> Result<Vec<FormatDescriptor>> {
        match self.fetch(url).await? {
            Metadata::Video(info) => Ok(info.formats),
            Metadata::Playlist { .. } => Err(YtgrabError::ExtractionError(format!(
                "{} resolved to a playlist, expected a single video",
                url
            ))
            .into()),
        }
    }
}
