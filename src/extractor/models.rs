//! Data structures for video information

use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";

/// A single downloadable encoding option for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub extension: String,
    pub resolution: String,
    /// Size in bytes, absent when the platform doesn't report it
    pub filesize: Option<u64>,
}

impl FormatDescriptor {
    /// Only formats with a known size can be offered for selection
    pub fn is_valid(&self) -> bool {
        self.filesize.is_some()
    }
}

/// One member video referenced by a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub title: String,
    pub url: String,
    pub id: String,
}

/// Video information structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub formats: Vec<FormatDescriptor>,
}

impl VideoInfo {
    /// Formats with a known file size, in provider order
    pub fn valid_formats(&self) -> Vec<FormatDescriptor> {
        valid_formats(&self.formats)
    }
}

/// Whatever a URL resolved to
#[derive(Debug, Clone)]
pub enum Metadata {
    Video(VideoInfo),
    Playlist {
        id: String,
        title: String,
        entries: Vec<PlaylistEntry>,
    },
}

/// Keep the formats whose file size is known.
pub fn valid_formats(formats: &[FormatDescriptor]) -> Vec<FormatDescriptor> {
    formats.iter().filter(|f| f.is_valid()).cloned().collect()
}

// ============================================================
// yt-dlp JSON shapes
// ============================================================

/// Top-level object printed by `yt-dlp --dump-single-json`
#[derive(Debug, Deserialize)]
pub(crate) struct RawInfo {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
    pub entries: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFormat {
    pub format_id: String,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub filesize: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEntry {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        Self {
            format_id: raw.format_id,
            extension: raw.ext.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            resolution: raw.resolution.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            filesize: raw.filesize,
        }
    }
}

impl RawEntry {
    fn into_entry(self) -> PlaylistEntry {
        let url = self
            .webpage_url
            .or(self.url)
            .filter(|u| u.starts_with("http"))
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", self.id));
        PlaylistEntry {
            title: self.title.unwrap_or_else(|| self.id.clone()),
            url,
            id: self.id,
        }
    }
}

impl RawInfo {
    /// Convert into typed metadata. `requested_url` fills in a missing page URL.
    pub fn into_metadata(self, requested_url: &str) -> Metadata {
        let title = self.title.unwrap_or_else(|| self.id.clone());
        let is_playlist = self.kind.as_deref() == Some("playlist") || self.entries.is_some();

        if is_playlist {
            let entries = self
                .entries
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(RawEntry::into_entry)
                .collect();
            return Metadata::Playlist {
                id: self.id,
                title,
                entries,
            };
        }

        Metadata::Video(VideoInfo {
            url: self
                .webpage_url
                .or(self.original_url)
                .unwrap_or_else(|| requested_url.to_string()),
            id: self.id,
            title,
            formats: self.formats.into_iter().map(FormatDescriptor::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_json_maps_to_descriptors() {
        let json = r#"{
            "id": "abc",
            "title": "Some clip",
            "webpage_url": "https://www.youtube.com/watch?v=abc",
            "formats": [
                {"format_id": "18", "ext": "mp4", "resolution": "640x360", "filesize": 1048576},
                {"format_id": "sb0", "ext": "mhtml", "resolution": "48x27"},
                {"format_id": "140", "ext": "m4a", "resolution": "audio only", "filesize": null}
            ]
        }"#;
        let raw: RawInfo = serde_json::from_str(json).unwrap();

        let Metadata::Video(video) = raw.into_metadata("https://youtu.be/abc") else {
            panic!("expected a video");
        };
        assert_eq!(video.title, "Some clip");
        assert_eq!(video.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(video.formats.len(), 3);
        assert_eq!(video.formats[1].filesize, None);

        let valid = video.valid_formats();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].format_id, "18");
        assert_eq!(valid[0].extension, "mp4");
    }

    #[test]
    fn test_missing_fields_read_as_not_available() {
        let raw: RawFormat = serde_json::from_str(r#"{"format_id": "22"}"#).unwrap();
        let format = FormatDescriptor::from(raw);
        assert_eq!(format.extension, "N/A");
        assert_eq!(format.resolution, "N/A");
        assert!(!format.is_valid());
    }

    #[test]
    fn test_flat_playlist_json_maps_to_entries() {
        let json = r#"{
            "_type": "playlist",
            "id": "PL1",
            "title": "Mix",
            "entries": [
                {"_type": "url", "id": "a1", "title": "First", "url": "https://www.youtube.com/watch?v=a1"},
                {"_type": "url", "id": "b2", "title": null, "url": "b2"},
                null
            ]
        }"#;
        let raw: RawInfo = serde_json::from_str(json).unwrap();

        let Metadata::Playlist { id, title, entries } = raw.into_metadata("https://x") else {
            panic!("expected a playlist");
        };
        assert_eq!(id, "PL1");
        assert_eq!(title, "Mix");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://www.youtube.com/watch?v=a1");
        assert_eq!(entries[1].title, "b2");
        assert_eq!(entries[1].url, "https://www.youtube.com/watch?v=b2");
    }
}
