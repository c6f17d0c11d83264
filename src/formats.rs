//! Choosing a format for one video or a whole batch

use crate::console::Console;
use crate::extractor::{valid_formats, FormatDescriptor, MetadataProvider, PlaylistEntry};
use crate::render;
use crate::utils::error::YtgrabError;
use std::collections::HashSet;
use tracing::{debug, warn};

const CHOICE_PROMPT: &str = "\nSelect a format number to download: ";

/// Show `formats` and keep asking until the user picks one of them.
///
/// Returns the chosen `format_id`. Bad answers are reported and asked again;
/// only a closed input ends the loop early.
pub fn select_format(
    console: &mut dyn Console,
    formats: &[FormatDescriptor],
) -> Result<String, YtgrabError> {
    if formats.is_empty() {
        return Err(YtgrabError::NoFormats);
    }

    console.plain(&render::format_table(formats));
    loop {
        let answer = console.prompt(CHOICE_PROMPT)?;
        match parse_choice(&answer, formats.len()) {
            Some(index) => return Ok(formats[index].format_id.clone()),
            None => console.error("Invalid choice, please select a valid format number."),
        }
    }
}

/// 1-based answer -> 0-based index, `None` unless it is in `1..=len`
fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    let choice = answer.trim().parse::<i64>().ok()?;
    if choice < 1 || choice as u64 > len as u64 {
        return None;
    }
    Some(choice as usize - 1)
}

/// Formats every usable entry of a batch can be downloaded in
#[derive(Debug, Clone, Default)]
pub struct CommonFormats {
    /// In the order of the first usable entry
    pub formats: Vec<FormatDescriptor>,
    /// Entries that took part in the intersection
    pub used: Vec<PlaylistEntry>,
    /// Entries whose formats couldn't be fetched or had no known size
    pub skipped: Vec<PlaylistEntry>,
}

/// Intersect the valid formats of `entries`.
///
/// Entries that fail to resolve are skipped with a warning and left out of
/// the intersection. Once the intersection is empty the remaining entries
/// are not queried.
pub async fn resolve_common_formats(
    provider: &dyn MetadataProvider,
    entries: &[PlaylistEntry],
    console: &mut dyn Console,
) -> CommonFormats {
    let mut result = CommonFormats::default();
    let mut common: Option<Vec<FormatDescriptor>> = None;

    for entry in entries {
        console.info(&format!("Fetching formats for: {}", entry.title));

        let valid = match provider.get_formats(&entry.url).await {
            Ok(formats) => valid_formats(&formats),
            Err(e) => {
                warn!("Skipping {}: {}", entry.url, e);
                console.warn(&format!("Skipping '{}': {}", entry.title, e));
                result.skipped.push(entry.clone());
                continue;
            }
        };
        if valid.is_empty() {
            warn!("Skipping {}: no formats with a known size", entry.url);
            console.warn(&format!(
                "Skipping '{}': no formats with a known size",
                entry.title
            ));
            result.skipped.push(entry.clone());
            continue;
        }

        result.used.push(entry.clone());
        let next = match common.take() {
            None => dedup_by_id(valid),
            Some(current) => {
                let ids: HashSet<&str> = valid.iter().map(|f| f.format_id.as_str()).collect();
                current
                    .into_iter()
                    .filter(|f| ids.contains(f.format_id.as_str()))
                    .collect()
            }
        };

        if next.is_empty() {
            debug!("No common formats left after {}", entry.url);
            break;
        }
        common = Some(next);
    }

    result.formats = common.unwrap_or_default();
    result
}

fn dedup_by_id(formats: Vec<FormatDescriptor>) -> Vec<FormatDescriptor> {
    let mut seen = HashSet::new();
    formats
        .into_iter()
        .filter(|f| seen.insert(f.format_id.clone()))
        .collect()
}
