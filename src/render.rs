//! Plain-text rendering of tables and panels

use crate::extractor::{FormatDescriptor, PlaylistEntry};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// `10485760` -> `"10.00 MB"`
pub fn format_filesize(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[derive(Tabled)]
struct FormatRow<'a> {
    #[tabled(rename = "Number")]
    number: usize,
    #[tabled(rename = "Format ID")]
    format_id: &'a str,
    #[tabled(rename = "Extension")]
    extension: &'a str,
    #[tabled(rename = "Resolution")]
    resolution: &'a str,
    #[tabled(rename = "Filesize")]
    filesize: String,
}

/// Numbered table of formats, numbering starts at 1
pub fn format_table(formats: &[FormatDescriptor]) -> String {
    let rows = formats.iter().enumerate().map(|(i, f)| FormatRow {
        number: i + 1,
        format_id: &f.format_id,
        extension: &f.extension,
        resolution: &f.resolution,
        filesize: f
            .filesize
            .map(format_filesize)
            .unwrap_or_else(|| "N/A".to_string()),
    });
    Table::new(rows).with(Style::modern()).to_string()
}

#[derive(Tabled)]
struct EntryRow<'a> {
    #[tabled(rename = "Number")]
    number: usize,
    #[tabled(rename = "Title")]
    title: &'a str,
}

/// Numbered table of playlist entries, numbering starts at 1
pub fn playlist_table(entries: &[PlaylistEntry]) -> String {
    let rows = entries.iter().enumerate().map(|(i, e)| EntryRow {
        number: i + 1,
        title: &e.title,
    });
    Table::new(rows).with(Style::modern()).to_string()
}

/// A rounded box with `title` above `body`
pub fn panel(title: &str, body: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([title]);
    builder.push_record([body]);
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, filesize: Option<u64>) -> FormatDescriptor {
        FormatDescriptor {
            format_id: id.to_string(),
            extension: "mp4".to_string(),
            resolution: "1280x720".to_string(),
            filesize,
        }
    }

    #[test]
    fn test_format_filesize() {
        assert_eq!(format_filesize(10_485_760), "10.00 MB");
        assert_eq!(format_filesize(0), "0.00 MB");
        assert_eq!(format_filesize(1_572_864), "1.50 MB");
    }

    #[test]
    fn test_format_table_numbers_rows() {
        let table = format_table(&[format("22", Some(10_485_760)), format("18", None)]);
        assert!(table.contains("Format ID"));
        assert!(table.contains("10.00 MB"));
        assert!(table.contains("N/A"));
        let first = table.lines().position(|l| l.contains("22")).unwrap();
        let second = table.lines().position(|l| l.contains("18")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_playlist_table_lists_titles() {
        let entries = vec![PlaylistEntry {
            title: "Intro".to_string(),
            url: "https://example.com/1".to_string(),
            id: "1".to_string(),
        }];
        let table = playlist_table(&entries);
        assert!(table.contains("Intro"));
        assert!(table.contains("Number"));
    }

    #[test]
    fn test_panel_lines_share_a_width() {
        let rendered = panel("Welcome", "ytgrab - Version: 1.0.2");
        let lines: Vec<&str> = rendered.lines().collect();
        // top, title, separator, body, bottom
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
        assert!(lines[0].starts_with('╭'));
        assert!(lines[1].contains("Welcome"));
        assert!(lines[3].contains("Version: 1.0.2"));
    }
}
