//! Report rendering and writing
//!
//! Rendering is a pure function of the [`ScanReport`]: the same report
//! always renders to the same bytes. Every path and tag value is escaped,
//! since both come straight from the user's filesystem.
//!
//! Writing goes through a sibling temporary file that is renamed over the
//! target, so a failed write never leaves a truncated report behind.

use crate::models::{LookupSuggestion, MetadataRecord, ScanReport};
use html_escape::encode_text;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Placeholder for empty fields
const PLACEHOLDER: &str = "\u{2014}";

const STYLE: &str = "body{background:#0b1220;color:#d7e1ec;font-family:Arial,sans-serif;padding:20px;}\
h1{font-size:24px;}h2{font-size:20px;margin-top:24px;}\
table{width:100%;border-collapse:collapse;margin-top:10px;}\
th,td{border:1px solid #203052;padding:8px;font-size:12px;text-align:left;}\
th{background:#0e172a;color:#93c5fd;}\
footer{margin-top:32px;font-size:11px;color:#5b6b82;}";

/// Report rendering/writing errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}' (expected html or json)", other)),
        }
    }
}

/// Renders and writes scan reports
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    format: ReportFormat,
    generator_label: String,
}

impl ReportGenerator {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            generator_label: format!("gpf-scan {}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render the report in the configured format
    pub fn render(&self, report: &ScanReport) -> Result<String, ReportError> {
        match self.format {
            ReportFormat::Html => Ok(self.render_html(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// Render the HTML document
    pub fn render_html(&self, report: &ScanReport) -> String {
        let mut html = String::with_capacity(4096);

        html.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
        html.push_str("<title>Gig Preflight Report</title><style>");
        html.push_str(STYLE);
        html.push_str("</style></head><body>");
        html.push_str("<h1>Gig Preflight Report</h1>");

        // Writing into a String cannot fail
        let _ = write!(
            html,
            "<p>Root: {}</p>\
             <p>Unsupported files: {}</p>\
             <p>Duplicate sets: {}</p>\
             <p>Tracks missing metadata: {}</p>",
            encode_text(&report.root.to_string_lossy()),
            report.unsupported_count,
            report.duplicate_set_count(),
            report.missing_metadata_count(),
        );

        if !report.duplicate_groups.is_empty() {
            html.push_str("<h2>Duplicates</h2>");
            for (idx, group) in report.duplicate_groups.iter().enumerate() {
                let _ = write!(html, "<p>Group {} ({} files)</p><ul>", idx + 1, group.len());
                for file in &group.files {
                    let _ = write!(html, "<li>{}</li>", encode_text(&file.path.to_string_lossy()));
                }
                html.push_str("</ul>");
            }
        }

        if !report.missing_metadata.is_empty() {
            html.push_str(
                "<h2>Missing Metadata</h2><table><thead><tr>\
                 <th>File</th><th>Current</th><th>Suggested</th>\
                 </tr></thead><tbody>",
            );
            for entry in &report.missing_metadata {
                let suggested = match &entry.suggestion {
                    Some(suggestion) => format_suggestion(suggestion),
                    None => PLACEHOLDER.to_string(),
                };
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    encode_text(&entry.file.path.to_string_lossy()),
                    encode_text(&format_current(&entry.current)),
                    encode_text(&suggested),
                );
            }
            html.push_str("</tbody></table>");
        }

        let _ = write!(
            html,
            "<footer>Generated by {}</footer>",
            encode_text(&self.generator_label)
        );
        html.push_str("</body></html>");
        html
    }

    /// Render and write to `path`, replacing any existing file
    pub fn write(&self, report: &ScanReport, path: &Path) -> Result<(), ReportError> {
        let document = self.render(report)?;
        write_atomically(path, document.as_bytes())?;

        tracing::info!(
            path = %path.display(),
            bytes = document.len(),
            "Report written"
        );
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(ReportFormat::Html)
    }
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

fn format_current(record: &MetadataRecord) -> String {
    format!(
        "{} / {} / {}",
        or_placeholder(&record.title),
        or_placeholder(&record.artist),
        or_placeholder(&record.album)
    )
}

fn format_suggestion(suggestion: &LookupSuggestion) -> String {
    format!(
        "{} / {} / {}",
        or_placeholder(&suggestion.title),
        or_placeholder(&suggestion.artist),
        or_placeholder(&suggestion.album)
    )
}

/// Write via a temporary sibling and rename
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp-{}", file_name, std::process::id()));

    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentDigest, DuplicateGroup, FileEntry, MissingMetadataEntry};
    use tempfile::TempDir;

    fn empty_report() -> ScanReport {
        ScanReport {
            root: PathBuf::from("/music"),
            unsupported_count: 0,
            unsupported_files: Vec::new(),
            duplicate_groups: Vec::new(),
            missing_metadata: Vec::new(),
        }
    }

    fn sample_report() -> ScanReport {
        ScanReport {
            root: PathBuf::from("/music"),
            unsupported_count: 1,
            unsupported_files: vec![FileEntry::new(2, PathBuf::from("/music/c.txt"))],
            duplicate_groups: vec![DuplicateGroup {
                digest: ContentDigest::from_hex("abcd"),
                files: vec![
                    FileEntry::new(0, PathBuf::from("/music/a.mp3")),
                    FileEntry::new(1, PathBuf::from("/music/b.mp3")),
                ],
            }],
            missing_metadata: vec![
                MissingMetadataEntry {
                    file: FileEntry::new(0, PathBuf::from("/music/a.mp3")),
                    current: MetadataRecord::default(),
                    suggestion: None,
                },
                MissingMetadataEntry {
                    file: FileEntry::new(3, PathBuf::from("/music/d.flac")),
                    current: MetadataRecord {
                        title: "Only Title".to_string(),
                        ..Default::default()
                    },
                    suggestion: Some(LookupSuggestion {
                        title: "Found".to_string(),
                        artist: "Someone".to_string(),
                        album: String::new(),
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_summary_counts() {
        let html = ReportGenerator::default().render_html(&sample_report());
        assert!(html.contains("<p>Unsupported files: 1</p>"));
        assert!(html.contains("<p>Duplicate sets: 1</p>"));
        assert!(html.contains("<p>Tracks missing metadata: 2</p>"));
        assert!(html.contains("<p>Group 1 (2 files)</p>"));
        assert!(html.contains("<li>/music/a.mp3</li><li>/music/b.mp3</li>"));
    }

    #[test]
    fn test_placeholders() {
        let html = ReportGenerator::default().render_html(&sample_report());
        assert!(html.contains("<td>/music/a.mp3</td><td>\u{2014} / \u{2014} / \u{2014}</td><td>\u{2014}</td>"));
        assert!(html.contains("<td>Only Title / \u{2014} / \u{2014}</td><td>Found / Someone / \u{2014}</td>"));
    }

    #[test]
    fn test_empty_report_has_no_sections() {
        let html = ReportGenerator::default().render_html(&empty_report());
        assert!(html.contains("<p>Unsupported files: 0</p>"));
        assert!(html.contains("<p>Duplicate sets: 0</p>"));
        assert!(html.contains("<p>Tracks missing metadata: 0</p>"));
        assert!(!html.contains("<h2>Duplicates</h2>"));
        assert!(!html.contains("<h2>Missing Metadata</h2>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut report = empty_report();
        report.root = PathBuf::from("/music/<script>alert(1)</script>");
        report.missing_metadata.push(MissingMetadataEntry {
            file: FileEntry::new(0, PathBuf::from("/music/R&B <live>.mp3")),
            current: MetadataRecord {
                title: "<b>bold</b>".to_string(),
                artist: String::new(),
                album: String::new(),
            },
            suggestion: None,
        });

        let html = ReportGenerator::default().render_html(&report);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("R&amp;B &lt;live&gt;.mp3"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let generator = ReportGenerator::default();
        let report = sample_report();
        assert_eq!(generator.render_html(&report), generator.render_html(&report));
    }

    #[test]
    fn test_json_format() {
        let generator = ReportGenerator::new(ReportFormat::Json);
        let json = generator.render(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["unsupported_count"], 1);
        assert_eq!(value["duplicate_groups"][0]["digest"], "abcd");
        assert_eq!(value["duplicate_groups"][0]["files"][1]["path"], "/music/b.mp3");
        assert!(value["missing_metadata"][0]["suggestion"].is_null());
        assert_eq!(value["missing_metadata"][1]["suggestion"]["artist"], "Someone");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("HTML".parse::<ReportFormat>(), Ok(ReportFormat::Html));
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_write_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.html");
        std::fs::write(&path, "stale").unwrap();

        ReportGenerator::default().write(&empty_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!doctype html>"));
        // No temporary files left behind
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no/such/dir/report.html");

        let result = ReportGenerator::default().write(&empty_report(), &path);
        assert!(matches!(result, Err(ReportError::Write { .. })));
    }
}
