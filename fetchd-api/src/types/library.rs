use serde::{Deserialize, Serialize};
use url::Url;

use super::{format_bytes, format_seconds};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub filesize: Option<i64>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: String
}

impl DownloadEntry {
    pub fn format_filesize(&self) -> String {
        format_bytes(self.filesize.unwrap_or(0))
    }

    pub fn format_duration(&self) -> String {
        format_seconds(self.duration.unwrap_or(0.0))
    }

    pub fn has_duration(&self) -> bool {
        self.duration.is_some_and(|secs| secs > 0.0)
    }

    pub fn has_resolution(&self) -> bool {
        self.resolution
            .as_ref()
            .is_some_and(|res| !res.is_empty() && res != "Unknown")
    }

    pub fn source_host(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(ToString::to_string))
            .unwrap_or_else(|| String::from("Unknown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DownloadEntry {
        DownloadEntry {
            id: 1,
            url: String::from("https://www.youtube.com/watch?v=abc123"),
            filename: String::from("epic_clip_1080p.mp4"),
            filesize: Some(52_428_800),
            resolution: Some(String::from("1920x1080")),
            duration: Some(212.0),
            created_at: String::from("2025-06-01 10:30:00"),
            status: String::from("completed")
        }
    }

    #[test]
    fn test_display_helpers() {
        let entry = entry();
        assert_eq!(entry.format_filesize(), "50 MB");
        assert_eq!(entry.format_duration(), "3:32");
        assert_eq!(entry.source_host(), "www.youtube.com");
    }

    #[test]
    fn test_source_host_falls_back_on_bad_url() {
        let mut entry = entry();
        entry.url = String::from("not a url");
        assert_eq!(entry.source_host(), "Unknown");
    }

    #[test]
    fn test_missing_metadata() {
        let mut entry = entry();
        entry.filesize = None;
        entry.duration = None;
        entry.resolution = Some(String::from("Unknown"));
        assert_eq!(entry.format_filesize(), "0 Bytes");
        assert!(!entry.has_duration());
        assert!(!entry.has_resolution());
    }
}
