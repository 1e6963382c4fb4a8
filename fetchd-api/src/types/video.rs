use serde::{Deserialize, Serialize};

use super::{format_bytes, format_seconds};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uploader: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub formats: Vec<VideoFormat>
}

impl VideoInfo {
    pub fn format_duration(&self) -> String {
        format_seconds(self.duration.unwrap_or(0.0))
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn format_views(&self) -> String {
        match self.view_count {
            None | Some(0) => String::from("Unknown"),
            Some(count) if count >= 1_000_000 => {
                format!("{:.1}M", count as f64 / 1_000_000.0)
            }
            Some(count) if count >= 1_000 => format!("{:.1}K", count as f64 / 1_000.0),
            Some(count) => count.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFormat {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub filesize: i64,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub vcodec: String,
    #[serde(default)]
    pub acodec: String,
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub format_note: String,
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub language: String
}

impl VideoFormat {
    pub fn format_filesize(&self) -> String {
        format_bytes(self.filesize)
    }

    pub fn format_bitrate(&self) -> Option<String> {
        self.tbr
            .filter(|kbps| *kbps > 0.0)
            .map(|kbps| format!("{:.1} Mb/s", kbps / 1000.0))
    }

    pub fn has_fps(&self) -> bool {
        self.fps.is_some_and(|fps| fps > 0.0)
    }

    pub fn has_codec(&self) -> bool {
        !self.vcodec.is_empty() && self.vcodec != "Unknown" && self.vcodec != "none"
    }

    pub fn has_language(&self) -> bool {
        !self.language.is_empty() && self.language != "unknown"
    }
}
