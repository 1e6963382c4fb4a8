use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadStatus {
    #[serde(default)]
    pub is_downloading: bool,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub status: String
}

impl Default for DownloadStatus {
    fn default() -> Self {
        Self {
            is_downloading: false,
            progress: 0.0,
            status: String::from("idle")
        }
    }
}

impl DownloadStatus {
    pub fn state(&self) -> DownloadState {
        if self.status.starts_with("error") {
            return DownloadState::Failed;
        }
        match self.status.as_str() {
            "idle" => DownloadState::Idle,
            "downloading" => DownloadState::Downloading,
            "processing" => DownloadState::Processing,
            "finished" => DownloadState::Finished,
            _ => DownloadState::Unknown
        }
    }

    /// A run is over once the engine reports no active download and has
    /// left the `downloading` phase. Post-processing keeps the run alive
    /// even though `is_downloading` has already flipped back.
    pub fn is_terminal(&self) -> bool {
        !self.is_downloading && self.status != "downloading"
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.strip_prefix("error:").map(str::trim)
    }

    pub fn status_label(&self) -> &'static str {
        match self.state() {
            DownloadState::Downloading => "Downloading video...",
            DownloadState::Processing => "Processing video...",
            DownloadState::Finished => "Download complete",
            DownloadState::Failed => "Download failed",
            DownloadState::Idle | DownloadState::Unknown => "Preparing download..."
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Idle,
    Downloading,
    Processing,
    Finished,
    Failed,
    Unknown
}
