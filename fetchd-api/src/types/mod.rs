mod library;
mod status;
mod video;

pub use library::DownloadEntry;
pub use status::{DownloadState, DownloadStatus};
pub use video::{VideoFormat, VideoInfo};

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn format_bytes(bytes: i64) -> String {
    if bytes <= 0 {
        return String::from("0 Bytes");
    }

    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    let exp = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exp as i32);

    let mut rendered = format!("{value:.2}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }

    format!("{rendered} {}", UNITS[exp])
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn format_seconds(total: f64) -> String {
    if total <= 0.0 || total.is_nan() {
        return String::from("Unknown");
    }

    let total = total.floor() as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}
