use fetchd_api::{VideoFormat, VideoInfo};
use rand::RngExt;

/// Pixel count of a dimensioned `WxH` resolution label. Labels without
/// an `x` (audio-only tracks, "Unknown") have no dimensions.
pub fn resolution_pixels(resolution: &str) -> Option<u64> {
    let (width, height) = resolution.split_once('x')?;
    let width: u64 = width.trim().parse().ok()?;
    let height: u64 = height.trim().parse().ok()?;
    Some(width * height)
}

/// Distinct resolution labels worth offering as a filter, best first.
///
/// Dimensioned labels below 400,000 pixels (360p and smaller) are cut;
/// non-dimensioned labels survive the floor and sink to the end.
pub fn available_resolutions(formats: &[VideoFormat]) -> Vec<String> {
    let mut seen = Vec::new();
    for format in formats {
        let resolution = &format.resolution;
        if resolution.is_empty() || resolution == "Unknown" {
            continue;
        }
        if seen.contains(resolution) {
            continue;
        }
        if let Some(pixels) = resolution_pixels(resolution) {
            if pixels < 400_000 {
                continue;
            }
        }
        seen.push(resolution.clone());
    }

    seen.sort_by_key(|resolution| std::cmp::Reverse(resolution_pixels(resolution).unwrap_or(0)));
    seen
}

/// Distinct file extensions across the formats, alphabetical.
pub fn available_extensions(formats: &[VideoFormat]) -> Vec<String> {
    let mut seen = Vec::new();
    for format in formats {
        let ext = &format.ext;
        if ext.is_empty() || ext == "Unknown" {
            continue;
        }
        if seen.contains(ext) {
            continue;
        }
        seen.push(ext.clone());
    }

    seen.sort();
    seen
}

/// Formats matching both filters. `"all"` is a wildcard on either axis;
/// anything else is an exact match.
pub fn filter_formats<'a>(
    formats: &'a [VideoFormat],
    resolution_filter: &str,
    format_filter: &str
) -> Vec<&'a VideoFormat> {
    formats
        .iter()
        .filter(|format| {
            let resolution_match =
                resolution_filter == "all" || format.resolution == resolution_filter;
            let format_match = format_filter == "all" || format.ext == format_filter;
            resolution_match && format_match
        })
        .collect()
}

/// Friendly tier label for a resolution, e.g. `1920x1080` becomes
/// `1080p`. Boundary pixel counts land in the higher tier. Labels below
/// 480p or without dimensions pass through unchanged.
pub fn resolution_category(resolution: &str) -> String {
    let Some(pixels) = resolution_pixels(resolution) else {
        return resolution.to_string();
    };

    let label = if pixels >= 3840 * 2160 {
        "4K"
    } else if pixels >= 2560 * 1440 {
        "2K"
    } else if pixels >= 1920 * 1080 {
        "1080p"
    } else if pixels >= 1280 * 720 {
        "720p"
    } else if pixels >= 854 * 480 {
        "480p"
    } else {
        return resolution.to_string();
    };

    label.to_string()
}

/// Suggested filename from the video title plus a resolution suffix
/// from the selected format. Empty when the video has no title.
pub fn derive_filename(info: &VideoInfo, selected: Option<&VideoFormat>) -> String {
    if info.title.is_empty() {
        return String::new();
    }

    // ASCII word characters only; accented letters and other scripts
    // are dropped, not transliterated.
    let cleaned: String = info
        .title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let joined = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    let base: String = joined.chars().take(50).collect();

    let suffix = selected
        .map(|format| width_suffix(&format.resolution))
        .unwrap_or_default();

    format!("{base}{suffix}")
}

fn width_suffix(resolution: &str) -> &'static str {
    let Some((width, _)) = resolution.split_once('x') else {
        return "";
    };
    let Ok(width) = width.trim().parse::<u64>() else {
        return "";
    };

    match width {
        w if w >= 3840 => "_4k",
        w if w >= 2560 => "_2k",
        w if w >= 1920 => "_1080p",
        w if w >= 1280 => "_720p",
        w if w >= 854 => "_480p",
        w if w >= 640 => "_360p",
        w if w >= 426 => "_240p",
        _ => ""
    }
}

/// Random `{adjective}_{noun}_{n}` filename. Falls back to
/// `random_video_{n}` when either word list is empty.
pub fn random_filename(adjectives: &[String], nouns: &[String]) -> String {
    let mut rng = rand::rng();
    let number: u32 = rng.random_range(1..=9999);

    if adjectives.is_empty() || nouns.is_empty() {
        return format!("random_video_{number}");
    }

    let adjective = &adjectives[rng.random_range(0..adjectives.len())];
    let noun = &nouns[rng.random_range(0..nouns.len())];
    format!("{adjective}_{noun}_{number}")
}

/// The loaded video plus everything the user can tweak before starting
/// a download. Lives server-side; replaced wholesale on each new URL
/// submission.
#[derive(Debug, Clone)]
pub struct Preview {
    pub info: VideoInfo,
    pub resolution_filter: String,
    pub format_filter: String,
    pub selected_format_id: Option<String>,
    pub filename: String,
    resolution_pinned: bool,
    format_pinned: bool
}

impl Preview {
    /// Builds the preview for freshly fetched video info, carrying the
    /// user's choices over from the previous preview when there is one.
    ///
    /// The best available resolution becomes the default filter only
    /// when the current filter is `"all"` and the user has not picked a
    /// filter themselves this session. A user-entered filename is never
    /// overwritten; an empty one gets the derived suggestion.
    pub fn on_new_video_info(
        previous: Option<&Preview>,
        info: VideoInfo,
        stored_resolution_filter: &str,
        stored_format_filter: &str
    ) -> Preview {
        let (mut resolution_filter, format_filter, resolution_pinned, format_pinned, filename) =
            match previous {
                Some(prev) => (
                    prev.resolution_filter.clone(),
                    prev.format_filter.clone(),
                    prev.resolution_pinned,
                    prev.format_pinned,
                    prev.filename.clone()
                ),
                None => (
                    stored_resolution_filter.to_string(),
                    stored_format_filter.to_string(),
                    false,
                    false,
                    String::new()
                )
            };

        if resolution_filter == "all" && !resolution_pinned {
            if let Some(best) = available_resolutions(&info.formats).into_iter().next() {
                resolution_filter = best;
            }
        }

        let mut preview = Preview {
            info,
            resolution_filter,
            format_filter,
            selected_format_id: None,
            filename,
            resolution_pinned,
            format_pinned
        };
        preview.reselect();
        preview
    }

    pub fn set_resolution_filter(&mut self, filter: String) {
        self.resolution_filter = filter;
        self.resolution_pinned = true;
        self.reselect();
    }

    pub fn set_format_filter(&mut self, filter: String) {
        self.format_filter = filter;
        self.format_pinned = true;
        self.reselect();
    }

    pub fn filtered_formats(&self) -> Vec<&VideoFormat> {
        filter_formats(&self.info.formats, &self.resolution_filter, &self.format_filter)
    }

    /// Re-derives the selected format and the suggested filename after
    /// the filters changed. Selection snaps to the first format under
    /// the current filters; the filename is only filled in when empty.
    fn reselect(&mut self) {
        let selected = self.filtered_formats().first().copied().cloned();
        self.selected_format_id = selected.as_ref().map(|format| format.format_id.clone());

        if self.filename.is_empty() {
            self.filename = derive_filename(&self.info, selected.as_ref());
        }
    }
}
