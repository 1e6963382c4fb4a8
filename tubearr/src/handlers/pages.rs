use askama::Template;
use axum::{extract::State, response::Html};
use chrono::{DateTime, NaiveDateTime};
use fetchd_api::{DownloadEntry, DownloadStatus, VideoFormat, VideoInfo};

use crate::error::AppError;
use crate::resolver::{self, Preview};
use crate::settings::Settings;
use crate::state::{AppState, Flash};

/// One filter pill: the raw value posted back, the label shown, and
/// whether it is the active selection.
pub struct FilterChoice {
    pub value: String,
    pub label: String,
    pub active: bool
}

pub struct PreviewView {
    pub info: VideoInfo,
    pub resolutions: Vec<FilterChoice>,
    pub extensions: Vec<FilterChoice>,
    pub formats: Vec<VideoFormat>,
    pub resolution_filter: String,
    pub format_filter: String,
    pub selected_format_id: String,
    pub filename: String
}

pub struct DownloadRow {
    pub entry: DownloadEntry,
    pub created: String
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    theme: String,
    status: DownloadStatus,
    flash: Option<Flash>,
    preview: Option<PreviewView>,
    downloads: Vec<DownloadRow>
}

#[derive(Template)]
#[template(path = "downloads.html")]
pub struct DownloadsTemplate {
    pub downloads: Vec<DownloadRow>
}

#[tracing::instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let theme = Settings::get_theme(&state.pool).await?;
    let status = state.session.status();
    let downloads = download_rows(state.library.snapshot().await);

    let (flash, preview) = {
        let mut ui = state.ui.write().await;
        (ui.flash.take(), ui.preview.as_ref().map(preview_view))
    };

    let template = IndexTemplate {
        theme,
        status,
        flash,
        preview,
        downloads
    };
    Ok(Html(template.render()?))
}

pub fn preview_view(preview: &Preview) -> PreviewView {
    let resolutions = resolver::available_resolutions(&preview.info.formats)
        .into_iter()
        .map(|value| FilterChoice {
            label: resolver::resolution_category(&value),
            active: value == preview.resolution_filter,
            value
        })
        .collect();

    let extensions = resolver::available_extensions(&preview.info.formats)
        .into_iter()
        .map(|value| FilterChoice {
            label: value.to_uppercase(),
            active: value == preview.format_filter,
            value
        })
        .collect();

    let formats = preview.filtered_formats().into_iter().cloned().collect();

    PreviewView {
        info: preview.info.clone(),
        resolutions,
        extensions,
        formats,
        resolution_filter: preview.resolution_filter.clone(),
        format_filter: preview.format_filter.clone(),
        selected_format_id: preview.selected_format_id.clone().unwrap_or_default(),
        filename: preview.filename.clone()
    }
}

pub fn download_rows(entries: Vec<DownloadEntry>) -> Vec<DownloadRow> {
    entries
        .into_iter()
        .map(|entry| {
            let created = display_date(&entry.created_at);
            DownloadRow { entry, created }
        })
        .collect()
}

/// The engine reports `created_at` as sqlite's `YYYY-MM-DD HH:MM:SS`;
/// RFC 3339 is accepted too. Anything else keeps its date part.
fn display_date(raw: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local()));

    match parsed {
        Ok(timestamp) => timestamp.format("%b %-d, %Y").to_string(),
        Err(_) => raw.split([' ', 'T']).next().unwrap_or(raw).to_string()
    }
}
