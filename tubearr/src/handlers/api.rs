use std::convert::Infallible;

use askama::Template;
use axum::body::Body;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, Redirect, Response};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

use crate::error::AppError;
use crate::handlers::pages::{DownloadsTemplate, download_rows};
use crate::resolver::Preview;
use crate::session::StartError;
use crate::settings::Settings;
use crate::state::{AppState, Flash};

#[derive(Debug, Deserialize)]
pub struct UrlForm {
    url: String
}

#[derive(Debug, Deserialize)]
pub struct PreviewForm {
    resolution_filter: Option<String>,
    format_filter: Option<String>,
    filename: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    filename: String,
    format_id: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    filename: String
}

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    theme: String
}

/// Engine-reported failures carry the engine's own message; transport
/// failures get the generic one.
fn gateway_message(err: fetchd_api::Error, fallback: &str) -> String {
    match err {
        fetchd_api::Error::Backend { message, .. } => message,
        other => {
            tracing::error!("engine call failed: {other}");
            fallback.to_string()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn fetch_video_info(
    State(state): State<AppState>,
    Form(input): Form<UrlForm>
) -> Result<Redirect, AppError> {
    let url = input.url.trim().to_string();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        state.ui.write().await.flash = Some(Flash::error("Please enter a valid URL"));
        return Ok(Redirect::to("/"));
    }

    match state.client.video_info(&url).await {
        Ok(info) => {
            let stored_resolution = Settings::get_resolution_filter(&state.pool).await?;
            let stored_format = Settings::get_format_filter(&state.pool).await?;

            let mut ui = state.ui.write().await;
            ui.preview = Some(Preview::on_new_video_info(
                ui.preview.as_ref(),
                info,
                &stored_resolution,
                &stored_format
            ));
            ui.flash = Some(Flash::success("Video info loaded successfully"));
        }
        Err(err) => {
            // A failed fetch must not leave a stale preview behind.
            let mut ui = state.ui.write().await;
            ui.preview = None;
            ui.flash = Some(Flash::error(gateway_message(err, "Failed to get video info")));
        }
    }

    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub async fn update_preview(
    State(state): State<AppState>,
    Form(input): Form<PreviewForm>
) -> Result<Redirect, AppError> {
    let mut ui = state.ui.write().await;
    let Some(preview) = ui.preview.as_mut() else {
        ui.flash = Some(Flash::error("No video selected"));
        return Ok(Redirect::to("/"));
    };

    if let Some(filename) = input.filename {
        let filename = filename.trim();
        if !filename.is_empty() {
            preview.filename = filename.to_string();
        }
    }

    if let Some(resolution) = input.resolution_filter {
        preview.set_resolution_filter(resolution.clone());
        Settings::set(&state.pool, "resolution_filter", &resolution).await?;
    }

    if let Some(format) = input.format_filter {
        preview.set_format_filter(format.clone());
        Settings::set(&state.pool, "format_filter", &format).await?;
    }

    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub async fn start_download(
    State(state): State<AppState>,
    Form(input): Form<DownloadForm>
) -> Redirect {
    let filename = input.filename.trim().to_string();
    let format_id = input.format_id.unwrap_or_default();

    // Every validation failure is caught here, before any engine call.
    let url = {
        let mut ui = state.ui.write().await;
        let Some(preview) = ui.preview.as_ref() else {
            ui.flash = Some(Flash::error("No video selected"));
            return Redirect::to("/");
        };
        if filename.is_empty() {
            ui.flash = Some(Flash::error("Please enter a filename"));
            return Redirect::to("/");
        }
        if format_id.is_empty() {
            ui.flash = Some(Flash::error("Please select a format"));
            return Redirect::to("/");
        }
        if state.session.status().is_downloading {
            ui.flash = Some(Flash::error("Another download is in progress"));
            return Redirect::to("/");
        }
        preview.info.url.clone()
    };

    match state.session.start(&url, &filename, Some(&format_id)).await {
        Ok(()) => {
            let mut ui = state.ui.write().await;
            if let Some(preview) = ui.preview.as_mut() {
                preview.filename = filename;
                preview.selected_format_id = Some(format_id);
            }
            ui.flash = Some(Flash::success("Download started"));
        }
        Err(StartError::AlreadyDownloading) => {
            state.ui.write().await.flash = Some(Flash::error("Another download is in progress"));
        }
        Err(StartError::Backend(err)) => {
            let message = gateway_message(err, "Failed to start download");
            state.ui.write().await.flash = Some(Flash::error(message));
        }
    }

    Redirect::to("/")
}

/// Mirrors the session to the browser: a `status` event per observed
/// status change and a `completed` event when a download finishes.
pub async fn status_stream(
    State(state): State<AppState>
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let status = WatchStream::new(state.session.subscribe_status()).map(|status| {
        let data = serde_json::to_string(&status).unwrap_or_default();
        Event::default().event("status").data(data)
    });

    let completed = BroadcastStream::new(state.session.subscribe_events())
        .filter_map(|event| futures::future::ready(event.ok()))
        .map(|_event| Event::default().event("completed").data("completed"));

    let stream = futures::stream::select(status, completed).map(Ok::<Event, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[tracing::instrument(skip(state))]
pub async fn downloads_fragment(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let template = DownloadsTemplate {
        downloads: download_rows(state.library.snapshot().await)
    };
    Ok(Html(template.render()?))
}

#[tracing::instrument(skip(state))]
pub async fn random_filename(State(state): State<AppState>) -> String {
    state.words.random_filename()
}

/// Proxies a finished file to the browser as an attachment, passing
/// the engine's suggested filename through.
#[tracing::instrument(skip(state))]
pub async fn save_file(
    State(state): State<AppState>,
    Path(id): Path<i64>
) -> Result<Response, AppError> {
    let file = state.client.fetch_file(id).await.map_err(AppError::from_gateway)?;

    let filename = file
        .filename
        .clone()
        .unwrap_or_else(|| format!("video_{id}.mp4"));
    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| String::from("application/octet-stream"));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_safe_filename(&filename))
        );
    if let Some(length) = file.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    Ok(builder.body(Body::from_stream(file.into_response().bytes_stream()))?)
}

/// The name goes inside a quoted `Content-Disposition` value; quotes
/// and control characters would break out of it.
fn header_safe_filename(name: &str) -> String {
    name.chars().filter(|c| *c != '"' && !c.is_control()).collect()
}

/// Proxies a file for inline playback, forwarding the browser's `Range`
/// header so the player can seek without a full download.
#[tracing::instrument(skip(state, headers))]
pub async fn stream_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap
) -> Result<Response, AppError> {
    let range = headers.get(header::RANGE).and_then(|value| value.to_str().ok());

    let upstream = state
        .client
        .stream_file(id, range)
        .await
        .map_err(AppError::from_gateway)?;

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::OK));
    for name in [
        header::CONTENT_TYPE,
        header::CONTENT_LENGTH,
        header::CONTENT_RANGE,
        header::ACCEPT_RANGES
    ] {
        if let Some(value) = upstream.headers().get(&name).and_then(|v| v.to_str().ok()) {
            builder = builder.header(&name, value);
        }
    }

    Ok(builder.body(Body::from_stream(upstream.bytes_stream()))?)
}

#[tracing::instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i64>
) -> Result<Html<String>, AppError> {
    state.client.delete_file(id).await.map_err(AppError::from_gateway)?;

    if let Err(err) = state.library.refresh().await {
        tracing::warn!("library refresh after delete failed: {err}");
    }

    downloads_fragment(State(state)).await
}

#[tracing::instrument(skip(state))]
pub async fn rename_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(input): Form<RenameForm>
) -> Result<Html<String>, AppError> {
    let filename = input.filename.trim();
    if filename.is_empty() {
        return Err(AppError::bad_request("Please enter a filename"));
    }

    state
        .client
        .rename_file(id, filename)
        .await
        .map_err(AppError::from_gateway)?;

    if let Err(err) = state.library.refresh().await {
        tracing::warn!("library refresh after rename failed: {err}");
    }

    downloads_fragment(State(state)).await
}

#[tracing::instrument(skip(state))]
pub async fn set_theme(
    State(state): State<AppState>,
    Form(input): Form<ThemeForm>
) -> Result<Redirect, AppError> {
    if input.theme != "light" && input.theme != "dark" {
        return Err(AppError::bad_request("Unknown theme"));
    }

    Settings::set(&state.pool, "theme", &input.theme).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_filename_strips_quotes_and_controls() {
        assert_eq!(header_safe_filename("my video.mp4"), "my video.mp4");
        assert_eq!(
            header_safe_filename("evil\".mp4\"; other=\"x"),
            "evil.mp4; other=x"
        );
        assert_eq!(header_safe_filename("a\r\nb.mp4"), "ab.mp4");
    }
}
