use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::types::{DownloadEntry, DownloadStatus, VideoInfo};

/// Word list categories served by the engine for random filename
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Adjectives,
    Nouns
}

impl WordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WordKind::Adjectives => "adjectives",
            WordKind::Nouns => "nouns"
        }
    }
}

/// A file body streamed back from the engine, with the metadata the
/// engine attached to it.
#[derive(Debug)]
pub struct FileDownload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    response: reqwest::Response
}

impl FileDownload {
    fn from_response(response: reqwest::Response) -> Self {
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let content_length = response.content_length();

        Self {
            filename,
            content_type,
            content_length,
            response
        }
    }

    pub fn into_response(self) -> reqwest::Response {
        self.response
    }
}

#[derive(Debug, Clone)]
pub struct FetchdClient {
    http: reqwest::Client,
    base_url: String
}

impl FetchdClient {
    /// Builds a client against the engine's API root, e.g.
    /// `http://127.0.0.1:5000/api`.
    ///
    /// No overall request timeout is set: metadata extraction and file
    /// transfers can legitimately run for minutes. Only connecting is
    /// bounded.
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url)?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        tracing::debug!(url = %url, "requesting video info");
        let response = self
            .http
            .post(self.endpoint("/video-info"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn start_download(
        &self,
        url: &str,
        filename: &str,
        format_id: Option<&str>
    ) -> Result<()> {
        tracing::debug!(url = %url, filename = %filename, format_id = ?format_id, "starting download");
        let response = self
            .http
            .post(self.endpoint("/download"))
            .json(&serde_json::json!({
                "url": url,
                "filename": filename,
                "format_id": format_id
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(())
    }

    pub async fn download_status(&self) -> Result<DownloadStatus> {
        let response = self
            .http
            .get(self.endpoint("/download-status"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn list_downloads(&self) -> Result<Vec<DownloadEntry>> {
        let response = self.http.get(self.endpoint("/downloads")).send().await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Fetches a stored file as an attachment. The engine supplies the
    /// user-facing filename via `Content-Disposition`.
    pub async fn fetch_file(&self, id: i64) -> Result<FileDownload> {
        let response = self
            .http
            .get(self.endpoint(&format!("/download-file/{id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(FileDownload::from_response(response))
    }

    /// Fetches a stored file for inline playback, forwarding an optional
    /// byte `Range` so seeking works. The response may be 200 or 206.
    pub async fn stream_file(&self, id: i64, range: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.http.get(self.endpoint(&format!("/stream-file/{id}")));
        if let Some(range) = range {
            request = request.header(reqwest::header::RANGE, range);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response)
    }

    pub async fn delete_file(&self, id: i64) -> Result<()> {
        tracing::debug!(id, "deleting file");
        let response = self
            .http
            .delete(self.endpoint(&format!("/delete-file/{id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(())
    }

    pub async fn rename_file(&self, id: i64, filename: &str) -> Result<()> {
        tracing::debug!(id, filename = %filename, "renaming file");
        let response = self
            .http
            .put(self.endpoint(&format!("/rename-file/{id}")))
            .json(&serde_json::json!({ "filename": filename }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(())
    }

    pub async fn word_list(&self, kind: WordKind) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.endpoint(&format!("/word-lists/{}", kind.as_str())))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Non-2xx responses carry `{"error": "..."}` when the engine produced
/// the failure itself. Anything else falls back to the status line.
async fn backend_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| error_field(&body))
        .unwrap_or_else(|| format!("request failed with status {status}"));

    Error::Backend {
        status: status.as_u16(),
        message
    }
}

fn error_field(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(ToString::to_string)
}

fn content_disposition_filename(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let rest = rest.trim();

    let name = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split('"').next()?
    } else {
        rest.split(';').next()?.trim()
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn video_info_body() -> serde_json::Value {
        json!({
            "url": "https://www.youtube.com/watch?v=abc123",
            "title": "Test Video",
            "uploader": "Test Channel",
            "duration": 212,
            "view_count": 1_234_567,
            "upload_date": "2025-06-01",
            "thumbnail": "https://example.com/thumb.jpg",
            "formats": [
                {
                    "format_id": "137",
                    "ext": "mp4",
                    "resolution": "1920x1080",
                    "filesize": 52_428_800,
                    "fps": 30,
                    "vcodec": "avc1.640028",
                    "acodec": "none",
                    "quality": 9,
                    "format_note": "1080p",
                    "tbr": 2500.5
                },
                {
                    "format_id": "22",
                    "ext": "mp4",
                    "resolution": "1280x720",
                    "filesize": 31_457_280,
                    "fps": null,
                    "vcodec": "avc1.64001F",
                    "acodec": "mp4a.40.2",
                    "quality": 8,
                    "format_note": "720p",
                    "tbr": 1200
                }
            ]
        })
    }

    #[test]
    fn test_content_disposition_filename() {
        assert_eq!(
            content_disposition_filename(r#"attachment; filename="my video.mp4""#),
            Some("my video.mp4".to_string())
        );
        assert_eq!(
            content_disposition_filename("attachment; filename=clip.webm"),
            Some("clip.webm".to_string())
        );
        assert_eq!(
            content_disposition_filename("attachment; filename=clip.mp4; size=42"),
            Some("clip.mp4".to_string())
        );
        assert_eq!(content_disposition_filename("inline"), None);
        assert_eq!(content_disposition_filename(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(matches!(
            FetchdClient::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let client = FetchdClient::new("http://localhost:5000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[tokio::test]
    async fn test_video_info_decodes_metadata() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/video-info")
            .match_body(Matcher::Json(
                json!({ "url": "https://www.youtube.com/watch?v=abc123" })
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(video_info_body().to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let info = client
            .video_info("https://www.youtube.com/watch?v=abc123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(info.title, "Test Video");
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[0].resolution, "1920x1080");
        assert_eq!(info.formats[1].fps, None);
        assert_eq!(info.format_views(), "1.2M");
        assert_eq!(info.format_duration(), "3:32");
    }

    #[tokio::test]
    async fn test_backend_error_message_is_surfaced() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/video-info")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": "Another download is in progress" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let err = client.video_info("https://example.com/v").await.unwrap_err();

        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Another download is in progress");
            }
            other => panic!("unexpected error: {other:?}")
        }
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_without_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/downloads")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let err = client.list_downloads().await.unwrap_err();

        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}")
        }
    }

    #[tokio::test]
    async fn test_start_download_sends_selection() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .match_body(Matcher::Json(json!({
                "url": "https://example.com/v",
                "filename": "my_clip_1080p",
                "format_id": "137"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "Download started" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        client
            .start_download("https://example.com/v", "my_clip_1080p", Some("137"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_download_without_format_sends_null() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .match_body(Matcher::Json(json!({
                "url": "https://example.com/v",
                "filename": "video",
                "format_id": null
            })))
            .with_status(200)
            .with_body(json!({ "message": "Download started" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        client
            .start_download("https://example.com/v", "video", None)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_status_decodes_and_reports_terminal() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/download-status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "is_downloading": false,
                    "progress": 100,
                    "status": "finished",
                    "current_download": { "filename": "clip.mp4" }
                })
                .to_string()
            )
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let status = client.download_status().await.unwrap();

        assert!(status.is_terminal());
        assert_eq!(status.percent(), 100);
    }

    #[tokio::test]
    async fn test_fetch_file_reads_attachment_metadata() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/download-file/7")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_header("content-disposition", r#"attachment; filename="clip.mp4""#)
            .with_body("fake video bytes")
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let file = client.fetch_file(7).await.unwrap();

        assert_eq!(file.filename.as_deref(), Some("clip.mp4"));
        assert_eq!(file.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(file.content_length, Some(16));

        let body = file.into_response().bytes().await.unwrap();
        assert_eq!(&body[..], b"fake video bytes");
    }

    #[tokio::test]
    async fn test_stream_file_forwards_range() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/stream-file/3")
            .match_header("range", "bytes=0-99")
            .with_status(206)
            .with_header("content-range", "bytes 0-99/1000")
            .with_body(vec![0_u8; 100])
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let response = client.stream_file(3, Some("bytes=0-99")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status().as_u16(), 206);
    }

    #[tokio::test]
    async fn test_rename_file_sends_put() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/rename-file/5")
            .match_body(Matcher::Json(json!({ "filename": "better_name" })))
            .with_status(200)
            .with_body(json!({ "message": "File renamed successfully" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        client.rename_file(5, "better_name").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rename_conflict_surfaces_engine_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/rename-file/5")
            .with_status(400)
            .with_body(json!({ "error": "A file with this name already exists" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let err = client.rename_file(5, "taken").await.unwrap_err();

        assert_eq!(err.backend_status(), Some(400));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_delete_file_hits_delete_route() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/delete-file/9")
            .with_status(200)
            .with_body(json!({ "message": "File deleted successfully" }).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        client.delete_file(9).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_word_list_decodes_array() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/word-lists/adjectives")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(["amazing", "epic", "stunning"]).to_string())
            .create_async()
            .await;

        let client = FetchdClient::new(&server.url()).unwrap();
        let words = client.word_list(WordKind::Adjectives).await.unwrap();

        assert_eq!(words, vec!["amazing", "epic", "stunning"]);
    }
}
