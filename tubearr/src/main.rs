mod db;
mod error;
mod handlers;
mod resolver;
mod session;
mod settings;
mod state;
mod words;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{delete, get, post}
};
use fetchd_api::FetchdClient;
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::{api, pages};
use session::DownloadSession;
use state::{AppState, Library, UiState};
use words::WordBank;

const POLL_CADENCE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubearr=info,tower_http=debug".into())
        )
        .init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./tubearr.db".to_string());

    let pool = db::init_pool(&database_path).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database initialized at {}", database_path);

    let fetchd_url =
        std::env::var("FETCHD_URL").unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string());
    let client = FetchdClient::new(&fetchd_url)?;
    tracing::info!("Using download engine at {}", fetchd_url);

    let words = Arc::new(WordBank::load(&client).await);

    let library = Arc::new(Library::new(client.clone()));
    if let Err(e) = library.refresh().await {
        tracing::warn!("Initial library refresh failed: {}", e);
    }

    let session = Arc::new(DownloadSession::new(
        client.clone(),
        library.clone(),
        POLL_CADENCE
    ));

    let state = AppState {
        pool,
        client,
        session,
        library,
        words,
        ui: Arc::new(RwLock::new(UiState::default()))
    };

    let app = Router::new()
        .route("/", get(pages::index))
        .route("/api/video-info", post(api::fetch_video_info))
        .route("/api/preview", post(api::update_preview))
        .route("/api/download", post(api::start_download))
        .route("/api/status/stream", get(api::status_stream))
        .route("/api/downloads", get(api::downloads_fragment))
        .route("/api/filename/random", get(api::random_filename))
        .route("/api/files/{id}", get(api::save_file))
        .route("/api/files/{id}", delete(api::delete_file))
        .route("/api/files/{id}/rename", post(api::rename_file))
        .route("/api/stream/{id}", get(api::stream_file))
        .route("/api/theme", post(api::set_theme))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
