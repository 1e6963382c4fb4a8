use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fetchd_api::{DownloadStatus, FetchdClient};
use tokio::sync::{Mutex, broadcast, oneshot, watch};
use tokio::time::MissedTickBehavior;

use crate::state::Library;

/// The engine runs at most one download at a time, so the session is a
/// single slot: start a job, poll its status at a fixed cadence until
/// the engine reports a terminal state, then refresh the library once.
pub struct DownloadSession {
    client: FetchdClient,
    library: Arc<Library>,
    cadence: Duration,
    status_tx: watch::Sender<DownloadStatus>,
    events_tx: broadcast::Sender<SessionEvent>,
    poll: Mutex<Option<PollHandle>>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Completed
}

#[derive(Debug)]
pub enum StartError {
    /// A download is already running. Detected from the last known
    /// status before any request is made.
    AlreadyDownloading,
    Backend(fetchd_api::Error)
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::AlreadyDownloading => write!(f, "Another download is in progress"),
            StartError::Backend(err) => write!(f, "{err}")
        }
    }
}

impl std::error::Error for StartError {}

struct PollHandle {
    cancel: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>
}

impl DownloadSession {
    pub fn new(client: FetchdClient, library: Arc<Library>, cadence: Duration) -> Self {
        let (status_tx, _) = watch::channel(DownloadStatus::default());
        let (events_tx, _) = broadcast::channel(16);

        Self {
            client,
            library,
            cadence,
            status_tx,
            events_tx,
            poll: Mutex::new(None)
        }
    }

    /// Asks the engine to start a download and begins polling. The poll
    /// loop fetches status immediately, then once per cadence tick,
    /// until the terminal condition or [`stop`](Self::stop).
    pub async fn start(
        &self,
        url: &str,
        filename: &str,
        format_id: Option<&str>
    ) -> Result<(), StartError> {
        let mut poll = self.poll.lock().await;

        let polling = poll.as_ref().is_some_and(|handle| !handle.task.is_finished());
        if polling || self.status_tx.borrow().is_downloading {
            return Err(StartError::AlreadyDownloading);
        }

        self.client
            .start_download(url, filename, format_id)
            .await
            .map_err(StartError::Backend)?;

        tracing::info!(url = %url, filename = %filename, "download started, polling status");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(
            self.client.clone(),
            Arc::clone(&self.library),
            self.cadence,
            self.status_tx.clone(),
            self.events_tx.clone(),
            cancel_rx
        ));
        *poll = Some(PollHandle {
            cancel: cancel_tx,
            task
        });

        Ok(())
    }

    /// Cancels the poll loop and waits for it to exit. A no-op when no
    /// loop is running, so callers can stop unconditionally.
    pub async fn stop(&self) {
        let handle = self.poll.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.cancel.send(());
            if handle.task.await.is_err() {
                tracing::warn!("poll task panicked before stop");
            }
            tracing::debug!("polling session stopped");
        }
    }

    /// Last status observed from the engine.
    pub fn status(&self) -> DownloadStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<DownloadStatus> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }
}

async fn poll_loop(
    client: FetchdClient,
    library: Arc<Library>,
    cadence: Duration,
    status_tx: watch::Sender<DownloadStatus>,
    events_tx: broadcast::Sender<SessionEvent>,
    mut cancel_rx: oneshot::Receiver<()>
) {
    // First tick fires immediately, giving the one-shot fetch right
    // after start before settling into the fixed cadence.
    let mut ticker = tokio::time::interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!("poll loop cancelled");
                return;
            }
            _ = ticker.tick() => {
                let status = match client.download_status().await {
                    Ok(status) => status,
                    Err(err) => {
                        // Transient failures never stop the loop.
                        tracing::warn!("status poll failed: {err}");
                        continue;
                    }
                };

                let terminal = status.is_terminal();
                let _ = status_tx.send(status);

                if terminal {
                    tracing::info!("download finished, refreshing library");
                    if let Err(err) = library.refresh().await {
                        tracing::warn!("library refresh after completion failed: {err}");
                    }
                    let _ = events_tx.send(SessionEvent::Completed);
                    return;
                }
            }
        }
    }
}
