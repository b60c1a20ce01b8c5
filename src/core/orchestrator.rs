//! Download orchestrator
//!
//! Two-phase request flow against the ytmp4 backend: `analyze` resolves a URL
//! into a [`VideoReference`] plus display metadata, `download` turns the stored
//! reference into a download link. Every failure is reported through the
//! [`StatusPresenter`] and returned to the caller; none of them escape as panics.
//!
//! Overlapping calls are not serialized. The reference slot is last-write-wins
//! and its lock is never held across a request.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::backend::Backend;
use crate::core::error_handling::{
    download_fallback_message, ClientError, ClientResult, ANALYZE_FALLBACK_MESSAGE,
};
use crate::core::models::{
    AnalyzeRequest, ApiResponse, DownloadKind, DownloadRequest, DownloadResult, DownloadTrigger,
    VideoMetadata, VideoReference,
};
use crate::core::notifications::{Severity, StatusPresenter};
use crate::utils::validation::validate_youtube_url;

/// Lifecycle of the stored reference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionPhase {
    /// No analyze call has succeeded yet
    Empty,
    Analyzed,
    /// At least one download call is in flight
    Downloading,
}

/// Snapshot of the triggering controls, `true` meaning disabled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ControlState {
    pub analyze_busy: bool,
    pub video_busy: bool,
    pub audio_busy: bool,
    pub progress_visible: bool,
}

impl ControlState {
    pub fn is_idle(&self) -> bool {
        *self == ControlState::default()
    }
}

#[derive(Debug, Clone, Copy)]
enum Control {
    Analyze,
    Download(DownloadKind),
}

#[derive(Debug, Default)]
struct InFlight {
    analyze: usize,
    video: usize,
    audio: usize,
}

impl InFlight {
    fn slot(&mut self, control: Control) -> &mut usize {
        match control {
            Control::Analyze => &mut self.analyze,
            Control::Download(DownloadKind::Video) => &mut self.video,
            Control::Download(DownloadKind::Audio) => &mut self.audio,
        }
    }
}

/// Client-side session: the single reference slot plus what is on screen
#[derive(Debug, Default)]
pub struct Session {
    reference: RwLock<Option<VideoReference>>,
    metadata: RwLock<Option<VideoMetadata>>,
    in_flight: Mutex<InFlight>,
    last_trigger: Mutex<Option<DownloadTrigger>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference(&self) -> Option<VideoReference> {
        self.reference.read().clone()
    }

    /// Metadata card contents, `None` while hidden
    pub fn metadata(&self) -> Option<VideoMetadata> {
        self.metadata.read().clone()
    }

    pub fn last_trigger(&self) -> Option<DownloadTrigger> {
        self.last_trigger.lock().clone()
    }

    pub fn controls(&self) -> ControlState {
        let in_flight = self.in_flight.lock();
        ControlState {
            analyze_busy: in_flight.analyze > 0,
            video_busy: in_flight.video > 0,
            audio_busy: in_flight.audio > 0,
            progress_visible: in_flight.video + in_flight.audio > 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.reference.read().is_none() {
            return SessionPhase::Empty;
        }
        let controls = self.controls();
        if controls.video_busy || controls.audio_busy {
            SessionPhase::Downloading
        } else {
            SessionPhase::Analyzed
        }
    }

    fn store_reference(&self, reference: VideoReference) {
        *self.reference.write() = Some(reference);
    }

    fn show_metadata(&self, metadata: Option<VideoMetadata>) {
        *self.metadata.write() = metadata;
    }

    fn busy(&self, control: Control) -> BusyGuard<'_> {
        *self.in_flight.lock().slot(control) += 1;
        BusyGuard {
            session: self,
            control,
        }
    }
}

/// Re-enables its control when dropped, whatever path the call took
struct BusyGuard<'a> {
    session: &'a Session,
    control: Control,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.session.in_flight.lock();
        let slot = in_flight.slot(self.control);
        *slot = slot.saturating_sub(1);
    }
}

/// Result of a successful download command
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub trigger: DownloadTrigger,
    pub result: DownloadResult,
    pub status_line: String,
    pub elapsed_ms: u128,
}

/// Result of a successful legacy one-shot fetch
#[derive(Debug, Clone, PartialEq)]
pub struct QuickFetchOutcome {
    pub trigger: DownloadTrigger,
    pub metadata: VideoMetadata,
    pub quality: Option<String>,
    pub status_line: String,
}

/// Compose `"{icon} {descriptor} from {source} ({ms}ms)"`
pub fn compose_status_line(result: &DownloadResult, elapsed_ms: u128) -> String {
    let source = result.cache_source();
    format!(
        "{} {} from {} ({}ms)",
        source.icon(),
        result.descriptor(),
        source.label(),
        elapsed_ms
    )
}

pub struct DownloadOrchestrator {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
    presenter: Arc<StatusPresenter>,
}

impl DownloadOrchestrator {
    pub fn new(backend: Arc<dyn Backend>, presenter: Arc<StatusPresenter>) -> Self {
        Self {
            backend,
            session: Arc::new(Session::new()),
            presenter,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn presenter(&self) -> &Arc<StatusPresenter> {
        &self.presenter
    }

    /// Validate `input`, resolve it through the backend and store the reference
    pub async fn analyze(&self, input: &str) -> ClientResult<VideoMetadata> {
        let result = self.analyze_inner(input).await;
        if let Err(err) = &result {
            self.report("Analysis", err);
        }
        result
    }

    async fn analyze_inner(&self, input: &str) -> ClientResult<VideoMetadata> {
        let url = validate_youtube_url(input)?;

        let _busy = self.session.busy(Control::Analyze);
        self.session.show_metadata(None);

        let started = Instant::now();
        let response = self
            .backend
            .video_info(&AnalyzeRequest { url: url.clone() })
            .await?;
        let elapsed_ms = started.elapsed().as_millis();

        match response {
            ApiResponse::Success(success) => {
                info!(
                    "Analyzed {} as video {} in {}ms",
                    url, success.reference.video_id, elapsed_ms
                );
                self.session.store_reference(success.reference);
                self.session.show_metadata(Some(success.metadata.clone()));
                self.presenter.show(
                    format!("Video analyzed in {}ms", elapsed_ms),
                    Severity::Success,
                );
                Ok(success.metadata)
            }
            ApiResponse::Failure { message } => {
                Err(ClientError::rejected(message, ANALYZE_FALLBACK_MESSAGE))
            }
        }
    }

    /// Request a download link of `kind` for the stored reference
    pub async fn download(&self, kind: DownloadKind) -> ClientResult<DownloadOutcome> {
        let result = self.download_inner(kind).await;
        if let Err(err) = &result {
            self.report("Download", err);
        }
        result
    }

    async fn download_inner(&self, kind: DownloadKind) -> ClientResult<DownloadOutcome> {
        // read and release before the request goes out
        let reference = self
            .session
            .reference()
            .filter(|reference| !reference.key.is_empty())
            .ok_or(ClientError::NotAnalyzed)?;

        let _busy = self.session.busy(Control::Download(kind));
        let request = DownloadRequest::new(&reference, kind);
        debug!("Requesting {} for video {}", kind, reference.video_id);

        let started = Instant::now();
        let response = self.backend.download(&request).await?;
        let elapsed_ms = started.elapsed().as_millis();

        match response {
            ApiResponse::Success(result) => {
                let trigger = DownloadTrigger::detached(result.download_url.clone());
                let status_line = compose_status_line(&result, elapsed_ms);
                info!("{} link ready for {}: {}", kind, reference.video_id, status_line);

                *self.session.last_trigger.lock() = Some(trigger.clone());
                self.presenter.show(status_line.clone(), Severity::Success);

                Ok(DownloadOutcome {
                    trigger,
                    result,
                    status_line,
                    elapsed_ms,
                })
            }
            ApiResponse::Failure { message } => Err(ClientError::rejected(
                message,
                download_fallback_message(kind),
            )),
        }
    }

    /// One-shot metadata plus best-quality link through the legacy endpoint.
    /// Leaves the stored reference untouched.
    pub async fn quick_fetch(&self, input: &str) -> ClientResult<QuickFetchOutcome> {
        let result = self.quick_fetch_inner(input).await;
        if let Err(err) = &result {
            self.report("Quick fetch", err);
        }
        result
    }

    async fn quick_fetch_inner(&self, input: &str) -> ClientResult<QuickFetchOutcome> {
        let url = validate_youtube_url(input)?;

        let _busy = self.session.busy(Control::Analyze);
        self.session.show_metadata(None);

        let started = Instant::now();
        let response = self.backend.quick_fetch(&url).await?;
        let elapsed_ms = started.elapsed().as_millis();

        match response {
            ApiResponse::Success(success) => {
                let trigger = DownloadTrigger::detached(success.download_url.clone());
                let status_line = match success.quality.as_deref() {
                    Some(quality) if !quality.is_empty() => {
                        format!("{}p HD video ready ({}ms)", quality, elapsed_ms)
                    }
                    _ => format!("HD video ready ({}ms)", elapsed_ms),
                };

                self.session.show_metadata(Some(success.metadata.clone()));
                *self.session.last_trigger.lock() = Some(trigger.clone());
                self.presenter.show(status_line.clone(), Severity::Success);

                Ok(QuickFetchOutcome {
                    trigger,
                    metadata: success.metadata,
                    quality: success.quality,
                    status_line,
                })
            }
            ApiResponse::Failure { message } => {
                Err(ClientError::rejected(message, ANALYZE_FALLBACK_MESSAGE))
            }
        }
    }

    fn report(&self, operation: &str, err: &ClientError) {
        err.log(operation);
        if let Some(severity) = err.category().severity() {
            self.presenter.show(err.user_message(), severity);
        }
    }
}
