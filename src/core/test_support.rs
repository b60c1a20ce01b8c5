//! In-memory backend for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::core::backend::Backend;
use crate::core::models::{
    AnalyzeEnvelope, AnalyzeRequest, AnalyzeSuccess, ApiResponse, CacheStats, DownloadEnvelope,
    DownloadKind, DownloadRequest, DownloadResult, QuickFetchEnvelope, QuickFetchSuccess,
    TransportError,
};

type Reply<T> = Result<T, TransportError>;

/// Replays scripted responses in order and records every request.
/// An exhausted script answers with a transport error.
#[derive(Default)]
pub struct MockBackend {
    analyze_replies: Mutex<VecDeque<Reply<ApiResponse<AnalyzeSuccess>>>>,
    download_replies: Mutex<VecDeque<Reply<ApiResponse<DownloadResult>>>>,
    stats_replies: Mutex<VecDeque<Reply<CacheStats>>>,
    quick_replies: Mutex<VecDeque<Reply<ApiResponse<QuickFetchSuccess>>>>,

    pub analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    pub download_requests: Mutex<Vec<DownloadRequest>>,
    pub quick_requests: Mutex<Vec<String>>,
    pub stats_calls: Mutex<usize>,

    /// When set, download calls wait for a notification before answering
    pub download_gate: Option<Arc<Notify>>,
    /// Same for cache-stats calls
    pub stats_gate: Option<Arc<Notify>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download_gate(gate: Arc<Notify>) -> Self {
        Self {
            download_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn with_stats_gate(gate: Arc<Notify>) -> Self {
        Self {
            stats_gate: Some(gate),
            ..Self::default()
        }
    }

    /// Queue an analyze reply from raw JSON, decoded like the HTTP backend does
    pub fn push_analyze_json(&self, body: serde_json::Value) {
        let reply = serde_json::from_value::<AnalyzeEnvelope>(body)
            .map_err(|e| TransportError::Malformed(e.to_string()))
            .and_then(AnalyzeEnvelope::into_response);
        self.analyze_replies.lock().push_back(reply);
    }

    pub fn push_download_json(&self, body: serde_json::Value, kind: DownloadKind) {
        let reply = serde_json::from_value::<DownloadEnvelope>(body)
            .map_err(|e| TransportError::Malformed(e.to_string()))
            .and_then(|envelope| envelope.into_response(kind));
        self.download_replies.lock().push_back(reply);
    }

    pub fn push_stats_json(&self, body: serde_json::Value) {
        let reply = serde_json::from_value::<CacheStats>(body)
            .map_err(|e| TransportError::Malformed(e.to_string()));
        self.stats_replies.lock().push_back(reply);
    }

    pub fn push_quick_json(&self, body: serde_json::Value) {
        let reply = serde_json::from_value::<QuickFetchEnvelope>(body)
            .map_err(|e| TransportError::Malformed(e.to_string()))
            .and_then(QuickFetchEnvelope::into_response);
        self.quick_replies.lock().push_back(reply);
    }

    pub fn fail_analyze(&self, reason: &str) {
        self.analyze_replies
            .lock()
            .push_back(Err(TransportError::Unreachable(reason.to_string())));
    }

    pub fn fail_download(&self, reason: &str) {
        self.download_replies
            .lock()
            .push_back(Err(TransportError::Unreachable(reason.to_string())));
    }

    pub fn fail_stats(&self, reason: &str) {
        self.stats_replies
            .lock()
            .push_back(Err(TransportError::Unreachable(reason.to_string())));
    }

    /// Total requests issued to any endpoint
    pub fn total_calls(&self) -> usize {
        self.analyze_requests.lock().len()
            + self.download_requests.lock().len()
            + self.quick_requests.lock().len()
            + *self.stats_calls.lock()
    }

    fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> Reply<T> {
        queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unreachable("no scripted reply".into())))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn video_info(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalyzeSuccess>, TransportError> {
        self.analyze_requests.lock().push(request.clone());
        Self::next(&self.analyze_replies)
    }

    async fn download(
        &self,
        request: &DownloadRequest,
    ) -> Result<ApiResponse<DownloadResult>, TransportError> {
        self.download_requests.lock().push(request.clone());
        if let Some(gate) = &self.download_gate {
            gate.notified().await;
        }
        Self::next(&self.download_replies)
    }

    async fn cache_stats(&self) -> Result<CacheStats, TransportError> {
        *self.stats_calls.lock() += 1;
        if let Some(gate) = &self.stats_gate {
            gate.notified().await;
        }
        Self::next(&self.stats_replies)
    }

    async fn quick_fetch(
        &self,
        url: &str,
    ) -> Result<ApiResponse<QuickFetchSuccess>, TransportError> {
        self.quick_requests.lock().push(url.to_string());
        Self::next(&self.quick_replies)
    }
}

/// Formatted log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Lines logged at `level`, e.g. `"ERROR"`
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().any(|word| word == level))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's events into a buffer until the guard drops.
/// Use from current-thread runtimes only.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
