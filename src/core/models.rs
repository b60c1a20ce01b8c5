//! Core data models and wire contract for the ytmp4 backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-issued handle binding a download call to an analyzed video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub struct VideoReference {
    pub key: String,

    pub video_id: String,
}

/// Display-only metadata returned by the analyze call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]

pub struct VideoMetadata {
    pub thumbnail: String,

    pub title: String,

    pub duration: String,
}

/// Content type requested from the download endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    Video,
    Audio,
}

impl DownloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadKind::Video => "video",
            DownloadKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for DownloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DownloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(DownloadKind::Video),
            "audio" => Ok(DownloadKind::Audio),
            other => Err(format!("Unknown download type: {}", other)),
        }
    }
}

/// Where the backend served a download from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheSource {
    /// Pre-existing Telegram cache entry
    Telegram,

    /// Fetched live from upstream
    Live,
}

impl CacheSource {
    /// Only the literal `telegram` tag counts as a cache hit.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("telegram") => CacheSource::Telegram,
            _ => CacheSource::Live,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CacheSource::Telegram => "⚡",
            CacheSource::Live => "🌐",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CacheSource::Telegram => "Telegram Cache",
            CacheSource::Live => "Live",
        }
    }
}

/// Successful download response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]

pub struct DownloadResult {
    pub download_url: String,

    pub kind: DownloadKind,

    pub quality: Option<String>,

    pub format: Option<String>,

    /// Raw tag as reported by the backend
    pub source: Option<String>,
}

impl DownloadResult {
    pub fn cache_source(&self) -> CacheSource {
        CacheSource::from_tag(self.source.as_deref())
    }

    /// Human-readable format descriptor, e.g. `720p HD video` or `128kbps HD audio`
    pub fn descriptor(&self) -> String {
        match self.kind {
            DownloadKind::Video => match self.quality.as_deref() {
                Some(quality) if !quality.is_empty() => format!("{}p HD video", quality),
                _ => "HD video".to_string(),
            },
            DownloadKind::Audio => match self.format.as_deref() {
                Some(format) if is_bitrate(format) => format!("{}kbps HD audio", format),
                Some(format) if !format.is_empty() => format!("{} HD audio", format),
                _ => "HD audio".to_string(),
            },
        }
    }
}

fn is_bitrate(format: &str) -> bool {
    !format.is_empty() && format.chars().all(|c| c.is_ascii_digit())
}

/// Browser-style download trigger handed to the binding layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]

pub struct DownloadTrigger {
    pub url: String,

    /// Opened detached from the current view (new tab / external opener)
    pub detached: bool,
}

impl DownloadTrigger {
    pub fn detached(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detached: true,
        }
    }
}

/// Read-only cache statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]

pub struct CacheStats {
    #[serde(default)]
    pub cache: Option<CacheCounters>,

    #[serde(default)]
    pub database: Option<DatabaseCounters>,

    #[serde(default)]
    pub total_cached_videos: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]

pub struct CacheCounters {
    #[serde(default)]
    pub hit_rate: Option<f64>,

    #[serde(default)]
    pub total_requests: Option<u64>,

    #[serde(default)]
    pub hits: Option<u64>,

    #[serde(default)]
    pub misses: Option<u64>,

    #[serde(default)]
    pub sets: Option<u64>,

    #[serde(default)]
    pub cache_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]

pub struct DatabaseCounters {
    #[serde(default)]
    pub total_videos: Option<u64>,

    #[serde(default)]
    pub videos_with_telegram_video: Option<u64>,

    #[serde(default)]
    pub videos_with_telegram_audio: Option<u64>,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        self.cache.as_ref().and_then(|c| c.hit_rate).unwrap_or(0.0)
    }

    pub fn total_requests(&self) -> u64 {
        self.cache.as_ref().and_then(|c| c.total_requests).unwrap_or(0)
    }

    pub fn total_cached(&self) -> u64 {
        self.total_cached_videos.unwrap_or(0)
    }
}

// ============================================================================
// Wire requests
// ============================================================================

/// Body of POST /api/video-info
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Body of POST /api/download
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub key: String,

    pub video_id: String,

    #[serde(rename = "type")]
    pub kind: DownloadKind,
}

impl DownloadRequest {
    pub fn new(reference: &VideoReference, kind: DownloadKind) -> Self {
        Self {
            key: reference.key.clone(),
            video_id: reference.video_id.clone(),
            kind,
        }
    }
}

// ============================================================================
// Wire responses
// ============================================================================

/// Decoded `status`-discriminated response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure { message: Option<String> },
}

/// Successful analyze payload
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeSuccess {
    pub reference: VideoReference,
    pub metadata: VideoMetadata,
}

/// Successful legacy one-shot payload
#[derive(Debug, Clone, PartialEq)]
pub struct QuickFetchSuccess {
    pub metadata: VideoMetadata,
    pub quality: Option<String>,
    pub download_url: String,
}

/// Raw response of POST /api/video-info
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeEnvelope {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "display_string")]
    pub duration: Option<String>,
}

impl AnalyzeEnvelope {
    pub fn into_response(self) -> Result<ApiResponse<AnalyzeSuccess>, TransportError> {
        if !self.status.unwrap_or(false) {
            return Ok(ApiResponse::Failure {
                message: self.message,
            });
        }

        // an empty key cannot address a later download
        let key = self
            .key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TransportError::Malformed("analyze response without key".into()))?;
        let video_id = self.video_id.ok_or_else(|| {
            TransportError::Malformed("analyze response without video_id".into())
        })?;

        Ok(ApiResponse::Success(AnalyzeSuccess {
            reference: VideoReference { key, video_id },
            metadata: VideoMetadata {
                thumbnail: self.thumbnail.unwrap_or_default(),
                title: self.title.unwrap_or_default(),
                duration: self.duration.unwrap_or_default(),
            },
        }))
    }
}

/// Raw response of POST /api/download
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadEnvelope {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "display_string")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "display_string")]
    pub format: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl DownloadEnvelope {
    /// `kind` is what was requested; the echoed `type` field is not trusted.
    pub fn into_response(
        self,
        kind: DownloadKind,
    ) -> Result<ApiResponse<DownloadResult>, TransportError> {
        if !self.status.unwrap_or(false) {
            return Ok(ApiResponse::Failure {
                message: self.message,
            });
        }

        let download_url = self.download_url.ok_or_else(|| {
            TransportError::Malformed("download response without download_url".into())
        })?;

        Ok(ApiResponse::Success(DownloadResult {
            download_url,
            kind,
            quality: self.quality,
            format: self.format,
            source: self.source,
        }))
    }
}

/// Raw response of GET /api/ytmp4
#[derive(Debug, Clone, Deserialize)]
pub struct QuickFetchEnvelope {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "display_string")]
    pub duration: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "display_string")]
    pub quality: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl QuickFetchEnvelope {
    pub fn into_response(self) -> Result<ApiResponse<QuickFetchSuccess>, TransportError> {
        if !self.status.unwrap_or(false) {
            return Ok(ApiResponse::Failure {
                message: self.message,
            });
        }

        let download_url = self.download_url.ok_or_else(|| {
            TransportError::Malformed("ytmp4 response without download_url".into())
        })?;

        Ok(ApiResponse::Success(QuickFetchSuccess {
            metadata: VideoMetadata {
                thumbnail: self.thumbnail.unwrap_or_default(),
                title: self.title.unwrap_or_default(),
                duration: self.duration.unwrap_or_default(),
            },
            quality: self.quality,
            download_url,
        }))
    }
}

/// Accepts a JSON string or number and keeps it as display text.
fn display_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Failures below the application protocol: the call never produced a usable envelope
#[derive(Debug, thiserror::Error)]

pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend unreachable: {0}")]
    Unreachable(String),
}
