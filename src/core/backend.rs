//! Backend seam
//!
//! The orchestrator talks to the ytmp4 service only through [`Backend`]. The
//! HTTP implementation decodes every body as a JSON envelope regardless of the
//! HTTP status, since the service reports `status: false` with 400/500 codes.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::core::config::BackendConfig;
use crate::core::models::{
    AnalyzeEnvelope, AnalyzeRequest, AnalyzeSuccess, ApiResponse, CacheStats, DownloadEnvelope,
    DownloadRequest, DownloadResult, QuickFetchEnvelope, QuickFetchSuccess, TransportError,
};

#[async_trait]
pub trait Backend: Send + Sync {
    /// POST video-info
    async fn video_info(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalyzeSuccess>, TransportError>;

    /// POST download
    async fn download(
        &self,
        request: &DownloadRequest,
    ) -> Result<ApiResponse<DownloadResult>, TransportError>;

    /// GET cache-stats
    async fn cache_stats(&self) -> Result<CacheStats, TransportError>;

    /// GET legacy one-shot endpoint
    async fn quick_fetch(
        &self,
        url: &str,
    ) -> Result<ApiResponse<QuickFetchSuccess>, TransportError>;
}

/// reqwest-backed implementation
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    video_info_url: Url,
    download_url: Url,
    cache_stats_url: Url,
    quick_fetch_url: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid backend base URL {}: {}", config.base_url, e))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| anyhow::anyhow!("Invalid endpoint path {}: {}", path, e))
        };

        Ok(Self {
            client,
            video_info_url: join(&config.video_info_path)?,
            download_url: join(&config.download_path)?,
            cache_stats_url: join(&config.cache_stats_path)?,
            quick_fetch_url: join(&config.quick_fetch_path)?,
        })
    }

    pub fn video_info_url(&self) -> &Url {
        &self.video_info_url
    }

    /// Refused or unresolvable connections are reported as unreachable
    async fn send(request: RequestBuilder) -> Result<Response, TransportError> {
        request.send().await.map_err(|err| {
            if err.is_connect() {
                TransportError::Unreachable(err.to_string())
            } else {
                TransportError::Network(err)
            }
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.bytes().await?;
        debug!("Backend answered {} ({} bytes)", status, body.len());
        serde_json::from_slice(&body)
            .map_err(|e| TransportError::Malformed(format!("HTTP {}: {}", status, e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn video_info(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<ApiResponse<AnalyzeSuccess>, TransportError> {
        let response =
            Self::send(self.client.post(self.video_info_url.clone()).json(request)).await?;
        let envelope: AnalyzeEnvelope = Self::decode(response).await?;
        envelope.into_response()
    }

    async fn download(
        &self,
        request: &DownloadRequest,
    ) -> Result<ApiResponse<DownloadResult>, TransportError> {
        let response =
            Self::send(self.client.post(self.download_url.clone()).json(request)).await?;
        let envelope: DownloadEnvelope = Self::decode(response).await?;
        envelope.into_response(request.kind)
    }

    async fn cache_stats(&self) -> Result<CacheStats, TransportError> {
        let response = Self::send(self.client.get(self.cache_stats_url.clone())).await?;
        Self::decode(response).await
    }

    async fn quick_fetch(
        &self,
        url: &str,
    ) -> Result<ApiResponse<QuickFetchSuccess>, TransportError> {
        let response =
            Self::send(self.client.get(self.quick_fetch_url.clone()).query(&[("url", url)]))
                .await?;
        let envelope: QuickFetchEnvelope = Self::decode(response).await?;
        envelope.into_response()
    }
}
