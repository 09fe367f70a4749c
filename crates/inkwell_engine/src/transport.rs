use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use inkwell_core::{FileRef, FileSource, TaskId};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::{EngineEvent, FailureKind, UploadError, UploadReceipt};

/// Connection settings for [`ReqwestTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Multipart upload endpoint of the image host.
    pub endpoint: String,
    /// Unsigned upload preset, sent as the `upload_preset` form field.
    pub upload_preset: Option<String>,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Body chunk size; progress is reported once per chunk.
    pub chunk_size: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/api/upload".to_string(),
            upload_preset: None,
            api_key: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 120_000,
            chunk_size: 64 * 1024,
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: Option<String>,
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// External collaborator that moves one file to the image host.
#[async_trait::async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(
        &self,
        task_id: TaskId,
        file: &FileRef,
        options: &UploadOptions,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadReceipt, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| UploadError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl UploadTransport for ReqwestTransport {
    async fn upload(
        &self,
        task_id: TaskId,
        file: &FileRef,
        options: &UploadOptions,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadReceipt, UploadError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| UploadError::new(FailureKind::InvalidEndpoint, err.to_string()))?;

        let data = read_file(file).await?;
        let total = data.len() as u64;
        let body = progress_body(task_id, data, self.settings.chunk_size, sink);

        let part = Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| UploadError::new(FailureKind::InvalidResponse, err.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(folder) = &options.folder {
            form = form.text("folder", folder.clone());
        }
        if let Some(preset) = &self.settings.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let mut request = self.client.post(endpoint).multipart(form);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let payload = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let message = error_message(&payload).unwrap_or_else(|| status.to_string());
            return Err(UploadError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        parse_receipt(&payload)
    }
}

async fn read_file(file: &FileRef) -> Result<Bytes, UploadError> {
    match &file.source {
        FileSource::Memory(bytes) => Ok(Bytes::copy_from_slice(bytes)),
        FileSource::Path(path) => tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|err| {
                UploadError::new(FailureKind::Io, format!("{}: {}", path.display(), err))
            }),
    }
}

/// Request body that reports percentage as reqwest pulls each chunk.
fn progress_body(
    task_id: TaskId,
    data: Bytes,
    chunk_size: usize,
    sink: Arc<dyn ProgressSink>,
) -> reqwest::Body {
    let total = data.len() as u64;
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect();
    let sent = Arc::new(AtomicU64::new(0));

    let stream = futures_util::stream::iter(chunks).map(move |chunk| {
        let done = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        sink.emit(EngineEvent::Progress {
            task_id,
            percent: percent_of(done, total),
        });
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}

pub(crate) fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    success: Option<bool>,
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
    error: Option<ErrorField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detail { message: String },
}

impl ErrorField {
    fn into_message(self) -> String {
        match self {
            ErrorField::Text(message) | ErrorField::Detail { message } => message,
        }
    }
}

pub(crate) fn parse_receipt(payload: &[u8]) -> Result<UploadReceipt, UploadError> {
    let body: ReceiptBody = serde_json::from_slice(payload)
        .map_err(|err| UploadError::new(FailureKind::InvalidResponse, err.to_string()))?;

    if body.success == Some(false) || body.error.is_some() {
        let message = body.error.map(ErrorField::into_message).unwrap_or_default();
        return Err(UploadError::new(FailureKind::Rejected, message));
    }

    let url = body
        .secure_url
        .or(body.url)
        .ok_or_else(|| UploadError::new(FailureKind::InvalidResponse, "response has no url"))?;
    let public_id = body.public_id.unwrap_or_else(|| url.clone());
    Ok(UploadReceipt { url, public_id })
}

fn error_message(payload: &[u8]) -> Option<String> {
    serde_json::from_slice::<ReceiptBody>(payload)
        .ok()
        .and_then(|body| body.error)
        .map(ErrorField::into_message)
        .filter(|message| !message.trim().is_empty())
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::new(FailureKind::Timeout, err.to_string());
    }
    UploadError::new(FailureKind::Network, err.to_string())
}
