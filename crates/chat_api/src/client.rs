use std::future::Future;
use std::path::Path;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::events::ChatEvent;
use crate::headers::{build_headers, HeaderProfile};
use crate::payload::{CreateThreadRequest, CreateThreadResponse, SendMessageRequest, UploadResponse};
use crate::sse::EventStreamParser;
use crate::url::{endpoint_url, thread_messages_url, threads_url, upload_url};

/// Optional cancellation signal shared across request and stream loops.
pub type CancelSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

/// Bookkeeping for one completed message stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub events: usize,
    pub malformed_records: usize,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        endpoint_url(&config.base_url, &[])?;
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn build_headers(&self, profile: HeaderProfile) -> Result<HeaderMap, ChatApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config, profile) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ChatApiError::InvalidHeader(format!("value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_create_thread_request(&self) -> Result<RequestBuilder, ChatApiError> {
        let body = CreateThreadRequest {
            graph_id: self.config.graph_id.clone(),
        };
        Ok(self
            .http
            .post(threads_url(&self.config.base_url)?)
            .headers(self.build_headers(HeaderProfile::Json)?)
            .json(&body))
    }

    pub fn build_message_request(
        &self,
        thread_id: &str,
        message: &str,
    ) -> Result<RequestBuilder, ChatApiError> {
        let body = SendMessageRequest::streaming(thread_id, message);
        Ok(self
            .http
            .post(thread_messages_url(&self.config.base_url, thread_id)?)
            .headers(self.build_headers(HeaderProfile::EventStream)?)
            .json(&body))
    }

    /// Creates a backend thread and returns its id.
    pub async fn create_thread(
        &self,
        cancellation: Option<&CancelSignal>,
    ) -> Result<String, ChatApiError> {
        let request = self.build_create_thread_request()?;
        let response = await_or_cancel(request.send(), cancellation).await??;
        let response = ensure_success(response, cancellation).await?;
        let body = await_or_cancel(response.text(), cancellation).await??;

        let parsed: CreateThreadResponse = serde_json::from_str(&body)?;
        let thread_id = parsed
            .resolved_id()
            .ok_or(ChatApiError::MissingThreadId)?
            .to_string();
        debug!(%thread_id, "created backend thread");
        Ok(thread_id)
    }

    /// Posts a message and feeds every decoded event to `on_event` in arrival
    /// order. Malformed records are skipped.
    pub async fn stream_message<F>(
        &self,
        thread_id: &str,
        message: &str,
        cancellation: Option<&CancelSignal>,
        mut on_event: F,
    ) -> Result<StreamSummary, ChatApiError>
    where
        F: FnMut(ChatEvent),
    {
        let request = self.build_message_request(thread_id, message)?;
        let response = await_or_cancel(request.send(), cancellation).await??;
        let response = ensure_success(response, cancellation).await?;

        let mut bytes = response.bytes_stream();
        let mut parser = EventStreamParser::default();
        let mut summary = StreamSummary::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            let chunk = chunk?;
            for event in parser.feed(&chunk) {
                summary.events += 1;
                on_event(event);
            }
        }

        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        for event in parser.finish() {
            summary.events += 1;
            on_event(event);
        }
        summary.malformed_records = parser.malformed_records();

        info!(
            %thread_id,
            events = summary.events,
            malformed = summary.malformed_records,
            "message stream finished"
        );
        Ok(summary)
    }

    /// Uploads one local file and returns the URL the backend stored it under.
    pub async fn upload_file(
        &self,
        thread_id: &str,
        file_name: &str,
        mime_type: &str,
        path: &Path,
        cancellation: Option<&CancelSignal>,
    ) -> Result<String, ChatApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ChatApiError::UploadIo {
                path: path.to_path_buf(),
                source,
            })?;

        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if !mime_type.trim().is_empty() {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("thread_id", thread_id.to_string());

        let request = self
            .http
            .post(upload_url(&self.config.base_url)?)
            .headers(self.build_headers(HeaderProfile::Multipart)?)
            .multipart(form);
        let response = await_or_cancel(request.send(), cancellation).await??;
        let response = ensure_success(response, cancellation).await?;
        let body = await_or_cancel(response.text(), cancellation).await??;

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        parsed
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ChatApiError::MissingUploadUrl)
    }
}

async fn ensure_success(
    response: Response,
    cancellation: Option<&CancelSignal>,
) -> Result<Response, ChatApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = await_or_cancel(response.text(), cancellation)
        .await?
        .unwrap_or_default();
    Err(ChatApiError::Status(
        status,
        parse_error_message(status, &body),
    ))
}

fn is_cancelled(cancel: Option<&CancelSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancelSignal>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
