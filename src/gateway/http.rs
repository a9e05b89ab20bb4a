//! HTTP implementation of the request gateway

use super::{
    Answer, DocumentReceipt, GatewayError, HealthStatus, RequestGateway, VideoReceipt,
    NO_RESPONSE_FALLBACK,
};
use crate::source::DocumentFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway talking to the answering service over HTTP
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (e.g. `http://localhost:5000`).
    ///
    /// `timeout` bounds every round trip; an expired call is reported as
    /// unreachable so the session never stays busy forever.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::unreachable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and read the whole body
    async fn send(request: RequestBuilder) -> Result<(StatusCode, String), GatewayError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::unreachable(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                GatewayError::unreachable(format!("Connection failed: {e}"))
            } else {
                GatewayError::unreachable(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::unreachable(format!("Failed to read response: {e}")))?;

        Ok((status, body))
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| {
        GatewayError::unreachable(format!("Failed to parse response: {e} - body: {body}"))
    })
}

/// Rejection carrying the server's `error` field when it sent one
fn classify_rejection(status: StatusCode, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) if !message.is_empty() => {
            GatewayError::rejected(message)
        }
        _ => GatewayError::rejected(format!("HTTP {status}")),
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn submit_document(&self, file: &DocumentFile) -> Result<DocumentReceipt, GatewayError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| GatewayError::unreachable(format!("Invalid media type: {e}")))?;
        let form = Form::new().part("file", part);

        let (status, body) = Self::send(self.client.post(self.url("/upload")).multipart(form)).await?;
        if !status.is_success() {
            return Err(classify_rejection(status, &body));
        }

        let ack: UploadResponse = parse_body(&body)?;
        if let Some(message) = ack.message {
            tracing::debug!(%message, "Upload acknowledged");
        }

        Ok(DocumentReceipt {
            name: file.name.clone(),
            size_bytes: file.size_bytes(),
        })
    }

    async fn submit_video(&self, url: &str) -> Result<VideoReceipt, GatewayError> {
        let request = self
            .client
            .post(self.url("/add-youtube"))
            .json(&VideoRequest { url });

        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            return Err(classify_rejection(status, &body));
        }

        let loaded: VideoResponse = parse_body(&body)?;
        tracing::debug!(
            video_id = %loaded.video_id,
            message = loaded.message.as_deref().unwrap_or_default(),
            duration_seconds = loaded.duration_seconds,
            "Transcript loaded"
        );

        Ok(VideoReceipt {
            video_id: loaded.video_id,
        })
    }

    async fn ask(&self, question: &str) -> Result<Answer, GatewayError> {
        let request = self
            .client
            .post(self.url("/chat"))
            .json(&ChatRequest { query: question });

        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            return Err(classify_rejection(status, &body));
        }

        let reply: ChatResponse = parse_body(&body)?;
        let text = reply
            .answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());

        Ok(Answer { text })
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let (status, body) = Self::send(self.client.get(self.url("/health"))).await?;
        if !status.is_success() {
            return Err(classify_rejection(status, &body));
        }
        parse_body(&body)
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct VideoRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    video_id: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}
