//! HTTP implementation of the upload worker protocol.

use crate::error::{AbortError, UploadError};
use crate::worker::UploadWorker;
use async_trait::async_trait;
use ferry_core::chunk::Chunk;
use ferry_core::session::{CompletionManifest, PartRef, PartResult, UploadSession};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_RETRIES: u32 = 3;

/// Retries an HTTP request with exponential backoff on transient failures.
///
/// Retries on transport errors and 5xx responses. Returns immediately on
/// success or 4xx (client errors that won't resolve with retries).
async fn retry_request<F, Fut>(mut make_request: F) -> reqwest::Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = reqwest::Result<reqwest::Response>>,
{
    let mut attempt = 0;

    loop {
        match make_request().await {
            Ok(response) if response.status().is_server_error() => {
                attempt += 1;
                if attempt > MAX_RETRIES {
                    return Ok(response);
                }
                let delay = Duration::from_secs(1 << (attempt - 1)); // 1s, 2s, 4s
                tracing::warn!(
                    status = %response.status(),
                    delay_secs = delay.as_secs(),
                    "server error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Ok(response) => return Ok(response),
            Err(e) => {
                attempt += 1;
                if attempt > MAX_RETRIES {
                    return Err(e);
                }
                let delay = Duration::from_secs(1 << (attempt - 1));
                tracing::warn!(error = %e, delay_secs = delay.as_secs(), "request error, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Reqwest-backed client for the remote upload worker.
#[derive(Clone)]
pub struct HttpWorkerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpWorkerClient {
    /// Create a client for the worker at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UploadError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ferry_core::Error::InvalidConfig(format!("invalid worker URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ferry_core::Error::InvalidConfig(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { http, base_url })
    }

    fn url(&self, call: &'static str, path: &str) -> Result<Url, UploadError> {
        self.base_url
            .join(path)
            .map_err(|e| UploadError::Transport {
                call,
                message: format!("failed to build URL: {e}"),
            })
    }

    /// Send with retry, then enforce a 2xx status. Non-2xx becomes a
    /// transport error carrying the status and body.
    async fn send_checked<F, Fut>(
        &self,
        call: &'static str,
        make_request: F,
    ) -> Result<reqwest::Response, UploadError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = reqwest::Result<reqwest::Response>>,
    {
        let response = retry_request(make_request)
            .await
            .map_err(|e| UploadError::Transport {
                call,
                message: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Transport {
                call,
                message: format!("{status}: {body}"),
            });
        }
        Ok(response)
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        call: &'static str,
        response: reqwest::Response,
    ) -> Result<T, UploadError> {
        response.json::<T>().await.map_err(|e| UploadError::Transport {
            call,
            message: format!("invalid response body: {e}"),
        })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
    id: &'a str,
    file_size: u64,
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateWire {
    success: bool,
    upload_id: Option<String>,
    client_token: Option<String>,
    total_parts: Option<u32>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartWire {
    success: bool,
    part_number: Option<u32>,
    etag: Option<String>,
    uploaded_bytes: Option<u64>,
    total_bytes: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteBody<'a> {
    upload_id: &'a str,
    parts: &'a [PartRef],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteWire {
    success: bool,
    etag: Option<String>,
    size: Option<u64>,
    error: Option<String>,
}

fn rejection_message(error: Option<String>) -> String {
    error.unwrap_or_else(|| "unknown error".to_string())
}

fn require<T>(
    value: Option<T>,
    call: &'static str,
    field: &'static str,
) -> Result<T, UploadError> {
    value.ok_or(UploadError::MissingField { call, field })
}

#[async_trait]
impl UploadWorker for HttpWorkerClient {
    async fn create(
        &self,
        resource_id: &str,
        file_size: u64,
        mime_type: &str,
        token: &str,
    ) -> Result<UploadSession, UploadError> {
        let url = self.url("create", "/upload/create")?;
        let body = CreateBody {
            id: resource_id,
            file_size,
            mime_type,
        };

        let response = self
            .send_checked("create", || {
                self.http
                    .post(url.clone())
                    .bearer_auth(token)
                    .json(&body)
                    .send()
            })
            .await?;
        let wire: CreateWire = Self::parse_json("create", response).await?;

        if !wire.success {
            return Err(UploadError::CreateRejected {
                message: rejection_message(wire.error),
            });
        }

        Ok(UploadSession {
            resource_id: resource_id.to_string(),
            upload_id: require(wire.upload_id, "create", "uploadId")?,
            client_token: require(wire.client_token, "create", "clientToken")?,
            total_parts: require(wire.total_parts, "create", "totalParts")?,
            file_size,
            mime_type: mime_type.to_string(),
        })
    }

    async fn put_part(
        &self,
        chunk: &Chunk,
        client_token: &str,
    ) -> Result<PartResult, UploadError> {
        let mut url = self.url("put part", &format!("/upload/part/{}", chunk.part_number))?;
        if chunk.is_last {
            url.query_pairs_mut().append_pair("isLast", "true");
        }

        let response = self
            .send_checked("put part", || {
                self.http
                    .put(url.clone())
                    .bearer_auth(client_token)
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(chunk.bytes.clone())
                    .send()
            })
            .await?;
        let wire: PartWire = Self::parse_json("put part", response).await?;

        if !wire.success {
            return Err(UploadError::PartRejected {
                part_number: chunk.part_number,
                message: rejection_message(wire.error),
            });
        }

        let part_number = require(wire.part_number, "put part", "partNumber")?;
        if part_number != chunk.part_number {
            return Err(UploadError::PartNumberMismatch {
                expected: chunk.part_number,
                actual: part_number,
            });
        }

        Ok(PartResult {
            part_number,
            etag: require(wire.etag, "put part", "etag")?,
            uploaded_bytes: require(wire.uploaded_bytes, "put part", "uploadedBytes")?,
            total_bytes: require(wire.total_bytes, "put part", "totalBytes")?,
        })
    }

    async fn complete(
        &self,
        upload_id: &str,
        resource_id: &str,
        parts: &[PartRef],
        token: &str,
    ) -> Result<CompletionManifest, UploadError> {
        let mut url = self.url("complete", "/upload/complete")?;
        url.query_pairs_mut().append_pair("fileId", resource_id);
        let body = CompleteBody { upload_id, parts };

        let response = self
            .send_checked("complete", || {
                self.http
                    .post(url.clone())
                    .bearer_auth(token)
                    .json(&body)
                    .send()
            })
            .await?;
        let wire: CompleteWire = Self::parse_json("complete", response).await?;

        if !wire.success {
            return Err(UploadError::CompletionRejected {
                message: rejection_message(wire.error),
            });
        }

        Ok(CompletionManifest::new(
            parts.to_vec(),
            require(wire.etag, "complete", "etag")?,
            require(wire.size, "complete", "size")?,
        )?)
    }

    async fn abort(
        &self,
        upload_id: &str,
        resource_id: &str,
        token: &str,
    ) -> Result<(), AbortError> {
        let mut url = self
            .url("abort", &format!("/upload/abort/{upload_id}"))
            .map_err(|e| AbortError::Transport(e.to_string()))?;
        url.query_pairs_mut().append_pair("fileId", resource_id);

        let response = retry_request(|| self.http.delete(url.clone()).bearer_auth(token).send())
            .await
            .map_err(|e| AbortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AbortError::Refused(format!("{status}: {body}")));
        }
        Ok(())
    }
}
