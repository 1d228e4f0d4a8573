//! The worker seam: operations the coordinator needs from the remote side.

use crate::error::{AbortError, UploadError};
use async_trait::async_trait;
use ferry_core::chunk::Chunk;
use ferry_core::session::{CompletionManifest, PartRef, PartResult, UploadSession};

/// The four lifecycle operations of the remote upload worker.
///
/// Create, complete, and abort require action-scoped backend tokens; part
/// uploads use the session's client token. Implemented over HTTP by
/// [`crate::HttpWorkerClient`] and by in-memory mocks in tests.
#[async_trait]
pub trait UploadWorker: Send + Sync {
    /// Open an upload session for `resource_id`.
    async fn create(
        &self,
        resource_id: &str,
        file_size: u64,
        mime_type: &str,
        token: &str,
    ) -> Result<UploadSession, UploadError>;

    /// Upload one part. The chunk's `is_last` flag must be signaled to the
    /// worker only on the final part. A part either fully succeeds with an
    /// etag or the whole upload fails; there is no partial success.
    async fn put_part(&self, chunk: &Chunk, client_token: &str)
    -> Result<PartResult, UploadError>;

    /// Finalize the upload. `parts` must be ascending by part number with
    /// etags exactly as returned by `put_part`.
    async fn complete(
        &self,
        upload_id: &str,
        resource_id: &str,
        parts: &[PartRef],
        token: &str,
    ) -> Result<CompletionManifest, UploadError>;

    /// Release worker-side resources for an abandoned session. Best-effort:
    /// callers log failures and move on.
    async fn abort(
        &self,
        upload_id: &str,
        resource_id: &str,
        token: &str,
    ) -> Result<(), AbortError>;
}

#[async_trait]
impl<W: UploadWorker + ?Sized> UploadWorker for std::sync::Arc<W> {
    async fn create(
        &self,
        resource_id: &str,
        file_size: u64,
        mime_type: &str,
        token: &str,
    ) -> Result<UploadSession, UploadError> {
        (**self).create(resource_id, file_size, mime_type, token).await
    }

    async fn put_part(
        &self,
        chunk: &Chunk,
        client_token: &str,
    ) -> Result<PartResult, UploadError> {
        (**self).put_part(chunk, client_token).await
    }

    async fn complete(
        &self,
        upload_id: &str,
        resource_id: &str,
        parts: &[PartRef],
        token: &str,
    ) -> Result<CompletionManifest, UploadError> {
        (**self).complete(upload_id, resource_id, parts, token).await
    }

    async fn abort(
        &self,
        upload_id: &str,
        resource_id: &str,
        token: &str,
    ) -> Result<(), AbortError> {
        (**self).abort(upload_id, resource_id, token).await
    }
}
