use async_trait::async_trait;
use ferry_client::error::{AbortError, UploadError};
use ferry_client::worker::UploadWorker;
use ferry_core::chunk::Chunk;
use ferry_core::session::{CompletionManifest, PartRef, PartResult, UploadSession};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Scripted failure for the mock worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    /// Every call succeeds.
    Nothing,
    /// Create reports success=false.
    Create,
    /// The given part is rejected by the worker.
    PartRejected(u32),
    /// The given part fails at the transport level.
    PartTransport(u32),
    /// Complete reports success=false.
    Complete,
    /// Complete succeeds but reports the wrong final size.
    CompleteWrongSize,
}

/// Record of one uploaded part.
#[derive(Clone, Debug)]
pub struct RecordedPart {
    pub part_number: u32,
    pub is_last: bool,
    pub len: u64,
    pub client_token: String,
}

/// In-memory worker that records every call for assertions.
pub struct MockWorker {
    chunk_size: u64,
    pub fail: FailOn,
    pub abort_fails: bool,

    file_size: AtomicU64,
    uploaded: AtomicU64,

    pub create_tokens: Mutex<Vec<String>>,
    pub parts: Mutex<Vec<RecordedPart>>,
    pub completes: Mutex<Vec<(String, Vec<PartRef>, String)>>,
    pub aborts: Mutex<Vec<(String, String, String)>>,
}

impl MockWorker {
    pub fn new(chunk_size: u64) -> Self {
        Self {
            chunk_size,
            fail: FailOn::Nothing,
            abort_fails: false,
            file_size: AtomicU64::new(0),
            uploaded: AtomicU64::new(0),
            create_tokens: Mutex::new(Vec::new()),
            parts: Mutex::new(Vec::new()),
            completes: Mutex::new(Vec::new()),
            aborts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(chunk_size: u64, fail: FailOn) -> Self {
        Self {
            fail,
            ..Self::new(chunk_size)
        }
    }

    pub fn part_count(&self) -> usize {
        self.parts.lock().unwrap().len()
    }

    pub fn complete_count(&self) -> usize {
        self.completes.lock().unwrap().len()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.lock().unwrap().len()
    }
}

#[async_trait]
impl UploadWorker for MockWorker {
    async fn create(
        &self,
        resource_id: &str,
        file_size: u64,
        mime_type: &str,
        token: &str,
    ) -> Result<UploadSession, UploadError> {
        self.create_tokens.lock().unwrap().push(token.to_string());

        if self.fail == FailOn::Create {
            return Err(UploadError::CreateRejected {
                message: "resource already exists".to_string(),
            });
        }

        self.file_size.store(file_size, Ordering::SeqCst);
        Ok(UploadSession {
            resource_id: resource_id.to_string(),
            upload_id: "mock-upload-1".to_string(),
            client_token: "mock-client-token".to_string(),
            total_parts: u32::try_from(file_size.div_ceil(self.chunk_size)).unwrap(),
            file_size,
            mime_type: mime_type.to_string(),
        })
    }

    async fn put_part(
        &self,
        chunk: &Chunk,
        client_token: &str,
    ) -> Result<PartResult, UploadError> {
        match self.fail {
            FailOn::PartRejected(n) if n == chunk.part_number => {
                return Err(UploadError::PartRejected {
                    part_number: n,
                    message: "checksum mismatch".to_string(),
                });
            }
            FailOn::PartTransport(n) if n == chunk.part_number => {
                return Err(UploadError::Transport {
                    call: "put part",
                    message: "502 Bad Gateway".to_string(),
                });
            }
            _ => {}
        }

        self.parts.lock().unwrap().push(RecordedPart {
            part_number: chunk.part_number,
            is_last: chunk.is_last,
            len: chunk.len(),
            client_token: client_token.to_string(),
        });

        let uploaded = self.uploaded.fetch_add(chunk.len(), Ordering::SeqCst) + chunk.len();
        Ok(PartResult {
            part_number: chunk.part_number,
            etag: format!("etag-{}", chunk.part_number),
            uploaded_bytes: uploaded,
            total_bytes: self.file_size.load(Ordering::SeqCst),
        })
    }

    async fn complete(
        &self,
        upload_id: &str,
        _resource_id: &str,
        parts: &[PartRef],
        token: &str,
    ) -> Result<CompletionManifest, UploadError> {
        self.completes.lock().unwrap().push((
            upload_id.to_string(),
            parts.to_vec(),
            token.to_string(),
        ));

        match self.fail {
            FailOn::Complete => Err(UploadError::CompletionRejected {
                message: "part inventory incomplete".to_string(),
            }),
            FailOn::CompleteWrongSize => Ok(CompletionManifest {
                parts: parts.to_vec(),
                etag: "final-etag".to_string(),
                size: self.file_size.load(Ordering::SeqCst) + 1,
            }),
            _ => Ok(CompletionManifest {
                parts: parts.to_vec(),
                etag: "final-etag".to_string(),
                size: self.file_size.load(Ordering::SeqCst),
            }),
        }
    }

    async fn abort(
        &self,
        upload_id: &str,
        resource_id: &str,
        token: &str,
    ) -> Result<(), AbortError> {
        self.aborts.lock().unwrap().push((
            upload_id.to_string(),
            resource_id.to_string(),
            token.to_string(),
        ));

        if self.abort_fails {
            return Err(AbortError::Refused("500: internal error".to_string()));
        }
        Ok(())
    }
}
