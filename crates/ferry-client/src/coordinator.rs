//! The upload lifecycle coordinator.

use crate::error::UploadError;
use crate::reader::{self, ChunkStream};
use crate::worker::UploadWorker;
use ferry_core::chunk::ChunkPlan;
use ferry_core::session::{
    CompletionManifest, PartRef, PartResult, UploadSession, verify_part_coverage,
};
use ferry_core::token::TokenAction;
use ferry_signer::TokenIssuer;
use std::path::Path;
use std::time::{Duration, Instant};

/// Lifecycle phase of one upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadPhase {
    /// No session yet.
    Idle,
    /// Session created, no parts sent.
    Created,
    /// Parts are being sent in order.
    Uploading,
    /// Terminal success.
    Completed,
    /// Compensating abort in flight.
    Aborting,
    /// Terminal failure.
    Failed,
}

/// Events that advance the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadEvent {
    SessionCreated,
    CreateFailed,
    UploadStarted,
    PartUploaded,
    PartFailed,
    Completed,
    CompleteFailed,
    AbortFinished,
}

impl UploadPhase {
    /// Pure transition: the next phase for `event`, or an error for an edge
    /// the lifecycle does not have.
    pub fn transition(self, event: UploadEvent) -> Result<UploadPhase, UploadError> {
        use UploadEvent as E;
        use UploadPhase as P;

        match (self, event) {
            (P::Idle, E::SessionCreated) => Ok(P::Created),
            (P::Idle, E::CreateFailed) => Ok(P::Failed),
            (P::Created, E::UploadStarted) => Ok(P::Uploading),
            (P::Uploading, E::PartUploaded) => Ok(P::Uploading),
            (P::Uploading, E::PartFailed) => Ok(P::Aborting),
            (P::Created | P::Uploading, E::Completed) => Ok(P::Completed),
            (P::Created | P::Uploading, E::CompleteFailed) => Ok(P::Aborting),
            (P::Aborting, E::AbortFinished) => Ok(P::Failed),
            (phase, event) => Err(UploadError::Lifecycle(format!(
                "no transition from {phase:?} on {event:?}"
            ))),
        }
    }

    /// Whether the phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome of a successful upload.
#[derive(Debug)]
pub struct UploadReport {
    pub resource_id: String,
    pub manifest: CompletionManifest,
    pub file_size: u64,
    pub mime_type: String,
    pub elapsed: Duration,
}

impl UploadReport {
    /// Average throughput in bytes per second.
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.file_size as f64 / secs
    }
}

type ProgressFn = dyn Fn(&PartResult) + Send + Sync;

/// Drives one file through the full upload lifecycle against a worker.
///
/// Create → stream all parts in order → complete; or, on any failure after
/// the session exists, a single compensating abort before the original error
/// is re-raised. One coordinator invocation owns its session exclusively.
pub struct UploadCoordinator<W> {
    worker: W,
    issuer: TokenIssuer,
    chunk_size: u64,
    progress: Option<Box<ProgressFn>>,
}

impl<W: UploadWorker> UploadCoordinator<W> {
    /// Create a coordinator using the protocol's fixed chunk size.
    pub fn new(worker: W, issuer: TokenIssuer) -> Self {
        Self {
            worker,
            issuer,
            chunk_size: ferry_core::CHUNK_SIZE,
            progress: None,
        }
    }

    /// Override the chunk size. The worker must agree on the same value.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Install a per-part progress observer. Called after each acknowledged
    /// part with the worker's own counters; display only.
    pub fn on_progress(
        mut self,
        callback: impl Fn(&PartResult) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Upload `path` under the stable name `resource_id`.
    pub async fn upload(
        &self,
        path: &Path,
        resource_id: &str,
    ) -> Result<UploadReport, UploadError> {
        let started = Instant::now();
        let info = reader::probe(path).await?;
        let plan = ChunkPlan::new(info.size, self.chunk_size)?;
        let mut phase = UploadPhase::Idle;

        let create_token = self.issuer.issue(TokenAction::Create)?;
        let session = match self
            .worker
            .create(resource_id, info.size, &info.mime_type, &create_token)
            .await
        {
            Ok(session) => {
                phase = phase.transition(UploadEvent::SessionCreated)?;
                session
            }
            Err(err) => {
                // Creation itself failed: nothing exists remotely to abort.
                phase.transition(UploadEvent::CreateFailed)?;
                return Err(err);
            }
        };

        tracing::debug!(
            upload_id = %session.upload_id,
            total_parts = session.total_parts,
            "upload session created"
        );

        match self.run_session(path, plan, &session, &mut phase).await {
            Ok(manifest) => Ok(UploadReport {
                resource_id: resource_id.to_string(),
                manifest,
                file_size: info.size,
                mime_type: info.mime_type,
                elapsed: started.elapsed(),
            }),
            Err(err) => {
                debug_assert_eq!(phase, UploadPhase::Aborting);
                self.abort_session(&session).await;
                phase.transition(UploadEvent::AbortFinished)?;
                Err(err)
            }
        }
    }

    /// Stream every part, then complete. On failure, leaves `phase` in
    /// `Aborting` and returns the original error untouched.
    async fn run_session(
        &self,
        path: &Path,
        plan: ChunkPlan,
        session: &UploadSession,
        phase: &mut UploadPhase,
    ) -> Result<CompletionManifest, UploadError> {
        *phase = phase.transition(UploadEvent::UploadStarted)?;

        let mut parts: Vec<PartRef> = Vec::with_capacity(plan.total_parts() as usize);

        let mut stream = match ChunkStream::open(path, plan).await {
            Ok(stream) => stream,
            Err(err) => {
                *phase = phase.transition(UploadEvent::PartFailed)?;
                return Err(err);
            }
        };

        loop {
            let chunk = match stream.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    *phase = phase.transition(UploadEvent::PartFailed)?;
                    return Err(err);
                }
            };

            let result = match self.worker.put_part(&chunk, &session.client_token).await {
                Ok(result) => {
                    *phase = phase.transition(UploadEvent::PartUploaded)?;
                    result
                }
                Err(err) => {
                    *phase = phase.transition(UploadEvent::PartFailed)?;
                    return Err(err);
                }
            };

            if let Some(callback) = &self.progress {
                callback(&result);
            }
            parts.push(PartRef::from(&result));
        }
        // The handle is closed here on every path; the abort branch never
        // holds it open.
        drop(stream);

        // Complete is never called unless every part 1..=totalParts is
        // accounted for, in ascending order.
        parts.sort_by_key(|p| p.part_number);
        if let Err(err) = verify_part_coverage(&parts, session.total_parts) {
            *phase = phase.transition(UploadEvent::CompleteFailed)?;
            return Err(err.into());
        }

        let complete_token = match self.issuer.issue(TokenAction::Complete) {
            Ok(token) => token,
            Err(err) => {
                *phase = phase.transition(UploadEvent::CompleteFailed)?;
                return Err(err.into());
            }
        };

        let manifest = match self
            .worker
            .complete(
                &session.upload_id,
                &session.resource_id,
                &parts,
                &complete_token,
            )
            .await
        {
            Ok(manifest) => manifest,
            Err(err) => {
                *phase = phase.transition(UploadEvent::CompleteFailed)?;
                return Err(err);
            }
        };

        if manifest.size != session.file_size {
            *phase = phase.transition(UploadEvent::CompleteFailed)?;
            return Err(UploadError::SizeMismatch {
                expected: session.file_size,
                actual: manifest.size,
            });
        }

        *phase = phase.transition(UploadEvent::Completed)?;
        Ok(manifest)
    }

    /// Best-effort compensation, invoked exactly once per failed session.
    /// Its outcome never changes the terminal state or masks the original
    /// failure.
    async fn abort_session(&self, session: &UploadSession) {
        let token = match self.issuer.issue(TokenAction::Abort) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(
                    upload_id = %session.upload_id,
                    error = %err,
                    "failed to mint abort token; session left for worker-side expiry"
                );
                return;
            }
        };

        match self
            .worker
            .abort(&session.upload_id, &session.resource_id, &token)
            .await
        {
            Ok(()) => {
                tracing::debug!(upload_id = %session.upload_id, "upload aborted");
            }
            Err(err) => {
                tracing::warn!(
                    upload_id = %session.upload_id,
                    error = %err,
                    "failed to abort upload"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path_transitions() {
        let phase = UploadPhase::Idle
            .transition(UploadEvent::SessionCreated)
            .and_then(|p| p.transition(UploadEvent::UploadStarted))
            .and_then(|p| p.transition(UploadEvent::PartUploaded))
            .and_then(|p| p.transition(UploadEvent::PartUploaded))
            .and_then(|p| p.transition(UploadEvent::Completed))
            .unwrap();
        assert_eq!(phase, UploadPhase::Completed);
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_create_failure_is_terminal_without_abort() {
        let phase = UploadPhase::Idle
            .transition(UploadEvent::CreateFailed)
            .unwrap();
        assert_eq!(phase, UploadPhase::Failed);
        // A failed creation has no session; the abort edge must not exist.
        assert!(phase.transition(UploadEvent::AbortFinished).is_err());
    }

    #[test]
    fn test_part_failure_routes_through_abort() {
        let phase = UploadPhase::Uploading
            .transition(UploadEvent::PartFailed)
            .unwrap();
        assert_eq!(phase, UploadPhase::Aborting);
        let phase = phase.transition(UploadEvent::AbortFinished).unwrap();
        assert_eq!(phase, UploadPhase::Failed);
    }

    #[test]
    fn test_complete_failure_from_created_or_uploading() {
        for start in [UploadPhase::Created, UploadPhase::Uploading] {
            let phase = start.transition(UploadEvent::CompleteFailed).unwrap();
            assert_eq!(phase, UploadPhase::Aborting);
        }
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let illegal = [
            (UploadPhase::Idle, UploadEvent::PartUploaded),
            (UploadPhase::Idle, UploadEvent::Completed),
            (UploadPhase::Created, UploadEvent::PartUploaded),
            (UploadPhase::Created, UploadEvent::SessionCreated),
            (UploadPhase::Completed, UploadEvent::PartFailed),
            (UploadPhase::Failed, UploadEvent::UploadStarted),
            (UploadPhase::Aborting, UploadEvent::PartUploaded),
            (UploadPhase::Uploading, UploadEvent::AbortFinished),
        ];
        for (phase, event) in illegal {
            assert!(
                phase.transition(event).is_err(),
                "{phase:?} on {event:?} should be illegal"
            );
        }
    }

    #[test]
    fn test_terminal_phases() {
        assert!(UploadPhase::Completed.is_terminal());
        assert!(UploadPhase::Failed.is_terminal());
        for phase in [
            UploadPhase::Idle,
            UploadPhase::Created,
            UploadPhase::Uploading,
            UploadPhase::Aborting,
        ] {
            assert!(!phase.is_terminal());
        }
    }
}
