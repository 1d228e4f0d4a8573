//! Lazy, forward-only chunking of the source file.

use crate::error::UploadError;
use ferry_core::chunk::{Chunk, ChunkPlan};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size and MIME type of the file to upload.
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub size: u64,
    pub mime_type: String,
}

/// Inspect the source file before opening a session.
pub async fn probe(path: &Path) -> Result<FileInfo, UploadError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            UploadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            UploadError::Io(e)
        }
    })?;
    if !metadata.is_file() {
        return Err(UploadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(FileInfo {
        size: metadata.len(),
        mime_type,
    })
}

/// A finite, single-pass sequence of chunks read from one file handle.
///
/// Yields exactly `plan.total_parts()` chunks with 1-based, contiguous part
/// numbers; `is_last` is set only on the final chunk. Restartable only by
/// reopening. The handle is released on drop, on every exit path.
pub struct ChunkStream {
    file: File,
    plan: ChunkPlan,
    next_part: u32,
}

impl ChunkStream {
    /// Open the file and prepare to stream chunks according to `plan`.
    pub async fn open(path: &Path, plan: ChunkPlan) -> Result<Self, UploadError> {
        let file = File::open(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                UploadError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                UploadError::Io(e)
            }
        })?;
        Ok(Self {
            file,
            plan,
            next_part: 1,
        })
    }

    /// Read the next chunk, or `None` once all parts were produced.
    ///
    /// A source that runs out of bytes before the plan is satisfied (stale
    /// size metadata, concurrent truncation) is a hard error, never a
    /// silently shorter upload.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, UploadError> {
        if self.next_part > self.plan.total_parts() {
            return Ok(None);
        }

        let part_number = self.next_part;
        let len = self.plan.part_len(part_number)?;
        let mut buf = vec![0u8; len as usize];

        match self.file.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(UploadError::SourceTruncated {
                    produced: part_number - 1,
                    expected: self.plan.total_parts(),
                });
            }
            Err(e) => return Err(UploadError::Io(e)),
        }

        self.next_part += 1;
        Ok(Some(Chunk {
            part_number,
            bytes: buf.into(),
            is_last: self.plan.is_last(part_number),
        }))
    }
}
