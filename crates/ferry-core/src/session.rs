//! Upload session records and the completion manifest.

use serde::{Deserialize, Serialize};

/// An in-progress multipart upload, as acknowledged by the worker's create
/// call.
///
/// Owned by exactly one coordinator invocation; logically destroyed on
/// complete or abort.
#[derive(Clone, Debug)]
pub struct UploadSession {
    /// Caller-chosen stable resource name.
    pub resource_id: String,
    /// Worker-assigned upload identifier (opaque).
    pub upload_id: String,
    /// Worker-issued token authorizing part uploads for this session only.
    pub client_token: String,
    /// Part count as reported by the worker.
    pub total_parts: u32,
    /// Source file size in bytes.
    pub file_size: u64,
    /// Source MIME type.
    pub mime_type: String,
}

/// The worker's acknowledgment of one uploaded part.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    /// Echoed part number (must match the request).
    pub part_number: u32,
    /// Integrity token assigned by the worker (opaque).
    pub etag: String,
    /// Worker-side running byte counter. Display only.
    pub uploaded_bytes: u64,
    /// Worker-side expected total. Display only.
    pub total_bytes: u64,
}

impl PartResult {
    /// Upload progress percentage from the worker's own counters.
    ///
    /// Never used for correctness decisions.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.uploaded_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// A `{partNumber, etag}` pair as submitted to the complete call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRef {
    pub part_number: u32,
    pub etag: String,
}

impl From<&PartResult> for PartRef {
    fn from(result: &PartResult) -> Self {
        Self {
            part_number: result.part_number,
            etag: result.etag.clone(),
        }
    }
}

/// Verify that `parts` covers exactly `1..=total_parts`, in ascending order,
/// with no duplicates or gaps.
pub fn verify_part_coverage(parts: &[PartRef], total_parts: u32) -> crate::Result<()> {
    if parts.len() as u64 != u64::from(total_parts) {
        return Err(crate::Error::ManifestIntegrity(format!(
            "expected {} parts, have {}",
            total_parts,
            parts.len()
        )));
    }
    for (i, part) in parts.iter().enumerate() {
        let expected = i as u32 + 1;
        if part.part_number != expected {
            return Err(crate::Error::ManifestIntegrity(format!(
                "expected part {} at position {}, found part {}",
                expected, i, part.part_number
            )));
        }
    }
    Ok(())
}

/// Final record of a successful upload.
#[derive(Clone, Debug)]
pub struct CompletionManifest {
    /// The acknowledged parts, ascending by part number.
    pub parts: Vec<PartRef>,
    /// Final object etag assigned by the worker.
    pub etag: String,
    /// Final object size in bytes.
    pub size: u64,
}

impl CompletionManifest {
    /// Build a manifest, verifying part coverage.
    pub fn new(parts: Vec<PartRef>, etag: String, size: u64) -> crate::Result<Self> {
        let total = u32::try_from(parts.len())
            .map_err(|_| crate::Error::ManifestIntegrity("part count overflow".to_string()))?;
        verify_part_coverage(&parts, total)?;
        Ok(Self { parts, etag, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(n: u32) -> PartRef {
        PartRef {
            part_number: n,
            etag: format!("etag-{n}"),
        }
    }

    #[test]
    fn test_coverage_accepts_contiguous_parts() {
        let parts = vec![part(1), part(2), part(3)];
        assert!(verify_part_coverage(&parts, 3).is_ok());
        assert!(verify_part_coverage(&[], 0).is_ok());
    }

    #[test]
    fn test_coverage_rejects_missing_part() {
        let parts = vec![part(1), part(3)];
        assert!(verify_part_coverage(&parts, 3).is_err());
    }

    #[test]
    fn test_coverage_rejects_out_of_order_parts() {
        let parts = vec![part(2), part(1), part(3)];
        assert!(verify_part_coverage(&parts, 3).is_err());
    }

    #[test]
    fn test_coverage_rejects_duplicates() {
        let parts = vec![part(1), part(2), part(2)];
        assert!(verify_part_coverage(&parts, 3).is_err());
    }

    #[test]
    fn test_part_ref_wire_format() {
        let json = serde_json::to_value(part(7)).unwrap();
        assert_eq!(json["partNumber"], 7);
        assert_eq!(json["etag"], "etag-7");
    }

    #[test]
    fn test_part_result_percent() {
        let result = PartResult {
            part_number: 1,
            etag: "e".to_string(),
            uploaded_bytes: 50,
            total_bytes: 200,
        };
        assert_eq!(result.percent(), 25.0);

        let empty = PartResult {
            part_number: 1,
            etag: "e".to_string(),
            uploaded_bytes: 0,
            total_bytes: 0,
        };
        assert_eq!(empty.percent(), 0.0);
    }
}
