//! Chunk geometry and chunk payloads.

use std::fmt;

/// Pure chunk geometry for one file: how many parts, and how long each is.
///
/// Part numbers are 1-based, contiguous, and every part except the last is
/// exactly `chunk_size` bytes long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    total_parts: u32,
}

impl ChunkPlan {
    /// Create a plan for a file of `file_size` bytes split into
    /// `chunk_size`-byte parts.
    pub fn new(file_size: u64, chunk_size: u64) -> crate::Result<Self> {
        if chunk_size == 0 {
            return Err(crate::Error::InvalidChunkSize(chunk_size));
        }
        let total_parts = u32::try_from(file_size.div_ceil(chunk_size)).map_err(|_| {
            crate::Error::ManifestIntegrity(format!(
                "file of {file_size} bytes needs more parts than can be numbered"
            ))
        })?;
        Ok(Self {
            file_size,
            chunk_size,
            total_parts,
        })
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Part size in bytes (the last part may be shorter).
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of parts (ceiling division; zero for an empty file).
    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    /// Length in bytes of the given part.
    pub fn part_len(&self, part_number: u32) -> crate::Result<u64> {
        if part_number == 0 || part_number > self.total_parts {
            return Err(crate::Error::PartOutOfRange {
                part: part_number,
                total: self.total_parts,
            });
        }
        if self.is_last(part_number) {
            let rem = self.file_size % self.chunk_size;
            Ok(if rem == 0 { self.chunk_size } else { rem })
        } else {
            Ok(self.chunk_size)
        }
    }

    /// Whether the given part is the final one.
    pub fn is_last(&self, part_number: u32) -> bool {
        self.total_parts > 0 && part_number == self.total_parts
    }
}

/// One part of the source file, ready to send.
#[derive(Clone)]
pub struct Chunk {
    /// 1-based part number.
    pub part_number: u32,
    /// The part payload.
    pub bytes: bytes::Bytes,
    /// True only on the final part of the file.
    pub is_last: bool,
}

impl Chunk {
    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("part_number", &self.part_number)
            .field("size", &self.bytes.len())
            .field("is_last", &self.is_last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_part_counts() {
        let plan = ChunkPlan::new(100, 64).unwrap();
        assert_eq!(plan.total_parts(), 2);

        let plan = ChunkPlan::new(128, 64).unwrap();
        assert_eq!(plan.total_parts(), 2);

        let plan = ChunkPlan::new(0, 64).unwrap();
        assert_eq!(plan.total_parts(), 0);
    }

    #[test]
    fn test_plan_rejects_zero_chunk_size() {
        assert!(ChunkPlan::new(100, 0).is_err());
    }

    #[test]
    fn test_part_lengths_sum_to_file_size() {
        for (file_size, chunk_size) in [(100u64, 30u64), (90, 30), (1, 30), (12 * 1024, 5 * 1024)]
        {
            let plan = ChunkPlan::new(file_size, chunk_size).unwrap();
            let total: u64 = (1..=plan.total_parts())
                .map(|n| plan.part_len(n).unwrap())
                .sum();
            assert_eq!(total, file_size, "sizes {file_size}/{chunk_size}");

            for n in 1..plan.total_parts() {
                assert_eq!(plan.part_len(n).unwrap(), chunk_size);
            }
        }
    }

    #[test]
    fn test_last_part_length() {
        let plan = ChunkPlan::new(100, 30).unwrap();
        assert_eq!(plan.part_len(4).unwrap(), 10);

        // Evenly divisible: last part is a full chunk.
        let plan = ChunkPlan::new(90, 30).unwrap();
        assert_eq!(plan.part_len(3).unwrap(), 30);
    }

    #[test]
    fn test_is_last_only_on_final_part() {
        let plan = ChunkPlan::new(100, 30).unwrap();
        assert_eq!(plan.total_parts(), 4);
        for n in 1..=3 {
            assert!(!plan.is_last(n));
        }
        assert!(plan.is_last(4));

        let empty = ChunkPlan::new(0, 30).unwrap();
        assert!(!empty.is_last(0));
    }

    #[test]
    fn test_part_len_out_of_range() {
        let plan = ChunkPlan::new(100, 30).unwrap();
        assert!(plan.part_len(0).is_err());
        assert!(plan.part_len(5).is_err());
    }

    #[test]
    fn test_twelve_mib_file_in_five_mib_chunks() {
        let mib = 1024 * 1024;
        let plan = ChunkPlan::new(12 * mib, 5 * mib).unwrap();
        assert_eq!(plan.total_parts(), 3);
        assert_eq!(plan.part_len(1).unwrap(), 5 * mib);
        assert_eq!(plan.part_len(2).unwrap(), 5 * mib);
        assert_eq!(plan.part_len(3).unwrap(), 2 * mib);
        assert!(plan.is_last(3));
    }
}
