use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Identity of one physical chunk. `(absolute_file_path, sequence)` names a
/// logical chunk slot; `version` strictly increases on every overwrite of
/// that slot on the same server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub absolute_file_path: String,
    pub version: u32,
    pub sequence: u32,
    pub last_updated: SystemTime,
    pub size: u64,
}

impl ChunkMetadata {
    pub fn new(absolute_file_path: String, sequence: u32, size: u64) -> Self {
        Self {
            absolute_file_path,
            version: 1,
            sequence,
            last_updated: SystemTime::now(),
            size,
        }
    }
    pub fn slot(&self) -> ChunkSlot {
        ChunkSlot {
            absolute_file_path: self.absolute_file_path.clone(),
            sequence: self.sequence,
        }
    }
}

/// A logical chunk slot, independent of version and replica.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSlot {
    pub absolute_file_path: String,
    pub sequence: u32,
}

/// Ordered slice digests for one chunk payload, one per fixed size slice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkIntegrity {
    pub slice_digests: Vec<String>,
}

impl ChunkIntegrity {
    pub fn compute(payload: &[u8], slice_size: usize) -> Self {
        Self {
            slice_digests: crate::integrity::compute_slice_digests(payload, slice_size),
        }
    }
    pub fn matches(&self, payload: &[u8], slice_size: usize) -> bool {
        crate::integrity::validate(payload, &self.slice_digests, slice_size)
    }
}

/// In memory aggregate of one chunk: metadata, integrity digests and the raw
/// payload. Serialized as a whole (metadata block, digest list, payload, in
/// that order, every length prefixed) to form the on disk chunk file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
    pub metadata: ChunkMetadata,
    pub integrity: ChunkIntegrity,
    pub payload: Vec<u8>,
}

impl Chunk {
    pub fn new(
        absolute_file_path: String,
        sequence: u32,
        payload: Vec<u8>,
        slice_size: usize,
    ) -> Self {
        let metadata = ChunkMetadata::new(absolute_file_path, sequence, payload.len() as u64);
        let integrity = ChunkIntegrity::compute(&payload, slice_size);
        Self {
            metadata,
            integrity,
            payload,
        }
    }
}
