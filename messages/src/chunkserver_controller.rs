use serde::{Deserialize, Serialize};
use storage::chunk::{ChunkMetadata, ChunkSlot};

/// Incremental report: only the chunks added since the previous report plus
/// any newly detected corrupted slots. The controller merges it additively.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinorHeartbeat {
    /// Advertised `host:port` of the sender, the controller side key.
    pub hostname: String,
    pub free_space: u64,
    pub total_chunks: u64,
    pub added_chunks: Vec<ChunkMetadata>,
    pub corrupted_chunks: Vec<ChunkSlot>,
}

/// Full inventory snapshot; the controller replaces its view of the sender
/// with this instead of merging.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MajorHeartbeat {
    pub hostname: String,
    pub free_space: u64,
    pub total_chunks: u64,
    pub chunks: Vec<ChunkMetadata>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeartbeatAck {
    /// false on the very first heartbeat from a hostname, which the
    /// controller treats as a registration.
    pub known: bool,
}
