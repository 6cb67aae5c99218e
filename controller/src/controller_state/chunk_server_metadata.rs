use std::time::{Duration, Instant};
use storage::chunk::ChunkMetadata;

/// Controller side view of one chunk server, keyed by its advertised
/// hostname. Entries are created on first heartbeat and only ever updated in
/// place afterwards; expiry is derived from the timestamp, never stored.
#[derive(Clone, Debug)]
pub struct ChunkServerMetadata {
    pub hostname: String,
    pub free_space: u64,
    pub total_chunks: u64,
    pub chunks: Vec<ChunkMetadata>,
    pub last_heartbeat: Instant,
}

impl ChunkServerMetadata {
    pub fn new(
        hostname: String,
        free_space: u64,
        total_chunks: u64,
        chunks: Vec<ChunkMetadata>,
    ) -> Self {
        Self {
            hostname,
            free_space,
            total_chunks,
            chunks,
            last_heartbeat: Instant::now(),
        }
    }
    pub fn mark_heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }
    /// Additive merge for minor heartbeats: scalar fields are replaced, the
    /// reported chunk entries are appended to the known list.
    pub fn merge_incremental(
        &mut self,
        free_space: u64,
        total_chunks: u64,
        added_chunks: Vec<ChunkMetadata>,
    ) {
        self.free_space = free_space;
        self.total_chunks = total_chunks;
        self.chunks.extend(added_chunks);
        self.mark_heartbeat();
    }
    pub fn is_expired(&self, threshold: Duration) -> bool {
        self.last_heartbeat.elapsed() > threshold
    }
}
