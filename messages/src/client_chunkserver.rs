use serde::{Deserialize, Serialize};
use storage::chunk::ChunkMetadata;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveChunkRequest {
    pub absolute_file_path: String,
    pub sequence: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveChunkResponse {
    pub metadata: ChunkMetadata,
    pub payload: Vec<u8>,
}
