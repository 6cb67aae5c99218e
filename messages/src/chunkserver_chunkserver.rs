use serde::{Deserialize, Serialize};

/// One hop of the replica chain. The receiver persists the payload, pops the
/// first remaining target and forwards the rest of the chain there. An empty
/// target list marks the last hop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreChunkRequest {
    pub absolute_file_path: String,
    pub sequence: u32,
    pub payload: Vec<u8>,
    pub remaining_targets: Vec<String>,
}

/// Sent back up the chain only after this hop has persisted the chunk and
/// the rest of the chain has acked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreChunkAck {
    pub version: u32,
}
