use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WritePlacementRequest {
    pub absolute_file_path: String,
    pub sequence: u32,
    pub chunk_size: u64,
}

/// Ordered replica chain for one chunk write. The client sends the chunk to
/// the first target with the remainder as the forwarding list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WritePlacementResponse {
    pub targets: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadLocationsRequest {
    pub absolute_file_path: String,
}

/// Replica holders per chunk sequence; index i lists the hostnames known to
/// hold chunk i.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadLocationsResponse {
    pub replica_sets: Vec<Vec<String>>,
}
