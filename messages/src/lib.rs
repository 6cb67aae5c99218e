pub mod chunkserver_chunkserver;
pub mod chunkserver_controller;
pub mod client_chunkserver;
pub mod client_controller;
pub mod codec;
pub mod transport;

use serde::{Deserialize, Serialize};

/// Every message that crosses a node boundary, one variant per kind.
/// Encoding and decoding dispatch on this tag; the payload structs live in
/// per channel modules.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Message {
    MinorHeartbeat(chunkserver_controller::MinorHeartbeat),
    MajorHeartbeat(chunkserver_controller::MajorHeartbeat),
    HeartbeatAck(chunkserver_controller::HeartbeatAck),
    StoreChunk(chunkserver_chunkserver::StoreChunkRequest),
    StoreChunkAck(chunkserver_chunkserver::StoreChunkAck),
    RetrieveChunk(client_chunkserver::RetrieveChunkRequest),
    RetrieveChunkResponse(client_chunkserver::RetrieveChunkResponse),
    WritePlacement(client_controller::WritePlacementRequest),
    WritePlacementResponse(client_controller::WritePlacementResponse),
    ReadLocations(client_controller::ReadLocationsRequest),
    ReadLocationsResponse(client_controller::ReadLocationsResponse),
    Error(String),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::MinorHeartbeat(_) => "MinorHeartbeat",
            Message::MajorHeartbeat(_) => "MajorHeartbeat",
            Message::HeartbeatAck(_) => "HeartbeatAck",
            Message::StoreChunk(_) => "StoreChunk",
            Message::StoreChunkAck(_) => "StoreChunkAck",
            Message::RetrieveChunk(_) => "RetrieveChunk",
            Message::RetrieveChunkResponse(_) => "RetrieveChunkResponse",
            Message::WritePlacement(_) => "WritePlacement",
            Message::WritePlacementResponse(_) => "WritePlacementResponse",
            Message::ReadLocations(_) => "ReadLocations",
            Message::ReadLocationsResponse(_) => "ReadLocationsResponse",
            Message::Error(_) => "Error",
        }
    }
}
