use std::sync::Arc;

use messages::chunkserver_controller::{HeartbeatAck, MajorHeartbeat, MinorHeartbeat};
use tokio::sync::Mutex;
use utilities::logger::{instrument, tracing, warn};

use crate::controller_state::ControllerState;

/// Handles everything chunk servers push at the controller.
#[derive(Clone)]
pub struct ChunkserverHandler {
    state: Arc<Mutex<ControllerState>>,
}

impl ChunkserverHandler {
    pub fn new(state: Arc<Mutex<ControllerState>>) -> Self {
        Self { state }
    }

    #[instrument(name = "controller_minor_heartbeat", skip(self, report), fields(hostname = %report.hostname))]
    pub async fn handle_minor_heartbeat(&self, report: MinorHeartbeat) -> HeartbeatAck {
        for slot in &report.corrupted_chunks {
            // repair is driven elsewhere, the controller only learns the slot is bad
            warn!(
                hostname = %report.hostname,
                file = %slot.absolute_file_path,
                sequence = slot.sequence,
                "Chunk server reported a corrupted chunk"
            );
        }
        let mut state = self.state.lock().await;
        let known = state.is_known(&report.hostname);
        state.update_chunk_server_metadata(report);
        HeartbeatAck { known }
    }

    #[instrument(name = "controller_major_heartbeat", skip(self, report), fields(hostname = %report.hostname, chunks = report.chunks.len()))]
    pub async fn handle_major_heartbeat(&self, report: MajorHeartbeat) -> HeartbeatAck {
        let mut state = self.state.lock().await;
        let known = state.is_known(&report.hostname);
        state.replace_chunk_server_metadata(report);
        HeartbeatAck { known }
    }
}
