use std::{sync::Arc, time::Duration};

use messages::client_controller::{
    ReadLocationsRequest, ReadLocationsResponse, WritePlacementRequest, WritePlacementResponse,
};
use tokio::sync::Mutex;
use utilities::{
    logger::{info, instrument, tracing},
    result::Result,
};

use crate::controller_state::ControllerState;

/// Answers client placement and location queries against the metadata model.
#[derive(Clone)]
pub struct ClientHandler {
    state: Arc<Mutex<ControllerState>>,
    expiry_threshold: Duration,
}

impl ClientHandler {
    pub fn new(state: Arc<Mutex<ControllerState>>, expiry_threshold: Duration) -> Self {
        Self {
            state,
            expiry_threshold,
        }
    }

    #[instrument(name = "controller_write_placement", skip(self, request), fields(file = %request.absolute_file_path, sequence = request.sequence))]
    pub async fn handle_write_placement(
        &self,
        request: WritePlacementRequest,
    ) -> Result<WritePlacementResponse> {
        let state = self.state.lock().await;
        let targets = state.select_best_chunk_servers(self.expiry_threshold)?;
        info!(?targets, "Selected replica chain for chunk write");
        Ok(WritePlacementResponse { targets })
    }

    #[instrument(name = "controller_read_locations", skip(self, request), fields(file = %request.absolute_file_path))]
    pub async fn handle_read_locations(
        &self,
        request: ReadLocationsRequest,
    ) -> Result<ReadLocationsResponse> {
        let state = self.state.lock().await;
        let replica_sets = state.read_locations(&request.absolute_file_path)?;
        Ok(ReadLocationsResponse { replica_sets })
    }
}
