use std::time::Duration;

use messages::{
    Message,
    client_controller::{ReadLocationsRequest, WritePlacementRequest},
    transport,
};
use utilities::{
    logger::{instrument, trace, tracing},
    result::Result,
    retry_policy::retry_with_backoff,
};

/// Client side wrapper over the controller's placement and location calls.
#[derive(Clone)]
pub struct ControllerService {
    controller_addrs: String,
    request_timeout: Duration,
}

impl ControllerService {
    pub fn new(controller_addrs: String, request_timeout: Duration) -> Self {
        Self {
            controller_addrs,
            request_timeout,
        }
    }

    #[instrument(name = "service_controller_write_placement", skip(self))]
    pub async fn get_write_placement(
        &self,
        absolute_file_path: &str,
        sequence: u32,
        chunk_size: u64,
    ) -> Result<Vec<String>> {
        let reply = retry_with_backoff(
            || async {
                let request = WritePlacementRequest {
                    absolute_file_path: absolute_file_path.to_owned(),
                    sequence,
                    chunk_size,
                };
                transport::send(
                    &self.controller_addrs,
                    &Message::WritePlacement(request),
                    self.request_timeout,
                )
                .await
            },
            3,
        )
        .await?;
        match reply {
            Message::WritePlacementResponse(response) => {
                trace!(targets = ?response.targets, "Got replica chain from controller");
                Ok(response.targets)
            }
            other => Err(format!(
                "controller replied with {} instead of a placement",
                other.kind()
            )
            .into()),
        }
    }

    #[instrument(name = "service_controller_read_locations", skip(self))]
    pub async fn get_read_locations(&self, absolute_file_path: &str) -> Result<Vec<Vec<String>>> {
        let reply = retry_with_backoff(
            || async {
                let request = ReadLocationsRequest {
                    absolute_file_path: absolute_file_path.to_owned(),
                };
                transport::send(
                    &self.controller_addrs,
                    &Message::ReadLocations(request),
                    self.request_timeout,
                )
                .await
            },
            3,
        )
        .await?;
        match reply {
            Message::ReadLocationsResponse(response) => Ok(response.replica_sets),
            other => Err(format!(
                "controller replied with {} instead of read locations",
                other.kind()
            )
            .into()),
        }
    }
}
