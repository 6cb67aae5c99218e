use std::time::Duration;

use messages::{
    Message,
    chunkserver_controller::{MajorHeartbeat, MinorHeartbeat},
    transport,
};
use storage::chunk::{ChunkMetadata, ChunkSlot};
use utilities::{
    logger::{info, instrument, tracing},
    result::Result,
};

/// Outbound reporting channel to the controller. Each send is one bounded
/// request/ack exchange over a fresh connection.
#[derive(Clone)]
pub struct ControllerService {
    controller_addrs: String,
    hostname: String,
    send_timeout: Duration,
}

impl ControllerService {
    pub fn new(controller_addrs: String, hostname: String, send_timeout: Duration) -> Self {
        Self {
            controller_addrs,
            hostname,
            send_timeout,
        }
    }

    #[instrument(name = "service_controller_minor_heartbeat", skip_all, fields(added = added_chunks.len(), corrupted = corrupted_chunks.len()))]
    pub async fn send_minor_heartbeat(
        &self,
        free_space: u64,
        total_chunks: u64,
        added_chunks: Vec<ChunkMetadata>,
        corrupted_chunks: Vec<ChunkSlot>,
    ) -> Result<()> {
        let report = MinorHeartbeat {
            hostname: self.hostname.clone(),
            free_space,
            total_chunks,
            added_chunks,
            corrupted_chunks,
        };
        self.send_report(Message::MinorHeartbeat(report)).await
    }

    #[instrument(name = "service_controller_major_heartbeat", skip_all, fields(chunks = chunks.len()))]
    pub async fn send_major_heartbeat(
        &self,
        free_space: u64,
        chunks: Vec<ChunkMetadata>,
    ) -> Result<()> {
        let report = MajorHeartbeat {
            hostname: self.hostname.clone(),
            free_space,
            total_chunks: chunks.len() as u64,
            chunks,
        };
        self.send_report(Message::MajorHeartbeat(report)).await
    }

    async fn send_report(&self, report: Message) -> Result<()> {
        match transport::send(&self.controller_addrs, &report, self.send_timeout).await? {
            Message::HeartbeatAck(ack) => {
                if !ack.known {
                    info!(hostname = %self.hostname, "Controller registered this chunk server");
                }
                Ok(())
            }
            other => Err(format!(
                "controller replied with {} instead of a heartbeat ack",
                other.kind()
            )
            .into()),
        }
    }
}
