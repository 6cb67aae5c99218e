use std::time::Duration;

use messages::{
    Message,
    chunkserver_chunkserver::StoreChunkRequest,
    client_chunkserver::RetrieveChunkRequest,
    transport,
};
use utilities::{
    logger::{instrument, tracing},
    result::Result,
};

/// Client side wrapper over direct chunkserver calls.
#[derive(Clone)]
pub struct ChunkserverService {
    request_timeout: Duration,
}

impl ChunkserverService {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    /// Sends the chunk to the first host of the chain; the chain itself
    /// relays to the rest and the ack only comes back once every hop has
    /// persisted.
    #[instrument(name = "service_chunkserver_store_chunk", skip(self, request), fields(first_hop = %first_hop, file = %request.absolute_file_path, sequence = request.sequence))]
    pub async fn store_chunk(&self, first_hop: &str, request: StoreChunkRequest) -> Result<u32> {
        match transport::send(first_hop, &Message::StoreChunk(request), self.request_timeout)
            .await?
        {
            Message::StoreChunkAck(ack) => Ok(ack.version),
            other => Err(format!(
                "chunkserver replied with {} instead of a store ack",
                other.kind()
            )
            .into()),
        }
    }

    #[instrument(name = "service_chunkserver_retrieve_chunk", skip(self))]
    pub async fn retrieve_chunk(
        &self,
        hostname: &str,
        absolute_file_path: &str,
        sequence: u32,
    ) -> Result<Vec<u8>> {
        let request = RetrieveChunkRequest {
            absolute_file_path: absolute_file_path.to_owned(),
            sequence,
        };
        match transport::send(
            hostname,
            &Message::RetrieveChunk(request),
            self.request_timeout,
        )
        .await?
        {
            Message::RetrieveChunkResponse(response) => Ok(response.payload),
            other => Err(format!(
                "chunkserver replied with {} instead of a chunk",
                other.kind()
            )
            .into()),
        }
    }
}
