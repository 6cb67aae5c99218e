use std::{sync::Arc, time::Duration};

use messages::{
    Message,
    chunkserver_chunkserver::{StoreChunkAck, StoreChunkRequest},
    client_chunkserver::{RetrieveChunkRequest, RetrieveChunkResponse},
    transport,
};
use storage::{chunk::Chunk, chunk_store::ChunkStore};
use tokio::sync::Mutex;
use utilities::{
    logger::{error, info, instrument, trace, tracing, warn},
    result::Result,
};

use crate::chunkserver_state::ChunkserverState;

/// Persists inbound chunks, relays them down the replica chain and serves
/// integrity checked reads.
#[derive(Clone)]
pub struct ChunkHandler {
    store: ChunkStore,
    state: Arc<Mutex<ChunkserverState>>,
    slice_size: usize,
    forward_timeout: Duration,
}

impl ChunkHandler {
    pub fn new(
        store: ChunkStore,
        state: Arc<Mutex<ChunkserverState>>,
        slice_size: usize,
        forward_timeout: Duration,
    ) -> Self {
        Self {
            store,
            state,
            slice_size,
            forward_timeout,
        }
    }

    /// Persist then relay. The ack only goes back to the caller once every
    /// hop further down the chain has acked, so a mid chain failure reaches
    /// the write's originator instead of being swallowed.
    #[instrument(name = "chunkserver_store_chunk", skip(self, request), fields(file = %request.absolute_file_path, sequence = request.sequence, remaining = request.remaining_targets.len()))]
    pub async fn process_chunk_store_request(
        &self,
        mut request: StoreChunkRequest,
    ) -> Result<StoreChunkAck> {
        let mut chunk = Chunk::new(
            request.absolute_file_path.clone(),
            request.sequence,
            std::mem::take(&mut request.payload),
            self.slice_size,
        );
        if self
            .store
            .exists(&request.absolute_file_path, request.sequence)
            .await
        {
            self.store.update(&mut chunk).await?;
        } else {
            self.store.save(&chunk).await?;
        }
        let version = chunk.metadata.version;
        info!(version, "Chunk persisted");
        {
            let mut state = self.state.lock().await;
            state.record_added(chunk.metadata.clone());
        }

        if request.remaining_targets.is_empty() {
            trace!("Last hop of the replica chain, nothing to forward");
            return Ok(StoreChunkAck { version });
        }
        let next_hop = request.remaining_targets.remove(0);
        info!(%next_hop, remaining = request.remaining_targets.len(), "Forwarding store request to the next replica");
        let forward = Message::StoreChunk(StoreChunkRequest {
            absolute_file_path: request.absolute_file_path,
            sequence: request.sequence,
            payload: chunk.payload,
            remaining_targets: request.remaining_targets,
        });
        match transport::send(&next_hop, &forward, self.forward_timeout).await {
            Ok(Message::StoreChunkAck(_)) => Ok(StoreChunkAck { version }),
            Ok(other) => {
                Err(format!("next hop {next_hop} replied with {} instead of an ack", other.kind()).into())
            }
            Err(e) => {
                error!(error = %e, %next_hop, "Forwarding failed, reporting the chain as broken");
                Err(format!("replica chain broke at {next_hop}: {e}").into())
            }
        }
    }

    /// Load and validate before serving. A failed validation is recorded for
    /// the next minor heartbeat and surfaced as an error so the client can
    /// fall back to another replica.
    #[instrument(name = "chunkserver_retrieve_chunk", skip(self, request), fields(file = %request.absolute_file_path, sequence = request.sequence))]
    pub async fn process_chunk_retrieve_request(
        &self,
        request: RetrieveChunkRequest,
    ) -> Result<RetrieveChunkResponse> {
        let chunk = self
            .store
            .load(&request.absolute_file_path, request.sequence)
            .await?;
        if !chunk.integrity.matches(&chunk.payload, self.slice_size) {
            let slot = chunk.metadata.slot();
            warn!("Stored chunk failed slice validation, scheduling a corruption report");
            self.state.lock().await.record_corrupted(slot);
            return Err(format!(
                "chunk {} sequence {} is corrupted on this server",
                request.absolute_file_path, request.sequence
            )
            .into());
        }
        Ok(RetrieveChunkResponse {
            metadata: chunk.metadata,
            payload: chunk.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLICE_SIZE: usize = 8 * 1024;

    fn handler(dir: &std::path::Path) -> ChunkHandler {
        let store = ChunkStore::new(dir).unwrap();
        ChunkHandler::new(
            store,
            Arc::new(Mutex::new(ChunkserverState::new())),
            SLICE_SIZE,
            Duration::from_secs(2),
        )
    }

    fn store_request(payload: Vec<u8>, targets: Vec<String>) -> StoreChunkRequest {
        StoreChunkRequest {
            absolute_file_path: "/data/f.bin".to_owned(),
            sequence: 0,
            payload,
            remaining_targets: targets,
        }
    }

    #[tokio::test]
    async fn last_hop_persists_without_forwarding() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        let ack = handler
            .process_chunk_store_request(store_request(vec![1u8; 30_000], vec![]))
            .await
            .unwrap();
        assert_eq!(ack.version, 1);

        let response = handler
            .process_chunk_retrieve_request(RetrieveChunkRequest {
                absolute_file_path: "/data/f.bin".to_owned(),
                sequence: 0,
            })
            .await
            .unwrap();
        assert_eq!(response.payload, vec![1u8; 30_000]);
        assert_eq!(response.metadata.version, 1);
    }

    #[tokio::test]
    async fn overwrite_bumps_the_version() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        handler
            .process_chunk_store_request(store_request(vec![1u8; 100], vec![]))
            .await
            .unwrap();
        let ack = handler
            .process_chunk_store_request(store_request(vec![2u8; 100], vec![]))
            .await
            .unwrap();
        assert_eq!(ack.version, 2);
    }

    #[tokio::test]
    async fn store_request_lands_in_the_added_queue() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        handler
            .process_chunk_store_request(store_request(vec![1u8; 100], vec![]))
            .await
            .unwrap();
        let added = handler.state.lock().await.drain_added();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].absolute_file_path, "/data/f.bin");
    }

    #[tokio::test]
    async fn unreachable_next_hop_fails_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        // port 1 refuses connections, so the forward cannot succeed
        let result = handler
            .process_chunk_store_request(store_request(
                vec![1u8; 100],
                vec!["127.0.0.1:1".to_owned()],
            ))
            .await;
        assert!(result.is_err());
        // the local copy was still persisted before the chain broke
        assert!(handler.store.exists("/data/f.bin", 0).await);
    }

    #[tokio::test]
    async fn corrupted_chunk_is_reported_not_served() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        handler
            .process_chunk_store_request(store_request(vec![7u8; 10_000], vec![]))
            .await
            .unwrap();
        // flip a payload byte behind the store's back
        let raw = std::fs::read(dir.path().join("data/f.bin_chunk0")).unwrap();
        let mut stored: Chunk = bincode::deserialize(&raw).unwrap();
        stored.payload[5] ^= 0xFF;
        std::fs::write(
            dir.path().join("data/f.bin_chunk0"),
            bincode::serialize(&stored).unwrap(),
        )
        .unwrap();

        let result = handler
            .process_chunk_retrieve_request(RetrieveChunkRequest {
                absolute_file_path: "/data/f.bin".to_owned(),
                sequence: 0,
            })
            .await;
        assert!(result.is_err());
        let corrupted = handler.state.lock().await.drain_corrupted();
        assert_eq!(corrupted.len(), 1);
        assert_eq!(corrupted[0].sequence, 0);
    }
}
