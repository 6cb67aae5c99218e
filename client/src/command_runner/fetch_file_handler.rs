use utilities::{
    logger::{instrument, tracing, warn},
    result::Result,
};

use crate::{
    chunk_joiner::ChunkJoiner, chunkserver_service::ChunkserverService,
    controller_service::ControllerService,
};

pub struct FetchFileHandler {
    controller: ControllerService,
    chunkserver: ChunkserverService,
}

impl FetchFileHandler {
    pub fn new(controller: ControllerService, chunkserver: ChunkserverService) -> Self {
        Self {
            controller,
            chunkserver,
        }
    }

    /// Fetches every chunk in sequence order, falling back across replica
    /// holders when one fails or serves a corrupted copy.
    #[instrument(skip(self))]
    pub async fn fetch_file(
        &self,
        remote_file_path: String,
        local_file_path: String,
    ) -> Result<String> {
        let replica_sets = self.controller.get_read_locations(&remote_file_path).await?;
        let mut joiner = ChunkJoiner::create(&local_file_path).await?;
        for (sequence, holders) in replica_sets.iter().enumerate() {
            match self
                .fetch_chunk(&remote_file_path, sequence as u32, holders)
                .await
            {
                Ok(payload) => joiner.append_chunk(&payload).await?,
                Err(e) => {
                    joiner.abort().await;
                    return Err(e);
                }
            }
        }
        joiner.finish().await?;
        Ok(format!("fetched {remote_file_path} to {local_file_path}"))
    }

    async fn fetch_chunk(
        &self,
        remote_file_path: &str,
        sequence: u32,
        holders: &[String],
    ) -> Result<Vec<u8>> {
        if holders.is_empty() {
            return Err(format!(
                "no replica recorded for chunk {sequence} of {remote_file_path}"
            )
            .into());
        }
        for hostname in holders {
            match self
                .chunkserver
                .retrieve_chunk(hostname, remote_file_path, sequence)
                .await
            {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    warn!(%hostname, sequence, error = %e, "Replica failed to serve chunk, trying the next holder");
                }
            }
        }
        Err(format!("every replica of chunk {sequence} of {remote_file_path} failed").into())
    }
}
