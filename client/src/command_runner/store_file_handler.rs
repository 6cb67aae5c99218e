use messages::chunkserver_chunkserver::StoreChunkRequest;
use utilities::{
    logger::{info, instrument, trace, tracing},
    result::Result,
};

use crate::{
    chunkserver_service::ChunkserverService, controller_service::ControllerService,
    file_chunker::FileChunker,
};

pub struct StoreFileHandler {
    controller: ControllerService,
    chunkserver: ChunkserverService,
    chunk_size: usize,
}

impl StoreFileHandler {
    pub fn new(
        controller: ControllerService,
        chunkserver: ChunkserverService,
        chunk_size: usize,
    ) -> Self {
        Self {
            controller,
            chunkserver,
            chunk_size,
        }
    }

    /// Cuts the local file into chunks and pushes each through a fresh
    /// replica chain obtained from the controller.
    #[instrument(skip(self))]
    pub async fn store_file(
        &self,
        local_file_path: String,
        remote_file_path: String,
    ) -> Result<String> {
        let file_metadata = tokio::fs::metadata(&local_file_path)
            .await
            .map_err(|e| format!("Error while reading file metadata : {e:?}"))?;
        if file_metadata.is_dir() {
            return Err(format!("Provided file path ({local_file_path}) is dir").into());
        }
        info!(file_size = file_metadata.len(), "Storing file");
        let mut chunker = FileChunker::open(&local_file_path, self.chunk_size).await?;
        let mut stored_chunks = 0u32;
        while let Some((sequence, payload)) = chunker.next_chunk().await? {
            let mut targets = self
                .controller
                .get_write_placement(&remote_file_path, sequence, payload.len() as u64)
                .await?;
            if targets.is_empty() {
                return Err("controller returned an empty replica chain".into());
            }
            trace!(sequence, ?targets, "Pushing chunk through replica chain");
            let first_hop = targets.remove(0);
            let request = StoreChunkRequest {
                absolute_file_path: remote_file_path.clone(),
                sequence,
                payload,
                remaining_targets: targets,
            };
            self.chunkserver.store_chunk(&first_hop, request).await?;
            stored_chunks += 1;
        }
        Ok(format!(
            "stored {remote_file_path} in {stored_chunks} chunks"
        ))
    }
}
