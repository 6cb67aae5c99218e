use tokio::{fs::File, io::AsyncWriteExt};
use utilities::{
    logger::{instrument, tracing},
    result::Result,
};

/// Reassembles a fetched file by appending chunk payloads in sequence order.
pub struct ChunkJoiner {
    file: File,
    file_path: String,
}

impl ChunkJoiner {
    #[instrument(name = "new_chunk_joiner")]
    pub async fn create(file_path: &str) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(file_path)
            .await
            .map_err(|e| format!("Error while creating the target file {e:?}"))?;
        Ok(Self {
            file,
            file_path: file_path.to_owned(),
        })
    }

    pub async fn append_chunk(&mut self, payload: &[u8]) -> Result<()> {
        self.file
            .write_all(payload)
            .await
            .map_err(|e| format!("Error while writing chunk to file {e:?}"))?;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<()> {
        self.file
            .flush()
            .await
            .map_err(|e| format!("Error while flushing the target file {e:?}"))?;
        Ok(())
    }

    #[instrument(name = "abort_join_chunk", skip(self))]
    pub async fn abort(self) {
        drop(self.file);
        let _ = tokio::fs::remove_file(&self.file_path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appended_chunks_rebuild_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        let mut joiner = ChunkJoiner::create(target.to_str().unwrap()).await.unwrap();
        joiner.append_chunk(&[1, 2, 3]).await.unwrap();
        joiner.append_chunk(&[4, 5]).await.unwrap();
        joiner.finish().await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn abort_removes_the_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        let mut joiner = ChunkJoiner::create(target.to_str().unwrap()).await.unwrap();
        joiner.append_chunk(&[1]).await.unwrap();
        joiner.abort().await;
        assert!(!target.exists());
    }
}
