use tokio::{fs::File, io::AsyncReadExt};
use utilities::result::Result;

/// Cuts a local file into fixed size chunks by sequential reads. The last
/// chunk may be shorter; an empty file yields no chunks at all.
pub struct FileChunker {
    file: File,
    chunk_size: usize,
    sequence: u32,
}

impl FileChunker {
    pub async fn open(file_path: &str, chunk_size: usize) -> Result<Self> {
        let file = File::open(file_path)
            .await
            .map_err(|e| format!("Error while opening the file to chunk {e:?}"))?;
        Ok(Self {
            file,
            chunk_size,
            sequence: 0,
        })
    }

    /// Next `(sequence, payload)` pair, or `None` once the file is consumed.
    pub async fn next_chunk(&mut self) -> Result<Option<(u32, Vec<u8>)>> {
        let mut payload = Vec::with_capacity(self.chunk_size);
        let mut reader = (&mut self.file).take(self.chunk_size as u64);
        reader
            .read_to_end(&mut payload)
            .await
            .map_err(|e| format!("Error while reading the next chunk {e:?}"))?;
        if payload.is_empty() {
            return Ok(None);
        }
        let sequence = self.sequence;
        self.sequence += 1;
        Ok(Some((sequence, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK_SIZE: usize = 64 * 1024;

    #[tokio::test]
    async fn hundred_kb_file_cuts_into_two_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("input.bin");
        let bytes: Vec<u8> = (0..100 * 1024u32).map(|i| (i % 97) as u8).collect();
        tokio::fs::write(&file_path, &bytes).await.unwrap();

        let mut chunker = FileChunker::open(file_path.to_str().unwrap(), CHUNK_SIZE)
            .await
            .unwrap();
        let (sequence, first) = chunker.next_chunk().await.unwrap().unwrap();
        assert_eq!(sequence, 0);
        assert_eq!(first.len(), 64 * 1024);
        let (sequence, second) = chunker.next_chunk().await.unwrap().unwrap();
        assert_eq!(sequence, 1);
        assert_eq!(second.len(), 36 * 1024);
        assert!(chunker.next_chunk().await.unwrap().is_none());
        assert_eq!([first, second].concat(), bytes);
    }

    #[tokio::test]
    async fn empty_file_yields_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("empty.bin");
        tokio::fs::write(&file_path, b"").await.unwrap();
        let mut chunker = FileChunker::open(file_path.to_str().unwrap(), CHUNK_SIZE)
            .await
            .unwrap();
        assert!(chunker.next_chunk().await.unwrap().is_none());
    }
}
