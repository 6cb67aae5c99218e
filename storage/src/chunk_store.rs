use crate::chunk::{Chunk, ChunkMetadata};
use crate::error::{ChunkStoreError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Capacity advertised to the controller before accounting for stored
/// chunks. Matches nothing physical, it only drives placement ordering.
pub const STORAGE_CAPACITY: u64 = 10_737_418_240;

/// Snapshot of everything currently on disk under the storage root.
#[derive(Debug, Default)]
pub struct StoreScan {
    pub chunks: Vec<ChunkMetadata>,
    pub used_bytes: u64,
}

impl StoreScan {
    pub fn free_space(&self) -> u64 {
        STORAGE_CAPACITY.saturating_sub(self.used_bytes)
    }
    pub fn total_chunks(&self) -> u64 {
        self.chunks.len() as u64
    }
}

/// On disk chunk repository. One file per chunk slot, derived from the
/// client visible absolute path plus a sequence suffix, nested under `root`.
#[derive(Clone)]
pub struct ChunkStore {
    root: PathBuf,
}

impl ChunkStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        info!(root = %root.display(), "Created root for chunk store");
        Ok(ChunkStore { root })
    }

    fn location(&self, absolute_file_path: &str, sequence: u32) -> PathBuf {
        let relative = absolute_file_path.trim_start_matches('/');
        self.root.join(format!("{relative}_chunk{sequence}"))
    }

    pub async fn exists(&self, absolute_file_path: &str, sequence: u32) -> bool {
        fs::try_exists(self.location(absolute_file_path, sequence))
            .await
            .unwrap_or(false)
    }

    #[instrument(name = "chunk_store_load", skip(self))]
    pub async fn load(&self, absolute_file_path: &str, sequence: u32) -> Result<Chunk> {
        let location = self.location(absolute_file_path, sequence);
        let raw = match fs::read(&location).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ChunkStoreError::NotFound(location.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(bincode::deserialize(&raw)?)
    }

    /// First write of a chunk slot, always version 1. Fails if the slot is
    /// already on disk; overwrites must go through `update` so the version
    /// keeps increasing.
    #[instrument(name = "chunk_store_save", skip(self, chunk), fields(file = %chunk.metadata.absolute_file_path, sequence = chunk.metadata.sequence))]
    pub async fn save(&self, chunk: &Chunk) -> Result<()> {
        let location = self.location(&chunk.metadata.absolute_file_path, chunk.metadata.sequence);
        if fs::try_exists(&location).await? {
            return Err(ChunkStoreError::AlreadyExists(location.display().to_string()));
        }
        if let Some(parent) = location.parent() {
            fs::create_dir_all(parent).await?;
        }
        self.write_atomic(&location, chunk).await
    }

    /// Overwrite of an existing slot. Reads the stored version, bumps it by
    /// one onto the incoming chunk and replaces the file.
    #[instrument(name = "chunk_store_update", skip(self, chunk), fields(file = %chunk.metadata.absolute_file_path, sequence = chunk.metadata.sequence))]
    pub async fn update(&self, chunk: &mut Chunk) -> Result<()> {
        let existing = self
            .load(&chunk.metadata.absolute_file_path, chunk.metadata.sequence)
            .await?;
        chunk.metadata.version = existing.metadata.version + 1;
        chunk.metadata.last_updated = SystemTime::now();
        let location = self.location(&chunk.metadata.absolute_file_path, chunk.metadata.sequence);
        self.write_atomic(&location, chunk).await
    }

    // write-temp-then-rename so a crash mid write cannot leave a truncated
    // file behind the real chunk name
    async fn write_atomic(&self, location: &Path, chunk: &Chunk) -> Result<()> {
        let raw = bincode::serialize(chunk)?;
        let file_name = location
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let staged = location.with_file_name(format!("{file_name}.partial"));
        fs::write(&staged, &raw).await?;
        fs::rename(&staged, location).await?;
        Ok(())
    }

    /// Full directory walk. Feeds the major heartbeat inventory and the free
    /// space / chunk count fields of both heartbeat kinds. Runs every minor
    /// tick, so it only decodes each file's metadata prefix and never pulls
    /// payload bytes into memory.
    #[instrument(name = "chunk_store_scan", skip(self))]
    pub async fn scan(&self) -> Result<StoreScan> {
        let mut scan = StoreScan::default();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.to_string_lossy().ends_with(".partial") {
                    continue;
                }
                scan.used_bytes += entry.metadata().await?.len();
                match Self::read_metadata_prefix(&path) {
                    Ok(metadata) => scan.chunks.push(metadata),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping undecodable chunk file during scan");
                    }
                }
            }
        }
        Ok(scan)
    }

    // the metadata block is the first field of the serialized chunk, so a
    // buffered read of the file head is enough to decode it
    fn read_metadata_prefix(path: &Path) -> Result<ChunkMetadata> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        Ok(bincode::deserialize_from(&mut reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLICE_SIZE: usize = 8 * 1024;

    fn sample_chunk(path: &str, sequence: u32, fill: u8) -> Chunk {
        Chunk::new(path.to_owned(), sequence, vec![fill; 20_000], SLICE_SIZE)
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        let chunk = sample_chunk("/data/movie.bin", 3, 0xAB);
        store.save(&chunk).await.unwrap();

        let loaded = store.load("/data/movie.bin", 3).await.unwrap();
        assert_eq!(loaded.metadata, chunk.metadata);
        assert_eq!(loaded.integrity, chunk.integrity);
        assert_eq!(loaded.payload, chunk.payload);
        assert_eq!(loaded.metadata.version, 1);
        assert!(loaded.integrity.matches(&loaded.payload, SLICE_SIZE));
    }

    #[tokio::test]
    async fn update_bumps_version_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.save(&sample_chunk("/a/f", 0, 1)).await.unwrap();

        for expected_version in 2..=5u32 {
            let mut rewrite = sample_chunk("/a/f", 0, expected_version as u8);
            store.update(&mut rewrite).await.unwrap();
            assert_eq!(rewrite.metadata.version, expected_version);
        }
        let loaded = store.load("/a/f", 0).await.unwrap();
        assert_eq!(loaded.metadata.version, 5);
        assert_eq!(loaded.payload, vec![5u8; 20_000]);
    }

    #[tokio::test]
    async fn save_refuses_existing_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.save(&sample_chunk("/a/f", 0, 1)).await.unwrap();
        let second = store.save(&sample_chunk("/a/f", 0, 2)).await;
        assert!(matches!(second, Err(ChunkStoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn load_missing_slot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        let missing = store.load("/nothing/here", 9).await;
        assert!(matches!(missing, Err(ChunkStoreError::NotFound(_))));
        assert!(!store.exists("/nothing/here", 9).await);
    }

    #[tokio::test]
    async fn scan_decodes_inventory_from_the_file_head() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.save(&sample_chunk("/data/a.bin", 0, 1)).await.unwrap();

        // chop off most of the payload; the metadata prefix stays intact
        let location = dir.path().join("data/a.bin_chunk0");
        let raw = fs::read(&location).await.unwrap();
        fs::write(&location, &raw[..raw.len() / 2]).await.unwrap();

        let scan = store.scan().await.unwrap();
        assert_eq!(scan.total_chunks(), 1);
        assert_eq!(scan.chunks[0].absolute_file_path, "/data/a.bin");
        assert_eq!(scan.chunks[0].size, 20_000);
        assert_eq!(scan.used_bytes, (raw.len() / 2) as u64);
    }

    #[tokio::test]
    async fn scan_reports_nested_inventory_and_usage() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(dir.path()).unwrap();
        store.save(&sample_chunk("/data/a.bin", 0, 1)).await.unwrap();
        store.save(&sample_chunk("/data/a.bin", 1, 2)).await.unwrap();
        store.save(&sample_chunk("/other/deep/b.bin", 0, 3)).await.unwrap();

        let scan = store.scan().await.unwrap();
        assert_eq!(scan.total_chunks(), 3);
        assert!(scan.used_bytes > 3 * 20_000);
        assert_eq!(scan.free_space(), STORAGE_CAPACITY - scan.used_bytes);
        let mut slots: Vec<(String, u32)> = scan
            .chunks
            .iter()
            .map(|m| (m.absolute_file_path.clone(), m.sequence))
            .collect();
        slots.sort();
        assert_eq!(
            slots,
            vec![
                ("/data/a.bin".to_owned(), 0),
                ("/data/a.bin".to_owned(), 1),
                ("/other/deep/b.bin".to_owned(), 0),
            ]
        );
    }
}
