pub mod chunk_server_metadata;
pub mod file_metadata;

use chunk_server_metadata::ChunkServerMetadata;
use file_metadata::FileMetadata;
use messages::chunkserver_controller::{MajorHeartbeat, MinorHeartbeat};
use std::collections::HashMap;
use std::time::Duration;
use storage::chunk::ChunkMetadata;
use utilities::{logger::info, result::Result};

/// The controller's whole world: chunk server health and inventory plus
/// file to replica location mappings. Callers hold this behind one mutex so
/// heartbeat folds and placement reads never interleave.
#[derive(Debug, Default)]
pub struct ControllerState {
    pub chunk_servers: HashMap<String, ChunkServerMetadata>,
    pub files: HashMap<String, FileMetadata>,
    replication_factor: usize,
}

impl ControllerState {
    pub fn new(replication_factor: usize) -> Self {
        Self {
            chunk_servers: HashMap::new(),
            files: HashMap::new(),
            replication_factor,
        }
    }

    pub fn is_known(&self, hostname: &str) -> bool {
        self.chunk_servers.contains_key(hostname)
    }

    /// Folds a minor heartbeat in: known hostnames are merged additively,
    /// unknown ones are registered fresh.
    pub fn update_chunk_server_metadata(&mut self, report: MinorHeartbeat) {
        self.update_files_metadata(&report.added_chunks, &report.hostname);
        match self.chunk_servers.get_mut(&report.hostname) {
            Some(entry) => {
                entry.merge_incremental(report.free_space, report.total_chunks, report.added_chunks)
            }
            None => {
                info!(hostname = %report.hostname, "Registering chunk server from first heartbeat");
                self.chunk_servers.insert(
                    report.hostname.clone(),
                    ChunkServerMetadata::new(
                        report.hostname,
                        report.free_space,
                        report.total_chunks,
                        report.added_chunks,
                    ),
                );
            }
        }
    }

    /// Folds a major heartbeat in: the report is a self consistent snapshot,
    /// so the stored entry is replaced outright instead of merged.
    pub fn replace_chunk_server_metadata(&mut self, report: MajorHeartbeat) {
        self.update_files_metadata(&report.chunks, &report.hostname);
        self.chunk_servers.insert(
            report.hostname.clone(),
            ChunkServerMetadata::new(
                report.hostname,
                report.free_space,
                report.total_chunks,
                report.chunks,
            ),
        );
    }

    pub fn update_files_metadata(&mut self, chunks: &[ChunkMetadata], hostname: &str) {
        for chunk in chunks {
            self.files
                .entry(chunk.absolute_file_path.clone())
                .or_insert_with(|| FileMetadata::new(chunk.absolute_file_path.clone()))
                .put(hostname, chunk.sequence);
        }
    }

    /// Picks the k least loaded live chunk servers by total chunks
    /// maintained. Partial selection: only the first k positions are
    /// ordered, so the result is a set, not a ranking. Fails explicitly when
    /// fewer than k live servers are known.
    pub fn select_best_chunk_servers(&self, expiry_threshold: Duration) -> Result<Vec<String>> {
        let k = self.replication_factor;
        let mut candidates: Vec<(&str, u64)> = self
            .chunk_servers
            .values()
            .filter(|entry| !entry.is_expired(expiry_threshold))
            .map(|entry| (entry.hostname.as_str(), entry.total_chunks))
            .collect();
        if candidates.len() < k {
            return Err(format!(
                "placement needs {k} live chunk servers but only {} are available",
                candidates.len()
            )
            .into());
        }
        for i in 0..k {
            let mut min = i;
            for j in (i + 1)..candidates.len() {
                if candidates[j].1 < candidates[min].1 {
                    min = j;
                }
            }
            candidates.swap(i, min);
        }
        Ok(candidates
            .into_iter()
            .take(k)
            .map(|(hostname, _)| hostname.to_owned())
            .collect())
    }

    pub fn read_locations(&self, absolute_file_path: &str) -> Result<Vec<Vec<String>>> {
        match self.files.get(absolute_file_path) {
            Some(file) => Ok(file.replica_sets()),
            None => Err(format!("no chunks recorded for file {absolute_file_path}").into()),
        }
    }
}
