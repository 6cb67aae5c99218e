use std::collections::VecDeque;
use storage::chunk::{ChunkMetadata, ChunkSlot};

/// Mutable inventory deltas accumulated between heartbeat reports. The store
/// request handler pushes, the heartbeat task drains; both go through one
/// mutex so a drain is atomic relative to concurrent pushes and FIFO order
/// is preserved.
#[derive(Debug, Default)]
pub struct ChunkserverState {
    newly_added_chunks: VecDeque<ChunkMetadata>,
    newly_corrupted_chunks: VecDeque<ChunkSlot>,
}

impl ChunkserverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&mut self, metadata: ChunkMetadata) {
        self.newly_added_chunks.push_back(metadata);
    }

    pub fn record_corrupted(&mut self, slot: ChunkSlot) {
        if !self.newly_corrupted_chunks.contains(&slot) {
            self.newly_corrupted_chunks.push_back(slot);
        }
    }

    pub fn drain_added(&mut self) -> Vec<ChunkMetadata> {
        self.newly_added_chunks.drain(..).collect()
    }

    pub fn drain_corrupted(&mut self) -> Vec<ChunkSlot> {
        self.newly_corrupted_chunks.drain(..).collect()
    }

    /// Puts a drained batch back at the head of the queue, ahead of anything
    /// recorded since the drain, so the next report carries it first.
    pub fn requeue_added(&mut self, batch: Vec<ChunkMetadata>) {
        for metadata in batch.into_iter().rev() {
            self.newly_added_chunks.push_front(metadata);
        }
    }

    pub fn requeue_corrupted(&mut self, batch: Vec<ChunkSlot>) {
        for slot in batch.into_iter().rev() {
            if !self.newly_corrupted_chunks.contains(&slot) {
                self.newly_corrupted_chunks.push_front(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_queue_in_insertion_order() {
        let mut state = ChunkserverState::new();
        for sequence in 0..4 {
            state.record_added(ChunkMetadata::new("/f".to_owned(), sequence, 10));
        }
        let drained = state.drain_added();
        let sequences: Vec<u32> = drained.iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
        assert!(state.drain_added().is_empty());
    }

    #[test]
    fn requeued_batch_goes_ahead_of_newer_entries() {
        let mut state = ChunkserverState::new();
        for sequence in 0..2 {
            state.record_added(ChunkMetadata::new("/f".to_owned(), sequence, 10));
        }
        let batch = state.drain_added();
        state.record_added(ChunkMetadata::new("/f".to_owned(), 2, 10));
        state.requeue_added(batch);
        let sequences: Vec<u32> = state.drain_added().iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn corrupted_slots_are_deduplicated() {
        let mut state = ChunkserverState::new();
        let slot = ChunkSlot {
            absolute_file_path: "/f".to_owned(),
            sequence: 1,
        };
        state.record_corrupted(slot.clone());
        state.record_corrupted(slot);
        assert_eq!(state.drain_corrupted().len(), 1);
    }
}
