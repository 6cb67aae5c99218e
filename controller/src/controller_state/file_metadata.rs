use std::collections::HashSet;

/// Replica locations for one client file: the set at index i holds the
/// hostnames known to store chunk i. Writing a high sequence first leaves
/// empty sets in the gap until those chunks are reported.
#[derive(Clone, Debug, Default)]
pub struct FileMetadata {
    pub absolute_file_path: String,
    pub replica_holders: Vec<HashSet<String>>,
}

impl FileMetadata {
    pub fn new(absolute_file_path: String) -> Self {
        Self {
            absolute_file_path,
            replica_holders: Vec::new(),
        }
    }

    pub fn put(&mut self, hostname: &str, sequence: u32) {
        let index = sequence as usize;
        while self.replica_holders.len() <= index {
            self.replica_holders.push(HashSet::new());
        }
        self.replica_holders[index].insert(hostname.to_owned());
    }

    /// Every known sequence has at least one replica holder.
    pub fn is_complete(&self) -> bool {
        !self.replica_holders.is_empty()
            && self.replica_holders.iter().all(|holders| !holders.is_empty())
    }

    /// Holders per sequence, sorted for a deterministic response.
    pub fn replica_sets(&self) -> Vec<Vec<String>> {
        self.replica_holders
            .iter()
            .map(|holders| {
                let mut hostnames: Vec<String> = holders.iter().cloned().collect();
                hostnames.sort();
                hostnames
            })
            .collect()
    }
}
