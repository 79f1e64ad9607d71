//! JSONL mirror reader

use crate::error::MirrorError;
use crate::log::ContractLog;
use grantflow_core::GrantId;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reader over the directory the external indexer writes into.
///
/// Files are read in name order; events are served sorted by block number
/// ascending regardless of file layout.
pub struct LogMirror {
    files: Vec<PathBuf>,
}

impl LogMirror {
    /// Create a mirror over a directory of `.jsonl` files.
    ///
    /// A missing directory is an empty feed, not an error; the indexer may
    /// simply not have produced anything yet.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, MirrorError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();
        Ok(Self { files })
    }

    /// All mirrored events, ordered by block number ascending.
    pub fn read_all(&self) -> Result<Vec<ContractLog>, MirrorError> {
        let mut logs = Vec::new();

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let log: ContractLog = serde_json::from_str(&line)?;
                logs.push(log);
            }
        }

        logs.sort_by(|a, b| a.block_number.cmp(&b.block_number).then(a.id.cmp(&b.id)));
        Ok(logs)
    }

    /// The ordered subsequence of events correlated to one grant.
    pub fn logs_for_grant(&self, grant_id: GrantId) -> Result<Vec<ContractLog>, MirrorError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|log| log.grant_id() == Some(grant_id))
            .collect())
    }

    /// Number of mirrored events
    pub fn count(&self) -> Result<usize, MirrorError> {
        Ok(self.read_all()?.len())
    }
}
