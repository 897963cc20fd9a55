use std::fs;
use std::path::PathBuf;

use crate::error::ReplogError;

/// Durable storage for state-machine snapshots, keyed by the log index of
/// the last command folded into them.
///
/// Grounded on `state_machine.cpp`'s `save_logical_snp_obj`/`read_logical_snp_obj`:
/// snapshots are named by log index, written to a temp file and renamed into
/// place (so a crash mid-write never leaves a partial snapshot visible under
/// its real name), and loading scans the directory for the highest index.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, log_index: u64, bytes: &[u8]) -> Result<(), ReplogError>;

    /// Loads the snapshot with the highest log index, or `None` if the store
    /// is empty (fresh node, no snapshot taken yet).
    fn load_latest(&self) -> Result<Option<(u64, Vec<u8>)>, ReplogError>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ReplogError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
        Ok(FileSnapshotStore { dir })
    }

    fn path_for(&self, log_index: u64) -> PathBuf {
        self.dir.join(log_index.to_string())
    }

    fn list_indices(&self) -> Result<Vec<u64>, ReplogError> {
        let mut indices = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(idx) = name.parse::<u64>() {
                    indices.push(idx);
                }
            }
        }
        Ok(indices)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, log_index: u64, bytes: &[u8]) -> Result<(), ReplogError> {
        let tmp_path = self.dir.join(format!(".{log_index}.tmp"));
        fs::write(&tmp_path, bytes).map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
        fs::rename(&tmp_path, self.path_for(log_index)).map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
        tracing::info!(log_index, "wrote snapshot");
        Ok(())
    }

    fn load_latest(&self) -> Result<Option<(u64, Vec<u8>)>, ReplogError> {
        let indices = self.list_indices()?;
        let Some(&max_idx) = indices.iter().max() else {
            return Ok(None);
        };
        let bytes = fs::read(self.path_for(max_idx)).map_err(|e| ReplogError::SnapshotIo(e.to_string()))?;
        Ok(Some((max_idx, bytes)))
    }
}
