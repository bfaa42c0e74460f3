//! The accumulated results of a sweep and their persistence.
//!
//! The record is keyed by architecture name, then pooling name, then hidden size. It is dumped as one
//! pretty printed json document, rewritten in full at each persistence event:
//!
//! ```text
//! {
//!   "graphsage": {
//!     "mean": {
//!       "32": { "train": { "mean": 0.98, "std": 0.03 }, "test": { "mean": 0.97, "std": 0.04 } }
//!     }
//!   }
//! }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::stats::SplitStats;
use crate::error::{GnnError, Result};
use crate::models::ModelKind;
use crate::pool::Pooling;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    entries: IndexMap<String, IndexMap<String, IndexMap<usize, SplitStats>>>,
}

impl ResultRecord {
    pub fn new() -> Self {
        ResultRecord::default()
    }

    /// records a completed combination. Returns false (and keeps the record unchanged) if it was already there
    pub fn insert(&mut self, kind: ModelKind, pooling: Pooling, hidden: usize, stats: SplitStats) -> bool {
        if self.contains(kind, pooling, hidden) {
            log::warn!("combination {} {} {} already recorded", kind, pooling, hidden);
            return false;
        }
        self.entries
            .entry(kind.name().to_string())
            .or_default()
            .entry(pooling.name().to_string())
            .or_default()
            .insert(hidden, stats);
        true
    }

    pub fn get(&self, kind: ModelKind, pooling: Pooling, hidden: usize) -> Option<&SplitStats> {
        self.entries.get(kind.name())?.get(pooling.name())?.get(&hidden)
    }

    pub fn contains(&self, kind: ModelKind, pooling: Pooling, hidden: usize) -> bool {
        self.get(kind, pooling, hidden).is_some()
    }

    /// number of recorded combinations
    pub fn len(&self) -> usize {
        self.entries.values().flat_map(|by_pool| by_pool.values()).map(|by_hidden| by_hidden.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrites path with the whole record.
    ///
    /// The document goes to a sibling temporary file, flushed to disk, which then replaces path.
    /// A reader never sees a truncated document.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let tmp_path = tmp_path_for(path);
        self.write_synced(&tmp_path).map_err(|e| {
            log::error!("could not write result record in {} : {}", tmp_path.display(), e);
            GnnError::Persistence(format!("writing {} : {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            log::error!("could not move {} to {} : {}", tmp_path.display(), path.display(), e);
            GnnError::Persistence(format!("renaming {} to {} : {}", tmp_path.display(), path.display(), e))
        })?;
        log::info!("result record with {} entries persisted in {}", self.len(), path.display());
        Ok(())
    } // end of persist

    fn write_synced(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        let mut bufwriter = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut bufwriter, self)?;
        bufwriter.write_all(b"\n")?;
        let file = bufwriter.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    /// reloads a record dumped by [ResultRecord::persist]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            log::error!("could not open result record {} : {}", path.display(), e);
            e
        })?;
        let record: ResultRecord = serde_json::from_reader(BufReader::new(file))?;
        log::info!("reloaded result record with {} entries from {}", record.len(), path.display());
        Ok(record)
    }
} // end of impl ResultRecord

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// end of mod tests
