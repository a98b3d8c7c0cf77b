//! Manual-edit preservation
//!
//! Keeps a path→fingerprint index of everything the last run generated. Before
//! writing a file, the current on-disk content is compared against the last
//! recorded fingerprint: a mismatch means the user hand-edited the file since
//! the previous run, so the write is skipped and reported instead of silently
//! overwritten. The index is the only state that survives across invocations;
//! it is loaded once before generation and saved once after.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::workspace::Workspace;

/// Index file name, relative to the output root
pub const INDEX_FILE: &str = ".charlie-track.json";

const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TrackIndex {
    version: u32,
    generated_at: DateTime<Utc>,
    /// Relative path (forward slashes) → blake3 hex of last generated content
    files: IndexMap<String, String>,
}

impl Default for TrackIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            generated_at: Utc::now(),
            files: IndexMap::new(),
        }
    }
}

/// What happened to one output path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Hand-edited since the last run; left untouched
    Conflict,
}

pub struct Tracker {
    index: TrackIndex,
}

impl Tracker {
    /// Load the index from the workspace, starting empty when absent
    pub fn load(ws: &dyn Workspace) -> Result<Self> {
        let index = match ws.read(Path::new(INDEX_FILE))? {
            Some(content) => match serde_json::from_str(&content) {
                Ok(index) => index,
                Err(e) => {
                    log::warn!("unreadable tracker index, starting fresh: {e}");
                    TrackIndex::default()
                }
            },
            None => TrackIndex::default(),
        };
        Ok(Self { index })
    }

    /// Persist the index back to the workspace
    pub fn save(&mut self, ws: &mut dyn Workspace) -> Result<()> {
        self.index.generated_at = Utc::now();
        let content =
            serde_json::to_string_pretty(&self.index).map_err(|e| Error::Serialize(e.to_string()))?;
        ws.write(Path::new(INDEX_FILE), &(content + "\n"))?;
        Ok(())
    }

    /// Write `content` to `rel` unless the file was hand-edited
    pub fn write(&mut self, ws: &mut dyn Workspace, rel: &str, content: &[u8]) -> Result<WriteOutcome> {
        let current = ws.read_bytes(Path::new(rel))?;
        let new_fingerprint = fingerprint(content);

        match current {
            None => {
                ws.write_bytes(Path::new(rel), content)?;
                self.index.files.insert(rel.to_string(), new_fingerprint);
                Ok(WriteOutcome::Written)
            }
            Some(on_disk) if on_disk == content => {
                // already up to date; adopt into the index without rewriting
                self.index.files.insert(rel.to_string(), new_fingerprint);
                Ok(WriteOutcome::Written)
            }
            Some(on_disk) => match self.index.files.get(rel) {
                Some(recorded) if *recorded == fingerprint(&on_disk) => {
                    ws.write_bytes(Path::new(rel), content)?;
                    self.index.files.insert(rel.to_string(), new_fingerprint);
                    Ok(WriteOutcome::Written)
                }
                // recorded but changed on disk, or never generated and the
                // file already exists with different content
                _ => Ok(WriteOutcome::Conflict),
            },
        }
    }
}

fn fingerprint(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}
