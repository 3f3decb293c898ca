//! FileRecord and the ordered FileSet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, VirtualPath};

/// One virtual file in an exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub path: VirtualPath,
    pub content: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub active: bool,
}

impl FileRecord {
    pub fn new(path: VirtualPath, content: impl Into<String>) -> Self {
        FileRecord {
            path,
            content: content.into(),
            read_only: false,
            hidden: false,
            active: false,
        }
    }
}

/// The ordered virtual file set of one exercise.
///
/// Records keep seed order; paths are unique within a set. A copy of the seed
/// is retained so the set can revert on explicit reset.
#[derive(Debug, Clone)]
pub struct FileSet {
    records: Vec<FileRecord>,
    seed: Vec<FileRecord>,
}

impl FileSet {
    /// Build a set from seed records. A later record with a duplicate path
    /// replaces the earlier one in place, keeping the first occurrence's
    /// position.
    pub fn from_seed(seed: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut records: Vec<FileRecord> = Vec::new();
        for record in seed {
            match records.iter_mut().find(|r| r.path == record.path) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }
        FileSet {
            seed: records.clone(),
            records,
        }
    }

    pub fn get(&self, path: &VirtualPath) -> Option<&FileRecord> {
        self.records.iter().find(|r| &r.path == path)
    }

    /// Content of the file at `path`, if present.
    pub fn content(&self, path: &VirtualPath) -> Option<&str> {
        self.get(path).map(|r| r.content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The file the editor shows by default: the first record marked active,
    /// else the first non-hidden record.
    pub fn active_file(&self) -> Option<&FileRecord> {
        self.records
            .iter()
            .find(|r| r.active)
            .or_else(|| self.records.iter().find(|r| !r.hidden))
    }

    /// Overlay previously saved edits onto the seed.
    ///
    /// Saved content replaces seed content for known paths. Saved paths that
    /// are not part of the seed (files the learner created in an earlier
    /// session) are re-added at the end as hidden, editable records.
    pub fn apply_edits(&mut self, edits: &BTreeMap<VirtualPath, String>) {
        for (path, content) in edits {
            match self.records.iter_mut().find(|r| &r.path == path) {
                Some(record) => record.content = content.clone(),
                None => {
                    let mut record = FileRecord::new(path.clone(), content.clone());
                    record.hidden = true;
                    self.records.push(record);
                }
            }
        }
    }

    /// Replace the content of an editable file.
    pub fn set_content(&mut self, path: &VirtualPath, content: impl Into<String>) -> Result<(), Error> {
        let record = self
            .records
            .iter_mut()
            .find(|r| &r.path == path)
            .ok_or_else(|| Error::UnknownFile {
                path: path.to_string(),
            })?;

        if record.read_only {
            return Err(Error::ReadOnly {
                path: path.to_string(),
            });
        }

        record.content = content.into();
        Ok(())
    }

    /// Revert every record to the seed, dropping learner-created files.
    pub fn reset(&mut self) {
        self.records = self.seed.clone();
    }

    /// The current `path -> content` edit map: every record whose content
    /// differs from its seed, plus every record the seed does not know.
    pub fn edits(&self) -> BTreeMap<VirtualPath, String> {
        self.records
            .iter()
            .filter(|r| {
                self.seed
                    .iter()
                    .find(|s| s.path == r.path)
                    .map(|s| s.content != r.content)
                    .unwrap_or(true)
            })
            .map(|r| (r.path.clone(), r.content.clone()))
            .collect()
    }
}
