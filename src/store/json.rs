use super::{created_desc, DiaryEntry, DiaryStore, EntryPatch, NewEntry, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk layout of the diary file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    next_id: u64,
    entries: Vec<DiaryEntry>,
}

impl StoreDocument {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

/// Diary kept in a single JSON file.
///
/// Changes are staged in memory; `commit` rewrites the file.
#[derive(Debug, Default)]
pub struct JsonStore {
    path: Option<PathBuf>,
    document: StoreDocument,
}

impl JsonStore {
    /// Open the diary at `path`. A missing file is an empty diary; an
    /// unreadable or unknown-version file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "no diary file yet");
            return Ok(Self {
                path: Some(path),
                document: StoreDocument::default(),
            });
        }

        let reader = BufReader::new(File::open(&path)?);
        let document: StoreDocument = serde_json::from_reader(reader)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;

        if document.version != StoreDocument::CURRENT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "{}: unsupported version {}",
                path.display(),
                document.version
            )));
        }

        debug!(path = %path.display(), entries = document.entries.len(), "diary loaded");
        Ok(Self {
            path: Some(path),
            document,
        })
    }

    /// A diary that is never written anywhere
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.document.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.entries.is_empty()
    }

    fn position(&self, id: u64) -> Result<usize, StoreError> {
        self.document
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

impl DiaryStore for JsonStore {
    fn create(&mut self, entry: NewEntry) -> Result<DiaryEntry, StoreError> {
        entry.validate()?;

        let id = self.document.next_id;
        self.document.next_id += 1;

        let created = DiaryEntry {
            id,
            external_id: entry.external_id,
            kind: entry.kind,
            title: entry.title.trim().to_string(),
            poster_url: entry.poster_url,
            date_watched: entry.date_watched,
            rating: entry.rating,
            review: entry.review,
            created_at: Utc::now(),
        };
        self.document.entries.push(created.clone());
        Ok(created)
    }

    fn get(&self, id: u64) -> Option<DiaryEntry> {
        self.document.entries.iter().find(|e| e.id == id).cloned()
    }

    fn list(&self) -> Vec<DiaryEntry> {
        let mut entries = self.document.entries.clone();
        entries.sort_by(created_desc);
        entries
    }

    fn update(&mut self, id: u64, patch: EntryPatch) -> Result<DiaryEntry, StoreError> {
        let index = self.position(id)?;
        patch.validate()?;

        let entry = &mut self.document.entries[index];
        patch.apply(entry);
        Ok(entry.clone())
    }

    fn delete(&mut self, id: u64) -> Result<DiaryEntry, StoreError> {
        let index = self.position(id)?;
        Ok(self.document.entries.remove(index))
    }

    fn clear(&mut self) -> usize {
        let removed = self.document.entries.len();
        self.document.entries.clear();
        removed
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // write beside the target, then swap it in
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &self.document)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        debug!(path = %path.display(), entries = self.document.entries.len(), "diary saved");
        Ok(())
    }
}
