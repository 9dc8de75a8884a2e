//! Snapshot file reads, writes and cleanup.
//!
//! Every failure in here is logged and turned into "no cache"; nothing
//! returns an error to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use super::row::{REQUIRED_COLUMNS, SnapshotRow};
use super::tag::DayTag;
use crate::model::CombinedRecord;

const FILE_PREFIX: &str = "combined_";
const FILE_EXT: &str = ".csv";

#[derive(Debug, thiserror::Error)]
enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// The merged and scored table for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tag: DayTag,
    pub dataset_key: Option<String>,
    pub records: Vec<CombinedRecord>,
}

/// A file name that matches `combined_[<key>_]<YYYYMMDD>.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheFile {
    path: PathBuf,
    key: Option<String>,
    tag: DayTag,
}

/// Split a snapshot file name into its optional key and tag.
fn parse_file_name(name: &str) -> Option<(Option<String>, DayTag)> {
    let core = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_EXT)?;
    match core.rsplit_once('_') {
        Some((key, tag)) if !key.is_empty() => Some((Some(key.to_string()), DayTag::parse(tag)?)),
        Some(_) => None,
        None => Some((None, DayTag::parse(core)?)),
    }
}

/// Per-day snapshot files in a single directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: Option<&str>, tag: &DayTag) -> PathBuf {
        let name = match key {
            Some(key) => format!("{FILE_PREFIX}{key}_{tag}{FILE_EXT}"),
            None => format!("{FILE_PREFIX}{tag}{FILE_EXT}"),
        };
        self.dir.join(name)
    }

    /// Read the snapshot for `key` tagged `tag`, if present and valid.
    pub fn read_today(&self, key: &str, tag: &DayTag) -> Option<Snapshot> {
        let path = self.path_for(Some(key), tag);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot for today");
            return None;
        }
        let records = self.load(&path)?;
        Some(Snapshot { tag: tag.clone(), dataset_key: Some(key.to_string()), records })
    }

    /// The newest valid snapshot of any day.
    ///
    /// Among files with the same tag, `preferred_key` wins. Invalid files are
    /// skipped in favour of older valid ones.
    pub fn read_latest_any(&self, preferred_key: &str) -> Option<Snapshot> {
        let mut files = self.list();
        files.sort_by(|a, b| {
            b.tag
                .cmp(&a.tag)
                .then_with(|| (b.key.as_deref() == Some(preferred_key)).cmp(&(a.key.as_deref() == Some(preferred_key))))
        });

        files.into_iter().find_map(|file| {
            let records = self.load(&file.path)?;
            tracing::debug!(path = %file.path.display(), tag = %file.tag, "adopting latest snapshot");
            Some(Snapshot { tag: file.tag, dataset_key: file.key, records })
        })
    }

    /// Persist `snapshot` under its tag and key.
    ///
    /// Outside cache-only mode every snapshot with a different tag is deleted,
    /// once before and once after the write. Returns whether the file landed.
    pub fn write(&self, snapshot: &Snapshot, cache_only: bool) -> bool {
        if !cache_only {
            self.cleanup(&snapshot.tag);
        }

        let path = self.path_for(snapshot.dataset_key.as_deref(), &snapshot.tag);
        let written = match self.write_file(&path, &snapshot.records) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), rows = snapshot.records.len(), "snapshot written");
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to write snapshot");
                false
            }
        };

        if !cache_only {
            self.cleanup(&snapshot.tag);
        }
        written
    }

    /// Delete every snapshot file whose tag is not `preserve`.
    ///
    /// Returns the number of files removed.
    pub fn cleanup(&self, preserve: &DayTag) -> usize {
        let mut removed = 0;
        for file in self.list().into_iter().filter(|f| &f.tag != preserve) {
            match fs::remove_file(&file.path) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(path = %file.path.display(), "deleted stale snapshot");
                }
                Err(err) => tracing::warn!(path = %file.path.display(), error = %err, "could not delete snapshot"),
            }
        }
        removed
    }

    fn list(&self) -> Vec<CacheFile> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), error = %err, "cannot scan cache directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                let name = entry.file_name();
                let (key, tag) = parse_file_name(name.to_str()?)?;
                Some(CacheFile { path: entry.path(), key, tag })
            })
            .collect()
    }

    fn load(&self, path: &Path) -> Option<Vec<CombinedRecord>> {
        match read_records(path) {
            Ok(Some(records)) => {
                tracing::debug!(path = %path.display(), rows = records.len(), "snapshot valid");
                Some(records)
            }
            Ok(None) => {
                tracing::warn!(path = %path.display(), "snapshot failed validation");
                None
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read snapshot");
                None
            }
        }
    }

    fn write_file(&self, path: &Path, records: &[CombinedRecord]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("snapshot");
        let tmp = self.dir.join(format!(".{file_name}.tmp"));

        let mut writer = csv::Writer::from_path(&tmp)?;
        for record in records {
            writer.serialize(SnapshotRow::from(record))?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// `Ok(None)` when the file parses but fails validation.
fn read_records(path: &Path) -> Result<Option<Vec<CombinedRecord>>, CacheError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .collect();
    if !missing.is_empty() {
        tracing::debug!(path = %path.display(), ?missing, "snapshot missing required columns");
        return Ok(None);
    }

    let rows: Vec<SnapshotRow> = reader.deserialize().collect::<Result<_, _>>()?;
    let records: Vec<CombinedRecord> = rows.into_iter().map(CombinedRecord::from).collect();

    let has_city = records.iter().any(|r| !r.city.is_empty());
    let has_country = records.iter().any(|r| r.country.is_some());
    if records.is_empty() || !has_city || !has_country {
        return Ok(None);
    }
    Ok(Some(records))
}
