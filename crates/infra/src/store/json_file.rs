use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value as JsonValue;

use super::r#trait::{Collection, CollectionWrite, DataStore, Snapshot, StoreError, check_commit};

/// Directory-backed store: one pretty-printed JSON array per collection
/// (`products.json`, `fields.json`, `movements.json`).
///
/// A commit first writes every collection to a temp file and keeps a backup
/// link to each file it replaces, then renames the temps into place. If any
/// step fails, the files already replaced are restored from their backups,
/// so a commit lands on disk completely or not at all.
///
/// Versions are tracked per handle: a file present at open time starts at
/// version 1. Only one handle should point at a directory.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    versions: Mutex<HashMap<Collection, u64>>,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::Io(format!("create {}: {e}", root.display())))?;

        let versions = Collection::ALL
            .iter()
            .map(|c| (*c, u64::from(collection_path(&root, *c).exists())))
            .collect();

        tracing::info!(root = %root.display(), "opened json file store");
        Ok(Self {
            root,
            versions: Mutex::new(versions),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, collection: Collection) -> PathBuf {
        collection_path(&self.root, collection)
    }

    fn read_records(&self, collection: Collection) -> Result<Vec<JsonValue>, StoreError> {
        let path = self.path_of(collection);
        if !path.exists() {
            return Ok(vec![]);
        }
        let bytes = std::fs::read(&path)
            .map_err(|e| StoreError::Io(format!("read {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
    }
}

fn collection_path(root: &Path, collection: Collection) -> PathBuf {
    root.join(format!("{}.json", collection.key()))
}

/// Hidden sibling of `path` used while a commit is in flight.
fn sibling(path: &Path, kind: &str) -> PathBuf {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("collection");
    path.with_file_name(format!(".{name}.{kind}.{}", std::process::id()))
}

fn write_temp(path: &Path, records: &[JsonValue]) -> Result<PathBuf, StoreError> {
    let bytes = serde_json::to_vec_pretty(records)
        .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
    let tmp = sibling(path, "tmp");
    let written = std::fs::File::create(&tmp).and_then(|mut f| {
        f.write_all(&bytes)?;
        f.sync_all()
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::Io(format!("write {}: {e}", tmp.display())));
    }
    Ok(tmp)
}

/// Keep the current contents of `target` reachable under a second name until
/// the commit is settled. Only regular files are backed up.
fn back_up(target: &Path) -> Result<Option<PathBuf>, StoreError> {
    if !target.is_file() {
        return Ok(None);
    }
    let backup = sibling(target, "bak");
    let _ = std::fs::remove_file(&backup);
    std::fs::hard_link(target, &backup)
        .or_else(|_| std::fs::copy(target, &backup).map(|_| ()))
        .map_err(|e| StoreError::Io(format!("back up {}: {e}", target.display())))?;
    Ok(Some(backup))
}

/// One collection file being replaced by a commit.
#[derive(Debug)]
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
    backup: Option<PathBuf>,
    placed: bool,
}

/// Put every target back the way it was and drop all commit leftovers.
fn roll_back(staged: &[Staged]) {
    for s in staged.iter().rev() {
        if s.placed {
            match &s.backup {
                Some(backup) => {
                    if let Err(e) = std::fs::rename(backup, &s.target) {
                        tracing::error!(target = %s.target.display(), error = %e, "failed to restore collection file");
                    }
                }
                None => {
                    let _ = std::fs::remove_file(&s.target);
                }
            }
        }
        let _ = std::fs::remove_file(&s.tmp);
        if let Some(backup) = &s.backup {
            let _ = std::fs::remove_file(backup);
        }
    }
}

impl JsonFileStore {
    /// Write every collection to a temp file and back up what it replaces.
    fn stage(&self, writes: &[CollectionWrite]) -> Result<Vec<Staged>, StoreError> {
        let mut staged = Vec::with_capacity(writes.len());
        for w in writes {
            let target = self.path_of(w.collection);
            let tmp = match write_temp(&target, &w.records) {
                Ok(tmp) => tmp,
                Err(err) => {
                    roll_back(&staged);
                    return Err(err);
                }
            };
            let backup = match back_up(&target) {
                Ok(backup) => backup,
                Err(err) => {
                    let _ = std::fs::remove_file(&tmp);
                    roll_back(&staged);
                    return Err(err);
                }
            };
            staged.push(Staged {
                tmp,
                target,
                backup,
                placed: false,
            });
        }
        Ok(staged)
    }
}

impl DataStore for JsonFileStore {
    fn load(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        // Hold the writer lock so a load never observes half of a commit.
        let versions = self.versions.lock().map_err(|_| StoreError::Poisoned)?;
        let version = versions.get(&collection).copied().unwrap_or(0);
        let records = self.read_records(collection)?;
        Ok(Snapshot { version, records })
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<Vec<u64>, StoreError> {
        if writes.is_empty() {
            return Ok(vec![]);
        }

        let mut versions = self.versions.lock().map_err(|_| StoreError::Poisoned)?;
        check_commit(&writes, |c| versions.get(&c).copied().unwrap_or(0))?;

        let mut staged = self.stage(&writes)?;
        for idx in 0..staged.len() {
            let s = &staged[idx];
            if let Err(e) = std::fs::rename(&s.tmp, &s.target) {
                let err = StoreError::Io(format!(
                    "rename {} -> {}: {e}",
                    s.tmp.display(),
                    s.target.display()
                ));
                roll_back(&staged);
                return Err(err);
            }
            staged[idx].placed = true;
        }
        for backup in staged.iter().filter_map(|s| s.backup.as_ref()) {
            let _ = std::fs::remove_file(backup);
        }
        if let Ok(dir) = std::fs::File::open(&self.root) {
            let _ = dir.sync_all();
        }

        let mut new_versions = Vec::with_capacity(writes.len());
        for w in &writes {
            let v = versions.entry(w.collection).or_insert(0);
            *v += 1;
            new_versions.push(*v);
        }

        tracing::debug!(root = %self.root.display(), versions = ?new_versions, "json file store commit");
        Ok(new_versions)
    }
}
