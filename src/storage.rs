// Local file storage for the timetable snapshot.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to TimetableStore or the entity structs it holds require
// incrementing STORAGE_VERSION below and adding a migration step.
use crate::context::AppContext;
use crate::store::TimetableStore;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Version history:
// - v0: bare TimetableStore object, no envelope
// - v1: versioned envelope
const STORAGE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StorageData {
    #[serde(default)]
    version: u32,
    timetable: TimetableStore,
}

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Loads the snapshot. A missing file is an empty timetable; an
    /// unreadable one is an error so that a later save cannot clobber it.
    pub fn load(ctx: &dyn AppContext) -> Result<TimetableStore> {
        let path = ctx.get_timetable_path()?;
        Self::load_from_path(&path)
    }

    pub fn save(ctx: &dyn AppContext, store: &TimetableStore) -> Result<()> {
        let path = ctx.get_timetable_path()?;
        Self::save_to_path(&path, store)
    }

    fn load_from_path(path: &Path) -> Result<TimetableStore> {
        if !path.exists() {
            return Ok(TimetableStore::default());
        }
        Self::with_lock(path, || {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            match serde_json::from_str::<StorageData>(&json) {
                Ok(data) if data.version == STORAGE_VERSION => return Ok(data.timetable),
                Ok(data) => anyhow::bail!(
                    "{} uses storage v{}, this build reads v{}",
                    path.display(),
                    data.version,
                    STORAGE_VERSION
                ),
                // No envelope: v0
                Err(_) => {}
            }

            let store = Self::migrate_to_current(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            log::info!(
                "Migrated {} to storage v{}",
                path.display(),
                STORAGE_VERSION
            );
            Self::write_versioned(path, &store)?;
            Ok(store)
        })
    }

    fn save_to_path(path: &Path, store: &TimetableStore) -> Result<()> {
        Self::with_lock(path, || Self::write_versioned(path, store))
    }

    fn write_versioned(path: &Path, store: &TimetableStore) -> Result<()> {
        let data = StorageData {
            version: STORAGE_VERSION,
            timetable: store.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        Self::atomic_write(path, json)
    }

    fn migrate_to_current(json: &str) -> Result<TimetableStore> {
        // v0 files are the bare snapshot object.
        serde_json::from_str::<TimetableStore>(json)
            .map_err(|e| anyhow::anyhow!("Failed to migrate v0 timetable: {}", e))
    }

    /// Replaces the local snapshot with one read from an external JSON file.
    /// Accepts both the bare and the versioned layout. Invalid entries abort
    /// the import before anything is written.
    pub fn import_file(ctx: &dyn AppContext, source: &Path) -> Result<TimetableStore> {
        let json = fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        let store = match serde_json::from_str::<StorageData>(&json) {
            Ok(data) => data.timetable,
            Err(_) => Self::migrate_to_current(&json)?,
        };

        let invalid = store.invalid_entries();
        if let Some((id, err)) = invalid.first() {
            anyhow::bail!(
                "{} invalid entr{} in {} (first: '{}': {})",
                invalid.len(),
                if invalid.len() == 1 { "y" } else { "ies" },
                source.display(),
                id,
                err
            );
        }

        Self::save(ctx, &store)?;
        Ok(store)
    }
}
