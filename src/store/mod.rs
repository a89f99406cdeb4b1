pub mod profile;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

pub use profile::StudentRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io failure: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt student record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable per-student state with atomic read-modify-write semantics.
///
/// One JSON document per student id. Mutations for the same student are
/// serialized behind a per-id async mutex held across the whole
/// read-modify-persist sequence; distinct students proceed in parallel.
/// Commits go through a temp file, fsync, then rename, so a record is either
/// fully replaced or untouched.
pub struct ProgressStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProgressStore {
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        let root = data_dir.join("students");
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    fn record_path(&self, student_id: &str) -> PathBuf {
        // Student ids come from callers; map anything outside a safe charset
        // so ids can never escape the store directory.
        let safe: String = student_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }

    fn lock_for(&self, student_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(student_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    async fn read_record(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        let path = self.record_path(student_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, record: &StudentRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.profile.student_id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(record)?;

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Reads a student record, creating the default zero-state in memory if
    /// none is persisted yet. The default is only written once a transaction
    /// commits.
    pub async fn load(&self, student_id: &str) -> Result<StudentRecord, StoreError> {
        let lock = self.lock_for(student_id);
        let _guard = lock.lock().await;
        Ok(self
            .read_record(student_id)
            .await?
            .unwrap_or_else(|| StudentRecord::new(student_id, chrono::Utc::now())))
    }

    /// Reads a record only if it exists; used by operations that must fail
    /// with `UnknownStudent` instead of auto-creating.
    pub async fn get(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        let lock = self.lock_for(student_id);
        let _guard = lock.lock().await;
        self.read_record(student_id).await
    }

    /// Applies `mutate` atomically: read (or default), mutate, persist. The
    /// per-id lock is held for the whole sequence, so concurrent transactions
    /// for one student compose instead of overwriting each other. If `mutate`
    /// fails or the durable write fails, nothing is committed.
    pub async fn transact<T, E, F>(&self, student_id: &str, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut StudentRecord) -> Result<T, E>,
        E: From<StoreError>,
    {
        let lock = self.lock_for(student_id);
        let _guard = lock.lock().await;

        let mut record = self
            .read_record(student_id)
            .await
            .map_err(E::from)?
            .unwrap_or_else(|| StudentRecord::new(student_id, chrono::Utc::now()));

        let out = mutate(&mut record)?;
        self.persist(&record).await.map_err(E::from)?;
        Ok(out)
    }

    /// All persisted records, for leaderboards and reports. Corrupt files are
    /// skipped with a warning rather than failing the whole listing.
    pub async fn list(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "skipping unreadable record");
                    continue;
                }
            };
            match serde_json::from_slice::<StudentRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "skipping corrupt record");
                }
            }
        }

        Ok(records)
    }

    /// Deletes a student's record. Returns whether one existed.
    pub async fn reset(&self, student_id: &str) -> Result<bool, StoreError> {
        let lock = self.lock_for(student_id);
        let _guard = lock.lock().await;

        let path = self.record_path(student_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
