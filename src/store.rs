//! # Bucket Store
//!
//! Pluggable persistence of partitioned records, keyed by task and bucket
//! index, plus the dashmap-backed in-memory reference implementation.

use crate::model::{DatasetSide, Record};
use anyhow::Result;
use dashmap::DashMap;
use rustc_hash::FxHashMap;

/// Storage contract between the ingestion path and the diff engine.
///
/// Implementations must make `write` atomic per `(task_id, bucket_index)`
/// with respect to concurrent callers: a merge appends to whatever the store
/// already holds, never replaces it. Reads during a diff run are assumed to
/// happen after all relevant ingestion for that task has completed.
pub trait BucketStore: Send + Sync {
    /// Append a batch of partitioned records into the task's buckets.
    fn write(&self, task_id: &str, grouped: FxHashMap<u32, Vec<Record>>) -> Result<()>;

    /// Read one bucket's records, filtered to a single dataset side.
    fn read(&self, task_id: &str, side: DatasetSide, bucket: u32) -> Result<Vec<Record>>;

    /// Drop all buckets held for the task.
    fn clean(&self, task_id: &str) -> Result<()>;
}

/// In-process concurrent-map store: task id -> bucket index -> records.
///
/// Buckets are created lazily on first write and destroyed together by
/// `clean`. The store is an owned object injected into the engine, not
/// process-wide state.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    tasks: DashMap<String, DashMap<u32, Vec<Record>>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently holding buckets.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of records held in one bucket, both sides combined.
    pub fn bucket_len(&self, task_id: &str, bucket: u32) -> usize {
        self.tasks
            .get(task_id)
            .and_then(|task| task.get(&bucket).map(|records| records.len()))
            .unwrap_or(0)
    }
}

impl BucketStore for MemoryBucketStore {
    fn write(&self, task_id: &str, grouped: FxHashMap<u32, Vec<Record>>) -> Result<()> {
        let task = self.tasks.entry(task_id.to_string()).or_default();
        let mut appended = 0usize;
        for (bucket, mut records) in grouped {
            appended += records.len();
            // Entry guard makes the merge atomic per bucket.
            task.entry(bucket).or_default().append(&mut records);
        }
        tracing::debug!(
            task = task_id,
            buckets = task.len(),
            appended,
            "merged batch into bucket store"
        );
        Ok(())
    }

    fn read(&self, task_id: &str, side: DatasetSide, bucket: u32) -> Result<Vec<Record>> {
        let Some(task) = self.tasks.get(task_id) else {
            return Ok(Vec::new());
        };
        let Some(records) = task.get(&bucket) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .filter(|record| record.side() == side)
            .cloned()
            .collect())
    }

    fn clean(&self, task_id: &str) -> Result<()> {
        self.tasks.remove(task_id);
        Ok(())
    }
}
