//! # Diff Engine
//!
//! Orchestrates ingestion into the bucket store and the bucket-parallel
//! comparison run that delivers classified results to a sink.

use crate::compare::compare_bucket;
use crate::config::DiffConfig;
use crate::model::{DatasetSide, Fields, Record};
use crate::partition;
use crate::store::{BucketStore, MemoryBucketStore};
use anyhow::Result;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Receiver of classified comparison results.
///
/// For each bucket the engine calls `on_more`, `on_diff`, `on_less` in that
/// order; buckets themselves complete in no particular order, possibly from
/// several threads at once. A returned error drops the remaining deliveries
/// for that bucket only.
pub trait DiffSink: Sync {
    fn on_more(&self, records: Vec<Record>) -> Result<()>;
    fn on_diff(&self, records: Vec<Record>) -> Result<()>;
    fn on_less(&self, records: Vec<Record>) -> Result<()>;
}

/// Sink that accumulates every delivery in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    more: Mutex<Vec<Record>>,
    diff: Mutex<Vec<Record>>,
    less: Mutex<Vec<Record>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn more(&self) -> Vec<Record> {
        self.more.lock().clone()
    }

    pub fn diff(&self) -> Vec<Record> {
        self.diff.lock().clone()
    }

    pub fn less(&self) -> Vec<Record> {
        self.less.lock().clone()
    }
}

impl DiffSink for CollectingSink {
    fn on_more(&self, mut records: Vec<Record>) -> Result<()> {
        self.more.lock().append(&mut records);
        Ok(())
    }

    fn on_diff(&self, mut records: Vec<Record>) -> Result<()> {
        self.diff.lock().append(&mut records);
        Ok(())
    }

    fn on_less(&self, mut records: Vec<Record>) -> Result<()> {
        self.less.lock().append(&mut records);
        Ok(())
    }
}

/// Bucketed differential-comparison engine over a pluggable store.
pub struct DiffEngine<S: BucketStore> {
    store: S,
    config: DiffConfig,
}

impl DiffEngine<MemoryBucketStore> {
    /// Engine backed by the in-memory reference store.
    pub fn in_memory(config: DiffConfig) -> Result<Self> {
        Self::new(MemoryBucketStore::new(), config)
    }
}

impl<S: BucketStore> DiffEngine<S> {
    /// Create an engine, failing fast on invalid configuration.
    pub fn new(store: S, config: DiffConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Partition one dataset batch and append it to the task's buckets.
    ///
    /// May be called repeatedly and concurrently for the same task; each call
    /// produces exactly one store write. An empty batch writes nothing.
    pub fn ingest(
        &self,
        task_id: &str,
        side: DatasetSide,
        identity_fields: &[String],
        batch: Vec<Fields>,
    ) -> Result<()> {
        let count = batch.len();
        let records: Vec<Record> = batch
            .into_par_iter()
            .map(|fields| Record::new(side, identity_fields, fields))
            .collect();
        let grouped = partition::group_by_bucket(records, self.config.bucket_count);
        debug!(
            task = task_id,
            side = %side,
            records = count,
            buckets = grouped.len(),
            "partitioned ingest batch"
        );
        self.store.write(task_id, grouped)
    }

    /// Compare the task's source records against its target records.
    ///
    /// One unit of work per bucket index, executed by a pool of
    /// `parallelism` worker threads; the call blocks until every bucket has
    /// completed. A failing bucket is logged and dropped without affecting
    /// the others. The task's bucket storage is released unconditionally
    /// once all workers finish.
    pub fn diff(
        &self,
        task_id: &str,
        ignore_fields: &HashSet<String>,
        sink: &dyn DiffSink,
    ) -> Result<()> {
        let bucket_count = self.config.bucket_count;
        let workers = self.config.worker_count().min(bucket_count as usize);

        let (tx, rx) = crossbeam_channel::unbounded::<u32>();
        for bucket in 0..bucket_count {
            tx.send(bucket)?;
        }
        drop(tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let rx = rx.clone();
                scope.spawn(move || {
                    while let Ok(bucket) = rx.recv() {
                        if let Err(err) = self.run_bucket(task_id, bucket, ignore_fields, sink) {
                            error!(
                                task = task_id,
                                bucket,
                                error = %err,
                                "bucket comparison failed; results dropped"
                            );
                        }
                    }
                });
            }
        });

        if let Err(err) = self.store.clean(task_id) {
            warn!(task = task_id, error = %err, "bucket cleanup failed");
        }
        Ok(())
    }

    fn run_bucket(
        &self,
        task_id: &str,
        bucket: u32,
        ignore_fields: &HashSet<String>,
        sink: &dyn DiffSink,
    ) -> Result<()> {
        let source = self.store.read(task_id, DatasetSide::Source, bucket)?;
        let target = self.store.read(task_id, DatasetSide::Target, bucket)?;
        let outcome = compare_bucket(source, target, ignore_fields);
        debug!(
            task = task_id,
            bucket,
            more = outcome.more.len(),
            diff = outcome.diff.len(),
            less = outcome.less.len(),
            "bucket compared"
        );
        sink.on_more(outcome.more)?;
        sink.on_diff(outcome.diff)?;
        sink.on_less(outcome.less)?;
        Ok(())
    }
}
