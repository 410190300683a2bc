use anyhow::{bail, Result};
use bucketdiff::{
    partition, DatasetSide, DiffConfig, DiffEngine, DiffSink, Record, Value,
};
use parking_lot::Mutex;
use std::collections::HashSet;

mod support;
use support::{id_only, identity, ids_of, row};

const BUCKETS: u32 = 8;
const POISON_ID: i64 = 13;

/// Sink that fails whenever a More delivery contains the poison record.
#[derive(Default)]
struct PoisonedSink {
    more: Mutex<Vec<Record>>,
    diff: Mutex<Vec<Record>>,
    less: Mutex<Vec<Record>>,
}

impl DiffSink for PoisonedSink {
    fn on_more(&self, mut records: Vec<Record>) -> Result<()> {
        if records
            .iter()
            .any(|r| r.fields().get("id") == Some(&Value::Int(POISON_ID)))
        {
            bail!("handler rejected batch");
        }
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

fn bucket_of(id: i64) -> u32 {
    let record = Record::new(DatasetSide::Source, &identity(), id_only(id));
    partition::partition(&record, BUCKETS).0
}

#[test]
fn failing_bucket_is_isolated_and_cleanup_still_runs() {
    let engine = DiffEngine::in_memory(DiffConfig::new(BUCKETS, 4)).unwrap();
    let ids: Vec<i64> = (0..40).collect();
    let batch: Vec<_> = ids.iter().map(|&i| row(i, "only-source")).collect();
    engine
        .ingest("task", DatasetSide::Source, &identity(), batch)
        .unwrap();

    let sink = PoisonedSink::default();
    // A failed bucket never fails the overall run.
    engine.diff("task", &HashSet::new(), &sink).unwrap();

    // Exactly the poisoned bucket's records are missing.
    let poisoned = bucket_of(POISON_ID);
    let expected: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|&id| bucket_of(id) != poisoned)
        .collect();
    assert!(expected.len() < ids.len());
    assert_eq!(ids_of(&sink.more.lock()), expected);

    // Cleanup runs even though a bucket failed.
    assert_eq!(engine.store().task_count(), 0);
}

#[test]
fn handler_failure_skips_that_buckets_later_deliveries() {
    // Single bucket: the More failure must also suppress Diff and Less for it.
    let engine = DiffEngine::in_memory(DiffConfig::new(1, 1)).unwrap();
    engine
        .ingest(
            "task",
            DatasetSide::Source,
            &identity(),
            vec![row(POISON_ID, "a"), row(1, "changed")],
        )
        .unwrap();
    engine
        .ingest(
            "task",
            DatasetSide::Target,
            &identity(),
            vec![row(1, "original"), row(2, "gone")],
        )
        .unwrap();

    let sink = PoisonedSink::default();
    engine.diff("task", &HashSet::new(), &sink).unwrap();

    assert!(sink.more.lock().is_empty());
    assert!(sink.diff.lock().is_empty());
    assert!(sink.less.lock().is_empty());
    assert_eq!(engine.store().task_count(), 0);
}
