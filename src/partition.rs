//! Hash partitioning of records into comparison buckets.

use crate::model::Record;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Compute a record's bucket index and identity hash.
///
/// Two records with equal identity values always land in the same bucket,
/// independent of field insertion order.
pub fn partition(record: &Record, bucket_count: u32) -> (u32, u64) {
    let hash = record.identity_hash();
    let index = (hash % u64::from(bucket_count.max(1))) as u32;
    (index, hash)
}

/// Partition a batch in parallel and group it by bucket index.
///
/// Within-bucket order follows batch input order.
pub fn group_by_bucket(records: Vec<Record>, bucket_count: u32) -> FxHashMap<u32, Vec<Record>> {
    let indexed: Vec<(u32, Record)> = records
        .into_par_iter()
        .map(|record| {
            let (index, _) = partition(&record, bucket_count);
            (index, record)
        })
        .collect();

    let mut grouped: FxHashMap<u32, Vec<Record>> = FxHashMap::default();
    for (index, record) in indexed {
        grouped.entry(index).or_default().push(record);
    }
    grouped
}
