//! # Bucket Comparison
//!
//! The per-bucket hash-join classification of source records against target
//! records into More / Diff / Less result sets.

use crate::model::Record;
use rustc_hash::FxHashMap;
use std::collections::HashSet;

/// Classified outcome of comparing one bucket.
///
/// `more` holds records present only in source, `diff` holds source records
/// whose identity matched a target but whose compared values differ, and
/// `less` holds target records never matched by a source record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketDiff {
    pub more: Vec<Record>,
    pub diff: Vec<Record>,
    pub less: Vec<Record>,
}

impl BucketDiff {
    pub fn is_empty(&self) -> bool {
        self.more.is_empty() && self.diff.is_empty() && self.less.is_empty()
    }
}

/// Compare one bucket's source records against its target records.
///
/// Fields named in `ignore_fields` are excluded from value comparison but
/// never from identity matching.
pub fn compare_bucket(
    source: Vec<Record>,
    target: Vec<Record>,
    ignore_fields: &HashSet<String>,
) -> BucketDiff {
    compare_with(source, target, ignore_fields, Record::identity_hash)
}

/// Hash-join comparison with an injectable hash function.
///
/// Collisions are expected: candidates sharing a hash are disambiguated by
/// full identity-signature comparison, and a source record consumes at most
/// one candidate (first signature match wins).
fn compare_with(
    source: Vec<Record>,
    target: Vec<Record>,
    ignore_fields: &HashSet<String>,
    hash_of: impl Fn(&Record) -> u64,
) -> BucketDiff {
    let mut outcome = BucketDiff::default();

    if source.is_empty() && target.is_empty() {
        return outcome;
    }
    if source.is_empty() {
        outcome.less = target;
        return outcome;
    }
    if target.is_empty() {
        outcome.more = source;
        return outcome;
    }

    let mut candidates: FxHashMap<u64, Vec<Record>> = FxHashMap::default();
    for record in target {
        candidates.entry(hash_of(&record)).or_default().push(record);
    }

    for record in source {
        let hash = hash_of(&record);
        let Some(bucket) = candidates.get_mut(&hash) else {
            outcome.more.push(record);
            continue;
        };

        let signature = record.identity_signature();
        match bucket
            .iter()
            .position(|candidate| candidate.identity_signature() == signature)
        {
            Some(position) => {
                let matched = bucket.remove(position);
                if bucket.is_empty() {
                    candidates.remove(&hash);
                }
                if record.value_signature(ignore_fields) != matched.value_signature(ignore_fields)
                {
                    outcome.diff.push(record);
                }
            }
            // Same hash but no identity match: surplus in source.
            None => outcome.more.push(record),
        }
    }

    for leftovers in candidates.into_values() {
        outcome.less.extend(leftovers);
    }
    outcome
}
