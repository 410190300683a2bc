//! # bucketdiff
//!
//! A bucketed differential-comparison engine: given two labeled collections
//! of structured records ("source" and "target"), it determines per logical
//! entity which records were added, removed, or changed, scaling past
//! single-threaded comparison through hash partitioning and a bucket-parallel
//! worker pool.
//!
//! Records flow Ingestion -> Partitioner -> BucketStore on the write path,
//! and BucketStore -> DiffEngine -> classification -> sink on the compare
//! path. The two paths are decoupled through the store, so source and target
//! loads may arrive independently and out of order.
//!
//! ```
//! use bucketdiff::{CollectingSink, DatasetSide, DiffConfig, DiffEngine, Fields, Value};
//! use std::collections::HashSet;
//!
//! let engine = DiffEngine::in_memory(DiffConfig::new(4, 2))?;
//! let identity = vec!["id".to_string()];
//!
//! let source: Fields = [("id".to_string(), Value::Int(1)), ("name".to_string(), Value::from("a"))]
//!     .into_iter()
//!     .collect();
//! let target: Fields = [("id".to_string(), Value::Int(1)), ("name".to_string(), Value::from("b"))]
//!     .into_iter()
//!     .collect();
//! engine.ingest("task", DatasetSide::Source, &identity, vec![source])?;
//! engine.ingest("task", DatasetSide::Target, &identity, vec![target])?;
//!
//! let sink = CollectingSink::new();
//! engine.diff("task", &HashSet::new(), &sink)?;
//! assert_eq!(sink.diff().len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod compare;
pub mod config;
pub mod engine;
pub mod model;
pub mod partition;
pub mod store;

pub use compare::{compare_bucket, BucketDiff};
pub use config::{ConfigError, DiffConfig};
pub use engine::{CollectingSink, DiffEngine, DiffSink};
pub use model::{DatasetSide, Fields, Record, Value, NULL_SENTINEL};
pub use store::{BucketStore, MemoryBucketStore};
