//! Crash Report Engine: groups crash records into reviewable spreadsheets.
//!
//! Takes a flat batch of crash records, groups them by exact crash-log
//! signature, keeps the first record per device across the run, renders one
//! sheet per surviving group (log lines newest-first) plus a device summary,
//! and delivers the report through an ordered chain of sinks.
//!
//! The pipeline is sequential and in-memory; per-run state lives in a
//! [`dedup::RunContext`] owned by that run.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod group;
pub mod naming;
pub mod normalize;
pub mod render;
pub mod report;
pub mod search;
pub mod sink;
pub mod source;
pub mod types;

pub use classify::{Classifier, KernelPanicClassifier};
pub use config::{Config, SinkMode};
pub use engine::Engine;
pub use error::{FetchError, ReportError, SinkError};
pub use report::Report;
pub use sink::{Sink, SinkChain};
pub use source::{CrashSource, SearchDumpSource};
pub use types::{CrashQuery, CrashRecord, RunOutcome};
