//! Batch conversion of every transformer in an input document.
//!
//! Jobs run on a rayon pool sharing one read-only [`Configuration`]. A
//! transformer that fails is recorded with status `error` and the run goes on;
//! regulating-control records of the successful ones are merged into a map
//! keyed by transformer id.
//!
//! [`Configuration`]: xfc_core::Configuration

pub mod job;
pub mod manifest;
pub mod runner;

pub use job::{jobs_from_document, ConversionJob, ConversionRecord, JobInput, TransformerKind};
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary, ConvertedDocument};
