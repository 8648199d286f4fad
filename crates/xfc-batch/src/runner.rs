use crate::job::{jobs_from_document, ConversionJob, ConversionRecord, JobInput};
use crate::manifest::{write_batch_manifest, BatchManifest};
use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::{error, info};
use xfc_algo::{Conversion, RegulatingControls, TransformerConversion};
use xfc_core::config::Configuration;
use xfc_core::converted::{ConvertedT2x, ConvertedT3x};
use xfc_core::diagnostics::{ConditionKind, Diagnostics};
use xfc_core::error::XfcResult;
use xfc_core::TransformerId;
use xfc_io::RawDocument;

/// Settings shared by every job of one run.
#[derive(Debug, Clone, Default)]
pub struct BatchRunnerConfig {
    pub configuration: Configuration,
    /// Worker threads; 0 means one per CPU
    pub threads: usize,
    /// Where to write the run manifest, if anywhere
    pub manifest_path: Option<PathBuf>,
    /// Name of the input recorded in the manifest
    pub input_label: String,
}

/// Converted models of a run, ready for the destination network builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertedDocument {
    pub two_winding: Vec<ConvertedT2x>,
    pub three_winding: Vec<ConvertedT3x>,
    /// Regulating controls by transformer id
    pub regulating_controls: BTreeMap<TransformerId, RegulatingControls>,
}

/// Summary returned after the run so clients can log success/failure counts.
#[derive(Debug)]
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub conditions: usize,
    pub converted: ConvertedDocument,
    pub records: Vec<ConversionRecord>,
    pub manifest_path: Option<PathBuf>,
}

impl BatchSummary {
    /// True when every transformer converted without any reported condition.
    pub fn is_clean(&self) -> bool {
        self.failure == 0 && self.conditions == 0
    }
}

enum JobOutput {
    TwoWinding(Conversion<ConvertedT2x>),
    ThreeWinding(Conversion<ConvertedT3x>),
}

pub fn run_batch(document: &RawDocument, config: &BatchRunnerConfig) -> Result<BatchSummary> {
    let jobs = jobs_from_document(document);

    // Configure thread pool: auto-detect CPU count if threads=0, otherwise use specified count
    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch conversion")?;

    // The configuration is only read, so every worker shares it by reference
    let results: Vec<(ConversionRecord, Option<JobOutput>)> = pool.install(|| {
        jobs.par_iter()
            .map(|job| run_job(job, &config.configuration))
            .collect()
    });

    let mut converted = ConvertedDocument::default();
    let mut records = Vec::with_capacity(results.len());
    let mut seen = HashSet::new();
    for (mut record, output) in results {
        if !seen.insert(record.transformer_id.clone()) {
            let message = format!("duplicate transformer id '{}'", record.transformer_id);
            error!(transformer = %record.transformer_id, "duplicate transformer id");
            record.diagnostics.add_error_with_entity(
                ConditionKind::MalformedInput,
                &message,
                &record.transformer_id,
            );
            record.status = "error".to_string();
            record.error = Some(message);
            records.push(record);
            continue;
        }
        match output {
            Some(JobOutput::TwoWinding(conversion)) => {
                merge_regulating(&mut converted, &conversion.model.id, conversion.regulating);
                converted.two_winding.push(conversion.model);
            }
            Some(JobOutput::ThreeWinding(conversion)) => {
                merge_regulating(&mut converted, &conversion.model.id, conversion.regulating);
                converted.three_winding.push(conversion.model);
            }
            None => {}
        }
        records.push(record);
    }

    let success = records.iter().filter(|record| record.is_ok()).count();
    let failure = records.len() - success;
    let conditions = records
        .iter()
        .filter(|record| record.is_ok())
        .map(|record| record.diagnostics.issues.len())
        .sum();
    info!(
        transformers = records.len(),
        success, failure, conditions, "batch conversion finished"
    );

    if let Some(path) = &config.manifest_path {
        let manifest = BatchManifest {
            created_at: Utc::now(),
            input: config.input_label.clone(),
            num_transformers: records.len(),
            success,
            failure,
            conditions,
            records: records.clone(),
        };
        write_batch_manifest(path, &manifest)?;
    }

    Ok(BatchSummary {
        success,
        failure,
        conditions,
        converted,
        records,
        manifest_path: config.manifest_path.clone(),
    })
}

fn merge_regulating(
    converted: &mut ConvertedDocument,
    id: &TransformerId,
    regulating: RegulatingControls,
) {
    if !regulating.is_empty() {
        converted.regulating_controls.insert(id.clone(), regulating);
    }
}

/// Convert a single transformer; a failure only affects this job.
fn run_job(job: &ConversionJob, config: &Configuration) -> (ConversionRecord, Option<JobOutput>) {
    let runner = || -> XfcResult<JobOutput> {
        match &job.input {
            JobInput::TwoWinding(raw) => {
                let ends = raw.to_model()?;
                ends.convert(config).map(JobOutput::TwoWinding)
            }
            JobInput::ThreeWinding(raw) => {
                let ends = raw.to_model()?;
                ends.convert(config).map(JobOutput::ThreeWinding)
            }
        }
    };

    match runner() {
        Ok(output) => {
            let diagnostics = match &output {
                JobOutput::TwoWinding(conversion) => conversion.diagnostics.clone(),
                JobOutput::ThreeWinding(conversion) => conversion.diagnostics.clone(),
            };
            let record = ConversionRecord {
                transformer_id: job.transformer_id.clone(),
                kind: job.kind(),
                status: "ok".to_string(),
                error: None,
                diagnostics,
            };
            (record, Some(output))
        }
        Err(err) => {
            error!(transformer = %job.transformer_id, "conversion failed: {err}");
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_error_with_entity(
                ConditionKind::MalformedInput,
                &err.to_string(),
                &job.transformer_id,
            );
            let record = ConversionRecord {
                transformer_id: job.transformer_id.clone(),
                kind: job.kind(),
                status: "error".to_string(),
                error: Some(err.to_string()),
                diagnostics,
            };
            (record, None)
        }
    }
}
