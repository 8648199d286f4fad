use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use xfc_batch::{run_batch, BatchRunnerConfig};
use xfc_core::Configuration;
use xfc_io::{load_configuration, load_document, write_json};

use xfc_cli::cli::ConvertArgs;

pub fn handle(args: &ConvertArgs) -> Result<()> {
    let configuration = match &args.config {
        Some(path) => load_configuration(path)?,
        None => Configuration::default(),
    };
    let document = load_document(&args.input)?;
    info!(
        "Converting {} transformers from {}",
        document.len(),
        args.input.display()
    );

    let config = BatchRunnerConfig {
        configuration,
        threads: args.threads,
        manifest_path: args.manifest.clone(),
        input_label: args.input.display().to_string(),
    };
    let summary = run_batch(&document, &config)?;

    write_json(&args.output, &summary.converted)
        .with_context(|| format!("writing converted models to '{}'", args.output.display()))?;

    for record in summary.records.iter().filter(|r| !r.is_ok()) {
        warn!(
            "{} failed: {}",
            record.transformer_id,
            record.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "Converted {} of {} transformers ({} failed, {} conditions) -> {}",
        summary.success,
        summary.success + summary.failure,
        summary.failure,
        summary.conditions,
        args.output.display()
    );
    if let Some(path) = &summary.manifest_path {
        println!("Manifest: {}", path.display());
    }

    if args.strict && !summary.is_clean() {
        bail!(
            "strict mode: {} transformers failed and {} conditions were reported",
            summary.failure,
            summary.conditions
        );
    }
    Ok(())
}
