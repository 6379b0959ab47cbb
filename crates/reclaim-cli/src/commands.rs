use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use reclaim_cli::config::{Overrides, load_config};
use reclaim_cli::ingest::read_records;
use reclaim_cli::writers::write_outputs;
use reclaim_pipeline::Pipeline;
use reclaim_schema::SchemaRegistry;
use tracing::{info, info_span, warn};

use crate::cli::{CheckArgs, MappingsArgs, RunArgs};
use crate::summary::apply_table_style;
use crate::types::RunResult;

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", input = %args.input.display());
    let _guard = span.enter();

    let mut config = load_config(args.config.as_deref())?;
    Overrides {
        workers: args.workers,
        batch_size: args.batch_size,
        timeout_secs: args.timeout_secs,
    }
    .apply(&mut config);

    let pipeline = Pipeline::from_schema_path(&args.schema, config)
        .with_context(|| format!("prepare pipeline from {}", args.schema.display()))?;
    let fields: Vec<String> = pipeline
        .registry()
        .fields()
        .iter()
        .map(|field| field.name.clone())
        .collect();
    let records = read_records(&args.input)?;
    info!(
        records = records.len(),
        fields = fields.len(),
        workers = pipeline.config().processing.workers,
        "starting run"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(pipeline.config().processing.workers.max(1))
        .enable_all()
        .build()
        .context("start async runtime")?;
    let output = runtime.block_on(pipeline.run(records));

    let written = if args.dry_run {
        info!("dry run, skipping output files");
        None
    } else {
        let dir = output_dir(args);
        Some(write_outputs(&output, &fields, &dir)?)
    };
    if output.has_escalations() {
        warn!(escalated = output.summary.escalated, "run produced escalations");
    }
    Ok(RunResult {
        input: args.input.clone(),
        output,
        written,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let report = config.validate();
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        eprintln!("error: {error}");
    }
    let registry = SchemaRegistry::from_path(&args.schema)
        .with_context(|| format!("load schema {}", args.schema.display()))?;
    println!("Schema: {} ({} fields)", args.schema.display(), registry.len());
    println!("Fingerprint: {}", registry.fingerprint());
    if !report.is_valid() {
        bail!("configuration has {} error(s)", report.errors.len());
    }
    println!("Configuration OK");
    Ok(())
}

pub fn run_mappings(args: &MappingsArgs) -> Result<()> {
    let registry = SchemaRegistry::from_path(&args.schema)
        .with_context(|| format!("load schema {}", args.schema.display()))?;
    let mappings = registry.field_mappings();
    if args.json {
        let text = serde_json::to_string_pretty(&mappings).context("encode mappings")?;
        println!("{text}");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec![
        "Legacy field",
        "Target field",
        "Type",
        "Required",
        "Transformation",
        "Example",
    ]);
    apply_table_style(&mut table);
    for mapping in mappings {
        table.add_row(vec![
            mapping.legacy_field,
            mapping.target_field,
            mapping.semantic_type.to_string(),
            if mapping.required { "yes" } else { "no" }.to_string(),
            mapping.transformation.to_string(),
            mapping.example.unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn output_dir(args: &RunArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("reclaim-output")
    })
}
