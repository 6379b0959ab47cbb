//! Output files for a completed run.
//!
//! | File                 | Content                                      |
//! |----------------------|----------------------------------------------|
//! | `clean.csv`          | normalized, masked values in schema order    |
//! | `clean.jsonl`        | the same, one JSON object per record         |
//! | `quarantined.jsonl`  | partial values with their field issues       |
//! | `escalated.jsonl`    | escalation reason and suggested actions      |
//! | `issues.csv`         | the issue log                                |
//! | `events.jsonl`       | audit events                                 |
//! | `metrics.json`       | batch metrics and the run summary            |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reclaim_model::{
    BatchMetrics, EscalationReason, FieldIssue, IssueCode, RecordId, RecordVerdict, RunSummary,
};
use reclaim_pipeline::RunOutput;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct IssueRow<'a> {
    row: u64,
    key: &'a str,
    field: &'a str,
    code: IssueCode,
    message: &'a str,
    blocking: bool,
}

#[derive(Serialize)]
struct EscalationRow<'a> {
    record: &'a RecordId,
    reason: Option<EscalationReason>,
    retry_count: u32,
    suggested_actions: &'a [&'static str],
    issues: Vec<FieldIssueRow<'a>>,
}

#[derive(Serialize)]
struct FieldIssueRow<'a> {
    field: &'a str,
    #[serde(flatten)]
    issue: &'a FieldIssue,
}

#[derive(Serialize)]
struct MetricsDocument<'a> {
    schema_fingerprint: &'a str,
    summary: &'a RunSummary,
    batches: &'a [BatchMetrics],
}

/// Write every output stream under `dir`, creating it if needed.
pub fn write_outputs(output: &RunOutput, fields: &[String], dir: &Path) -> Result<WrittenOutputs> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut files = Vec::new();

    let path = dir.join("clean.csv");
    write_clean_csv(&path, fields, &output.clean)?;
    files.push(path);

    let path = dir.join("clean.jsonl");
    write_jsonl(&path, output.clean.iter().map(flat_record))?;
    files.push(path);

    let path = dir.join("quarantined.jsonl");
    write_jsonl(&path, &output.quarantined)?;
    files.push(path);

    let path = dir.join("escalated.jsonl");
    write_jsonl(&path, output.escalated.iter().map(escalation_row))?;
    files.push(path);

    let path = dir.join("issues.csv");
    write_issue_log(&path, output)?;
    files.push(path);

    let path = dir.join("events.jsonl");
    write_jsonl(&path, &output.events)?;
    files.push(path);

    let path = dir.join("metrics.json");
    let document = MetricsDocument {
        schema_fingerprint: &output.schema_fingerprint,
        summary: &output.summary,
        batches: &output.batches,
    };
    let file = create(&path)?;
    serde_json::to_writer_pretty(file, &document)
        .with_context(|| format!("write {}", path.display()))?;
    files.push(path);

    info!(dir = %dir.display(), files = files.len(), "outputs written");
    Ok(WrittenOutputs {
        dir: dir.to_path_buf(),
        files,
    })
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_jsonl<I, T>(path: &Path, items: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let mut out = create(path)?;
    for item in items {
        serde_json::to_writer(&mut out, &item)
            .with_context(|| format!("write {}", path.display()))?;
        out.write_all(b"\n")?;
    }
    out.flush().with_context(|| format!("flush {}", path.display()))
}

fn write_clean_csv(path: &Path, fields: &[String], records: &[RecordVerdict]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    writer.write_record(fields)?;
    for verdict in records {
        let row: Vec<String> = fields
            .iter()
            .map(|field| {
                verdict
                    .value(field)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))
}

fn write_issue_log(path: &Path, output: &RunOutput) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for entry in &output.issues {
        writer.serialize(IssueRow {
            row: entry.record.row,
            key: entry.record.key.as_deref().unwrap_or_default(),
            field: &entry.field,
            code: entry.code,
            message: &entry.message,
            blocking: entry.blocking,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))
}

/// `{"_row": 1, "record_id": 1003, ...}`
fn flat_record(verdict: &RecordVerdict) -> Value {
    let mut object = Map::new();
    object.insert("_row".to_string(), Value::from(verdict.id.row));
    for outcome in &verdict.outcomes {
        let value = outcome
            .value
            .as_ref()
            .and_then(|value| serde_json::to_value(value).ok())
            .unwrap_or(Value::Null);
        object.insert(outcome.field.clone(), value);
    }
    Value::Object(object)
}

fn escalation_row(verdict: &RecordVerdict) -> EscalationRow<'_> {
    EscalationRow {
        record: &verdict.id,
        reason: verdict.escalation,
        retry_count: verdict.retry_count,
        suggested_actions: verdict
            .escalation
            .map(EscalationReason::suggested_actions)
            .unwrap_or_default(),
        issues: verdict
            .issues()
            .map(|(outcome, issue)| FieldIssueRow {
                field: &outcome.field,
                issue,
            })
            .collect(),
    }
}
