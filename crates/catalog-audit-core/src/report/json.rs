use crate::audit::EvaluationBatch;
use crate::report::summary::{CombinedSummary, UrlSummary};
use crate::report::AuditArtifacts;
use anyhow::Context;
use std::path::Path;

pub fn write_audit_json(artifacts: &AuditArtifacts, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(artifacts)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

pub fn read_audit_json(path: &Path) -> anyhow::Result<AuditArtifacts> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_summary_json(summary: &CombinedSummary, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

pub fn write_url_summary_json(summary: &UrlSummary, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

pub fn write_evaluation_json(batch: &EvaluationBatch, out: &Path) -> anyhow::Result<()> {
    let v = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "evaluated": batch.results.len(),
        "skipped": batch.skipped,
        "averages": batch.averages(),
        "results": batch.results,
    });
    std::fs::write(out, serde_json::to_string_pretty(&v)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
