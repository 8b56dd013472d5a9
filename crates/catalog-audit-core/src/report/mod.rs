pub mod console;
pub mod csv;
pub mod json;
pub mod summary;

use crate::model::{AuditVariant, AuditedRecord};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix of per-source result files; the part before it names the source.
pub const RESULT_SUFFIX: &str = "_audit_result";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditArtifacts {
    pub schema_version: u32,
    pub generated_at: String,
    /// Variant shared by every record; absent when the file mixes variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<AuditVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub records: Vec<AuditedRecord>,
}

impl AuditArtifacts {
    pub fn new(source_file: Option<String>, records: Vec<AuditedRecord>) -> Self {
        let variant = common_variant(&records);
        Self {
            schema_version: summary::SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            variant,
            source_file,
            records,
        }
    }
}

fn common_variant(records: &[AuditedRecord]) -> Option<AuditVariant> {
    let first = records.first()?.result.variant;
    records
        .iter()
        .all(|r| r.result.variant == first)
        .then_some(first)
}

pub fn result_file_name(source: &str, extension: &str) -> String {
    format!("{source}{RESULT_SUFFIX}.{extension}")
}

/// Source name encoded in a result file name, if it is one.
pub fn source_of_result_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let source = stem.strip_suffix(RESULT_SUFFIX)?;
    (!source.is_empty()).then(|| source.to_string())
}

/// Result files under `dir`, sorted by name. A CSV is skipped when a JSON for
/// the same source exists.
pub fn find_result_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list result directory {}", dir.display()))?;
    let mut json = Vec::new();
    let mut csv = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if source_of_result_file(&path).is_none() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => json.push(path),
            Some("csv") => csv.push(path),
            _ => {}
        }
    }
    let covered: Vec<Option<String>> = json.iter().map(|p| source_of_result_file(p)).collect();
    csv.retain(|p| !covered.contains(&source_of_result_file(p)));
    json.extend(csv);
    json.sort();
    Ok(json)
}

/// Load one result file; every record is tagged with the file's source name.
pub fn load_result_file(path: &Path) -> anyhow::Result<Vec<AuditedRecord>> {
    let mut records = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => csv::read_audit_csv(path)?,
        _ => json::read_audit_json(path)?.records,
    };
    if let Some(source) = source_of_result_file(path) {
        for record in &mut records {
            record.source_file = Some(source.clone());
        }
    }
    Ok(records)
}

pub struct LoadedResults {
    pub files: Vec<PathBuf>,
    pub records: Vec<AuditedRecord>,
}

pub fn load_results(dir: &Path) -> anyhow::Result<LoadedResults> {
    let files = find_result_files(dir)?;
    let mut records = Vec::new();
    for file in &files {
        let loaded = load_result_file(file)?;
        tracing::info!(file = %file.display(), rows = loaded.len(), "result file loaded");
        records.extend(loaded);
    }
    Ok(LoadedResults { files, records })
}
