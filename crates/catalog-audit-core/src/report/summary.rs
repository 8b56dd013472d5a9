//! Combined summary output over one or more result sources.

use crate::aggregate::{self, AggregateSummary, GroupSummary};
use crate::model::{Aspect, AuditedRecord};
use serde::{Deserialize, Serialize};

/// Current schema version for result and summary files
pub const SCHEMA_VERSION: u32 = 1;

pub const SUMMARY_FILE_NAME: &str = "combined_summary.json";
pub const URL_SUMMARY_SUFFIX: &str = "_url_summary";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedSummary {
    pub schema_version: u32,
    pub generated_at: String,
    /// Result files the rows were read from, in load order.
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub summary: AggregateSummary,
}

impl CombinedSummary {
    pub fn build(sources: Vec<String>, records: &[AuditedRecord]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            sources,
            summary: aggregate::summarize(records),
        }
    }
}

/// Per-supplier-URL pass rates of one no-URL audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlSummary {
    pub schema_version: u32,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub total_rows: usize,
    pub aspects: Vec<Aspect>,
    pub urls: Vec<GroupSummary>,
}

impl UrlSummary {
    pub fn build(source_file: Option<String>, records: &[AuditedRecord]) -> Self {
        let aspects = aggregate::aspects_present(records);
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            source_file,
            total_rows: records.len(),
            urls: aggregate::summarize_by_url(records, &aspects),
            aspects,
        }
    }
}

pub fn url_summary_file_name(source: &str) -> String {
    format!("{source}{URL_SUMMARY_SUFFIX}.json")
}

/// Colour band of a pass rate: at least 80 is good, at least 60 is fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTier {
    Good,
    Fair,
    Poor,
}

impl PassTier {
    pub fn of(rate: f64) -> Self {
        if rate >= 80.0 {
            Self::Good
        } else if rate >= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Good => "🟢",
            Self::Fair => "🟡",
            Self::Poor => "🔴",
        }
    }
}
