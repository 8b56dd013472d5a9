//! Record-at-a-time orchestration: normalize, judge, finalize.
//!
//! Records and candidate calls are awaited strictly one after another; no
//! per-record failure stops a batch.

use crate::candidate::{self, CandidateSet, ContentRow, SelectedCandidate};
use crate::judge::JudgeService;
use crate::model::{AuditedRecord, ProductRecord};
use crate::normalize;
use crate::verdict;
use serde::{Deserialize, Serialize};

pub struct Auditor {
    judge: JudgeService,
}

impl Auditor {
    pub fn new(judge: JudgeService) -> Self {
        Self { judge }
    }

    pub fn judge(&self) -> &JudgeService {
        &self.judge
    }

    pub async fn audit_record(&self, record: &ProductRecord) -> AuditedRecord {
        let fields = normalize::normalize(record);
        let variant = record.variant();
        let outcome = self.judge.review(record, &fields).await;
        let result = verdict::finalize(outcome, variant, &fields);

        tracing::info!(
            id = record.id.as_str(),
            variant = variant.as_str(),
            issues = result.has_issues(),
            "record audited"
        );

        AuditedRecord {
            id: record.id.clone(),
            url: record.grouping_url().map(str::to_string),
            title: record.title.clone(),
            category_id: fields.category_id,
            category_text: fields.category_text,
            source_file: record.source_file.clone(),
            result,
        }
    }

    pub async fn audit_batch(&self, records: &[ProductRecord]) -> Vec<AuditedRecord> {
        let mut out = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            tracing::debug!(index = idx + 1, total = records.len(), id = record.id.as_str(), "auditing");
            out.push(self.audit_record(record).await);
        }
        out
    }

    /// `None` when the row is incomplete or has no usable candidate title.
    pub async fn evaluate_row(&self, row: &ContentRow) -> Option<EvaluatedRow> {
        if !row.is_complete() {
            tracing::info!(id = ?row.id, "skipping incomplete row");
            return None;
        }
        let Some(candidates) = CandidateSet::parse(&row.optimized_title_raw) else {
            tracing::info!(id = ?row.id, "skipping row without optimized title candidates");
            return None;
        };
        let input = row.content_input();
        let selected = candidate::select(&self.judge, &input, &candidates).await?;
        tracing::info!(
            id = ?row.id,
            lang = input.lang.as_str(),
            candidates = selected.candidates_count,
            overall = selected.evaluation.overall_score,
            "row evaluated"
        );
        Some(EvaluatedRow {
            row: row.clone(),
            selected,
        })
    }

    pub async fn evaluate_batch(&self, rows: &[ContentRow]) -> EvaluationBatch {
        let mut results = Vec::new();
        let mut skipped = 0;
        for row in rows {
            match self.evaluate_row(row).await {
                Some(evaluated) => results.push(evaluated),
                None => skipped += 1,
            }
        }
        EvaluationBatch { results, skipped }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRow {
    pub row: ContentRow,
    pub selected: SelectedCandidate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationBatch {
    pub results: Vec<EvaluatedRow>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub title: f64,
    pub description: f64,
    pub overall: f64,
}

impl EvaluationBatch {
    /// Mean scores over evaluated rows; `None` when nothing was evaluated.
    pub fn averages(&self) -> Option<AverageScores> {
        if self.results.is_empty() {
            return None;
        }
        let n = self.results.len() as f64;
        let sum = |f: fn(&EvaluatedRow) -> u8| {
            self.results.iter().map(|r| f64::from(f(r))).sum::<f64>() / n
        };
        Some(AverageScores {
            title: sum(|r| r.selected.evaluation.title_score),
            description: sum(|r| r.selected.evaluation.description_score),
            overall: sum(|r| r.selected.evaluation.overall_score),
        })
    }
}
