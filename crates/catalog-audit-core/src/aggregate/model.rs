use crate::model::{Aspect, Status, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-status tally for one aspect over one group of rows.
///
/// `missing` counts rows that carry no verdict for the aspect (mixed
/// variants), so the four counters always sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pass: usize,
    pub needs_review: usize,
    pub needs_manual_check: usize,
    pub missing: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Option<Status>) {
        self.total += 1;
        match status {
            Some(Status::Pass) => self.pass += 1,
            Some(Status::NeedsReview) => self.needs_review += 1,
            Some(Status::NeedsManualCheck) => self.needs_manual_check += 1,
            None => self.missing += 1,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Pass => self.pass,
            Status::NeedsReview => self.needs_review,
            Status::NeedsManualCheck => self.needs_manual_check,
        }
    }

    /// Percentage of the group's rows; 0.0 for an empty group.
    pub fn percent(&self, status: Status) -> f64 {
        percent_of(self.count(status), self.total)
    }

    pub fn missing_percent(&self) -> f64 {
        percent_of(self.missing, self.total)
    }

    pub fn pass_rate(&self) -> f64 {
        self.percent(Status::Pass)
    }
}

pub fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Counts for every aspect over one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: String,
    pub rows: usize,
    pub aspects: BTreeMap<Aspect, StatusCounts>,
}

impl GroupSummary {
    pub fn pass_rate(&self, aspect: Aspect) -> f64 {
        self.aspects
            .get(&aspect)
            .map(StatusCounts::pass_rate)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub aspect: Aspect,
    pub status: Status,
    /// Truncated to the display limit.
    pub reason: String,
    pub count: usize,
    /// Share of all rows, not of the failing ones.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    pub verdicts: BTreeMap<Aspect, Verdict>,
}

/// Everything the combined summary reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_rows: usize,
    pub aspects: Vec<Aspect>,
    pub global: GroupSummary,
    pub by_file: Vec<GroupSummary>,
    pub by_url: Vec<GroupSummary>,
    pub issues: Vec<ReasonCount>,
    pub problem_items: Vec<ProblemItem>,
}
