//! Cross-source aggregation of finalized audit results.
//!
//! Summaries are recomputed from the records on every call; nothing is cached.

mod model;

pub use model::{
    percent_of, AggregateSummary, GroupSummary, ProblemItem, ReasonCount, StatusCounts,
};

use crate::model::{Aspect, AuditVariant, AuditedRecord, Status};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const TOP_REASONS: usize = 10;
pub const REASON_DISPLAY_CHARS: usize = 150;
/// Grouping key for rows without a source file tag.
pub const UNTAGGED_FILE: &str = "(unknown)";

/// Aspects present in at least one record, in canonical order.
pub fn aspects_present(records: &[AuditedRecord]) -> Vec<Aspect> {
    let set: BTreeSet<Aspect> = records
        .iter()
        .flat_map(|r| r.result.verdicts.keys().copied())
        .collect();
    set.into_iter().collect()
}

pub fn summarize_group<'a, I>(key: impl Into<String>, aspects: &[Aspect], rows: I) -> GroupSummary
where
    I: IntoIterator<Item = &'a AuditedRecord>,
{
    let mut counts: BTreeMap<Aspect, StatusCounts> =
        aspects.iter().map(|a| (*a, StatusCounts::default())).collect();
    let mut n = 0;
    for record in rows {
        n += 1;
        for (aspect, tally) in counts.iter_mut() {
            tally.record(record.result.status(*aspect));
        }
    }
    GroupSummary {
        key: key.into(),
        rows: n,
        aspects: counts,
    }
}

/// One group per source file, in first-seen order.
pub fn summarize_by_file(records: &[AuditedRecord], aspects: &[Aspect]) -> Vec<GroupSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AuditedRecord>> = HashMap::new();
    for record in records {
        let key = record.source_file.as_deref().unwrap_or(UNTAGGED_FILE);
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }
    order
        .into_iter()
        .map(|key| summarize_group(key, aspects, groups[key].iter().copied()))
        .collect()
}

/// One group per supplier URL of no-URL records; sourced records and rows
/// without a URL are left out. Largest groups first, ties in first-seen order.
pub fn summarize_by_url(records: &[AuditedRecord], aspects: &[Aspect]) -> Vec<GroupSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AuditedRecord>> = HashMap::new();
    for record in records {
        if record.result.variant != AuditVariant::NoUrl {
            continue;
        }
        let Some(url) = record.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
            continue;
        };
        groups
            .entry(url)
            .or_insert_with(|| {
                order.push(url);
                Vec::new()
            })
            .push(record);
    }
    let mut summaries: Vec<GroupSummary> = order
        .into_iter()
        .map(|key| summarize_group(key, aspects, groups[key].iter().copied()))
        .collect();
    summaries.sort_by(|a, b| b.rows.cmp(&a.rows));
    summaries
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Most frequent reasons per aspect and non-PASS status.
pub fn issue_analysis(records: &[AuditedRecord], aspects: &[Aspect]) -> Vec<ReasonCount> {
    let total = records.len();
    let mut out = Vec::new();
    for aspect in aspects {
        for status in [Status::NeedsReview, Status::NeedsManualCheck] {
            let mut order: Vec<&str> = Vec::new();
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for record in records {
                if let Some(verdict) = record.result.get(*aspect).filter(|v| v.status == status) {
                    let reason = verdict.reason.as_str();
                    let count = counts.entry(reason).or_insert_with(|| {
                        order.push(reason);
                        0
                    });
                    *count += 1;
                }
            }
            // stable: equal counts stay in first-seen order
            order.sort_by(|a, b| counts[b].cmp(&counts[a]));
            out.extend(order.into_iter().take(TOP_REASONS).map(|reason| {
                let display = if reason.trim().is_empty() { "N/A" } else { reason };
                ReasonCount {
                    aspect: *aspect,
                    status,
                    reason: truncate_chars(display, REASON_DISPLAY_CHARS),
                    count: counts[reason],
                    percent: percent_of(counts[reason], total),
                }
            }));
        }
    }
    out
}

/// Rows with at least one non-PASS verdict.
pub fn problem_items(records: &[AuditedRecord]) -> Vec<ProblemItem> {
    records
        .iter()
        .filter(|r| r.result.has_issues())
        .map(|r| ProblemItem {
            source_file: r.source_file.clone(),
            id: r.id.clone(),
            url: r.url.clone(),
            title: r.title.clone(),
            verdicts: r.result.verdicts.clone(),
        })
        .collect()
}

pub fn summarize(records: &[AuditedRecord]) -> AggregateSummary {
    let aspects = aspects_present(records);
    AggregateSummary {
        total_rows: records.len(),
        global: summarize_group("all", &aspects, records),
        by_file: summarize_by_file(records, &aspects),
        by_url: summarize_by_url(records, &aspects),
        issues: issue_analysis(records, &aspects),
        problem_items: problem_items(records),
        aspects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuditResult, Verdict};
    use proptest::prelude::*;

    fn record(file: &str, url: Option<&str>, keyword: Status, reason: &str) -> AuditedRecord {
        let variant = AuditVariant::NoUrl;
        let mut verdicts = BTreeMap::new();
        verdicts.insert(Aspect::ProductValidity, Verdict::new(Status::Pass, "ok"));
        verdicts.insert(Aspect::Category, Verdict::new(Status::Pass, "ok"));
        verdicts.insert(Aspect::Keyword, Verdict::new(keyword, reason));
        AuditedRecord {
            id: "x".into(),
            url: url.map(str::to_string),
            title: "t".into(),
            category_id: None,
            category_text: String::new(),
            source_file: Some(file.into()),
            result: AuditResult { variant, verdicts },
        }
    }

    fn files_a_and_b() -> Vec<AuditedRecord> {
        let mut records = Vec::new();
        for i in 0..10 {
            let status = if i < 8 { Status::Pass } else { Status::NeedsManualCheck };
            records.push(record("A", Some("https://a.example"), status, "off"));
        }
        for i in 0..5 {
            let status = if i < 1 { Status::Pass } else { Status::NeedsManualCheck };
            records.push(record("B", None, status, "off"));
        }
        records
    }

    #[test]
    fn per_file_and_global_pass_rates() {
        let summary = summarize(&files_a_and_b());
        assert_eq!(summary.by_file.len(), 2);
        assert_eq!(summary.by_file[0].key, "A");
        assert!((summary.by_file[0].pass_rate(Aspect::Keyword) - 80.0).abs() < 1e-9);
        assert!((summary.by_file[1].pass_rate(Aspect::Keyword) - 20.0).abs() < 1e-9);
        assert!((summary.global.pass_rate(Aspect::Keyword) - 60.0).abs() < 1e-9);
        assert_eq!(summary.problem_items.len(), 6);
    }

    #[test]
    fn url_groups_skip_untagged_rows_and_sort_by_size() {
        let mut records = files_a_and_b();
        records.push(record("B", Some("https://b.example"), Status::Pass, ""));
        let groups = summarize_by_url(&records, &aspects_present(&records));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "https://a.example");
        assert_eq!(groups[0].rows, 10);
        assert_eq!(groups[1].rows, 1);
    }

    #[test]
    fn sourced_records_are_not_grouped_by_url() {
        let records: Vec<AuditedRecord> = (0..5)
            .map(|i| {
                let url = format!("https://shop.example/p/{i}");
                let mut r = record("S", Some(&url), Status::Pass, "");
                r.result.variant = AuditVariant::Sourced;
                r
            })
            .collect();
        let summary = summarize(&records);
        assert!(summary.by_url.is_empty());
        assert_eq!(summary.by_file[0].rows, 5);

        let mut mixed = records;
        mixed.push(record("N", Some("https://supplier.example"), Status::Pass, ""));
        mixed.push(record("N", Some("https://supplier.example"), Status::Pass, ""));
        let groups = summarize_by_url(&mixed, &aspects_present(&mixed));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rows, 2);
    }

    #[test]
    fn mixed_variants_count_missing() {
        let mut records = files_a_and_b();
        let mut sourced = record("C", None, Status::Pass, "");
        sourced.result.variant = AuditVariant::Sourced;
        sourced.result.verdicts.remove(&Aspect::ProductValidity);
        sourced.result.verdicts.insert(Aspect::Url, Verdict::new(Status::NeedsReview, "Category page"));
        records.push(sourced);
        let summary = summarize(&records);
        let url = summary.global.aspects[&Aspect::Url];
        assert_eq!(url.needs_review, 1);
        assert_eq!(url.missing, 15);
        assert_eq!(url.total, 16);
    }

    #[test]
    fn issue_analysis_ranks_and_truncates() {
        let long = "z".repeat(400);
        let mut records = vec![
            record("A", None, Status::NeedsManualCheck, "irrelevant"),
            record("A", None, Status::NeedsManualCheck, &long),
            record("A", None, Status::NeedsManualCheck, &long),
            record("A", None, Status::NeedsReview, ""),
        ];
        records.push(record("A", None, Status::Pass, "fine"));
        let issues = issue_analysis(&records, &[Aspect::Keyword]);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].status, Status::NeedsReview);
        assert_eq!(issues[0].reason, "N/A");
        assert_eq!(issues[1].count, 2);
        assert_eq!(issues[1].reason.chars().count(), REASON_DISPLAY_CHARS);
        assert!((issues[1].percent - 40.0).abs() < 1e-9);
        assert_eq!(issues[2].reason, "irrelevant");
    }

    #[test]
    fn empty_group_is_zero_percent() {
        let empty: Vec<AuditedRecord> = Vec::new();
        let group = summarize_group("none", &[Aspect::Keyword], &empty);
        assert_eq!(group.rows, 0);
        assert_eq!(group.pass_rate(Aspect::Keyword), 0.0);
    }

    fn status_strategy() -> impl Strategy<Value = Option<Status>> {
        prop_oneof![
            Just(None),
            Just(Some(Status::Pass)),
            Just(Some(Status::NeedsReview)),
            Just(Some(Status::NeedsManualCheck)),
        ]
    }

    proptest! {
        #[test]
        fn counts_sum_to_group_size(statuses in prop::collection::vec(status_strategy(), 1..60)) {
            let records: Vec<AuditedRecord> = statuses
                .iter()
                .map(|s| {
                    let mut r = record("A", None, Status::Pass, "");
                    match s {
                        Some(status) => {
                            r.result.verdicts.insert(Aspect::Keyword, Verdict::new(*status, "r"));
                        }
                        None => {
                            r.result.verdicts.remove(&Aspect::Keyword);
                        }
                    }
                    r
                })
                .collect();
            let group = summarize_group("A", &[Aspect::Keyword], &records);
            let c = group.aspects[&Aspect::Keyword];
            prop_assert_eq!(c.pass + c.needs_review + c.needs_manual_check + c.missing, records.len());
            let pct: f64 = Status::ALL.iter().map(|s| c.percent(*s)).sum::<f64>() + c.missing_percent();
            prop_assert!((pct - 100.0).abs() < 1e-6);
        }
    }
}
