use crate::aggregate::{AggregateSummary, GroupSummary};
use crate::audit::EvaluationBatch;
use crate::dedup::DedupStats;
use crate::model::{Aspect, AuditedRecord, Status};
use crate::report::summary::{CombinedSummary, PassTier, UrlSummary};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const URL_ROWS: usize = 10;
const URL_DISPLAY_CHARS: usize = 60;

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Deterministic one-line rendering of a group's pass rates.
#[must_use]
pub fn format_group_line(group: &GroupSummary, aspects: &[Aspect]) -> String {
    let rates: Vec<String> = aspects
        .iter()
        .map(|a| format!("{}={:.1}%", a.label(), group.pass_rate(*a)))
        .collect();
    format!("{:<30} rows={:<5} {}", shorten(&group.key, 30), group.rows, rates.join(" "))
}

pub fn print_audit_summary(records: &[AuditedRecord]) {
    let issues = records.iter().filter(|r| r.result.has_issues()).count();
    eprintln!();
    for r in records.iter().filter(|r| r.result.has_issues()) {
        let flagged: Vec<String> = r
            .result
            .verdicts
            .iter()
            .filter(|(_, v)| v.status != Status::Pass)
            .map(|(a, v)| format!("{}={}", a.label(), v.status))
            .collect();
        eprintln!("⚠️  {:<20} {}", shorten(&r.id, 20), flagged.join(" "));
    }
    eprintln!("{RULE}");
    eprintln!(
        "Summary: {} records | {} clean | {} with issues",
        records.len(),
        records.len() - issues,
        issues
    );
}

fn print_status_table(summary: &AggregateSummary) {
    eprintln!(
        "{:<18} {:>7} {:>9} {:>9} {:>9} {:>9}",
        "aspect", "rows", "PASS", "REVIEW", "MANUAL", "missing"
    );
    for aspect in &summary.aspects {
        let Some(c) = summary.global.aspects.get(aspect) else {
            continue;
        };
        eprintln!(
            "{} {:<15} {:>7} {:>8.1}% {:>8.1}% {:>8.1}% {:>8.1}%",
            PassTier::of(c.pass_rate()).icon(),
            aspect.label(),
            c.total,
            c.percent(Status::Pass),
            c.percent(Status::NeedsReview),
            c.percent(Status::NeedsManualCheck),
            c.missing_percent(),
        );
    }
}

fn print_url_groups(groups: &[GroupSummary], aspects: &[Aspect]) {
    if groups.is_empty() {
        return;
    }
    eprintln!("{RULE}");
    eprintln!("Pass rate by URL (top {URL_ROWS})");
    for group in groups.iter().take(URL_ROWS) {
        eprintln!("  {}", shorten(&group.key, URL_DISPLAY_CHARS));
        eprintln!("      {}", format_group_line(group, aspects));
    }
}

pub fn print_url_summary(summary: &UrlSummary) {
    eprintln!();
    eprintln!("Supplier URLs: {} | Rows: {}", summary.urls.len(), summary.total_rows);
    print_url_groups(&summary.urls, &summary.aspects);
}

pub fn print_combined_summary(combined: &CombinedSummary) {
    let summary = &combined.summary;
    eprintln!();
    eprintln!("Sources: {}", combined.sources.len());
    eprintln!("Rows:    {}", summary.total_rows);
    eprintln!("{RULE}");
    print_status_table(summary);

    if !summary.by_file.is_empty() {
        eprintln!("{RULE}");
        eprintln!("Pass rate by file");
        for group in &summary.by_file {
            eprintln!("  {}", format_group_line(group, &summary.aspects));
        }
    }

    print_url_groups(&summary.by_url, &summary.aspects);

    if !summary.issues.is_empty() {
        eprintln!("{RULE}");
        eprintln!("Top issues");
        for issue in &summary.issues {
            eprintln!(
                "  {:<12} {:<18} {:>5} ({:.1}%)  {}",
                issue.aspect.label(),
                issue.status.as_str(),
                issue.count,
                issue.percent,
                issue.reason
            );
        }
    }

    eprintln!("{RULE}");
    eprintln!(
        "Summary: {} rows | {} problem items",
        summary.total_rows,
        summary.problem_items.len()
    );
}

pub fn print_evaluation_summary(batch: &EvaluationBatch) {
    eprintln!();
    eprintln!("Evaluated: {} | Skipped: {}", batch.results.len(), batch.skipped);
    match batch.averages() {
        Some(avg) => {
            eprintln!("Average scores:");
            eprintln!("  Title:       {:.2}/2.0", avg.title);
            eprintln!("  Description: {:.2}/2.0", avg.description);
            eprintln!("  Overall:     {:.2}/2.0", avg.overall);
        }
        None => eprintln!("No rows evaluated."),
    }
}

pub fn print_dedup_stats(stats: &DedupStats) {
    eprintln!();
    eprintln!("Rows:      {}", stats.total);
    eprintln!("Kept:      {}", stats.kept);
    eprintln!("Removed:   {}", stats.removed);
    eprintln!("Retention: {:.2}%", stats.retention_rate());
    eprintln!("{RULE}");
    for (url, s) in stats.per_url.iter().take(URL_ROWS) {
        eprintln!("  {}", shorten(url, URL_DISPLAY_CHARS));
        eprintln!("      total: {}, kept: {}, removed: {}", s.total, s.kept, s.removed());
    }
}
