//! Duplicate-title filter: one row per trimmed `(url, title)` pair.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlDedupStats {
    pub total: usize,
    pub kept: usize,
}

impl UrlDedupStats {
    pub fn removed(&self) -> usize {
        self.total - self.kept
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupStats {
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
    /// Per trimmed URL, largest first; ties keep first-seen order.
    pub per_url: Vec<(String, UrlDedupStats)>,
}

impl DedupStats {
    /// Percentage of rows kept; 0.0 for empty input.
    pub fn retention_rate(&self) -> f64 {
        crate::aggregate::percent_of(self.kept, self.total)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated<T> {
    pub rows: Vec<T>,
    pub stats: DedupStats,
}

/// Keep the first row for each trimmed `(url, title)` key, preserving order.
pub fn dedup_by_url_title<T, F>(rows: Vec<T>, key: F) -> Deduplicated<T>
where
    F: Fn(&T) -> (String, String),
{
    let total = rows.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut url_order: Vec<String> = Vec::new();
    let mut per_url: HashMap<String, UrlDedupStats> = HashMap::new();
    let mut kept_rows = Vec::with_capacity(rows.len());

    for row in rows {
        let (url, title) = key(&row);
        let (url, title) = (url.trim().to_string(), title.trim().to_string());
        let stats = per_url.entry(url.clone()).or_insert_with(|| {
            url_order.push(url.clone());
            UrlDedupStats::default()
        });
        stats.total += 1;
        if seen.insert((url, title)) {
            stats.kept += 1;
            kept_rows.push(row);
        }
    }

    let mut per_url: Vec<(String, UrlDedupStats)> = url_order
        .into_iter()
        .map(|url| {
            let stats = per_url.get(&url).copied().unwrap_or_default();
            (url, stats)
        })
        .collect();
    per_url.sort_by(|a, b| b.1.total.cmp(&a.1.total));

    let kept = kept_rows.len();
    tracing::info!(total, kept, removed = total - kept, "duplicate titles filtered");
    Deduplicated {
        rows: kept_rows,
        stats: DedupStats {
            total,
            kept,
            removed: total - kept,
            per_url,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<(&'static str, &'static str, u32)> {
        vec![
            ("https://a", "Bottle", 1),
            ("https://a ", " Bottle", 2),
            ("https://a", "Cup", 3),
            ("https://b", "Bottle", 4),
            ("https://b", "Bottle", 5),
            ("https://b", "Bottle", 6),
        ]
    }

    #[test]
    fn keeps_first_per_trimmed_pair() {
        let out = dedup_by_url_title(rows(), |r| (r.0.to_string(), r.1.to_string()));
        let ids: Vec<u32> = out.rows.iter().map(|r| r.2).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(out.stats.total, 6);
        assert_eq!(out.stats.kept, 3);
        assert_eq!(out.stats.removed, 3);
        assert!((out.stats.retention_rate() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn per_url_stats_sorted_by_total() {
        let out = dedup_by_url_title(rows(), |r| (r.0.to_string(), r.1.to_string()));
        assert_eq!(out.stats.per_url.len(), 2);
        assert_eq!(out.stats.per_url[0].0, "https://a");
        assert_eq!(out.stats.per_url[0].1, UrlDedupStats { total: 3, kept: 2 });
        assert_eq!(out.stats.per_url[1].1.removed(), 2);
    }

    #[test]
    fn empty_input() {
        let out = dedup_by_url_title(Vec::<(String, String)>::new(), |r| r.clone());
        assert!(out.rows.is_empty());
        assert_eq!(out.stats.retention_rate(), 0.0);
    }
}
