//! CSV result sinks. Audit results carry one `<aspect>_status` and
//! `<aspect>_reason` column pair per aspect present in the batch.

use crate::aggregate::aspects_present;
use crate::audit::EvaluatedRow;
use crate::candidate::RubricEvaluation;
use crate::ingest;
use crate::model::{Aspect, AuditResult, AuditVariant, AuditedRecord, Status, Verdict};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

const RECORD_COLUMNS: [&str; 6] = ["id", "url", "title", "category_id", "category", "source_file"];

fn writer(out: &Path) -> anyhow::Result<::csv::Writer<std::fs::File>> {
    ::csv::Writer::from_path(out).with_context(|| format!("failed to create {}", out.display()))
}

fn status_column(aspect: Aspect) -> String {
    format!("{}_status", aspect.label())
}

fn reason_column(aspect: Aspect) -> String {
    format!("{}_reason", aspect.label())
}

pub fn write_audit_csv(records: &[AuditedRecord], out: &Path) -> anyhow::Result<()> {
    let aspects = aspects_present(records);
    let mut w = writer(out)?;
    let mut header: Vec<String> = RECORD_COLUMNS.iter().map(|c| c.to_string()).collect();
    for aspect in &aspects {
        header.push(status_column(*aspect));
        header.push(reason_column(*aspect));
    }
    w.write_record(&header)?;

    for r in records {
        let mut row = vec![
            r.id.clone(),
            r.url.clone().unwrap_or_default(),
            r.title.clone(),
            r.category_id.clone().unwrap_or_default(),
            r.category_text.clone(),
            r.source_file.clone().unwrap_or_default(),
        ];
        for aspect in &aspects {
            match r.result.get(*aspect) {
                Some(v) => {
                    row.push(v.status.as_str().to_string());
                    row.push(v.reason.clone());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Read a result CSV written by [`write_audit_csv`]. Unknown statuses are
/// treated as missing; the variant is inferred from the aspects present.
pub fn read_audit_csv(path: &Path) -> anyhow::Result<Vec<AuditedRecord>> {
    let table = ingest::read_csv(path)?;
    let aspects: Vec<Aspect> = Aspect::ALL
        .into_iter()
        .filter(|a| table.has_column(&status_column(*a)))
        .collect();
    let records = table
        .rows()
        .map(|row| {
            let verdicts: BTreeMap<Aspect, Verdict> = aspects
                .iter()
                .filter_map(|a| {
                    let status = Status::parse(row.get(&status_column(*a)))?;
                    Some((*a, Verdict::new(status, row.get(&reason_column(*a)))))
                })
                .collect();
            let variant = if verdicts.contains_key(&Aspect::ProductValidity) {
                AuditVariant::NoUrl
            } else {
                AuditVariant::Sourced
            };
            AuditedRecord {
                id: row.get("id").to_string(),
                url: row.non_blank("url"),
                title: row.get("title").to_string(),
                category_id: row.non_blank("category_id"),
                category_text: row.get("category").to_string(),
                source_file: row.non_blank("source_file"),
                result: AuditResult { variant, verdicts },
            }
        })
        .collect();
    Ok(records)
}

/// Write a table back out with its original header order.
pub fn write_table_csv<'a, I>(headers: &[String], rows: I, out: &Path) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut w = writer(out)?;
    w.write_record(headers)?;
    for cells in rows {
        w.write_record(cells.iter().take(headers.len()))?;
    }
    w.flush()?;
    Ok(())
}

const EVALUATION_COLUMNS: [&str; 17] = [
    "id",
    "Title_Original",
    "Description_original",
    "Title_AI_optimized",
    "Description_optimized_AI",
    "lang",
    "title_score",
    "description_score",
    "overall_score",
    "title_must_have_score",
    "title_must_avoid_score",
    "description_must_have_score",
    "description_must_avoid_score",
    "title_evaluation",
    "description_evaluation",
    "candidates_count",
    "detected_lang",
];

fn evaluation_json(eval: &RubricEvaluation) -> anyhow::Result<String> {
    Ok(serde_json::to_string(eval)?)
}

/// One line per evaluated row: the selected title replaces the candidate list.
/// Pass-through columns follow the fixed ones, named after the first row.
pub fn write_evaluation_csv(rows: &[EvaluatedRow], out: &Path) -> anyhow::Result<()> {
    let mut w = writer(out)?;
    let extra_headers: Vec<&str> = rows
        .first()
        .map(|r| r.row.extra.iter().map(|(h, _)| h.as_str()).collect())
        .unwrap_or_default();
    let header: Vec<&str> = EVALUATION_COLUMNS
        .iter()
        .copied()
        .chain(extra_headers.iter().copied())
        .collect();
    w.write_record(&header)?;

    for r in rows {
        let e = &r.selected.evaluation;
        let input = r.row.content_input();
        let mut line = vec![
            r.row.id.clone().unwrap_or_default(),
            r.row.original_title.clone(),
            r.row.original_description.clone(),
            r.selected.title.clone(),
            r.row.optimized_description.clone(),
            r.row.lang.clone().unwrap_or_default(),
            e.title_score.to_string(),
            e.description_score.to_string(),
            e.overall_score.to_string(),
            e.title.must_have_score.to_string(),
            e.title.must_avoid_score.to_string(),
            e.description.must_have_score.to_string(),
            e.description.must_avoid_score.to_string(),
            evaluation_json(&e.title)?,
            evaluation_json(&e.description)?,
            r.selected.candidates_count.to_string(),
            input.lang.as_str().to_string(),
        ];
        for h in &extra_headers {
            let v = r
                .row
                .extra
                .iter()
                .find(|(k, _)| k.as_str() == *h)
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            line.push(v);
        }
        w.write_record(&line)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audited(id: &str, variant: AuditVariant, verdicts: &[(Aspect, Status, &str)]) -> AuditedRecord {
        AuditedRecord {
            id: id.into(),
            url: Some("https://shop/p".into()),
            title: "Bottle, steel".into(),
            category_id: None,
            category_text: "Home>Kitchen".into(),
            source_file: Some("batch_a".into()),
            result: AuditResult {
                variant,
                verdicts: verdicts
                    .iter()
                    .map(|(a, s, r)| (*a, Verdict::new(*s, *r)))
                    .collect(),
            },
        }
    }

    #[test]
    fn audit_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("batch_a_audit_result.csv");
        let records = vec![
            audited(
                "1",
                AuditVariant::Sourced,
                &[
                    (Aspect::Url, Status::Pass, "product page"),
                    (Aspect::Category, Status::NeedsManualCheck, "category empty or N/A"),
                ],
            ),
            audited("2", AuditVariant::Sourced, &[(Aspect::Url, Status::NeedsReview, "list, page")]),
        ];
        write_audit_csv(&records, &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "id,url,title,category_id,category,source_file,url_status,url_reason,category_status,category_reason"
        );

        let back = read_audit_csv(&out).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].title, "Bottle, steel");
        assert_eq!(back[0].result, records[0].result);
        assert_eq!(back[1].result.status(Aspect::Category), None);
        assert_eq!(back[1].result.get(Aspect::Url).unwrap().reason, "list, page");
    }
}
