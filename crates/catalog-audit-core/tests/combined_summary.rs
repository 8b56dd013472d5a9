use catalog_audit_core::model::{Aspect, AuditResult, AuditVariant, AuditedRecord, Status, Verdict};
use catalog_audit_core::report::summary::CombinedSummary;
use catalog_audit_core::report::{self, csv, json, AuditArtifacts};

fn record(id: &str, status: Status) -> AuditedRecord {
    AuditedRecord {
        id: id.into(),
        url: None,
        title: format!("title {id}"),
        category_id: None,
        category_text: "Home".into(),
        // overwritten from the file name on load
        source_file: Some("stale".into()),
        result: AuditResult {
            variant: AuditVariant::NoUrl,
            verdicts: [
                (Aspect::ProductValidity, Verdict::new(Status::Pass, "ok")),
                (Aspect::Category, Verdict::new(Status::Pass, "ok")),
                (Aspect::Keyword, Verdict::new(status, "keywords off")),
            ]
            .into_iter()
            .collect(),
        },
    }
}

fn batch(prefix: &str, total: usize, passing: usize) -> Vec<AuditedRecord> {
    (0..total)
        .map(|i| {
            let status = if i < passing { Status::Pass } else { Status::NeedsManualCheck };
            record(&format!("{prefix}{i}"), status)
        })
        .collect()
}

#[test]
fn summary_over_a_result_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = AuditArtifacts::new(None, batch("a", 10, 8));
    json::write_audit_json(&a, &dir.path().join(report::result_file_name("A", "json")))
        .expect("write A");
    csv::write_audit_csv(&batch("b", 5, 1), &dir.path().join(report::result_file_name("B", "csv")))
        .expect("write B");
    // superseded by the JSON of the same source
    csv::write_audit_csv(&batch("x", 3, 0), &dir.path().join(report::result_file_name("A", "csv")))
        .expect("write stale A");
    std::fs::write(dir.path().join("notes.json"), "{}").expect("write unrelated");

    let loaded = report::load_results(dir.path()).expect("load");
    assert_eq!(loaded.files.len(), 2);
    assert_eq!(loaded.records.len(), 15);

    let sources = loaded
        .files
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let combined = CombinedSummary::build(sources, &loaded.records);
    let summary = &combined.summary;

    assert_eq!(summary.by_file[0].key, "A");
    assert_eq!(format!("{:.1}", summary.by_file[0].pass_rate(Aspect::Keyword)), "80.0");
    assert_eq!(summary.by_file[1].key, "B");
    assert_eq!(format!("{:.1}", summary.by_file[1].pass_rate(Aspect::Keyword)), "20.0");
    assert_eq!(format!("{:.1}", summary.global.pass_rate(Aspect::Keyword)), "60.0");

    let top = summary
        .issues
        .iter()
        .find(|i| i.aspect == Aspect::Keyword && i.status == Status::NeedsManualCheck)
        .expect("keyword issue");
    assert_eq!(top.count, 6);
    assert!((top.percent - 40.0).abs() < 1e-9);

    let out = dir.path().join("combined_summary.json");
    json::write_summary_json(&combined, &out).expect("write summary");
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).expect("read")).expect("json");
    assert_eq!(v["total_rows"], 15);
    assert_eq!(v["global"]["aspects"]["keyword_review"]["pass"], 9);
}
