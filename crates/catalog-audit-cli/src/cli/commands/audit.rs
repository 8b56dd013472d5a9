use super::judge_builder::build_judge;
use crate::cli::args::AuditArgs;
use crate::exit_codes::SUCCESS;
use catalog_audit_core::audit::Auditor;
use catalog_audit_core::dedup::dedup_by_url_title;
use catalog_audit_core::ingest::{self, online_records, scraped_records};
use catalog_audit_core::model::ProductRecord;
use catalog_audit_core::report::summary::{url_summary_file_name, UrlSummary};
use catalog_audit_core::report::{self, console, csv, json, AuditArtifacts};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    Scraped,
    Online,
}

fn output_dir(args: &AuditArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

fn dedup(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let out = dedup_by_url_title(records, |r| {
        (
            r.grouping_url().unwrap_or_default().to_string(),
            r.title.clone(),
        )
    });
    console::print_dedup_stats(&out.stats);
    out.rows
}

pub(crate) async fn run(args: AuditArgs, layout: Layout) -> anyhow::Result<i32> {
    // fail on credentials before touching the input
    let judge = build_judge(&args.judge)?;

    let table = ingest::read_table(&args.input)?;
    let source = ingest::source_tag(&args.input);
    let mut records = match layout {
        Layout::Scraped => scraped_records(&table, Some(&source)),
        Layout::Online => online_records(&table, Some(&source)),
    };
    if args.dedup {
        records = dedup(records);
    }

    let auditor = Auditor::new(judge);
    let audited = auditor.audit_batch(&records).await;

    let dir = output_dir(&args);
    std::fs::create_dir_all(&dir)?;
    if args.format.csv() {
        let out = dir.join(report::result_file_name(&source, "csv"));
        csv::write_audit_csv(&audited, &out)?;
        eprintln!("Wrote {}", out.display());
    }
    if args.format.json() {
        let out = dir.join(report::result_file_name(&source, "json"));
        let artifacts = AuditArtifacts::new(Some(source.clone()), audited.clone());
        json::write_audit_json(&artifacts, &out)?;
        eprintln!("Wrote {}", out.display());
    }

    console::print_audit_summary(&audited);
    if layout == Layout::Online {
        let urls = UrlSummary::build(Some(source.clone()), &audited);
        let out = dir.join(url_summary_file_name(&source));
        json::write_url_summary_json(&urls, &out)?;
        eprintln!("Wrote {}", out.display());
        console::print_url_summary(&urls);
    }
    Ok(SUCCESS)
}
