use super::judge_builder::build_judge;
use crate::cli::args::EvaluateArgs;
use crate::exit_codes::SUCCESS;
use catalog_audit_core::audit::Auditor;
use catalog_audit_core::ingest::{self, content_rows};
use catalog_audit_core::report::{console, csv, json};
use std::path::PathBuf;

fn default_output(input: &std::path::Path) -> PathBuf {
    let stem = ingest::source_tag(input);
    input.with_file_name(format!("{stem}_evaluated.csv"))
}

pub(crate) async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    let judge = build_judge(&args.judge)?;
    let table = ingest::read_table(&args.input)?;
    let rows = content_rows(&table);

    let auditor = Auditor::new(judge);
    let batch = auditor.evaluate_batch(&rows).await;

    if batch.results.is_empty() {
        tracing::warn!(skipped = batch.skipped, "no rows evaluated; nothing written");
    } else {
        let out = args.output.clone().unwrap_or_else(|| default_output(&args.input));
        csv::write_evaluation_csv(&batch.results, &out)?;
        eprintln!("Wrote {}", out.display());
    }
    if let Some(out) = &args.json {
        json::write_evaluation_json(&batch, out)?;
        eprintln!("Wrote {}", out.display());
    }

    console::print_evaluation_summary(&batch);
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("data/batch.csv")),
            PathBuf::from("data/batch_evaluated.csv")
        );
    }
}
