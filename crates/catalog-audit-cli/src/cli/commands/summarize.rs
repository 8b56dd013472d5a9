use crate::cli::args::SummarizeArgs;
use crate::exit_codes::SUCCESS;
use catalog_audit_core::report::summary::{CombinedSummary, SUMMARY_FILE_NAME};
use catalog_audit_core::report::{self, console, json};

pub(crate) fn run(args: SummarizeArgs) -> anyhow::Result<i32> {
    let loaded = report::load_results(&args.dir)?;
    if loaded.files.is_empty() {
        anyhow::bail!("no *{}.json or .csv files in {}", report::RESULT_SUFFIX, args.dir.display());
    }

    let sources = loaded
        .files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    let combined = CombinedSummary::build(sources, &loaded.records);

    let out = args.out.clone().unwrap_or_else(|| args.dir.join(SUMMARY_FILE_NAME));
    json::write_summary_json(&combined, &out)?;
    eprintln!("Wrote {}", out.display());

    console::print_combined_summary(&combined);
    Ok(SUCCESS)
}
