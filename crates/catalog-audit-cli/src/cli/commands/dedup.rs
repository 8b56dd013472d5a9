use crate::cli::args::DedupArgs;
use crate::exit_codes::SUCCESS;
use catalog_audit_core::dedup::dedup_by_url_title;
use catalog_audit_core::ingest;
use catalog_audit_core::report::{console, csv};
use std::path::{Path, PathBuf};

fn default_output(input: &Path) -> PathBuf {
    let stem = ingest::source_tag(input);
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    input.with_file_name(format!("{stem}_filtered_{stamp}.csv"))
}

pub(crate) fn run(args: DedupArgs) -> anyhow::Result<i32> {
    let table = ingest::read_table(&args.input)?;
    for column in ["url", "title"] {
        if !table.has_column(column) {
            anyhow::bail!("{} has no '{column}' column", args.input.display());
        }
    }

    let rows: Vec<_> = table.rows().collect();
    let out = dedup_by_url_title(rows, |r| (r.get("url").to_string(), r.get("title").to_string()));

    let path = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    csv::write_table_csv(table.headers(), out.rows.iter().map(|r| r.cells()), &path)?;
    eprintln!("Wrote {}", path.display());

    console::print_dedup_stats(&out.stats);
    Ok(SUCCESS)
}
