use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "catalog-audit",
    version,
    about = "Audit e-commerce product records with an LLM judge"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Audit scraped records against their source page (URL, title, description, category, keywords)
    Audit(AuditArgs),
    /// Audit online records without a source URL (validity, category, keywords)
    AuditOnline(AuditArgs),
    /// Score optimized titles/descriptions and pick the best title candidate
    Evaluate(EvaluateArgs),
    /// Combine `*_audit_result` files of a directory into one summary
    Summarize(SummarizeArgs),
    /// Drop rows repeating a (url, title) pair, keeping the first
    Dedup(DedupArgs),
    Version,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct JudgeArgs {
    /// Judge provider
    /// - dashscope: live calls to the DashScope (Qwen) compatible endpoint
    /// - fake: deterministic offline judge (tests/dev)
    #[arg(long, env = "CATALOG_AUDIT_JUDGE")]
    pub judge: Option<String>,

    /// Judge model identifier (provider-specific)
    /// Example: qwen-plus
    #[arg(long, env = "CATALOG_AUDIT_JUDGE_MODEL")]
    pub judge_model: Option<String>,

    /// Falls back to QWEN_API_KEY, then DASHSCOPE_API_KEY
    #[arg(long, hide = true)]
    pub judge_api_key: Option<String>,

    /// Optional YAML config (version: 1) with a `judge` section
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ResultFormat {
    pub fn csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct AuditArgs {
    /// Record source (.csv with header row, or .jsonl)
    pub input: PathBuf,

    /// Directory for `<input>_audit_result.*`; defaults to the input's directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ResultFormat::Both)]
    pub format: ResultFormat,

    /// Drop duplicate (url, title) rows before auditing
    #[arg(long)]
    pub dedup: bool,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct EvaluateArgs {
    /// Content-optimization rows (.csv or .jsonl)
    pub input: PathBuf,

    /// Result CSV; defaults to `<input>_evaluated.csv` next to the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the full evaluation as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SummarizeArgs {
    /// Directory holding `*_audit_result.json` / `*_audit_result.csv` files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Summary JSON; defaults to `combined_summary.json` inside --dir
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct DedupArgs {
    /// CSV with `url` and `title` columns
    pub input: PathBuf,

    /// Defaults to `<input>_filtered_<timestamp>.csv` next to the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
