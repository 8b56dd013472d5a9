use super::args::*;

pub(crate) mod audit;
pub(crate) mod dedup;
pub(crate) mod evaluate;
pub(crate) mod judge_builder;
pub(crate) mod summarize;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Audit(args) => audit::run(args, audit::Layout::Scraped).await,
        Command::AuditOnline(args) => audit::run(args, audit::Layout::Online).await,
        Command::Evaluate(args) => evaluate::run(args).await,
        Command::Summarize(args) => summarize::run(args),
        Command::Dedup(args) => dedup::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
