use anyhow::Context as _;
use autograde_core::action;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Encoded report, as found in the `result` output
    #[arg()] // positional argument
    pub blob: String,
}

pub fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let report = action::decode_report(&args.blob)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to render report")?;
    println!("{}", json);
    Ok(())
}
