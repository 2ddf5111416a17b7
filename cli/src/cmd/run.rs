use std::path::PathBuf;

use anyhow::bail;
use autograde_core::{action, suite::SuiteStatus};

use crate::sink::GithubSink;
use crate::util;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// JSON file of the form {"tests": [...]}
    #[arg(short = 't', long)]
    pub tests: Option<PathBuf>,

    /// Submission directory the commands run in (default: current dir)
    #[arg(short = 'C', long)]
    pub cwd: Option<PathBuf>,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cwd = args.cwd.clone().unwrap_or_else(util::current_dir);
    let cfg = global_args.load_config(&cwd)?;

    let tests_file = super::resolve_tests_file(&args.tests, &cwd);
    let specs = action::load_test_specs(&tests_file)?;

    let mut sink = GithubSink::from_env()?;
    let report = action::run_suite(&specs, &cwd, &cfg, &mut sink).await?;

    if report.status == SuiteStatus::Error {
        let num_failed = report.tests.iter().filter(|r| !r.is_pass()).count();
        bail!("{}/{} tests did not pass", num_failed, report.tests.len());
    }
    Ok(())
}
