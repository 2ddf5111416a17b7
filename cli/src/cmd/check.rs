use std::path::PathBuf;

use anyhow::bail;
use autograde_core::action;
use colored::Colorize;

use crate::util;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// JSON file of the form {"tests": [...]}
    #[arg(short = 't', long)]
    pub tests: Option<PathBuf>,
}

pub fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cwd = util::current_dir();
    let tests_file = super::resolve_tests_file(&args.tests, &cwd);
    let specs = action::load_test_specs(&tests_file)?;

    let problems = action::check_test_specs(&specs);
    for (name, problem) in &problems {
        println!("{} {}: {}", "✗".bright_red(), name.bold(), problem);
    }
    if !problems.is_empty() {
        bail!("{} problems found in {:?}", problems.len(), tests_file);
    }

    println!(
        "{}",
        format!("{} tests look fine ✨", specs.len()).green()
    );
    Ok(())
}
