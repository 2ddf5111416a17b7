pub mod check;
pub mod decode;
pub mod run;

use std::path::{Path, PathBuf};

use autograde_core::HarnessConfig;

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Harness config (default: nearest `autograde.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("r"))]
    Run(run::Args),

    Check(check::Args),
    Decode(decode::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

pub const DEFAULT_TESTS_FILE: &str = ".github/classroom/autograding.json";

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Run(args) => run::exec(args, self).await,
            Check(args) => check::exec(args, self),
            Decode(args) => decode::exec(args, self),
        }
    }

    pub fn load_config(&self, cwd: impl AsRef<Path>) -> anyhow::Result<HarnessConfig> {
        match &self.config {
            Some(path) => HarnessConfig::from_toml_file(path.to_owned()),
            None => HarnessConfig::from_file_finding_in_ancestors_or_default(cwd),
        }
    }
}

/// Resolves the tests file against `cwd` when it is relative.
pub fn resolve_tests_file(tests_file: &Option<PathBuf>, cwd: &Path) -> PathBuf {
    let path = tests_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TESTS_FILE));
    let path = if path.is_absolute() { path } else { cwd.join(path) };
    log::debug!("Tests file: {:?}", util::replace_homedir_to_tilde(&path));
    path
}
