pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::path::{Path, PathBuf};

use error::*;

use crate::config::HarnessConfig;
use crate::env::{BaseEnv, HostEnv};
use crate::executor::CommandExecutor;
use crate::sink::ReportSink;
use crate::suite::{SuiteReport, SuiteRunner};
use crate::testing::{SpecProblem, TestRunner, TestSpec, TestSuiteFile};

pub fn load_test_specs(tests_file: impl AsRef<Path>) -> Result<Vec<TestSpec>> {
    let tests_file = tests_file.as_ref();
    let specs = TestSuiteFile::from_json_file(tests_file)?.tests;
    if specs.is_empty() {
        log::warn!("No tests are declared in {:?}", tests_file);
    }
    Ok(specs)
}

/// Lists every problem found in `specs`, keyed by test name.
pub fn check_test_specs(specs: &[TestSpec]) -> Vec<(String, SpecProblem)> {
    specs
        .iter()
        .flat_map(|spec| {
            spec.problems()
                .into_iter()
                .map(|p| (spec.name.to_owned(), p))
        })
        .collect()
}

pub fn build_suite_runner(cfg: &HarnessConfig, host: &HostEnv) -> SuiteRunner {
    let base_env = BaseEnv::new(host, &cfg.env);
    let executor = CommandExecutor::new(cfg.shell.to_owned(), base_env);
    let runner = TestRunner::new(executor, cfg.feedback_var.to_owned());

    let temp_root: PathBuf = cfg
        .temp_root
        .clone()
        .unwrap_or_else(|| host.temp_root().to_owned());
    SuiteRunner::new(runner, temp_root)
}

pub async fn run_suite(
    specs: &[TestSpec],
    cwd: impl AsRef<Path>,
    cfg: &HarnessConfig,
    sink: &mut dyn ReportSink,
) -> Result<SuiteReport> {
    let cwd = cwd.as_ref();
    ensure!(cwd.is_dir(), "Not a directory: {:?}", cwd);

    let host = HostEnv::from_env().context("Failed to read host environment")?;
    let suite = build_suite_runner(cfg, &host);

    log::info!(
        "Running {} tests in {:?} (shell: {:?})",
        specs.len(),
        cwd,
        cfg.shell
    );
    suite.run(specs, cwd, sink).await
}

pub fn decode_report(blob: &str) -> Result<SuiteReport> {
    SuiteReport::decode(blob)
}
