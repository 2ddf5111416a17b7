use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackStore;
use crate::sink::ReportSink;
use crate::style;
use crate::testing::{TestResult, TestRunner, TestSpec};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SuiteStatus {
    Pass,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub version: u32,
    pub status: SuiteStatus,
    pub max_score: f64,
    pub tests: Vec<TestResult>,
}

impl SuiteReport {
    pub const VERSION: u32 = 1;

    /// JSON, then base64.
    pub fn encode(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(BASE64.encode(json))
    }

    pub fn decode(blob: &str) -> anyhow::Result<Self> {
        let json = BASE64
            .decode(blob.trim())
            .context("Result blob is not valid base64")?;
        serde_json::from_slice(&json).context("Result blob does not hold a suite report")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Points {
    pub accumulated: f64,
    pub available: f64,
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.accumulated, self.available)
    }
}

/// Running status and points over the tests seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub status: SuiteStatus,
    /// `None` until some test declares points.
    pub points: Option<Points>,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            status: SuiteStatus::Pass,
            points: None,
        }
    }
}

impl Tally {
    /// Called before the test runs.
    pub fn declare(&mut self, spec: &TestSpec) {
        if let Some(p) = spec.points {
            self.points.get_or_insert_with(Points::default).available += p;
        }
    }

    pub fn record(&mut self, spec: &TestSpec, result: &TestResult) {
        if spec.is_pointed() {
            self.points.get_or_insert_with(Points::default).accumulated +=
                result.score.unwrap_or(0.0);
        }
        if !result.is_pass() {
            self.status = SuiteStatus::Error;
        }
    }

    pub fn max_score(&self) -> f64 {
        self.points.map_or(0.0, |p| p.available)
    }
}

#[derive(Debug, Clone)]
pub struct SuiteRunner {
    runner: TestRunner,
    temp_root: PathBuf,
    quiet: bool,
}

impl SuiteRunner {
    pub const POINTS_OUTPUT: &str = "points";
    pub const RESULT_OUTPUT: &str = "result";

    pub fn new(runner: TestRunner, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            temp_root: temp_root.into(),
            quiet: false,
        }
    }

    /// Suppresses the console narrative.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn get_runner(&self) -> &TestRunner {
        &self.runner
    }

    pub fn get_temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Runs every test in order and publishes the outputs to `sink`.
    pub async fn run(
        &self,
        specs: &[TestSpec],
        cwd: &Path,
        sink: &mut dyn ReportSink,
    ) -> anyhow::Result<SuiteReport> {
        let store = FeedbackStore::create(&self.temp_root)
            .context("Failed to create feedback directory")?;

        let mut tally = Tally::default();
        let mut results = Vec::with_capacity(specs.len());

        for spec in specs {
            tally.declare(spec);
            if !self.quiet {
                style::print_test_start(&spec.name);
            }

            let res = self.runner.run(spec, cwd, &store).await;
            tally.record(spec, &res);

            if !res.is_pass() {
                sink.fail(&format!("Test failed: {}", spec.name))
                    .unwrap_or_else(|e| log::warn!("Failed to signal failure: {:#}", e));
            }
            if !self.quiet {
                style::print_test_verdict(&res);
                if !res.is_pass() {
                    style::print_test_result_detail(&res, spec);
                }
            }
            results.push(res);
        }

        if let Some(points) = tally.points {
            sink.set_output(Self::POINTS_OUTPUT, &points.to_string())?;
            sink.notify(&format!("Points {}", points))?;
        }

        let report = SuiteReport {
            version: SuiteReport::VERSION,
            status: tally.status,
            max_score: tally.max_score(),
            tests: results,
        };
        let blob = report.encode().context("Failed to serialize suite report")?;
        sink.set_output(Self::RESULT_OUTPUT, &blob)?;

        if !self.quiet {
            style::print_suite_summary(&report, tally.points);
        }
        Ok(report)
    }
}
