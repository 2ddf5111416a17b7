use std::{path::Path, time::Duration};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::compare::{self, CompareError, Comparison};

/// One graded test, as declared in the tests file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,

    pub run: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Minutes, shared by setup and run.
    pub timeout: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,

    #[serde(default = "TestSpec::default_comparison")]
    pub comparison: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestSuiteFile {
    pub tests: Vec<TestSpec>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SpecProblem {
    #[error("Empty run command")]
    EmptyRunCommand,

    #[error("Timeout must be a positive number of minutes (got {0})")]
    InvalidTimeout(f64),

    #[error("Points must be a non-negative number (got {0})")]
    InvalidPoints(f64),

    #[error(transparent)]
    Comparison(#[from] CompareError),
}

impl TestSpec {
    fn default_comparison() -> String {
        Comparison::Included.to_string()
    }

    /// Total wall-clock budget for setup and run together.
    pub fn timeout_budget(&self) -> Duration {
        let millis = self.timeout * 60_000.0;
        if millis.is_finite() && millis > 0.0 {
            Duration::from_millis(millis.round() as u64)
        } else {
            Duration::ZERO
        }
    }

    pub fn setup_command(&self) -> Option<&str> {
        self.setup.as_deref().filter(|s| !s.is_empty())
    }

    pub fn expected_output(&self) -> &str {
        self.output.as_deref().unwrap_or("")
    }

    pub fn is_pointed(&self) -> bool {
        self.points.is_some()
    }

    /// Human-readable rendering of the graded invocation.
    pub fn test_code(&self) -> String {
        format!("{} <stdin>{}", self.run, self.input.as_deref().unwrap_or(""))
    }

    /// Problems that would make this test error regardless of the submission.
    pub fn problems(&self) -> Vec<SpecProblem> {
        let mut res = Vec::new();
        if self.run.trim().is_empty() {
            res.push(SpecProblem::EmptyRunCommand);
        }
        if !(self.timeout.is_finite() && self.timeout > 0.0) {
            res.push(SpecProblem::InvalidTimeout(self.timeout));
        }
        if let Some(p) = self.points.filter(|p| !(p.is_finite() && *p >= 0.0)) {
            res.push(SpecProblem::InvalidPoints(p));
        }
        match Comparison::parse(&self.comparison) {
            Ok(Comparison::Regex) => {
                if let Err(e) = compare::compile_pattern(self.expected_output()) {
                    res.push(e.into());
                }
            }
            Ok(_) => (),
            Err(e) => res.push(e.into()),
        }
        res
    }
}

impl TestSuiteFile {
    pub fn from_json_file(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        fsutil::read_json_with_deserialize(filepath)
            .with_context(|| format!("Failed to load tests from {:?}", filepath))
    }
}
