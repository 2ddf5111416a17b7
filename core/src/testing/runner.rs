use std::{path::Path, time::Duration};

use tokio::time::Instant;

use super::{result::*, spec::*};
use crate::compare;
use crate::executor::{CommandExecutor, ExecError, ExecutionOutcome};
use crate::feedback::FeedbackStore;

#[derive(Debug, Clone)]
pub struct TestRunner {
    executor: CommandExecutor,
    feedback_var: String,
}

impl TestRunner {
    pub const SETUP_EXHAUSTED_BUDGET: &str =
        "Command timed out: setup used the entire time budget";

    pub fn new(executor: CommandExecutor, feedback_var: impl Into<String>) -> Self {
        Self {
            executor,
            feedback_var: feedback_var.into(),
        }
    }

    pub fn get_executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn get_feedback_var(&self) -> &str {
        &self.feedback_var
    }

    /// Runs one test through setup, run, comparison and feedback collection.
    ///
    /// Always yields a result; every failure is folded into it.
    pub async fn run(&self, spec: &TestSpec, cwd: &Path, store: &FeedbackStore) -> TestResult {
        let remaining = match self.setup(spec, cwd).await {
            Ok(remaining) => remaining,
            Err(message) => return TestResult::errored_early(spec, message),
        };

        let feedback_path = store.allocate();
        log::debug!("{}: feedback path {:?}", spec.name, feedback_path);

        let start_at = Instant::now();
        let outcome = self
            .executor
            .run_captured(
                &spec.run,
                spec.input.as_deref(),
                remaining,
                cwd,
                &[(self.feedback_var.as_str(), feedback_path.as_os_str())],
            )
            .await;
        let execution_time = start_at.elapsed();

        let verdict = self.judge(spec, outcome);

        let feedback = match store.collect(&feedback_path) {
            Ok(content) => FeedbackOutcome::Collected(content),
            Err(e) => FeedbackOutcome::Failed(e.to_string()),
        };

        let assessment = reduce(&spec.name, verdict, feedback);
        TestResult::new(spec, assessment, Some(execution_time))
    }

    /// Returns the budget left for the run phase.
    async fn setup(&self, spec: &TestSpec, cwd: &Path) -> Result<Duration, String> {
        let budget = spec.timeout_budget();
        let Some(setup) = spec.setup_command() else {
            return Ok(budget);
        };

        log::info!("{}: setup: {}", spec.name, setup);
        let start_at = Instant::now();
        self.executor
            .run_silent(setup, budget, cwd, &[])
            .await
            .map_err(|e: ExecError| e.to_string())?;

        remaining_budget(budget, start_at.elapsed())
            .ok_or_else(|| Self::SETUP_EXHAUSTED_BUDGET.to_owned())
    }

    fn judge(&self, spec: &TestSpec, outcome: ExecutionOutcome) -> Verdict {
        let actual = match outcome {
            ExecutionOutcome::Output(actual) => actual,
            ExecutionOutcome::Error(message) => return Verdict::Errored(message),
        };
        log::info!("{}: stdout:\n{}", spec.name, actual);

        let expected = spec.expected_output();
        match compare::compare(&actual, expected, &spec.comparison) {
            Ok(true) => Verdict::Pass,
            Ok(false) => Verdict::Mismatch {
                expected: expected.to_owned(),
                actual,
            },
            Err(e) => Verdict::Errored(e.to_string()),
        }
    }
}

/// Budget left for the run phase, or `None` once setup has used all of it.
pub(crate) fn remaining_budget(budget: Duration, setup_elapsed: Duration) -> Option<Duration> {
    Some(budget.saturating_sub(setup_elapsed)).filter(|d| !d.is_zero())
}
