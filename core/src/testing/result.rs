use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::spec::TestSpec;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub err_message: Option<String>,
    pub content: Option<String>,
    pub test_code: String,
    pub execution_time: String,
    pub score: Option<f64>,
}

/// How the graded command fared, before feedback is taken into account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Mismatch { expected: String, actual: String },
    /// Execution failure, timeout, or a comparison that could not be evaluated.
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Collected(String),
    Failed(String),
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub status: TestStatus,
    pub err_message: Option<String>,
    pub content: Option<String>,
}

impl Verdict {
    pub fn status(&self) -> TestStatus {
        match self {
            Verdict::Pass => TestStatus::Pass,
            Verdict::Mismatch { .. } => TestStatus::Fail,
            Verdict::Errored(_) => TestStatus::Error,
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Verdict::Pass => None,
            Verdict::Mismatch { expected, actual } => Some(format!(
                "Output does not match expected.\nExpected: {}\nGot: {}",
                expected, actual
            )),
            Verdict::Errored(msg) => Some(msg.to_owned()),
        }
    }
}

/// Combines the verdict with the feedback collection outcome.
///
/// A failed feedback read always wins: the test becomes `error` carrying the
/// read failure, even when the verdict was more specific. The discarded
/// verdict message is logged.
pub fn reduce(test_name: &str, verdict: Verdict, feedback: FeedbackOutcome) -> Assessment {
    match feedback {
        FeedbackOutcome::Failed(read_err) => {
            if let Some(discarded) = verdict.message() {
                log::warn!(
                    "{}: feedback collection failed, discarding {} verdict: {}",
                    test_name,
                    verdict.status(),
                    discarded
                );
            }
            Assessment {
                status: TestStatus::Error,
                err_message: Some(read_err),
                content: None,
            }
        }
        FeedbackOutcome::Collected(content) => Assessment {
            status: verdict.status(),
            err_message: verdict.message(),
            content: Some(content),
        },
        FeedbackOutcome::NotAttempted => Assessment {
            status: verdict.status(),
            err_message: verdict.message(),
            content: None,
        },
    }
}

impl TestResult {
    pub fn new(spec: &TestSpec, assessment: Assessment, execution_time: Option<Duration>) -> Self {
        let Assessment {
            status,
            err_message,
            content,
        } = assessment;
        Self {
            name: spec.name.to_owned(),
            status,
            err_message,
            content,
            test_code: spec.test_code(),
            execution_time: format_execution_time(execution_time),
            score: spec
                .points
                .map(|p| if status == TestStatus::Pass { p } else { 0.0 }),
        }
    }

    /// A test that stopped before the run phase.
    pub fn errored_early(spec: &TestSpec, message: impl Into<String>) -> Self {
        let assessment = reduce(
            &spec.name,
            Verdict::Errored(message.into()),
            FeedbackOutcome::NotAttempted,
        );
        Self::new(spec, assessment, None)
    }

    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

pub fn format_execution_time(d: Option<Duration>) -> String {
    match d {
        Some(d) => format!("{}s", d.as_millis() as f64 / 1000.0),
        None => "0".to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn spec(points: Option<f64>) -> TestSpec {
        TestSpec {
            name: "t".into(),
            setup: None,
            run: "./a.out".into(),
            input: Some("1 2".into()),
            output: Some("3".into()),
            timeout: 1.0,
            points,
            comparison: "exact".into(),
        }
    }

    struct X {
        verdict: Verdict,
        feedback: FeedbackOutcome,
        want: Assessment,
    }

    fn mismatch() -> Verdict {
        Verdict::Mismatch {
            expected: "right".into(),
            actual: "wrong".into(),
        }
    }

    #[test]
    fn reduction_rule() {
        let cases = [
            X {
                verdict: Verdict::Pass,
                feedback: FeedbackOutcome::Collected("good".into()),
                want: Assessment {
                    status: TestStatus::Pass,
                    err_message: None,
                    content: Some("good".into()),
                },
            },
            X {
                verdict: mismatch(),
                feedback: FeedbackOutcome::Collected("".into()),
                want: Assessment {
                    status: TestStatus::Fail,
                    err_message: mismatch().message(),
                    content: Some("".into()),
                },
            },
            X {
                verdict: Verdict::Errored("Command timed out".into()),
                feedback: FeedbackOutcome::NotAttempted,
                want: Assessment {
                    status: TestStatus::Error,
                    err_message: Some("Command timed out".into()),
                    content: None,
                },
            },
            X {
                verdict: Verdict::Pass,
                feedback: FeedbackOutcome::Failed("Cannot read file".into()),
                want: Assessment {
                    status: TestStatus::Error,
                    err_message: Some("Cannot read file".into()),
                    content: None,
                },
            },
            X {
                verdict: mismatch(),
                feedback: FeedbackOutcome::Failed("Cannot read file".into()),
                want: Assessment {
                    status: TestStatus::Error,
                    err_message: Some("Cannot read file".into()),
                    content: None,
                },
            },
        ];
        for x in cases {
            assert_eq!(reduce("t", x.verdict, x.feedback), x.want);
        }
    }

    #[test]
    fn mismatch_message_embeds_actual_output() {
        let msg = mismatch().message().unwrap();
        assert!(msg.contains("wrong"));
        assert!(msg.contains("right"));
    }

    #[test]
    fn score_follows_points_and_status() {
        let pass = reduce("t", Verdict::Pass, FeedbackOutcome::NotAttempted);
        let fail = reduce("t", mismatch(), FeedbackOutcome::NotAttempted);

        assert_eq!(TestResult::new(&spec(Some(5.0)), pass.clone(), None).score, Some(5.0));
        assert_eq!(TestResult::new(&spec(Some(5.0)), fail.clone(), None).score, Some(0.0));
        assert_eq!(TestResult::new(&spec(None), pass, None).score, None);
        assert_eq!(TestResult::new(&spec(None), fail, None).score, None);
    }

    #[test]
    fn errored_early() {
        let r = TestResult::errored_early(&spec(Some(3.0)), "Command failed: make");
        assert_eq!(r.status, TestStatus::Error);
        assert_eq!(r.err_message.as_deref(), Some("Command failed: make"));
        assert_eq!(r.content, None);
        assert_eq!(r.execution_time, "0");
        assert_eq!(r.score, Some(0.0));
        assert_eq!(r.test_code, "./a.out <stdin>1 2");
    }

    #[test]
    fn execution_time_format() {
        assert_eq!(format_execution_time(None), "0");
        assert_eq!(format_execution_time(Some(Duration::from_millis(1234))), "1.234s");
        assert_eq!(format_execution_time(Some(Duration::from_millis(500))), "0.5s");
        assert_eq!(format_execution_time(Some(Duration::from_secs(2))), "2s");
    }

    #[test]
    fn serialized_field_names() {
        let r = TestResult::errored_early(&spec(None), "boom");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["err_message"], "boom");
        assert!(v["content"].is_null());
        assert!(v["score"].is_null());
        assert_eq!(v["execution_time"], "0");
    }
}
