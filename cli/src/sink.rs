use std::path::PathBuf;

use anyhow::Context as _;
use autograde_core::env::unicode_vars;
use autograde_core::sink::ReportSink;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GithubEnv {
    pub github_output: Option<PathBuf>,
    pub github_step_summary: Option<PathBuf>,
}

/// Publishes outputs the way a GitHub Actions step does.
#[derive(Debug, Clone, Default)]
pub struct GithubSink {
    env: GithubEnv,
    num_failures: usize,
}

impl GithubSink {
    const DELIMITER: &str = "AUTOGRADE_EOF";

    pub fn new(env: GithubEnv) -> Self {
        Self {
            env,
            num_failures: 0,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let env: GithubEnv = envy::from_iter(unicode_vars(std::env::vars_os()))
            .context("Failed to read GitHub environment")?;
        Ok(Self::new(env))
    }

    pub fn num_failures(&self) -> usize {
        self.num_failures
    }

    fn output_entry(name: &str, value: &str) -> String {
        if value.contains('\n') {
            format!("{name}<<{d}\n{value}\n{d}\n", d = Self::DELIMITER)
        } else {
            format!("{}={}\n", name, value)
        }
    }
}

impl ReportSink for GithubSink {
    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        match &self.env.github_output {
            Some(path) => fsutil::append(path, Self::output_entry(name, value))
                .with_context(|| format!("Failed to set output '{}'", name)),
            None => {
                println!("::set-output name={}::{}", name, value);
                Ok(())
            }
        }
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        self.num_failures += 1;
        println!("::error::{}", message);
        Ok(())
    }

    fn notify(&mut self, text: &str) -> anyhow::Result<()> {
        match &self.env.github_step_summary {
            Some(path) => fsutil::append(path, format!("{}\n", text))
                .context("Failed to write step summary"),
            None => {
                log::info!("{}", text);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outputs_are_appended_to_github_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let summary = dir.path().join("summary.md");
        let mut sink = GithubSink::new(GithubEnv {
            github_output: Some(out.clone()),
            github_step_summary: Some(summary.clone()),
        });

        sink.set_output("points", "3/5").unwrap();
        sink.set_output("result", "eyJ2ZXJzaW9uIjoxfQ==").unwrap();
        sink.notify("Points 3/5").unwrap();
        sink.fail("Test failed: b").unwrap();

        assert_eq!(
            fsutil::read_to_string(&out).unwrap(),
            "points=3/5\nresult=eyJ2ZXJzaW9uIjoxfQ==\n"
        );
        assert_eq!(fsutil::read_to_string(&summary).unwrap(), "Points 3/5\n");
        assert_eq!(sink.num_failures(), 1);
    }

    #[test]
    fn multiline_values_use_a_delimiter() {
        assert_eq!(
            GithubSink::output_entry("note", "a\nb"),
            "note<<AUTOGRADE_EOF\na\nb\nAUTOGRADE_EOF\n"
        );
    }

    #[test]
    fn github_env_from_vars() {
        let env: GithubEnv = envy::from_iter(vec![(
            "GITHUB_OUTPUT".to_owned(),
            "/runner/output".to_owned(),
        )])
        .unwrap();
        assert_eq!(env.github_output, Some(PathBuf::from("/runner/output")));
        assert_eq!(env.github_step_summary, None);
    }
}
