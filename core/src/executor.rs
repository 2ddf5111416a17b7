use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{io::AsyncWriteExt as _, process::Command};

use crate::env::BaseEnv;

/// Result of a captured run: either the trimmed stdout or a failure message, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Output(String),
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{}", ExecError::TIMED_OUT)]
    TimedOut { limit: Duration },

    #[error("Failed to spawn '{shell} -c {command}': {source}")]
    Spawn {
        shell: String,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to communicate with subprocess: {0}")]
    Io(#[source] io::Error),

    #[error("Command failed: {command} (exit code {code}){stderr}")]
    Exited {
        command: String,
        code: i32,
        stderr: StderrTail,
    },

    #[error("Command failed: {command} (terminated by signal){stderr}")]
    Signaled { command: String, stderr: StderrTail },
}

impl ExecError {
    pub const TIMED_OUT: &str = "Command timed out";

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::TimedOut { .. })
    }
}

/// Captured stderr, rendered on its own line after a failure message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StderrTail(String);

impl StderrTail {
    fn new(buf: &[u8]) -> Self {
        Self(String::from_utf8_lossy(buf).trim().to_owned())
    }
}

impl fmt::Display for StderrTail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "\n{}", self.0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandExecutor {
    shell: PathBuf,
    base_env: BaseEnv,
}

impl CommandExecutor {
    pub fn new(shell: impl Into<PathBuf>, base_env: BaseEnv) -> Self {
        Self {
            shell: shell.into(),
            base_env,
        }
    }

    pub fn get_shell(&self) -> &Path {
        &self.shell
    }

    pub fn base_env(&self) -> &BaseEnv {
        &self.base_env
    }

    /// Runs `command` feeding `input` to its stdin and returns its trimmed stdout.
    ///
    /// Every failure is folded into [`ExecutionOutcome::Error`]; a timeout always
    /// reads [`ExecError::TIMED_OUT`].
    pub async fn run_captured(
        &self,
        command: &str,
        input: Option<&str>,
        timeout: Duration,
        cwd: &Path,
        env: &[(&str, &OsStr)],
    ) -> ExecutionOutcome {
        match self.exec(command, Some(input.unwrap_or("")), true, timeout, cwd, env).await {
            Ok(stdout) => {
                ExecutionOutcome::Output(String::from_utf8_lossy(&stdout).trim().to_owned())
            }
            Err(e) if e.is_timeout() => ExecutionOutcome::Error(ExecError::TIMED_OUT.to_owned()),
            Err(e) => ExecutionOutcome::Error(e.to_string()),
        }
    }

    /// Runs `command` with no stdin and discarded stdout.
    pub async fn run_silent(
        &self,
        command: &str,
        timeout: Duration,
        cwd: &Path,
        env: &[(&str, &OsStr)],
    ) -> Result<(), ExecError> {
        self.exec(command, None, false, timeout, cwd, env)
            .await
            .map(|_| ())
    }

    async fn exec(
        &self,
        command: &str,
        input: Option<&str>,
        capture_stdout: bool,
        timeout: Duration,
        cwd: &Path,
        env: &[(&str, &OsStr)],
    ) -> Result<Vec<u8>, ExecError> {
        let stdio = |on: bool| if on { Stdio::piped() } else { Stdio::null() };

        let mut proc = Command::new(&self.shell)
            .args(["-c", command])
            .current_dir(cwd)
            .env_clear()
            .envs(self.base_env.iter())
            .envs(env.iter().copied())
            .stdin(stdio(input.is_some()))
            .stdout(stdio(capture_stdout))
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                shell: self.shell.to_string_lossy().into_owned(),
                command: command.to_owned(),
                source,
            })?;

        let stdin = proc.stdin.take();
        let mut stdout = proc.stdout.take();
        let mut stderr = proc.stderr.take();

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let res = {
            let fut_stdin = async {
                let (Some(mut stdin), Some(input)) = (stdin, input) else {
                    return Ok(());
                };
                match stdin.write_all(input.as_bytes()).await {
                    // the child may exit without reading its input
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                }
                // stdin is dropped here so that the child sees EOF
            };
            let fut_stdout = async {
                match stdout.as_mut() {
                    Some(r) => tokio::io::copy(r, &mut stdout_buf).await.map(|_| ()),
                    None => Ok(()),
                }
            };
            let fut_stderr = async {
                match stderr.as_mut() {
                    Some(r) => tokio::io::copy(r, &mut stderr_buf).await.map(|_| ()),
                    None => Ok(()),
                }
            };
            let fut_exit_status = proc.wait();

            tokio::time::timeout(timeout, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
            })
            .await
        };

        match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill timed-out process: {:#}", e));
                Err(ExecError::TimedOut { limit: timeout })
            }
            Ok(Err(e)) => Err(ExecError::Io(e)),
            Ok(Ok((_, _, _, exit_status))) => {
                Self::check_exit_status(command, exit_status, &stderr_buf)?;
                Ok(stdout_buf)
            }
        }
    }

    fn check_exit_status(
        command: &str,
        status: ExitStatus,
        stderr: &[u8],
    ) -> Result<(), ExecError> {
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ExecError::Exited {
                command: command.to_owned(),
                code,
                stderr: StderrTail::new(stderr),
            }),
            None => Err(ExecError::Signaled {
                command: command.to_owned(),
                stderr: StderrTail::new(stderr),
            }),
        }
    }
}
