//! External tool invocation.
//!
//! Every interaction with the version-control tool goes through
//! [`CommandRunner`]: spawn with an argument vector (never a shell), capture
//! stdout to completion, and surface launch failures and non-zero exits as
//! typed errors. Stderr is captured for diagnostics only and is never parsed
//! as data. There are no implicit retries; callers decide whether a failure
//! is fatal or ignorable.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

/// Errors from running the external tool.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The executable could not be started at all.
    #[error("failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited with a non-zero code. Stderr is attached for
    /// diagnostics.
    #[error("process exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    /// The optional per-invocation deadline elapsed and the process was
    /// killed.
    #[error("process did not complete within {seconds}s")]
    Timeout { seconds: u64 },
}

pub type ProcessResult<T> = Result<T, ProcessError>;

/// Runs one external program with argument vectors and captures its stdout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Enable the optional per-invocation deadline. Disabled by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program to completion and return its decoded stdout.
    ///
    /// Arguments are passed as a vector, never concatenated through a shell.
    /// Stdout is decoded as UTF-8 best-effort; invalid sequences are
    /// replaced rather than failing the call.
    pub async fn run(&self, args: &[&str]) -> ProcessResult<String> {
        debug!(command = %format!("{} {}", self.program, args.join(" ")), "invoking external tool");

        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = match self.timeout {
            Some(limit) => match timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ProcessError::Timeout {
                        seconds: limit.as_secs(),
                    })
                }
            },
            None => command.output().await,
        };

        let output = output.map_err(|source| ProcessError::LaunchFailed {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProcessError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = CommandRunner::new("echo");
        let output = runner.run(&["hello", "world"]).await.unwrap();
        assert_eq!(output.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_failure() {
        let runner = CommandRunner::new("definitely-not-a-real-binary-4af1");
        let result = runner.run(&["--version"]).await;
        assert!(matches!(result, Err(ProcessError::LaunchFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_code() {
        let runner = CommandRunner::new("false");
        match runner.run(&[]).await {
            Err(ProcessError::NonZeroExit { code, .. }) => assert_ne!(code, 0),
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_attached_to_error() {
        // `ls` on a missing path writes the complaint to stderr.
        let runner = CommandRunner::new("ls");
        match runner.run(&["/definitely/not/a/path/4af1"]).await {
            Err(ProcessError::NonZeroExit { stderr, .. }) => assert!(!stderr.is_empty()),
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_slow_process() {
        let runner = CommandRunner::new("sleep").with_timeout(Duration::from_millis(50));
        let result = runner.run(&["5"]).await;
        assert!(matches!(result, Err(ProcessError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_working_dir_applies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let runner = CommandRunner::new("ls").with_working_dir(dir.path());
        let output = runner.run(&[]).await.unwrap();
        assert!(output.contains("marker.txt"));
    }
}
