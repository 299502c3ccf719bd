//! Concrete Subversion client.
//!
//! Builds the argument vectors for the `svn` executable, runs them through
//! [`CommandRunner`], and feeds the raw output to the parsers. This is the
//! only module that knows Subversion's command-line surface; everything
//! above it works against the [`VcsClient`] trait.

use crate::config::SvnConfig;
use crate::parse;
use crate::process::{CommandRunner, ProcessError};
use crate::provider::{VcsClient, VcsError, VcsResult};
use crate::types::{FileStatusEntry, LogEntry, Revision, RevisionReference};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Subversion error codes reported when a path or revision does not exist:
/// E160013/W160013 (path not found), E160006 (no such revision), E195012
/// (unable to find repository location), E200009 (target not under version
/// control).
fn not_found_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:E160013|E160006|E195012|E200009|W160013)\b")
            .expect("static pattern compiles")
    })
}

fn is_not_found_stderr(stderr: &str) -> bool {
    not_found_pattern().is_match(stderr)
}

pub struct SvnClient {
    runner: CommandRunner,
    working_copy_root: PathBuf,
}

impl SvnClient {
    pub fn new(config: SvnConfig) -> VcsResult<Self> {
        config
            .validate()
            .map_err(|message| VcsError::InvalidConfig { message })?;

        let mut runner = CommandRunner::new(&config.executable);
        if let Some(timeout) = config.command_timeout {
            runner = runner.with_timeout(timeout);
        }

        Ok(Self {
            runner,
            working_copy_root: config.working_copy_root,
        })
    }

    fn version_args() -> Vec<String> {
        vec!["--version".to_string(), "-q".to_string()]
    }

    fn status_args(&self) -> Vec<String> {
        vec![
            "status".to_string(),
            self.working_copy_root.to_string_lossy().into_owned(),
        ]
    }

    fn log_args(path: &str, limit: Option<usize>) -> Vec<String> {
        let mut args = vec!["log".to_string(), path.to_string(), "--xml".to_string()];
        if let Some(limit) = limit {
            args.push("-l".to_string());
            args.push(limit.to_string());
        }
        args
    }

    fn cat_args(path: &str, revision: &Revision) -> Vec<String> {
        vec![
            "cat".to_string(),
            "-r".to_string(),
            revision.to_string(),
            path.to_string(),
        ]
    }

    async fn run(&self, args: &[String]) -> Result<String, ProcessError> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(&arg_refs).await
    }
}

#[async_trait]
impl VcsClient for SvnClient {
    async fn version(&self) -> VcsResult<String> {
        let output = self.run(&Self::version_args()).await?;
        Ok(output.trim().to_string())
    }

    async fn status(&self) -> VcsResult<Vec<FileStatusEntry>> {
        let output = self.run(&self.status_args()).await?;
        Ok(parse::parse_status(&output))
    }

    async fn log(&self, path: &str, limit: Option<usize>) -> VcsResult<Vec<LogEntry>> {
        let output = match self.run(&Self::log_args(path, limit)).await {
            Ok(output) => output,
            Err(ProcessError::NonZeroExit { stderr, .. }) if is_not_found_stderr(&stderr) => {
                return Err(VcsError::NotFound {
                    reference: path.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(parse::parse_log(&output, path)?)
    }

    async fn cat(&self, path: &str, revision: &Revision) -> VcsResult<String> {
        match self.run(&Self::cat_args(path, revision)).await {
            Ok(content) => Ok(content),
            Err(ProcessError::NonZeroExit { stderr, .. }) if is_not_found_stderr(&stderr) => {
                Err(VcsError::NotFound {
                    reference: RevisionReference::new(path, *revision).to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn client_name(&self) -> &'static str {
        "svn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_args() {
        assert_eq!(SvnClient::version_args(), vec!["--version", "-q"]);
    }

    #[test]
    fn test_status_args_carry_working_copy_root() {
        let config = SvnConfig::default().with_working_copy_root("/srv/checkout");
        let client = SvnClient::new(config).unwrap();
        assert_eq!(client.status_args(), vec!["status", "/srv/checkout"]);
    }

    #[test]
    fn test_log_args_pass_limit_to_tool() {
        assert_eq!(
            SvnClient::log_args("src/lib.rs", None),
            vec!["log", "src/lib.rs", "--xml"]
        );
        assert_eq!(
            SvnClient::log_args("src/lib.rs", Some(20)),
            vec!["log", "src/lib.rs", "--xml", "-l", "20"]
        );
    }

    #[test]
    fn test_cat_args() {
        assert_eq!(
            SvnClient::cat_args("a.txt", &Revision::Base),
            vec!["cat", "-r", "BASE", "a.txt"]
        );
        assert_eq!(
            SvnClient::cat_args("a.txt", &Revision::Number(5)),
            vec!["cat", "-r", "5", "a.txt"]
        );
    }

    #[test]
    fn test_not_found_stderr_classification() {
        assert!(is_not_found_stderr(
            "svn: E160013: File not found: revision 9, path '/a.txt'"
        ));
        assert!(is_not_found_stderr(
            "svn: warning: W160013: URL 'file:///repo/a.txt' non-existent in revision 9"
        ));
        assert!(is_not_found_stderr("svn: E160006: No such revision 9999"));
        assert!(!is_not_found_stderr(
            "svn: E155007: '/tmp/x' is not a working copy"
        ));
        assert!(!is_not_found_stderr(""));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SvnConfig::default().with_executable("");
        let result = SvnClient::new(config);
        assert!(matches!(result, Err(VcsError::InvalidConfig { .. })));
    }
}
