use crate::parse::ParseError;
use crate::process::ProcessError;
use crate::types::{FileStatusEntry, LogEntry, Revision};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcsError {
    /// The external tool could not be launched, exited non-zero, or timed
    /// out. See [`ProcessError`] for the exact failure.
    #[error("tool invocation failed: {0}")]
    Process(#[from] ProcessError),

    #[error("could not parse tool output: {0}")]
    Parse(#[from] ParseError),

    /// The requested path or revision does not exist in the repository.
    #[error("not found: {reference}")]
    NotFound { reference: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl VcsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VcsError::NotFound { .. })
    }
}

pub type VcsResult<T> = Result<T, VcsError>;

/// The capability surface the engine needs from a version-control tool:
/// a status query returning entries, a log query returning structured
/// history, a content query returning text, and a version probe. The
/// synchronizer, history browser and content resolver are written against
/// this trait so the concrete tool can be swapped without touching them.
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Version of the underlying tool, trimmed to a single token.
    async fn version(&self) -> VcsResult<String>;

    /// Current status listing of the working copy. Every call re-queries the
    /// tool; nothing is cached.
    async fn status(&self) -> VcsResult<Vec<FileStatusEntry>>;

    /// Revision history for one path, newest first. A finite `limit` is
    /// passed through to the tool to bound cost; `None` requests the full
    /// history.
    async fn log(&self, path: &str, limit: Option<usize>) -> VcsResult<Vec<LogEntry>>;

    /// Immutable content of `path` as of `revision`. Independent per call
    /// and safe to invoke concurrently.
    async fn cat(&self, path: &str, revision: &Revision) -> VcsResult<String>;

    fn client_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileStatus;
    use chrono::Utc;

    struct MockClient;

    #[async_trait]
    impl VcsClient for MockClient {
        async fn version(&self) -> VcsResult<String> {
            Ok("1.14.2".to_string())
        }

        async fn status(&self) -> VcsResult<Vec<FileStatusEntry>> {
            Ok(vec![FileStatusEntry::new("a.txt", FileStatus::Modified)])
        }

        async fn log(&self, path: &str, _limit: Option<usize>) -> VcsResult<Vec<LogEntry>> {
            Ok(vec![LogEntry {
                revision: 3,
                author: "alice".to_string(),
                message: "change".to_string(),
                timestamp: Utc::now(),
                path: path.to_string(),
            }])
        }

        async fn cat(&self, path: &str, revision: &Revision) -> VcsResult<String> {
            Ok(format!("{}@{}", path, revision))
        }

        fn client_name(&self) -> &'static str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let client = MockClient;

        assert_eq!(client.version().await.unwrap(), "1.14.2");

        let status = client.status().await.unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].status, FileStatus::Modified);

        let log = client.log("a.txt", Some(5)).await.unwrap();
        assert_eq!(log[0].path, "a.txt");

        let content = client.cat("a.txt", &Revision::Base).await.unwrap();
        assert_eq!(content, "a.txt@BASE");

        assert_eq!(client.client_name(), "mock");
    }

    #[test]
    fn test_not_found_predicate() {
        let err = VcsError::NotFound {
            reference: "a.txt@9".to_string(),
        };
        assert!(err.is_not_found());

        let err: VcsError = ParseError::Malformed {
            detail: "x".to_string(),
        }
        .into();
        assert!(!err.is_not_found());
    }
}
