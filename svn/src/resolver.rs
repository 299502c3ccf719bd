//! On-demand resolution of historical file content.

use crate::provider::{VcsClient, VcsResult};
use crate::types::Revision;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the immutable content of a path at a revision.
///
/// Every resolution is an independent tool invocation with no shared mutable
/// state, so any number of `(path, revision)` pairs may be resolved
/// concurrently, and one failed resolution never disturbs the others.
pub struct ContentResolver {
    client: Arc<dyn VcsClient>,
}

impl ContentResolver {
    pub fn new(client: Arc<dyn VcsClient>) -> Self {
        Self { client }
    }

    /// Content of `path` as of `revision`. Text only: content that is not
    /// valid UTF-8 comes back with replacement characters rather than
    /// failing.
    pub async fn get_content(&self, path: &str, revision: &Revision) -> VcsResult<String> {
        debug!(path, revision = %revision, "resolving historical content");
        self.client.cat(path, revision).await
    }

    /// Degraded variant for display surfaces that render something for every
    /// request: a failed resolution is logged and shown as empty content
    /// instead of an error.
    pub async fn get_content_or_empty(&self, path: &str, revision: &Revision) -> String {
        match self.get_content(path, revision).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path, revision = %revision, error = %e, "content resolution failed; rendering empty");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{VcsError, VcsResult};
    use crate::types::{FileStatusEntry, LogEntry};
    use async_trait::async_trait;

    struct RevisionEcho;

    #[async_trait]
    impl VcsClient for RevisionEcho {
        async fn version(&self) -> VcsResult<String> {
            Ok("1.14.2".to_string())
        }

        async fn status(&self) -> VcsResult<Vec<FileStatusEntry>> {
            Ok(Vec::new())
        }

        async fn log(&self, _path: &str, _limit: Option<usize>) -> VcsResult<Vec<LogEntry>> {
            Ok(Vec::new())
        }

        async fn cat(&self, path: &str, revision: &Revision) -> VcsResult<String> {
            if path == "gone.txt" {
                return Err(VcsError::NotFound {
                    reference: format!("{}@{}", path, revision),
                });
            }
            Ok(format!("content of {} at {}", path, revision))
        }

        fn client_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_resolution_is_per_revision() {
        let resolver = ContentResolver::new(Arc::new(RevisionEcho));
        let base = resolver.get_content("a.txt", &Revision::Base).await.unwrap();
        let pinned = resolver
            .get_content("a.txt", &Revision::Number(5))
            .await
            .unwrap();
        assert_eq!(base, "content of a.txt at BASE");
        assert_eq!(pinned, "content of a.txt at 5");
    }

    #[tokio::test]
    async fn test_missing_path_surfaces_not_found() {
        let resolver = ContentResolver::new(Arc::new(RevisionEcho));
        let result = resolver.get_content("gone.txt", &Revision::Base).await;
        assert!(matches!(result, Err(VcsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_degraded_variant_renders_empty() {
        let resolver = ContentResolver::new(Arc::new(RevisionEcho));
        let content = resolver
            .get_content_or_empty("gone.txt", &Revision::Base)
            .await;
        assert_eq!(content, "");
    }
}
