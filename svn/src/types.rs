use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a working-copy file, taken from the first column of the
/// `svn status` flag field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Untracked,
    Ignored,
    Missing,
    Unknown,
}

impl FileStatus {
    /// Classify the first status flag column. Anything outside the known set
    /// (conflict markers, externals, property-only changes) is `Unknown`.
    pub fn from_flag(flag: char) -> Self {
        match flag {
            'M' => FileStatus::Modified,
            'A' => FileStatus::Added,
            'D' => FileStatus::Deleted,
            '?' => FileStatus::Untracked,
            'I' => FileStatus::Ignored,
            '!' => FileStatus::Missing,
            _ => FileStatus::Unknown,
        }
    }

    /// Whether this status represents a tracked local change (M/A/D). Only
    /// these reach the published snapshot; consumers rely on that.
    pub fn is_tracked_change(&self) -> bool {
        matches!(
            self,
            FileStatus::Modified | FileStatus::Added | FileStatus::Deleted
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Added => write!(f, "added"),
            FileStatus::Deleted => write!(f, "deleted"),
            FileStatus::Untracked => write!(f, "untracked"),
            FileStatus::Ignored => write!(f, "ignored"),
            FileStatus::Missing => write!(f, "missing"),
            FileStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One file in a status listing. Produced fresh on every poll cycle and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileStatusEntry {
    pub path: String,
    pub status: FileStatus,
}

impl FileStatusEntry {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// A point-in-time view of working-copy status. Replaced wholesale on each
/// successful refresh; a failed refresh leaves the previous snapshot intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCopySnapshot {
    pub entries: Vec<FileStatusEntry>,
    pub captured_at: DateTime<Utc>,
}

impl WorkingCopySnapshot {
    pub fn new(entries: Vec<FileStatusEntry>) -> Self {
        Self {
            entries,
            captured_at: Utc::now(),
        }
    }

    /// The snapshot published before the first successful refresh.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Order-independent entry-set equality. Two snapshots holding the same
    /// entries in different order are considered equal, so reordering of the
    /// tool's output never triggers a change notification.
    pub fn same_entries(&self, other: &WorkingCopySnapshot) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        let mut left = self.entries.clone();
        let mut right = other.entries.clone();
        left.sort();
        right.sort();
        left == right
    }
}

impl Default for WorkingCopySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// One revision in a file's history, as reported by the log query.
/// Sequences are newest-first, matching the tool's native order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub revision: u64,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

/// A resolvable revision token: either the literal working-copy base or a
/// numbered repository revision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Revision {
    /// The last-synced working-copy base, distinct from the remote HEAD.
    Base,
    Number(u64),
}

impl Revision {
    /// The revision used as the diff base for a numbered revision.
    ///
    /// This is the `current - 1` approximation: the true previous change to a
    /// given path may be older when the path was untouched in intervening
    /// revisions. Kept as-is rather than resolved against the tool.
    pub fn previous(&self) -> Option<Revision> {
        match self {
            Revision::Base => None,
            Revision::Number(n) if *n > 1 => Some(Revision::Number(n - 1)),
            Revision::Number(_) => None,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Base => write!(f, "BASE"),
            Revision::Number(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BASE") {
            return Ok(Revision::Base);
        }
        s.parse::<u64>()
            .map(Revision::Number)
            .map_err(|_| format!("invalid revision token: {}", s))
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::Base
    }
}

/// Transient key identifying one immutable historical blob. Constructed per
/// resolution request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevisionReference {
    pub path: String,
    pub revision: Revision,
}

impl RevisionReference {
    pub fn new(path: impl Into<String>, revision: Revision) -> Self {
        Self {
            path: path.into(),
            revision,
        }
    }
}

impl fmt::Display for RevisionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.revision)
    }
}

/// An item in an interactive history listing: either a real log entry or the
/// marker offering to expand to the full history. A dedicated variant rather
/// than a sentinel label, so a commit message can never collide with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HistoryPickItem {
    Entry(LogEntry),
    ShowAllMarker,
}
