pub mod client;
pub mod config;
pub mod history;
pub mod notify;
pub mod parse;
pub mod process;
pub mod provider;
pub mod resolver;
pub mod sync;
pub mod types;

pub use client::SvnClient;
pub use config::SvnConfig;
pub use history::HistoryBrowser;
pub use notify::{ChangeNotifier, Subscription};
pub use parse::{parse_log, parse_status, ParseError, ParseResult};
pub use process::{CommandRunner, ProcessError, ProcessResult};
pub use provider::{VcsClient, VcsError, VcsResult};
pub use resolver::ContentResolver;
pub use sync::{StatusSynchronizer, SyncState};
pub use types::{
    FileStatus, FileStatusEntry, HistoryPickItem, LogEntry, Revision, RevisionReference,
    WorkingCopySnapshot,
};

pub mod prelude {
    pub use crate::client::*;
    pub use crate::config::*;
    pub use crate::history::*;
    pub use crate::notify::*;
    pub use crate::provider::*;
    pub use crate::resolver::*;
    pub use crate::sync::*;
    pub use crate::types::*;
}
