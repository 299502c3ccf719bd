use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the SVN engine: which executable to run, where the
/// working copy lives, and the refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvnConfig {
    /// Name or path of the Subversion executable.
    pub executable: String,
    /// Root of the working copy passed to status queries.
    pub working_copy_root: PathBuf,
    /// Fixed interval between scheduled status refreshes.
    pub poll_interval: Duration,
    /// Quiet window for collapsing bursts of filesystem events into one
    /// refresh.
    pub debounce_window: Duration,
    /// Optional hard deadline for a single external tool invocation. Off by
    /// default; the original tolerates arbitrarily slow tool calls.
    pub command_timeout: Option<Duration>,
}

impl Default for SvnConfig {
    fn default() -> Self {
        Self {
            executable: "svn".to_string(),
            working_copy_root: PathBuf::from("."),
            poll_interval: Duration::from_secs(10),
            debounce_window: Duration::from_secs(1),
            command_timeout: None,
        }
    }
}

impl SvnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_working_copy_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_copy_root = root.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.executable.is_empty() {
            return Err("Executable cannot be empty".to_string());
        }

        if self.working_copy_root.as_os_str().is_empty() {
            return Err("Working copy root cannot be empty".to_string());
        }

        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than 0".to_string());
        }

        if self.debounce_window.is_zero() {
            return Err("Debounce window must be greater than 0".to_string());
        }

        if let Some(timeout) = self.command_timeout {
            if timeout.is_zero() {
                return Err("Command timeout must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SvnConfig::default();
        assert_eq!(config.executable, "svn");
        assert_eq!(config.working_copy_root, PathBuf::from("."));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.debounce_window, Duration::from_secs(1));
        assert!(config.command_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SvnConfig::new()
            .with_executable("/usr/local/bin/svn")
            .with_working_copy_root("/srv/checkout")
            .with_poll_interval(Duration::from_secs(30))
            .with_debounce_window(Duration::from_millis(500))
            .with_command_timeout(Duration::from_secs(60));

        assert_eq!(config.executable, "/usr/local/bin/svn");
        assert_eq!(config.working_copy_root, PathBuf::from("/srv/checkout"));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.debounce_window, Duration::from_millis(500));
        assert_eq!(config.command_timeout, Some(Duration::from_secs(60)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SvnConfig::default();

        config.executable = "".to_string();
        assert!(config.validate().is_err());

        config.executable = "svn".to_string();
        config.poll_interval = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config.poll_interval = Duration::from_secs(10);
        config.debounce_window = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config.debounce_window = Duration::from_secs(1);
        config.command_timeout = Some(Duration::from_secs(0));
        assert!(config.validate().is_err());

        config.command_timeout = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = SvnConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SvnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.executable, deserialized.executable);
        assert_eq!(config.poll_interval, deserialized.poll_interval);
    }
}
