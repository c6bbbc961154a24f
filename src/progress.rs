//! Progress feedback for assessment runs.
//!
//! One spinner per pipeline phase (clone, each analyzer, scoring, report),
//! drawn on stderr with `indicatif`.
//!
//! - **Quiet Mode**: no progress output (`REPO_QUALITY_QUIET` env var or
//!   `--quiet`)
//! - **Non-TTY**: spinners are hidden in CI and piped output

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub const TEMPLATE_SPINNER: &str = "{spinner} {msg}";
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const QUIET_ENV: &str = "REPO_QUALITY_QUIET";

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    pub quiet_mode: bool,
}

impl ProgressConfig {
    pub fn from_env(quiet: bool) -> Self {
        Self {
            quiet_mode: quiet || std::env::var_os(QUIET_ENV).is_some(),
        }
    }

    pub fn should_show_progress(&self) -> bool {
        !self.quiet_mode && std::io::stderr().is_terminal()
    }
}

#[derive(Clone)]
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            config,
        }
    }

    /// A manager that never draws, for library callers and tests
    pub fn hidden() -> Self {
        Self::new(ProgressConfig { quiet_mode: true })
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet_mode
    }

    /// Create a ticking spinner, hidden when progress should not be shown
    pub fn create_spinner(&self, msg: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template(TEMPLATE_SPINNER) {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Clear all spinners before printing final output
    pub fn clear(&self) -> std::io::Result<()> {
        self.multi.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode_disables_progress() {
        std::env::set_var(QUIET_ENV, "1");
        let config = ProgressConfig::from_env(false);
        assert!(!config.should_show_progress());
        std::env::remove_var(QUIET_ENV);
    }

    #[test]
    fn test_explicit_quiet_flag() {
        let config = ProgressConfig::from_env(true);
        assert!(config.quiet_mode);
        assert!(!config.should_show_progress());
    }

    #[test]
    fn test_hidden_manager_returns_hidden_spinner() {
        let manager = ProgressManager::hidden();
        let spinner = manager.create_spinner("Cloning");
        assert!(spinner.is_hidden());
        assert!(manager.is_quiet());
    }
}
