//! Progress feedback for analysis phases, built on `indicatif`.
//!
//! Progress bars are created through a global manager so library code can
//! report phase progress without threading handles around. Bars are hidden
//! in quiet mode (`--quiet` or `SENSORKIT_QUIET`) and when stderr is not a
//! terminal, so CI logs and piped output stay clean.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

// Progress bar templates
pub const TEMPLATE_INDEXING: &str = "📁 {msg} {pos}/{len} files ({percent}%) - {eta}";
pub const TEMPLATE_SENSORS: &str = "🔎 {msg} {pos}/{len} sensors - {eta}";
pub const TEMPLATE_SPINNER: &str = "{spinner} {msg}";

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output
    pub quiet_mode: bool,
}

impl ProgressConfig {
    /// Create progress configuration from environment and CLI arguments
    pub fn from_env(quiet: bool) -> Self {
        let env_quiet = std::env::var("SENSORKIT_QUIET").is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
        }
    }

    /// Determine if progress bars should be displayed
    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }
        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

static GLOBAL_PROGRESS: Lazy<Mutex<Option<ProgressManager>>> = Lazy::new(|| Mutex::new(None));

/// Centralized progress manager for coordinating multiple progress bars
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

    /// Initialize the global progress manager
    pub fn init_global(config: ProgressConfig) {
        *GLOBAL_PROGRESS.lock() = Some(Self::new(config));
    }

    /// Get a clone of the global progress manager, if one was initialized
    pub fn global() -> Option<Self> {
        GLOBAL_PROGRESS.lock().clone()
    }

    /// Create a progress bar with the given length and template.
    ///
    /// Returns a hidden progress bar if progress should not be shown.
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let bar = self.multi.add(ProgressBar::new(len));
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("█▓▒░  "));
        }
        bar
    }

    /// Create a spinner with the given message.
    ///
    /// Returns a hidden progress bar if progress should not be shown.
    pub fn create_spinner(&self, msg: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template(TEMPLATE_SPINNER) {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar
    }

    /// Clear all progress bars before printing final output
    pub fn clear(&self) -> std::io::Result<()> {
        self.multi.clear()
    }
}
