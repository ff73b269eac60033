//! Colored output and progress reporting for the launcher
//!
//! Uses owo-colors for terminal colors and indicatif for progress bars.
//! Launcher chatter goes to stderr so the wrapped binary owns stdout.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Spinner characters shared by every progress indicator
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

const TICK_INTERVAL_MS: u64 = 80;

/// Enable or disable the debug channel.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print a detail line (dimmed prefix)
/// Example: "     using cached binary /home/me/.cache/..."
pub fn detail(message: &str) {
    eprintln!("     {}", message.dimmed());
}

/// Print a success message (green)
/// Example: "==> downloaded binary to /home/me/.cache/..."
pub fn success(message: &str) {
    eprintln!("{} {}", "==>".green().bold(), message.green());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a continuation line under an error (no prefix)
pub fn error_detail(message: &str) {
    eprintln!("  {}", message);
}

/// Print a hint line (cyan)
pub fn hint(message: &str) {
    eprintln!("{} {}", "hint:".cyan().bold(), message);
}

/// Debug message, shown only when verbose output is enabled
pub fn debug(message: &str) {
    if is_verbose() {
        eprintln!("{} {}", "[mesh-gateway:debug]".dimmed(), message);
    }
}

/// Create a download indicator.
///
/// Starts as a byte-counting spinner; call [`upgrade_to_percent`] once the
/// content length is known.
pub fn download_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg} {bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

const PERCENT_TEMPLATE: &str =
    "     {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {percent}% ({bytes}/{total_bytes})";

/// Switch a download spinner to a percentage bar for a known total.
pub fn upgrade_to_percent(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PERCENT_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸━"),
    );
}

/// RAII guard that clears a progress bar when dropped.
///
/// Keeps the terminal clean when a download bails out halfway.
pub struct ProgressGuard<'a>(&'a ProgressBar);

impl<'a> ProgressGuard<'a> {
    pub fn new(pb: &'a ProgressBar) -> Self {
        Self(pb)
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}
