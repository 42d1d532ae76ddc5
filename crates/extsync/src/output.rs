//! Terminal output utilities

use console::style;
use extsync_engine::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print one list entry with a colored marker
pub fn item(marker: &str, text: &str) {
    let marker = match marker {
        "+" => style(marker).green(),
        "-" => style(marker).red(),
        "~" => style(marker).yellow(),
        _ => style(marker).dim(),
    };
    println!("  {} {}", marker, text);
}

/// Progress bar fed by the sync engine
///
/// The bar is created lazily on the first step so that runs with nothing to
/// do never draw one.
#[derive(Default)]
pub struct SyncProgressBar {
    bar: Mutex<Option<ProgressBar>>,
}

impl SyncProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

impl ProgressReporter for SyncProgressBar {
    fn show_step(&self, message: &str, current: usize, total: usize) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| Self::create(total));
        pb.set_length(total as u64);
        // Position counts finished items
        pb.set_position(current.saturating_sub(1) as u64);
        pb.set_message(message.to_string());
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}
