//! Output formatting and progress display

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use drivepush_core::domain::format_size;
use drivepush_core::ports::IProgressSink;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Minimum number of bytes between two progress lines
const PROGRESS_STEP: u64 = 1024 * 1024;

/// Prints transfer progress to stderr, overwriting the current line
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    last_reported: AtomicU64,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether a progress update is worth printing
fn should_report(last: u64, transferred: u64, total: u64) -> bool {
    transferred < last || transferred - last >= PROGRESS_STEP || (total > 0 && transferred >= total)
}

fn progress_line(transferred: u64, total: u64) -> String {
    if total == 0 {
        return format!("Uploaded {}", format_size(transferred));
    }
    let percent = transferred.saturating_mul(100) / total;
    format!(
        "Uploaded {} of {} ({}%)",
        format_size(transferred),
        format_size(total),
        percent.min(100)
    )
}

impl IProgressSink for ProgressPrinter {
    fn on_progress(&self, transferred: u64, total: u64) {
        let last = self.last_reported.load(Ordering::Relaxed);
        if !should_report(last, transferred, total) {
            return;
        }
        self.last_reported.store(transferred, Ordering::Relaxed);

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[K{}", progress_line(transferred, total));
        if total > 0 && transferred >= total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
