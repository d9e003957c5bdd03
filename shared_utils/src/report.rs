//! End-of-batch summary printed by the CLI.

use crate::batch::BatchResult;
use crate::progress::format_duration;
use console::style;
use std::path::Path;
use std::time::Duration;

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Headline for the failed count, `None` when nothing failed.
pub fn failed_line(result: &BatchResult) -> Option<String> {
    (result.failed > 0).then(|| {
        format!(
            "⚠️  {} file{} failed.",
            result.failed,
            plural(result.failed)
        )
    })
}

/// Headline for the completed count, `None` when nothing completed.
pub fn completed_line(result: &BatchResult) -> Option<String> {
    (result.completed > 0).then(|| {
        let verb = if result.completed == 1 { "has" } else { "have" };
        format!(
            "🎉 {} file{} {} been converted with success.",
            result.completed,
            plural(result.completed),
            verb
        )
    })
}

pub fn print_summary_report(
    result: &BatchResult,
    duration: Duration,
    operation_name: &str,
    output_dir: Option<&Path>,
) {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║  📊 {:<48} ║", format!("{} Summary", operation_name));
    println!("╠══════════════════════════════════════════════════════╣");
    println!("║  📁 Files:        {:>10}                         ║", result.total);
    println!("║  ✅ Completed:    {:>10}                         ║", result.completed);
    println!("║  ❌ Failed:       {:>10}                         ║", result.failed);
    println!(
        "║  ⏱️  Total Time:   {:>10}                         ║",
        format_duration(duration)
    );
    println!("╚══════════════════════════════════════════════════════╝");

    if let Some(line) = failed_line(result) {
        eprintln!("{}", style(line).yellow().bold());
    }
    if let Some(line) = completed_line(result) {
        println!("{}", style(line).green().bold());
        if let Some(dir) = output_dir {
            println!("Files saved at: {}", dir.display());
        }
    }
}

/// One-line variant used in quiet mode.
pub fn print_simple_summary(result: &BatchResult) {
    println!(
        "✅ Complete: {} completed, {} failed (total: {})",
        result.completed, result.failed, result.total
    );
}
