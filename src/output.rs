//! Output formatting and styling module.
//!
//! Provides a centralized interface for the human-facing CLI output: colored
//! status lines, the table of planned destinations and the end-of-run summary.
//! Diagnostics during the run go through [`Reporter`](crate::report::Reporter)
//! instead.

use crate::report::RunReport;
use crate::scanner::FileBucket;
use colored::*;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Sorted 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one row per destination with the number of files bound for it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::classifier::DestinationPath;
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::scanner::FileBucket;
    ///
    /// let mut bucket = FileBucket::new();
    /// bucket.insert(DestinationPath::single("documents"), "notes.txt".to_string());
    /// OutputFormatter::plan_table(&bucket);
    /// ```
    pub fn plan_table(bucket: &FileBucket) {
        Self::header("PLAN");

        let rows: Vec<(String, usize)> = bucket
            .iter()
            .map(|(destination, files)| (destination.to_string(), files.len()))
            .collect();

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(11); // At least "Destination" width

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (destination, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                destination,
                count.to_string().green(),
                if *count == 1 { "file" } else { "files" },
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        let total = bucket.file_count();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            if total == 1 { "file" } else { "files" },
            width = width
        );

        if !bucket.unclassified().is_empty() {
            println!(
                "{} left in place (no matching rule)",
                bucket.unclassified().len().to_string().yellow()
            );
        }
    }

    /// Prints the counters of a finished run and lists every failure.
    pub fn run_summary(report: &RunReport) {
        Self::header("SUMMARY");
        println!("  Scanned:     {}", report.scanned);
        println!("  Classified:  {}", report.classified);
        println!(
            "  Directories: {} created, {} already present",
            report.leaves_created.to_string().green(),
            report.leaves_existing
        );
        println!("  Moved:       {}", report.moved.to_string().green());

        if report.conflicts > 0 {
            Self::warning(&format!(
                "{} files skipped because the destination name was taken",
                report.conflicts
            ));
        }

        if report.skipped > 0 {
            Self::warning(&format!(
                "{} files left in place because their directory could not be made",
                report.skipped
            ));
        }

        for relocation in &report.side_relocations {
            Self::warning(&format!(
                "Moved blocking file {} to {}",
                relocation.from.display(),
                relocation.to.display()
            ));
        }

        if report.failures.is_empty() {
            Self::success("Done.");
        } else {
            Self::error(&format!("{} items failed:", report.failures.len()));
            for failure in &report.failures {
                eprintln!("    - {}: {}", failure.path.display(), failure.reason);
            }
        }
    }
}
