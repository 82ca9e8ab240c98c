//! Output formatting and reporting

use anyhow::{Context, Result};
use colored::*;
use nullinate_core::{FileOutcome, MigrationMode, MigrationReport};

use crate::OutputFormat;

/// Prints a migration report in the selected format
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn print_report(&self, report: &MigrationReport, mode: MigrationMode) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human_format(report, mode);
                Ok(())
            }
            OutputFormat::Json => self.print_json_format(report, mode),
        }
    }

    fn print_human_format(&self, report: &MigrationReport, mode: MigrationMode) {
        for file in &report.files {
            let path = file.path.display();
            match &file.outcome {
                FileOutcome::Unchanged => {}
                FileOutcome::Rewritten => println!("{} {}", "rewritten".green(), path),
                FileOutcome::WouldRewrite { diff } => {
                    println!("{} {}", "would rewrite".yellow(), path);
                    if let Some(diff) = diff {
                        print_diff(diff);
                    }
                }
                FileOutcome::Skipped { reason } => {
                    println!("{} {} ({})", "skipped".dimmed(), path, reason)
                }
                FileOutcome::Failed { kind, error } => eprintln!(
                    "{} {}: {}",
                    format!("failed ({kind})").red().bold(),
                    path,
                    error
                ),
            }
        }

        self.print_summary_human(report, mode);
    }

    fn print_summary_human(&self, report: &MigrationReport, mode: MigrationMode) {
        println!("\n{}", "Summary:".bold());
        println!("  Files processed: {}", report.files.len());

        let changed = match mode {
            MigrationMode::Write => report.rewritten(),
            MigrationMode::Check | MigrationMode::Diff => report.would_rewrite(),
        };
        if changed == 0 {
            println!("  {} No changes needed", "✓".green());
        } else if mode == MigrationMode::Write {
            println!("  Rewritten: {}", changed.to_string().green());
        } else {
            println!("  Would rewrite: {}", changed.to_string().yellow());
        }

        if report.skipped() > 0 {
            println!("  Skipped: {}", report.skipped().to_string().dimmed());
        }
        if report.failed() > 0 {
            println!("  Failed: {}", report.failed().to_string().red());
        }
    }

    fn print_json_format(&self, report: &MigrationReport, mode: MigrationMode) -> Result<()> {
        let result = serde_json::json!({
            "mode": mode,
            "files": report.files,
            "summary": {
                "processed": report.files.len(),
                "unchanged": report.unchanged(),
                "rewritten": report.rewritten(),
                "wouldRewrite": report.would_rewrite(),
                "skipped": report.skipped(),
                "failed": report.failed()
            }
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize JSON report")?
        );
        Ok(())
    }
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}
