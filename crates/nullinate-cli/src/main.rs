//! Nullinate CLI
//!
//! Command-line interface that migrates `[CanBeNull]` / `[NotNull]`
//! annotations in C# solutions, projects and source files to nullable
//! reference types

mod commands;
mod output;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use nullinate_core::init_tracing;
use std::io;
use std::path::PathBuf;
use tracing::error;

use crate::commands::MigrateArgs;

#[derive(Parser)]
#[command(name = "nullinate")]
#[command(about = "Migrate JetBrains nullability annotations to C# nullable reference types")]
#[command(version = nullinate_core::VERSION)]
#[command(
    long_about = "nullinate rewrites [CanBeNull] / [NotNull] annotations into nullable reference\n\
types (`string?`) and drops the annotations from declarations that are not public.\n\
Formatting and comments around every edit are preserved.\n\
\n\
Examples:\n  \
nullinate App.sln                # Rewrite every project in a solution\n  \
nullinate Lib/Lib.csproj         # Rewrite one project\n  \
nullinate --check Foo.cs         # Exit 1 if Foo.cs would change\n  \
nullinate --diff App.sln         # Show the edits without writing them"
)]
struct Cli {
    /// Solutions, projects or source files to migrate
    #[arg(value_name = "INPUTS", help = "Files to migrate (.sln, .csproj or .cs)")]
    inputs: Vec<PathBuf>,

    /// Report files that would change without writing them
    #[arg(long, help = "Do not write; exit with status 1 if any file would change")]
    check: bool,

    /// Print a unified diff for each file that would change
    #[arg(long, help = "Do not write; print a diff of the pending changes")]
    diff: bool,

    /// Configuration file path
    #[arg(
        short,
        long,
        help = "Path to configuration file (.nullinaterc.json/.nullinaterc.toml/nullinate.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,

    /// Output format
    #[arg(long, default_value = "human", help = "Output format for the report")]
    format: OutputFormat,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling integration
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "nullinate=error",
        1 => "nullinate=warn",
        2 => "nullinate=info",
        3 => "nullinate=debug",
        _ => "nullinate=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    let args = MigrateArgs {
        inputs: cli.inputs,
        check: cli.check,
        diff: cli.diff,
        config: cli.config,
        threads: cli.threads,
        format: cli.format,
    };

    match commands::migrate_command(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("nullinate failed: {:#}", e);
            eprintln!("{} {:#}", "error:".red(), e);
            std::process::exit(1);
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
