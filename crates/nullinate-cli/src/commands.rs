//! The migrate command

use anyhow::{Context, Result};
use nullinate_core::{
    ConfigLoader, InputKind, MigrationMode, MigrationOptions, Migrator, ProjectDiscovery,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::OutputFormat;
use crate::output::OutputFormatter;

/// Arguments for one migration run, after CLI parsing
#[derive(Debug, Clone)]
pub struct MigrateArgs {
    pub inputs: Vec<PathBuf>,
    pub check: bool,
    pub diff: bool,
    pub config: Option<PathBuf>,
    pub threads: Option<usize>,
    pub format: OutputFormat,
}

impl MigrateArgs {
    fn mode(&self) -> MigrationMode {
        if self.diff {
            MigrationMode::Diff
        } else if self.check {
            MigrationMode::Check
        } else {
            MigrationMode::Write
        }
    }
}

/// Migrate every input and return the process exit code
pub fn migrate_command(args: MigrateArgs) -> Result<i32> {
    debug!("Running migration on inputs: {:?}", args.inputs);

    if args.inputs.is_empty() {
        print_usage();
        return Ok(1);
    }
    if let Some(bad) = args.inputs.iter().find(|p| InputKind::of(p).is_none()) {
        eprintln!("unsupported input: {}", bad.display());
        print_usage();
        return Ok(1);
    }

    let (config, config_path) =
        ConfigLoader::load(args.config.as_deref(), Some(start_dir(&args.inputs[0])))?;
    if let Some(path) = &config_path {
        debug!("Using configuration from {}", path.display());
    }

    if let Some(threads) = args.threads.or(config.run_config().threads) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to set thread pool size")?;
    }

    let files_config = config.files_config();
    let base_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);
    let discovery = ProjectDiscovery::with_excludes(&files_config.exclude, base_dir)?;
    let files = discovery.discover(&args.inputs)?;

    let mode = args.mode();
    let start_time = Instant::now();
    let migrator = Migrator::new(MigrationOptions {
        mode,
        skip_generated: files_config.skip_generated,
    });
    let report = migrator.run(&files);
    info!("Migration finished in {:?}", start_time.elapsed());

    OutputFormatter::new(args.format).print_report(&report, mode)?;

    let pending = args.check && report.would_rewrite() > 0;
    Ok(if report.has_failures() || pending { 1 } else { 0 })
}

/// Directory where configuration discovery starts
fn start_dir(first_input: &Path) -> &Path {
    match first_input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn print_usage() {
    println!("nullinate v{}", nullinate_core::VERSION);
    println!("-------------");
    println!("\nUsage:");
    println!("  nullinate {{ file.sln | file.csproj | file.cs }} ...");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(check: bool, diff: bool) -> MigrateArgs {
        MigrateArgs {
            inputs: vec![PathBuf::from("Foo.cs")],
            check,
            diff,
            config: None,
            threads: None,
            format: OutputFormat::Human,
        }
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(args(false, false).mode(), MigrationMode::Write);
        assert_eq!(args(true, false).mode(), MigrationMode::Check);
        assert_eq!(args(false, true).mode(), MigrationMode::Diff);
        assert_eq!(args(true, true).mode(), MigrationMode::Diff);
    }

    #[test]
    fn test_start_dir() {
        assert_eq!(start_dir(Path::new("Foo.cs")), Path::new("."));
        assert_eq!(start_dir(Path::new("src/Foo.cs")), Path::new("src"));
    }
}
