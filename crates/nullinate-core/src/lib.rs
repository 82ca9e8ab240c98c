//! Nullinate Core
//!
//! Migrates JetBrains-style `[CanBeNull]` / `[NotNull]` annotations in C#
//! sources to nullable reference types. This crate provides the lossless C#
//! syntax tree, the rewriter, solution/project discovery and the per-file
//! migration driver used by the `nullinate` binary.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod error;
pub mod migrate;
pub mod project;
pub mod result;
pub mod rewrite;

// Re-export commonly used types
pub use config::{ConfigLoader, FilesConfiguration, NullinateConfig, RunConfiguration};
pub use cst::{CsSyntaxKind, CsSyntaxNode, Parse, ParseError, parse_csharp};
pub use error::{ErrorKind, NullinateError};
pub use migrate::{
    FileOutcome, FileReport, MigrationMode, MigrationOptions, MigrationReport, Migrator,
};
pub use project::{InputKind, ProjectDiscovery};
pub use result::{Result, ResultExt};
pub use rewrite::{
    Marker, NullabilityRewriter, RewriteError, RewriteOutcome, SourceRewrite, rewrite_source,
};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nullinate=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
