//! Configuration system for nullinate
//!
//! Settings live in an optional config file next to (or above) the solution
//! or project being migrated. Command-line flags override anything read here.
//!
//! ## Configuration Files
//!
//! Searched in this order, starting at the directory of the first input and
//! moving up to the filesystem root:
//! - `.nullinaterc.json`
//! - `.nullinaterc.toml`
//! - `nullinate.yaml` / `nullinate.yml`
//! - `nullinate.json`
//!
//! ## Example Configuration
//!
//! ```yaml
//! files:
//!   exclude:
//!     - "**/Migrations/**"
//!     - "**/*.Designer.cs"
//!   skipGenerated: true
//! run:
//!   threads: 4
//! ```

mod loader;
mod nullinate_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use nullinate_config::{FilesConfiguration, NullinateConfig, RunConfiguration};
