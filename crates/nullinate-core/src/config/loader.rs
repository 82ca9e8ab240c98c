//! Configuration file discovery and loading

use super::nullinate_config::NullinateConfig;
use crate::error::NullinateError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in discovery priority order
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".nullinaterc.json",
    ".nullinaterc.toml",
    "nullinate.yaml",
    "nullinate.yml",
    "nullinate.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Starts from the given directory and moves up the directory tree until
    /// a config is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path.canonicalize().map_err(|e| {
            NullinateError::config_error(format!(
                "Invalid path '{}': {e}",
                start_path.display()
            ))
        })?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<NullinateConfig> {
        NullinateConfig::load(path)
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, discovery starts at
    /// `start_dir` (or the current directory) and falls back to the default
    /// configuration when nothing is found. Returns the file used, if any.
    pub fn load(
        custom_path: Option<&Path>,
        start_dir: Option<&Path>,
    ) -> Result<(NullinateConfig, Option<PathBuf>)> {
        if let Some(path) = custom_path {
            if !path.is_file() {
                return Err(NullinateError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::load_from_file(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                Ok((config, Some(path)))
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok((NullinateConfig::default(), None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "nullinate.json",
            r#"{
                "files": {
                    "exclude": ["**/Generated/**"]
                }
            }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.files_config().exclude, vec!["**/Generated/**"]);
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            ".nullinaterc.toml",
            "[run]\nthreads = 3\n",
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.run_config().threads, Some(3));
    }

    #[test]
    fn test_auto_discover() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();

        create_temp_config(temp_dir.path(), "nullinate.yaml", "files:\n  skipGenerated: false\n");

        let found = ConfigLoader::auto_discover(&nested).unwrap();
        assert!(found.is_some_and(|p| p.ends_with("nullinate.yaml")));
    }

    #[test]
    fn test_dotfile_wins_over_plain_name() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "nullinate.json", "{}");
        create_temp_config(temp_dir.path(), ".nullinaterc.json", "{}");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap();
        assert!(found.is_some_and(|p| p.ends_with(".nullinaterc.json")));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.json")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_content_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "nullinate.json", "{ not json");

        let result = ConfigLoader::load(Some(&config_path), None);
        assert!(matches!(result, Err(NullinateError::Config { .. })));
    }
}
