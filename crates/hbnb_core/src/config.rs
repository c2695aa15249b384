//! Fixed console settings.
//!
//! The console takes no flags and reads no environment variables; this struct
//! only gathers the hardcoded defaults so tests can point them elsewhere.

use crate::console::PROMPT;
use crate::logging::default_log_level;
use crate::store::DEFAULT_STORAGE_PATH;
use std::path::{Path, PathBuf};

const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backing file of the storage engine.
    pub storage_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; `None` resolves to `<base>/logs`.
    pub log_dir: Option<PathBuf>,
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            prompt: PROMPT.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Returns the log directory, resolving the default against `base`.
    pub fn resolve_log_dir(&self, base: &Path) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| base.join(LOG_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::ConsoleConfig;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_use_fixed_storage_file_and_prompt() {
        let config = ConsoleConfig::default();
        assert_eq!(config.storage_path, PathBuf::from("file.json"));
        assert_eq!(config.prompt, "(hbnb) ");
        assert!(config.log_level == "debug" || config.log_level == "info");
    }

    #[test]
    fn log_dir_defaults_under_base() {
        let config = ConsoleConfig::default();
        assert_eq!(
            config.resolve_log_dir(Path::new("/srv/hbnb")),
            PathBuf::from("/srv/hbnb/logs")
        );

        let explicit = ConsoleConfig {
            log_dir: Some(PathBuf::from("/var/log/hbnb")),
            ..ConsoleConfig::default()
        };
        assert_eq!(
            explicit.resolve_log_dir(Path::new("/srv/hbnb")),
            PathBuf::from("/var/log/hbnb")
        );
    }
}
