//! Storage configuration shared by every namespace of a host process.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used under the platform config dir.
pub const DEFAULT_DIR_NAME: &str = "optkeep";

/// Bounded wait for an in-flight write-back before giving up.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Where and how namespace files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	/// Directory holding one `<namespace>.json` file per namespace.
	pub config_dir: PathBuf,
	/// How long a write-back waits for another in-flight write of the same file.
	pub write_timeout: Duration,
	/// Emit indented JSON.
	pub pretty: bool,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			config_dir: default_config_dir(),
			write_timeout: DEFAULT_WRITE_TIMEOUT,
			pretty: true,
		}
	}
}

impl StoreConfig {
	/// Creates a configuration rooted at `config_dir` with default settings.
	pub fn new(config_dir: impl Into<PathBuf>) -> Self {
		Self {
			config_dir: config_dir.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
		self.write_timeout = timeout;
		self
	}

	#[must_use]
	pub fn with_pretty(mut self, pretty: bool) -> Self {
		self.pretty = pretty;
		self
	}

	/// Returns the backing file path for `namespace`.
	pub fn file_path(&self, namespace: &str) -> PathBuf {
		self.config_dir.join(format!("{namespace}.json"))
	}

	pub fn config_dir(&self) -> &Path {
		&self.config_dir
	}
}

/// Returns the default directory for namespace files.
///
/// Uses the platform config directory (e.g. `$XDG_CONFIG_HOME`), falling
/// back to the system temp directory when none is available.
pub fn default_config_dir() -> PathBuf {
	dirs::config_dir().unwrap_or_else(std::env::temp_dir).join(DEFAULT_DIR_NAME)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_path_uses_namespace() {
		let config = StoreConfig::new("/srv/config");
		assert_eq!(config.file_path("homes"), PathBuf::from("/srv/config/homes.json"));
	}

	#[test]
	fn defaults() {
		let config = StoreConfig::new("dir").with_pretty(false);
		assert_eq!(config.write_timeout, Duration::from_secs(1));
		assert!(!config.pretty);
		assert!(default_config_dir().ends_with(DEFAULT_DIR_NAME));
	}
}
