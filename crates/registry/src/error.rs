//! Infrastructure errors for registries and their backing files.

use std::path::PathBuf;
use std::time::Duration;

/// Failure reading or writing a namespace file.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
	#[error("failed to read {}: {source}", path.display())]
	Read { path: PathBuf, source: std::io::Error },

	#[error("malformed option file {}: {source}", path.display())]
	Malformed { path: PathBuf, source: serde_json::Error },

	#[error("failed to encode options for {}: {source}", path.display())]
	Encode { path: PathBuf, source: serde_json::Error },

	#[error("failed to write {}: {source}", path.display())]
	Write { path: PathBuf, source: std::io::Error },

	#[error("could not write {} because it was already being written for more than {waited:?}", path.display())]
	Busy { path: PathBuf, waited: Duration },
}

impl PersistError {
	/// Returns true for failures a later write-back may recover from.
	pub fn is_transient(&self) -> bool {
		matches!(self, PersistError::Busy { .. } | PersistError::Write { .. })
	}
}

/// Fatal registry construction or initialization error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	#[error("option '{name}' is declared more than once in namespace '{namespace}'")]
	DuplicateOption { namespace: String, name: String },

	#[error("invalid namespace: {0:?}")]
	InvalidNamespace(String),

	#[error("namespace '{0}' is already registered")]
	DuplicateNamespace(String),

	#[error(transparent)]
	Persist(#[from] PersistError),
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
