//! JSON persistence for one namespace file.
//!
//! A [`JsonStore`] reads a namespace file into a flat key/value map and writes
//! full snapshots back. Writes of the same file are serialized by a per-store
//! lock with a bounded wait; stores for different namespaces never contend.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::PersistError;

/// Raw entries of a namespace file, in file order.
pub type FileEntries = IndexMap<String, serde_json::Value>;

/// Reader and writer for a single `<namespace>.json` file.
#[derive(Debug)]
pub struct JsonStore {
	path: PathBuf,
	write_lock: Mutex<()>,
	write_timeout: Duration,
	pretty: bool,
}

impl JsonStore {
	pub fn new(path: impl Into<PathBuf>, write_timeout: Duration, pretty: bool) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
			write_timeout,
			pretty,
		}
	}

	/// Creates the store backing `namespace` under `config`.
	pub fn for_namespace(config: &StoreConfig, namespace: &str) -> Self {
		Self::new(config.file_path(namespace), config.write_timeout, config.pretty)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the file into a flat map.
	///
	/// Returns `Ok(None)` when the file does not exist or holds only
	/// whitespace. Anything else that is not a JSON object is
	/// [`PersistError::Malformed`]; the file is left untouched in that case.
	pub fn read(&self) -> Result<Option<FileEntries>, PersistError> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
			Err(source) => {
				return Err(PersistError::Read {
					path: self.path.clone(),
					source,
				});
			}
		};

		if content.trim().is_empty() {
			tracing::debug!(domain = "options", path = %self.path.display(), "option file is empty; treating as absent");
			return Ok(None);
		}

		serde_json::from_str::<FileEntries>(&content)
			.map(Some)
			.map_err(|source| PersistError::Malformed {
				path: self.path.clone(),
				source,
			})
	}

	/// Takes the write lock, waiting at most the configured timeout.
	///
	/// Returns [`PersistError::Busy`] if another write of this file holds the
	/// lock for longer than that.
	pub fn lock(&self) -> Result<StoreWriter<'_>, PersistError> {
		match self.write_lock.try_lock_for(self.write_timeout) {
			Some(guard) => Ok(StoreWriter { store: self, _guard: guard }),
			None => Err(PersistError::Busy {
				path: self.path.clone(),
				waited: self.write_timeout,
			}),
		}
	}

	/// Writes a full snapshot, replacing the file.
	///
	/// `snapshot` runs only once the write lock is held, so the last writer
	/// always serializes the newest state. If the lock cannot be taken in time
	/// this returns [`PersistError::Busy`] without calling `snapshot`.
	pub fn write_with<S, F>(&self, snapshot: F) -> Result<(), PersistError>
	where
		S: Serialize,
		F: FnOnce() -> S,
	{
		let writer = self.lock()?;
		writer.write(&snapshot())
	}

	fn encode<S: Serialize>(&self, entries: &S) -> Result<Vec<u8>, PersistError> {
		let encoded = if self.pretty {
			serde_json::to_vec_pretty(entries)
		} else {
			serde_json::to_vec(entries)
		};
		let mut bytes = encoded.map_err(|source| PersistError::Encode {
			path: self.path.clone(),
			source,
		})?;
		bytes.push(b'\n');
		Ok(bytes)
	}

	/// Atomically replaces the file through a sibling temp file.
	fn replace_file(&self, bytes: &[u8]) -> Result<(), PersistError> {
		let write_err = |source: std::io::Error| PersistError::Write {
			path: self.path.clone(),
			source,
		};

		let dir = match self.path.parent() {
			Some(dir) if !dir.as_os_str().is_empty() => dir,
			_ => Path::new("."),
		};
		fs::create_dir_all(dir).map_err(write_err)?;

		let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
		temp.write_all(bytes).map_err(write_err)?;
		temp.as_file().sync_all().map_err(write_err)?;
		temp.persist(&self.path).map_err(|err| write_err(err.error))?;
		Ok(())
	}

	/// Holds the write lock, simulating a long in-flight write.
	#[cfg(test)]
	pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
		self.write_lock.lock()
	}
}

/// Exclusive write access to a [`JsonStore`] file.
///
/// The lock is released when the writer is dropped.
pub struct StoreWriter<'a> {
	store: &'a JsonStore,
	_guard: MutexGuard<'a, ()>,
}

impl StoreWriter<'_> {
	/// Replaces the file with `entries`.
	pub fn write<S: Serialize>(&self, entries: &S) -> Result<(), PersistError> {
		let bytes = self.store.encode(entries)?;
		self.store.replace_file(&bytes)?;
		tracing::debug!(domain = "options", path = %self.store.path.display(), bytes = bytes.len(), "wrote option file");
		Ok(())
	}
}
