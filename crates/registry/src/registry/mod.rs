//! The option registry for one namespace.
//!
//! An [`OptionRegistry`] owns the declared options of a host application,
//! reconciles them with the namespace file on [`init`](OptionRegistry::init)
//! and serves lookups and validated mutations afterwards.
//!
//! # Locking
//!
//! All option slots sit behind one coarse [`RwLock`]; the name index and the
//! declaration-ordered name list are immutable after construction and read
//! without locking. Write-backs take the store's file lock first and only
//! then snapshot the options, so concurrent `set_option(.., true)` calls on
//! different options never lose an update.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::StoreConfig;
use crate::core::{FromOptionValue, OptionType, OptionValue};
use crate::error::{PersistError, RegistryError, Result};
use crate::options::{OptionDef, OptionError, OptionSnapshot, RuleKind, TypedOptionKey};
use crate::persist::JsonStore;

mod reconcile;

pub use reconcile::ReconcileReport;

#[derive(Debug, Default)]
struct RegistryState {
	options: Vec<OptionDef>,
	/// Indices changed since the last successful write-back.
	unsaved: BTreeSet<usize>,
}

/// Typed options of one namespace, backed by `<config-dir>/<namespace>.json`.
pub struct OptionRegistry {
	namespace: Box<str>,
	names: Vec<Box<str>>,
	index: FxHashMap<Box<str>, usize>,
	state: RwLock<RegistryState>,
	store: JsonStore,
}

impl OptionRegistry {
	/// Builds a registry from the host's declared options.
	///
	/// Declaration order is kept for listing and for the written file.
	/// Declaring a name twice is rejected, as is a namespace that is empty
	/// or would escape the config directory.
	pub fn new<I>(namespace: impl Into<String>, defs: I, config: &StoreConfig) -> Result<Self>
	where
		I: IntoIterator<Item = OptionDef>,
	{
		let namespace = namespace.into();
		validate_namespace(&namespace)?;

		let options: Vec<OptionDef> = defs.into_iter().collect();
		let mut index = FxHashMap::with_capacity_and_hasher(options.len(), Default::default());
		let mut names = Vec::with_capacity(options.len());
		for (idx, opt) in options.iter().enumerate() {
			let name: Box<str> = opt.name().into();
			if index.insert(name.clone(), idx).is_some() {
				return Err(RegistryError::DuplicateOption {
					namespace,
					name: name.into(),
				});
			}
			names.push(name);
		}

		let store = JsonStore::for_namespace(config, &namespace);
		Ok(Self {
			namespace: namespace.into_boxed_str(),
			names,
			index,
			state: RwLock::new(RegistryState {
				options,
				unsaved: BTreeSet::new(),
			}),
			store,
		})
	}

	/// Loads the namespace file and reconciles it with the declared options.
	///
	/// Stale file keys are dropped, missing options keep their defaults and
	/// entries with an incompatible type fall back to the default. If any of
	/// that happened, or no file existed, the file is rewritten once.
	///
	/// A file that cannot be read or parsed is an error and is left
	/// untouched. A failed rewrite is only logged.
	pub fn init(&self) -> Result<ReconcileReport> {
		let entries = self.store.read()?;

		let mut report = {
			let mut state = self.state.write();
			let report = reconcile::reconcile(&self.namespace, &mut state.options, &self.index, entries.as_ref());
			state.unsaved.clear();
			report
		};

		if report.needs_rewrite() {
			report.rewritten = self.write_back().is_ok();
			if report.rewritten {
				tracing::info!(
					domain = "options",
					namespace = &*self.namespace,
					path = %self.store.path().display(),
					created = report.created,
					added = report.added.len(),
					dropped = report.dropped.len(),
					repaired = report.repaired.len(),
					"rewrote option file after reconciliation",
				);
			}
		}

		Ok(report)
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Path of the backing file.
	pub fn file_path(&self) -> &Path {
		self.store.path()
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn option_exists(&self, name: &str) -> bool {
		self.index.contains_key(name)
	}

	/// Returns the declared type of `name`.
	pub fn option_type(&self, name: &str) -> Option<OptionType> {
		let idx = *self.index.get(name)?;
		Some(self.state.read().options[idx].value_type())
	}

	pub fn get_option_value(&self, name: &str) -> Option<OptionValue> {
		let idx = *self.index.get(name)?;
		Some(self.state.read().options[idx].value())
	}

	/// Returns the value of `name` only if it exists and has type `T`.
	pub fn get<T: FromOptionValue>(&self, name: &str) -> Option<T> {
		T::from_option(&self.get_option_value(name)?)
	}

	pub fn get_typed<T: FromOptionValue>(&self, key: TypedOptionKey<T>) -> Option<T> {
		self.get(key.name())
	}

	/// Returns a copy of the named option's definition and state.
	pub fn option(&self, name: &str) -> Option<OptionSnapshot> {
		let idx = *self.index.get(name)?;
		Some(OptionSnapshot::from(&self.state.read().options[idx]))
	}

	/// Returns copies of every option in declaration order.
	pub fn options(&self) -> Vec<OptionSnapshot> {
		self.state.read().options.iter().map(OptionSnapshot::from).collect()
	}

	/// Validates and stores `value`, then writes back if `persist` is set.
	///
	/// Write-back failures are logged and do not affect the result; the
	/// change stays recorded as unsaved until a later write succeeds.
	pub fn try_set(&self, name: &str, value: impl Into<OptionValue>, persist: bool) -> Result<(), OptionError> {
		let idx = *self.index.get(name).ok_or_else(|| OptionError::UnknownOption(name.to_string()))?;
		let value = value.into();
		{
			let mut state = self.state.write();
			state.options[idx].try_set_value(value)?;
			state.unsaved.insert(idx);
		}
		tracing::debug!(domain = "options", namespace = &*self.namespace, name, %value, persist, "option set");

		// A failed write-back is logged by `write_back` and stays unsaved.
		if persist && self.write_back().is_err() {
			tracing::debug!(domain = "options", namespace = &*self.namespace, name, "option kept in memory only");
		}
		Ok(())
	}

	/// Boolean form of [`try_set`](Self::try_set).
	///
	/// `false` covers both unknown names and rejected values; use
	/// [`option_exists`](Self::option_exists) or `try_set` to tell them apart.
	pub fn set_option(&self, name: &str, value: impl Into<OptionValue>, persist: bool) -> bool {
		self.try_set(name, value, persist).is_ok()
	}

	/// Resets every option to its default without writing back.
	pub fn reset_options(&self) {
		let mut guard = self.state.write();
		let state = &mut *guard;
		for (idx, opt) in state.options.iter_mut().enumerate() {
			if opt.value() != opt.default_value() {
				state.unsaved.insert(idx);
			}
			opt.reset();
		}
	}

	/// Declared option names in declaration order.
	pub fn list_option_names(&self) -> Vec<String> {
		self.names.iter().map(|name| name.to_string()).collect()
	}

	/// Returns true if `name` is an integer option whose rule is exactly `rule`.
	pub fn has_rule(&self, name: &str, rule: RuleKind) -> bool {
		let Some(&idx) = self.index.get(name) else {
			return false;
		};
		let state = self.state.read();
		let opt = &state.options[idx];
		opt.value_type() == OptionType::Int && opt.rule().kind() == rule
	}

	/// Names of integer options carrying `rule`, in declaration order.
	pub fn options_with_rule(&self, rule: RuleKind) -> Vec<String> {
		self.state
			.read()
			.options
			.iter()
			.filter(|opt| opt.value_type() == OptionType::Int && opt.rule().kind() == rule)
			.map(|opt| opt.name().to_string())
			.collect()
	}

	/// Options changed since the last successful write-back, in declaration order.
	pub fn unsaved_changes(&self) -> Vec<(String, OptionValue)> {
		let state = self.state.read();
		state
			.unsaved
			.iter()
			.map(|&idx| (state.options[idx].name().to_string(), state.options[idx].value()))
			.collect()
	}

	pub fn has_unsaved_changes(&self) -> bool {
		!self.state.read().unsaved.is_empty()
	}

	/// Forgets recorded changes without writing them.
	pub fn clear_unsaved_changes(&self) {
		self.state.write().unsaved.clear();
	}

	/// Writes every option to the namespace file, replacing its contents.
	///
	/// Waits up to the configured timeout for another in-flight write of the
	/// same file, then gives up with [`PersistError::Busy`]. In-memory values
	/// are authoritative either way.
	pub fn write_back(&self) -> Result<(), PersistError> {
		let result = self.store.lock().and_then(|writer| {
			let (entries, taken) = {
				let mut state = self.state.write();
				let entries = state
					.options
					.iter()
					.map(|opt| (opt.name().to_string(), opt.value()))
					.collect::<IndexMap<String, OptionValue>>();
				(entries, std::mem::take(&mut state.unsaved))
			};
			// Restore while the file lock is still held.
			writer.write(&entries).inspect_err(|_| {
				if !taken.is_empty() {
					self.state.write().unsaved.extend(taken);
				}
			})
		});

		if let Err(error) = &result {
			match error {
				PersistError::Busy { .. } => tracing::warn!(
					domain = "options",
					namespace = &*self.namespace,
					%error,
					"could not persist options; file busy",
				),
				_ => tracing::warn!(domain = "options", namespace = &*self.namespace, %error, "could not persist options"),
			}
		}
		result
	}

	/// Writes back only if there are unsaved changes.
	///
	/// Returns whether a write happened.
	pub fn flush_pending(&self) -> Result<bool, PersistError> {
		if !self.has_unsaved_changes() {
			return Ok(false);
		}
		self.write_back().map(|()| true)
	}
}

impl core::fmt::Debug for OptionRegistry {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("OptionRegistry")
			.field("namespace", &self.namespace)
			.field("path", &self.store.path())
			.field("options", &self.names.len())
			.finish()
	}
}

fn validate_namespace(namespace: &str) -> Result<()> {
	let invalid = namespace.is_empty()
		|| namespace == "."
		|| namespace.contains("..")
		|| namespace.contains(['/', '\\'])
		|| namespace.chars().any(char::is_control);
	if invalid {
		return Err(RegistryError::InvalidNamespace(namespace.to_string()));
	}
	Ok(())
}

#[cfg(test)]
mod tests;
