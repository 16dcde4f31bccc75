//! Owned directory of the registries loaded in one process.
//!
//! Settings screens and similar surfaces enumerate every loaded namespace
//! through a [`RegistryDirectory`] handed to them by the host.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::config::StoreConfig;
use crate::error::{PersistError, RegistryError, Result};
use crate::options::OptionDef;
use crate::registry::{OptionRegistry, ReconcileReport};

/// Namespace-keyed set of registries, in registration order.
#[derive(Debug, Default)]
pub struct RegistryDirectory {
	registries: RwLock<IndexMap<Box<str>, Arc<OptionRegistry>>>,
}

impl RegistryDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an already built registry.
	pub fn insert(&self, registry: OptionRegistry) -> Result<Arc<OptionRegistry>> {
		let mut registries = self.registries.write();
		if registries.contains_key(registry.namespace()) {
			return Err(RegistryError::DuplicateNamespace(registry.namespace().to_string()));
		}
		let registry = Arc::new(registry);
		registries.insert(registry.namespace().into(), Arc::clone(&registry));
		Ok(registry)
	}

	/// Builds, initializes and registers the registry for `namespace`.
	///
	/// Nothing is registered if construction or initialization fails.
	pub fn load<I>(&self, namespace: &str, defs: I, config: &StoreConfig) -> Result<(Arc<OptionRegistry>, ReconcileReport)>
	where
		I: IntoIterator<Item = OptionDef>,
	{
		if self.contains(namespace) {
			return Err(RegistryError::DuplicateNamespace(namespace.to_string()));
		}
		let registry = OptionRegistry::new(namespace, defs, config)?;
		let report = registry.init()?;
		Ok((self.insert(registry)?, report))
	}

	pub fn get(&self, namespace: &str) -> Option<Arc<OptionRegistry>> {
		self.registries.read().get(namespace).cloned()
	}

	pub fn contains(&self, namespace: &str) -> bool {
		self.registries.read().contains_key(namespace)
	}

	pub fn remove(&self, namespace: &str) -> Option<Arc<OptionRegistry>> {
		self.registries.write().shift_remove(namespace)
	}

	/// Registered namespaces in registration order.
	pub fn namespaces(&self) -> Vec<String> {
		self.registries.read().keys().map(|ns| ns.to_string()).collect()
	}

	pub fn registries(&self) -> Vec<Arc<OptionRegistry>> {
		self.registries.read().values().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.registries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.registries.read().is_empty()
	}

	/// Flushes pending changes of every registry.
	///
	/// Each namespace is written independently; failures are collected and
	/// do not stop the remaining flushes.
	pub fn flush_all(&self) -> Vec<(String, PersistError)> {
		self.registries()
			.into_iter()
			.filter_map(|registry| {
				registry
					.flush_pending()
					.err()
					.map(|error| (registry.namespace().to_string(), error))
			})
			.collect()
	}
}
