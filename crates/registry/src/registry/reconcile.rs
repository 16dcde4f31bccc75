//! Merges declared options with a previously written namespace file.

use rustc_hash::FxHashMap;

use crate::core::OptionValue;
use crate::options::OptionDef;
use crate::persist::FileEntries;

/// Outcome of reconciling declared options with the backing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	/// No file existed; declared defaults were adopted.
	pub created: bool,
	/// Declared options absent from the file, in declaration order.
	pub added: Vec<String>,
	/// File keys with no declared option, in file order.
	pub dropped: Vec<String>,
	/// Declared options whose file value had an incompatible type.
	pub repaired: Vec<String>,
	/// The file was rewritten after reconciliation.
	pub rewritten: bool,
}

impl ReconcileReport {
	/// Returns true if the file no longer matches the declared option set.
	pub fn needs_rewrite(&self) -> bool {
		self.created || !self.added.is_empty() || !self.dropped.is_empty() || !self.repaired.is_empty()
	}
}

/// Applies file values onto `options`.
///
/// Type-compatible file values are assigned without the rule check: the
/// file is treated as previously validated state.
pub(crate) fn reconcile(
	namespace: &str,
	options: &mut [OptionDef],
	index: &FxHashMap<Box<str>, usize>,
	entries: Option<&FileEntries>,
) -> ReconcileReport {
	let Some(entries) = entries else {
		return ReconcileReport {
			created: true,
			..ReconcileReport::default()
		};
	};

	let mut report = ReconcileReport::default();

	for key in entries.keys().filter(|key| !index.contains_key(key.as_str())) {
		tracing::warn!(domain = "options", namespace, key = key.as_str(), "dropping stale option from file");
		report.dropped.push(key.clone());
	}

	for opt in options.iter_mut() {
		let Some(raw) = entries.get(opt.name()) else {
			tracing::debug!(domain = "options", namespace, name = opt.name(), "option missing from file; using default");
			opt.reset();
			report.added.push(opt.name().to_string());
			continue;
		};

		let applied = OptionValue::from_json(raw).filter(|value| opt.assign_trusted(*value));
		match applied {
			Some(value) => {
				if let Err(reason) = opt.validate(value) {
					tracing::debug!(domain = "options", namespace, %reason, "file value violates rule; kept as trusted");
				}
			}
			None => {
				tracing::warn!(
					domain = "options",
					namespace,
					name = opt.name(),
					expected = opt.value_type().name(),
					got = OptionValue::json_type_name(raw),
					"incompatible value in option file; falling back to default",
				);
				opt.reset();
				report.repaired.push(opt.name().to_string());
			}
		}
	}

	report
}
