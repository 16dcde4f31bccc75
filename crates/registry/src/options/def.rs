use super::rule::{Bounds, Rule};
use super::OptionError;
use crate::core::{OptionType, OptionValue};

/// A single named, typed, validated option.
///
/// Boolean options always carry [`Rule::None`]. Integer options carry the rule
/// given at construction together with the [`Bounds`] derived from it.
///
/// The default value is trusted: constructors never check it against the
/// rule, only later [`set_value`](Self::set_value) calls are validated.
#[derive(Clone, PartialEq, Eq)]
pub struct OptionDef {
	name: Box<str>,
	default: OptionValue,
	value: OptionValue,
	rule: Rule,
	bounds: Bounds,
}

impl OptionDef {
	/// Declares a boolean option.
	pub fn bool(name: impl Into<Box<str>>, default: bool) -> Self {
		Self::new(name.into(), OptionValue::Bool(default), Rule::None)
	}

	/// Declares an integer option without a rule.
	pub fn int(name: impl Into<Box<str>>, default: i64) -> Self {
		Self::new(name.into(), OptionValue::Int(default), Rule::None)
	}

	/// Attaches a validation rule to an integer option.
	///
	/// Has no effect on boolean options, whose rule is always [`Rule::None`].
	#[must_use]
	pub fn with_rule(mut self, rule: Rule) -> Self {
		if self.default.value_type() == OptionType::Int {
			self.rule = rule;
			self.bounds = rule.bounds();
		}
		self
	}

	fn new(name: Box<str>, default: OptionValue, rule: Rule) -> Self {
		Self {
			name,
			default,
			value: default,
			rule,
			bounds: rule.bounds(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value_type(&self) -> OptionType {
		self.default.value_type()
	}

	pub fn default_value(&self) -> OptionValue {
		self.default
	}

	pub fn value(&self) -> OptionValue {
		self.value
	}

	pub fn rule(&self) -> Rule {
		self.rule
	}

	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Checks `value` against the declared type and rule without mutating.
	pub fn validate(&self, value: OptionValue) -> Result<(), OptionError> {
		match value {
			OptionValue::Int(n) if self.value_type() == OptionType::Int => {
				if self.rule.accepts(n) {
					Ok(())
				} else {
					Err(OptionError::OutOfBounds {
						option: self.name.to_string(),
						rule: self.rule,
						value: n,
					})
				}
			}
			OptionValue::Bool(_) if self.value_type() == OptionType::Bool => Ok(()),
			other => Err(OptionError::TypeMismatch {
				option: self.name.to_string(),
				expected: self.value_type(),
				got: other.type_name(),
			}),
		}
	}

	/// Validates and stores `value`. A rejected value leaves the option untouched.
	pub fn try_set_value(&mut self, value: OptionValue) -> Result<(), OptionError> {
		self.validate(value)?;
		self.value = value;
		Ok(())
	}

	/// Boolean form of [`try_set_value`](Self::try_set_value).
	pub fn set_value(&mut self, value: impl Into<OptionValue>) -> bool {
		self.try_set_value(value.into()).is_ok()
	}

	/// Stores a value read from a trusted source, skipping the rule check.
	///
	/// Returns false without mutating if the type does not match. A file may
	/// therefore load a value that [`set_value`](Self::set_value) would refuse.
	pub(crate) fn assign_trusted(&mut self, value: OptionValue) -> bool {
		if !value.matches_type(self.value_type()) {
			return false;
		}
		self.value = value;
		true
	}

	/// Restores the default value. Bypasses validation.
	pub fn reset(&mut self) {
		self.value = self.default;
	}
}

impl core::fmt::Debug for OptionDef {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("OptionDef")
			.field("name", &self.name)
			.field("value", &self.value)
			.field("rule", &self.rule)
			.finish()
	}
}

/// Point-in-time copy of an option, for listing and settings surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSnapshot {
	pub name: String,
	pub value_type: OptionType,
	pub rule: Rule,
	pub bounds: Bounds,
	pub default: OptionValue,
	pub value: OptionValue,
}

impl From<&OptionDef> for OptionSnapshot {
	fn from(def: &OptionDef) -> Self {
		Self {
			name: def.name.to_string(),
			value_type: def.value_type(),
			rule: def.rule,
			bounds: def.bounds,
			default: def.default,
			value: def.value,
		}
	}
}
