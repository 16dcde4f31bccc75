//! Option definitions, validation rules and value parsing.

pub mod def;
pub mod parse;
pub mod rule;
pub mod typed_keys;

pub use def::{OptionDef, OptionSnapshot};
pub use rule::{BOUND_CAP, Bounds, Rule, RuleKind};
pub use typed_keys::TypedOptionKey;

pub use crate::core::{FromOptionValue, OptionType, OptionValue};

/// Rejection of a lookup or mutation.
///
/// Unknown names, wrong types and rule violations are kept apart so command
/// surfaces can word each case differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
	UnknownOption(String),
	TypeMismatch {
		option: String,
		expected: OptionType,
		got: &'static str,
	},
	OutOfBounds {
		option: String,
		rule: Rule,
		value: i64,
	},
	InvalidValue {
		option: String,
		reason: String,
	},
}

impl OptionError {
	/// Returns true for errors caused by the value rather than the name.
	pub fn is_invalid_value(&self) -> bool {
		!matches!(self, OptionError::UnknownOption(_))
	}
}

impl core::fmt::Display for OptionError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			OptionError::UnknownOption(key) => write!(f, "unknown option: {key}"),
			OptionError::TypeMismatch { option, expected, got } => {
				write!(f, "type mismatch for option '{option}': expected {expected}, got {got}")
			}
			OptionError::OutOfBounds { option, rule, value } => {
				write!(f, "invalid value for option '{option}': {value} is not {rule}")
			}
			OptionError::InvalidValue { option, reason } => {
				write!(f, "invalid value for option '{option}': {reason}")
			}
		}
	}
}

impl std::error::Error for OptionError {}
