//! Parsing helpers for command surfaces.
//!
//! Adapters receive option values as text; these helpers turn that text into
//! an [`OptionValue`] of the declared type and suggest names on typos.

use crate::options::{OptionError, OptionType, OptionValue};
use crate::registry::OptionRegistry;

/// Parse a string value into an [`OptionValue`] for the named option.
///
/// Only the type is checked here; the rule is applied by the registry's
/// `set_option`/`try_set`.
pub fn parse_value(registry: &OptionRegistry, name: &str, value: &str) -> Result<OptionValue, OptionError> {
	let ty = registry.option_type(name).ok_or_else(|| OptionError::UnknownOption(name.to_string()))?;

	parse_value_for_type(value, ty).map_err(|reason| OptionError::InvalidValue {
		option: name.to_string(),
		reason,
	})
}

/// Parse a string value into an [`OptionValue`] for a known type.
pub fn parse_value_for_type(value: &str, ty: OptionType) -> Result<OptionValue, String> {
	match ty {
		OptionType::Bool => parse_bool(value).map(OptionValue::Bool),
		OptionType::Int => parse_int(value).map(OptionValue::Int),
	}
}

/// Parse a boolean value from common string representations.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(format!("invalid boolean: '{value}' (expected true/false, yes/no, on/off, 1/0)")),
	}
}

/// Parse an integer value.
pub fn parse_int(value: &str) -> Result<i64, String> {
	value.trim().parse::<i64>().map_err(|_| format!("invalid integer: '{value}'"))
}

/// Suggests a declared option name close to `name` using fuzzy matching.
pub fn suggest_option(registry: &OptionRegistry, name: &str) -> Option<String> {
	registry
		.list_option_names()
		.into_iter()
		.map(|candidate| (strsim::levenshtein(name, &candidate), candidate))
		.filter(|(distance, _)| *distance <= 3)
		.min_by_key(|(distance, _)| *distance)
		.map(|(_, candidate)| candidate)
}
