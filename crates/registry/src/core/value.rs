use serde::Serialize;
use serde_json::Value;

/// A typed option value.
///
/// Serializes as a bare JSON boolean or integer, which is the on-disk form of
/// every entry in a namespace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
	/// Boolean value (true/false).
	Bool(bool),
	/// Integer value.
	Int(i64),
}

impl OptionValue {
	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			OptionValue::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			OptionValue::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns true if this value matches the given type.
	pub fn matches_type(&self, ty: OptionType) -> bool {
		matches!((self, ty), (OptionValue::Bool(_), OptionType::Bool) | (OptionValue::Int(_), OptionType::Int))
	}

	/// Returns the [`OptionType`] of this value.
	pub fn value_type(&self) -> OptionType {
		match self {
			OptionValue::Bool(_) => OptionType::Bool,
			OptionValue::Int(_) => OptionType::Int,
		}
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		self.value_type().name()
	}

	/// Converts a JSON primitive read from a namespace file.
	///
	/// Integral floats such as `4.0` are coerced to `Int(4)` because some
	/// encoders emit every number as floating point. Anything else that is not
	/// a boolean or an `i64`-representable integer yields `None`.
	pub fn from_json(value: &Value) -> Option<Self> {
		match value {
			Value::Bool(b) => Some(OptionValue::Bool(*b)),
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					return Some(OptionValue::Int(i));
				}
				let f = n.as_f64()?;
				// i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
				(f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| OptionValue::Int(f as i64))
			}
			_ => None,
		}
	}

	/// Returns a short description of a JSON value's type for diagnostics.
	pub fn json_type_name(value: &Value) -> &'static str {
		match value {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Number(n) if n.is_f64() => "float",
			Value::Number(_) => "int",
			Value::String(_) => "string",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
		}
	}
}

impl core::fmt::Display for OptionValue {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			OptionValue::Bool(v) => write!(f, "{v}"),
			OptionValue::Int(v) => write!(f, "{v}"),
		}
	}
}

impl From<bool> for OptionValue {
	fn from(v: bool) -> Self {
		OptionValue::Bool(v)
	}
}

impl From<i64> for OptionValue {
	fn from(v: i64) -> Self {
		OptionValue::Int(v)
	}
}

impl From<i32> for OptionValue {
	fn from(v: i32) -> Self {
		OptionValue::Int(i64::from(v))
	}
}

/// The type of an option's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
	/// Boolean type.
	Bool,
	/// Integer type.
	Int,
}

impl OptionType {
	/// Returns the lowercase type name used in diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			OptionType::Bool => "bool",
			OptionType::Int => "int",
		}
	}
}

impl core::fmt::Display for OptionType {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(self.name())
	}
}

// Seal the FromOptionValue trait to prevent external implementations.
mod sealed {
	pub trait Sealed {}
	impl Sealed for i64 {}
	impl Sealed for bool {}
}

/// Trait for types that can be extracted from an [`OptionValue`].
pub trait FromOptionValue: sealed::Sealed + Sized {
	/// Extracts the value from an `OptionValue`, returning `None` if the type doesn't match.
	fn from_option(value: &OptionValue) -> Option<Self>;

	/// Returns the `OptionType` corresponding to this Rust type.
	fn option_type() -> OptionType;
}

impl FromOptionValue for i64 {
	fn from_option(value: &OptionValue) -> Option<Self> {
		value.as_int()
	}

	fn option_type() -> OptionType {
		OptionType::Int
	}
}

impl FromOptionValue for bool {
	fn from_option(value: &OptionValue) -> Option<Self> {
		value.as_bool()
	}

	fn option_type() -> OptionType {
		OptionType::Bool
	}
}
