use std::marker::PhantomData;

use crate::core::FromOptionValue;

/// Typed handle to a declared option name.
///
/// Hosts declare these as constants next to their option list so reads come
/// back as `bool`/`i64` instead of an untyped [`OptionValue`](crate::core::OptionValue).
pub struct TypedOptionKey<T: FromOptionValue> {
	pub(crate) name: &'static str,
	pub(crate) _marker: PhantomData<T>,
}

impl<T: FromOptionValue> Clone for TypedOptionKey<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T: FromOptionValue> Copy for TypedOptionKey<T> {}

impl<T: FromOptionValue> TypedOptionKey<T> {
	/// Creates a new typed key for the option called `name`.
	pub const fn new(name: &'static str) -> Self {
		Self { name, _marker: PhantomData }
	}

	/// Returns the option name this key refers to.
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl<T: FromOptionValue> core::fmt::Debug for TypedOptionKey<T> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("TypedOptionKey").field(&self.name).finish()
	}
}
