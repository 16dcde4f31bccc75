//! Value primitives shared by option definitions, the registry and the store.

mod value;

pub use value::{FromOptionValue, OptionType, OptionValue};
