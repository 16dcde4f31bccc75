//! Typed option registry with validated, file-backed persistence.
//!
//! A host application declares its options once at start-up and hands them
//! to an [`OptionRegistry`] for its namespace. The registry reconciles them
//! with `<config-dir>/<namespace>.json`, validates every mutation against the
//! option's [`Rule`] and writes the full option set back on request.
//!
//! # Modules
//!
//! - [`core`] - value primitives
//! - [`options`] - option definitions, rules and parsing helpers
//! - [`registry`] - the per-namespace registry and reconciliation
//! - [`persist`] - the JSON file gateway
//! - [`directory`] - cross-namespace enumeration
//!
//! ```no_run
//! use optkeep_registry::{OptionDef, OptionRegistry, Rule, StoreConfig};
//!
//! # fn main() -> optkeep_registry::Result<()> {
//! let registry = OptionRegistry::new(
//! 	"homes",
//! 	[
//! 		OptionDef::bool("allowHomes", true),
//! 		OptionDef::int("minOpLevel", 4).with_rule(Rule::OpLevel),
//! 	],
//! 	&StoreConfig::default(),
//! )?;
//! registry.init()?;
//! assert!(!registry.set_option("minOpLevel", 6, true));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod directory;
pub mod error;
pub mod options;
pub mod persist;
pub mod registry;

pub use config::StoreConfig;
pub use crate::core::{FromOptionValue, OptionType, OptionValue};
pub use directory::RegistryDirectory;
pub use error::{PersistError, RegistryError, Result};
pub use options::{Bounds, OptionDef, OptionError, OptionSnapshot, Rule, RuleKind, TypedOptionKey};
pub use persist::JsonStore;
pub use registry::{OptionRegistry, ReconcileReport};
