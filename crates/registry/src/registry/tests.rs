use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use super::*;
use crate::options::Rule;

fn declarations() -> Vec<OptionDef> {
	vec![
		OptionDef::bool("true", true),
		OptionDef::int("op", 4).with_rule(Rule::OpLevel),
		OptionDef::int("maxVal", 28).with_rule(Rule::MaxValue(50)),
		OptionDef::int("minVal", 90).with_rule(Rule::MinValue(-7)),
		OptionDef::int("posVal", 0).with_rule(Rule::Positive),
		OptionDef::int("negVal", -50).with_rule(Rule::Negative),
		OptionDef::int("range", 125).with_rule(Rule::Range { min: -128, max: 127 }),
		OptionDef::bool("false", false),
	]
}

fn open(dir: &Path) -> OptionRegistry {
	OptionRegistry::new("testing", declarations(), &StoreConfig::new(dir)).expect("registry builds")
}

fn read_json(path: &Path) -> Value {
	serde_json::from_str(&fs::read_to_string(path).expect("file exists")).expect("file is json")
}

#[test]
fn lists_names_in_declaration_order() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert_eq!(
		registry.list_option_names(),
		vec!["true", "op", "maxVal", "minVal", "posVal", "negVal", "range", "false"]
	);
	assert_eq!(registry.len(), 8);
}

#[test]
fn duplicate_declaration_is_rejected() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let defs = vec![OptionDef::bool("a", true), OptionDef::int("a", 1)];
	let err = OptionRegistry::new("dup", defs, &StoreConfig::new(temp_dir.path())).expect_err("duplicate must fail");
	assert!(matches!(err, RegistryError::DuplicateOption { ref name, .. } if name == "a"));
}

#[test]
fn namespace_must_be_a_plain_file_stem() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let config = StoreConfig::new(temp_dir.path());
	for bad in ["", "..", "a/b", "a\\b", "../up"] {
		let err = OptionRegistry::new(bad, Vec::new(), &config).expect_err("namespace must be rejected");
		assert!(matches!(err, RegistryError::InvalidNamespace(_)), "{bad:?}");
	}
}

#[test]
fn defaults_are_served_before_init() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert_eq!(registry.get_option_value("true"), Some(OptionValue::Bool(true)));
	assert_eq!(registry.get_option_value("op"), Some(OptionValue::Int(4)));
	assert_eq!(registry.get_option_value("posVal"), Some(OptionValue::Int(0)));
	assert_eq!(registry.get_option_value("range"), Some(OptionValue::Int(125)));
	assert_eq!(registry.get_option_value("missing"), None);
}

#[test]
fn op_level_scenario() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert!(!registry.set_option("op", 6, false));
	assert_eq!(registry.get_option_value("op"), Some(OptionValue::Int(4)));
	assert!(registry.set_option("op", 2, false));
	assert_eq!(registry.get_option_value("op"), Some(OptionValue::Int(2)));
}

#[test]
fn max_value_boundary_is_inclusive() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert!(!registry.set_option("maxVal", 58, false));
	assert_eq!(registry.get::<i64>("maxVal"), Some(28));
	assert!(registry.set_option("maxVal", 50, false));
	assert_eq!(registry.get::<i64>("maxVal"), Some(50));
}

#[test]
fn set_rejects_each_rule_violation() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert!(!registry.set_option("minVal", -8, false));
	assert!(registry.set_option("minVal", -7, false));
	assert!(!registry.set_option("posVal", -4, false));
	assert!(registry.set_option("posVal", 8, false));
	assert!(!registry.set_option("negVal", 4, false));
	assert!(registry.set_option("negVal", -8, false));
	assert!(!registry.set_option("range", 128, false));
	assert!(registry.set_option("range", 127, false));
	assert!(!registry.set_option("range", -129, false));
	assert!(registry.set_option("range", -128, false));
	assert!(registry.set_option("true", false, false));
	assert!(!registry.set_option("true", 1, false));
}

#[test]
fn try_set_distinguishes_failures() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());

	let unknown = registry.try_set("nope", true, false).expect_err("unknown option");
	assert_eq!(unknown, OptionError::UnknownOption("nope".to_string()));
	assert!(!unknown.is_invalid_value());

	let mismatch = registry.try_set("op", true, false).expect_err("wrong type");
	assert!(matches!(mismatch, OptionError::TypeMismatch { .. }));
	assert!(mismatch.is_invalid_value());

	let bounds = registry.try_set("op", 5, false).expect_err("out of bounds");
	assert!(matches!(bounds, OptionError::OutOfBounds { value: 5, .. }));

	assert!(!registry.has_unsaved_changes());
}

#[test]
fn typed_lookup_checks_type() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	const OP: TypedOptionKey<i64> = TypedOptionKey::new("op");
	const FLAG: TypedOptionKey<bool> = TypedOptionKey::new("false");
	assert_eq!(registry.get_typed(OP), Some(4));
	assert_eq!(registry.get_typed(FLAG), Some(false));
	assert_eq!(registry.get::<bool>("op"), None);
	assert_eq!(registry.get::<i64>("missing"), None);
}

#[test]
fn reset_restores_all_defaults() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	let initial: Vec<_> = registry.options().into_iter().map(|opt| (opt.name, opt.value)).collect();

	assert!(registry.set_option("true", false, false));
	assert!(registry.set_option("op", 0, false));
	assert!(registry.set_option("range", -3, false));
	registry.reset_options();

	let after: Vec<_> = registry.options().into_iter().map(|opt| (opt.name, opt.value)).collect();
	assert_eq!(after, initial);
	assert!(!temp_dir.path().join("testing.json").exists());
}

#[test]
fn has_rule_is_exact() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert!(registry.has_rule("op", RuleKind::OpLevel));
	assert!(registry.has_rule("range", RuleKind::Range));
	assert!(!registry.has_rule("op", RuleKind::Range));
	assert!(!registry.has_rule("true", RuleKind::None));
	assert!(!registry.has_rule("missing", RuleKind::OpLevel));
	assert_eq!(registry.options_with_rule(RuleKind::Positive), vec!["posVal"]);
	assert!(registry.options_with_rule(RuleKind::None).is_empty());
}

#[test]
fn init_without_file_creates_it() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());

	let report = registry.init().expect("init succeeds");
	assert!(report.created);
	assert!(report.rewritten);
	assert_eq!(
		read_json(registry.file_path()),
		json!({
			"true": true, "op": 4, "maxVal": 28, "minVal": 90,
			"posVal": 0, "negVal": -50, "range": 125, "false": false
		})
	);
}

#[test]
fn init_writes_declaration_order() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let config = StoreConfig::new(temp_dir.path()).with_pretty(false);
	let registry = OptionRegistry::new("testing", declarations(), &config).expect("registry builds");
	registry.init().expect("init succeeds");

	assert_eq!(
		fs::read_to_string(registry.file_path()).expect("file exists"),
		"{\"true\":true,\"op\":4,\"maxVal\":28,\"minVal\":90,\"posVal\":0,\"negVal\":-50,\"range\":125,\"false\":false}\n"
	);
}

#[test]
fn init_fails_when_file_is_unreadable() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	fs::create_dir(temp_dir.path().join("testing.json")).expect("create blocking dir");

	let registry = open(temp_dir.path());
	let err = registry.init().expect_err("unreadable file must fail");
	assert!(matches!(err, RegistryError::Persist(PersistError::Read { .. })), "{err:?}");
	if let RegistryError::Persist(error) = &err {
		assert!(!error.is_transient());
	}
}

#[test]
fn failed_write_keeps_value_and_unsaved() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let not_a_dir = temp_dir.path().join("config");
	fs::write(&not_a_dir, "").expect("create blocking file");
	let registry = open(&not_a_dir);

	assert!(registry.set_option("op", 1, true));
	assert_eq!(registry.get::<i64>("op"), Some(1));
	assert_eq!(registry.unsaved_changes(), vec![("op".to_string(), OptionValue::Int(1))]);

	let err = registry.write_back().expect_err("write must fail");
	assert!(matches!(err, PersistError::Write { .. }), "{err:?}");
	assert!(err.is_transient());
	assert!(registry.has_unsaved_changes());

	fs::remove_file(&not_a_dir).expect("remove blocking file");
	assert!(registry.flush_pending().expect("write succeeds"));
	assert!(!registry.has_unsaved_changes());
	assert_eq!(read_json(registry.file_path()).get("op"), Some(&json!(1)));
}

#[test]
fn init_applies_file_values() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let path = temp_dir.path().join("testing.json");
	fs::write(
		&path,
		r#"{"true":false,"op":1,"maxVal":3,"minVal":0,"posVal":9,"negVal":-2,"range":0,"false":true}"#,
	)
	.expect("seed file");
	let before = fs::read_to_string(&path).expect("read seed");

	let registry = open(temp_dir.path());
	let report = registry.init().expect("init succeeds");

	assert!(!report.needs_rewrite());
	assert!(!report.rewritten);
	assert_eq!(registry.get::<bool>("true"), Some(false));
	assert_eq!(registry.get::<i64>("op"), Some(1));
	assert_eq!(registry.get::<i64>("negVal"), Some(-2));
	assert_eq!(fs::read_to_string(&path).expect("read after"), before);
}

#[test]
fn init_drops_stale_and_adds_missing() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let path = temp_dir.path().join("testing.json");
	fs::write(&path, r#"{"op": 3, "oldOption": true}"#).expect("seed file");

	let registry = open(temp_dir.path());
	let report = registry.init().expect("init succeeds");

	assert_eq!(report.dropped, vec!["oldOption"]);
	assert_eq!(report.added.len(), 7);
	assert!(report.rewritten);
	assert!(!registry.option_exists("oldOption"));
	assert_eq!(registry.get::<i64>("op"), Some(3));
	assert_eq!(registry.get::<i64>("minVal"), Some(90));

	let written = read_json(&path);
	assert!(written.get("oldOption").is_none());
	assert_eq!(written.get("op"), Some(&json!(3)));
	assert_eq!(written.get("minVal"), Some(&json!(90)));
}

#[test]
fn init_repairs_incompatible_types() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let path = temp_dir.path().join("testing.json");
	fs::write(
		&path,
		r#"{"true":1,"op":"two","maxVal":4.5,"minVal":12.0,"posVal":0,"negVal":-50,"range":125,"false":false}"#,
	)
	.expect("seed file");

	let registry = open(temp_dir.path());
	let report = registry.init().expect("init succeeds");

	assert_eq!(report.repaired, vec!["true", "op", "maxVal"]);
	assert!(report.added.is_empty());
	assert_eq!(registry.get::<bool>("true"), Some(true));
	assert_eq!(registry.get::<i64>("op"), Some(4));
	assert_eq!(registry.get::<i64>("maxVal"), Some(28));
	assert_eq!(registry.get::<i64>("minVal"), Some(12));

	let written = read_json(&path);
	assert_eq!(written.get("op"), Some(&json!(4)));
	assert_eq!(written.get("minVal"), Some(&json!(12)));
}

#[test]
fn init_trusts_out_of_bound_file_values() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	fs::write(temp_dir.path().join("testing.json"), r#"{"op": 9}"#).expect("seed file");

	let registry = open(temp_dir.path());
	registry.init().expect("init succeeds");

	assert_eq!(registry.get::<i64>("op"), Some(9));
	assert!(!registry.set_option("op", 9, false));
}

#[test]
fn init_fails_on_malformed_file() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let path = temp_dir.path().join("testing.json");
	fs::write(&path, "{\"op\": 3,").expect("seed file");

	let registry = open(temp_dir.path());
	let err = registry.init().expect_err("malformed file is fatal");
	assert!(matches!(err, RegistryError::Persist(PersistError::Malformed { .. })));
	assert_eq!(fs::read_to_string(&path).expect("file untouched"), "{\"op\": 3,");
}

#[test]
fn round_trip_through_fresh_registry() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	registry.init().expect("init succeeds");
	assert!(registry.set_option("true", false, false));
	assert!(registry.set_option("op", 1, false));
	assert!(registry.set_option("range", -100, false));
	assert!(registry.set_option("negVal", -9, true));

	let reloaded = open(temp_dir.path());
	let report = reloaded.init().expect("reload succeeds");
	assert!(!report.needs_rewrite());
	assert_eq!(reloaded.options(), registry.options());
}

#[test]
fn persist_flag_controls_write_back() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	registry.init().expect("init succeeds");
	let path = registry.file_path().to_path_buf();

	assert!(registry.set_option("op", 2, false));
	assert_eq!(read_json(&path).get("op"), Some(&json!(4)));
	assert_eq!(registry.unsaved_changes(), vec![("op".to_string(), OptionValue::Int(2))]);

	assert!(registry.set_option("maxVal", 1, true));
	let written = read_json(&path);
	assert_eq!(written.get("op"), Some(&json!(2)));
	assert_eq!(written.get("maxVal"), Some(&json!(1)));
	assert!(!registry.has_unsaved_changes());
}

#[test]
fn flush_pending_writes_only_when_dirty() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	registry.init().expect("init succeeds");

	assert!(!registry.flush_pending().expect("nothing to flush"));
	registry.reset_options();
	assert!(!registry.has_unsaved_changes());

	assert!(registry.set_option("false", true, false));
	assert!(registry.flush_pending().expect("flush succeeds"));
	assert_eq!(read_json(registry.file_path()).get("false"), Some(&json!(true)));
	assert!(!registry.flush_pending().expect("already flushed"));
}

#[test]
fn clear_unsaved_changes_discards_record() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = open(temp_dir.path());
	assert!(registry.set_option("op", 1, false));
	assert!(registry.set_option("true", false, false));
	assert_eq!(registry.unsaved_changes().len(), 2);
	registry.clear_unsaved_changes();
	assert!(registry.unsaved_changes().is_empty());
	assert_eq!(registry.get::<i64>("op"), Some(1));
}

#[test]
fn busy_write_back_keeps_memory_and_unsaved() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let config = StoreConfig::new(temp_dir.path()).with_write_timeout(Duration::from_millis(20));
	let registry = OptionRegistry::new("testing", declarations(), &config).expect("registry builds");
	registry.init().expect("init succeeds");

	let guard = registry.store.lock_writes();
	assert!(registry.set_option("op", 3, true));
	assert!(matches!(registry.write_back(), Err(PersistError::Busy { .. })));
	drop(guard);

	assert_eq!(registry.get::<i64>("op"), Some(3));
	assert_eq!(registry.unsaved_changes(), vec![("op".to_string(), OptionValue::Int(3))]);
	assert_eq!(read_json(registry.file_path()).get("op"), Some(&json!(4)));

	registry.write_back().expect("write succeeds once free");
	assert_eq!(read_json(registry.file_path()).get("op"), Some(&json!(3)));
	assert!(!registry.has_unsaved_changes());
}

#[test]
fn concurrent_sets_on_different_options_are_not_lost() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = Arc::new(open(temp_dir.path()));
	registry.init().expect("init succeeds");

	for round in 0..20i64 {
		let barrier = Arc::new(Barrier::new(2));
		let handles: Vec<_> = [("maxVal", round), ("minVal", round + 100)]
			.into_iter()
			.map(|(name, value)| {
				let registry = Arc::clone(&registry);
				let barrier = Arc::clone(&barrier);
				thread::spawn(move || {
					barrier.wait();
					registry.set_option(name, value, true)
				})
			})
			.collect();
		for handle in handles {
			assert!(handle.join().expect("setter thread"));
		}

		let written = read_json(registry.file_path());
		assert_eq!(written.get("maxVal"), Some(&json!(round)));
		assert_eq!(written.get("minVal"), Some(&json!(round + 100)));
	}
}

#[test]
fn concurrent_sets_on_same_option_stay_valid() {
	let temp_dir = tempfile::tempdir().expect("create tempdir");
	let registry = Arc::new(open(temp_dir.path()));

	let handles: Vec<_> = (0..8i64)
		.map(|i| {
			let registry = Arc::clone(&registry);
			thread::spawn(move || {
				for value in -10..10 {
					registry.set_option("range", value * (i + 1), false);
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().expect("setter thread");
	}

	let value = registry.get::<i64>("range").expect("range exists");
	assert!((-128..=127).contains(&value));
}
