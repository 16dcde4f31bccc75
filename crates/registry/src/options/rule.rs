//! Validation rules for integer options.

/// Sanity cap used for the open side of one-sided rules.
pub const BOUND_CAP: i64 = 512;

/// Validation policy attached to an integer option.
///
/// The rule is fixed when the option is constructed and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rule {
	/// Any integer is accepted.
	#[default]
	None,
	/// Accepts values `<= max`.
	MaxValue(i64),
	/// Accepts values `>= min`.
	MinValue(i64),
	/// Accepts permission levels `0..=4`.
	OpLevel,
	/// Accepts values `> 0`.
	Positive,
	/// Accepts values `< 0`.
	Negative,
	/// Accepts values in `min..=max`.
	Range { min: i64, max: i64 },
}

/// Payload-free discriminant of a [`Rule`], used for rule queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
	None,
	MaxValue,
	MinValue,
	OpLevel,
	Positive,
	Negative,
	Range,
}

/// Resolved `(min, max)` pair of an integer option.
///
/// Derived once from the rule. For [`Rule::None`] the pair is inert; UI
/// surfaces may still use it as a slider range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
	pub min: i64,
	pub max: i64,
}

impl Bounds {
	pub const fn new(min: i64, max: i64) -> Self {
		Self { min, max }
	}

	pub fn contains(&self, value: i64) -> bool {
		self.min <= value && value <= self.max
	}
}

impl Rule {
	/// Returns the discriminant of this rule.
	pub fn kind(&self) -> RuleKind {
		match self {
			Rule::None => RuleKind::None,
			Rule::MaxValue(_) => RuleKind::MaxValue,
			Rule::MinValue(_) => RuleKind::MinValue,
			Rule::OpLevel => RuleKind::OpLevel,
			Rule::Positive => RuleKind::Positive,
			Rule::Negative => RuleKind::Negative,
			Rule::Range { .. } => RuleKind::Range,
		}
	}

	/// Derives the `(min, max)` pair stored alongside an integer option.
	pub fn bounds(&self) -> Bounds {
		match *self {
			Rule::None | Rule::OpLevel => Bounds::new(0, 4),
			Rule::MaxValue(max) => Bounds::new(-BOUND_CAP, max),
			Rule::MinValue(min) => Bounds::new(min, BOUND_CAP),
			Rule::Positive => Bounds::new(1, BOUND_CAP),
			Rule::Negative => Bounds::new(-BOUND_CAP, -1),
			Rule::Range { min, max } => Bounds::new(min, max),
		}
	}

	/// Returns true if `value` satisfies this rule.
	///
	/// One-sided rules check only their own side; the [`BOUND_CAP`] edge of
	/// their [`Bounds`] is not enforced.
	pub fn accepts(&self, value: i64) -> bool {
		match *self {
			Rule::None => true,
			Rule::MaxValue(max) => value <= max,
			Rule::MinValue(min) => value >= min,
			Rule::OpLevel => (0..=4).contains(&value),
			Rule::Positive => value > 0,
			Rule::Negative => value < 0,
			Rule::Range { min, max } => min <= value && value <= max,
		}
	}
}

impl core::fmt::Display for Rule {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Rule::None => f.write_str("any integer"),
			Rule::MaxValue(max) => write!(f, "at most {max}"),
			Rule::MinValue(min) => write!(f, "at least {min}"),
			Rule::OpLevel => f.write_str("an operator level between 0 and 4"),
			Rule::Positive => f.write_str("a positive integer"),
			Rule::Negative => f.write_str("a negative integer"),
			Rule::Range { min, max } => write!(f, "between {min} and {max}"),
		}
	}
}
