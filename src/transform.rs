//! Decoding raw form strings into typed JSON values, keyed by field kind.
//!
//! Browsers submit every field as text (or not at all, in the case of unchecked checkboxes).
//! A [`TransformRegistry`] maps a field kind, as recorded by [`extract`](crate::extract::extract),
//! to a function that recovers the value the backend actually wants.

use hashbrown::HashMap;
use serde_json::{Number, Value};
use tracing::trace;

/// Decodes one raw field value. `None` means the browser did not submit the field at all.
pub type Transform = fn(Option<&str>) -> serde_json::Result<Value>;

#[derive(Clone, Copy, Debug)]
struct Entry {
	transform: Transform,
	/// Whether the field being left out of a submission is itself a value.
	decodes_absence: bool,
}

#[derive(Clone, Debug)]
pub struct TransformRegistry {
	transforms: HashMap<String, Entry>,
}

impl Default for TransformRegistry {
	/// The standard kinds: `checkbox`, `number`, `range`, `select`, `file`, `expander` and `details`.
	///
	/// Only `checkbox`, `expander` and `details` decode absence (as `false`).
	fn default() -> Self {
		let mut registry = Self::empty();
		registry.register_absence_aware("checkbox", checkbox);
		registry.register("number", number);
		registry.register("range", number);
		registry.register("select", json);
		registry.register("file", json);
		registry.register_absence_aware("expander", checkbox);
		registry.register_absence_aware("details", checkbox);
		registry
	}
}

impl TransformRegistry {
	/// A registry without any transforms. Every field passes through as its raw string.
	#[must_use]
	pub fn empty() -> Self {
		Self {
			transforms: HashMap::new(),
		}
	}

	/// Registers `transform` for `kind`, returning the transform it replaces, if any.
	///
	/// Fields of `kind` that weren't submitted (disabled controls, for example) are left out of the submission
	/// instead of being decoded.
	pub fn register(&mut self, kind: impl Into<String>, transform: Transform) -> Option<Transform> {
		self.insert(kind.into(), transform, false)
	}

	/// Like [`register`](`TransformRegistry::register`), but `transform` also runs (with [`None`]) for fields that weren't submitted.
	///
	/// This is the case for checkboxes, which browsers omit while unchecked.
	pub fn register_absence_aware(&mut self, kind: impl Into<String>, transform: Transform) -> Option<Transform> {
		self.insert(kind.into(), transform, true)
	}

	fn insert(&mut self, kind: String, transform: Transform, decodes_absence: bool) -> Option<Transform> {
		self.transforms
			.insert(
				kind,
				Entry {
					transform,
					decodes_absence,
				},
			)
			.map(|entry| entry.transform)
	}

	#[must_use]
	pub fn get(&self, kind: &str) -> Option<Transform> {
		self.transforms.get(kind).map(|entry| entry.transform)
	}

	#[must_use]
	pub fn contains(&self, kind: &str) -> bool {
		self.transforms.contains_key(kind)
	}

	/// Decodes `raw` as `kind`.
	///
	/// Kinds without a registered transform pass their raw string through unchanged.
	/// A field that wasn't submitted at all decodes to [`None`] and should be omitted,
	/// unless its kind was registered with [`register_absence_aware`](`TransformRegistry::register_absence_aware`).
	///
	/// # Errors
	///
	/// Iff the registered transform rejects `raw`.
	pub fn decode(&self, kind: &str, raw: Option<&str>) -> serde_json::Result<Option<Value>> {
		match (self.transforms.get(kind), raw) {
			(Some(entry), Some(_)) => (entry.transform)(raw).map(Some),
			(Some(entry), None) if entry.decodes_absence => (entry.transform)(None).map(Some),
			(Some(_), None) => {
				trace!(kind, "Field not submitted. Leaving it out.");
				Ok(None)
			}
			(None, _) => {
				trace!(kind, "No transform registered. Passing through.");
				Ok(raw.map(|raw| Value::String(raw.to_owned())))
			}
		}
	}
}

/// Present and non-empty means checked.
///
/// # Errors
///
/// Never.
pub fn checkbox(raw: Option<&str>) -> serde_json::Result<Value> {
	Ok(Value::Bool(raw.map_or(false, |raw| !raw.is_empty())))
}

/// See [`parse_int_float`].
///
/// # Errors
///
/// Never. Unparseable input decodes as `0`.
pub fn number(raw: Option<&str>) -> serde_json::Result<Value> {
	Ok(parse_int_float(raw.unwrap_or_default()))
}

/// Parses a JSON document. Absent and empty input decode as `null`.
///
/// # Errors
///
/// Iff `raw` is non-empty and not valid JSON.
pub fn json(raw: Option<&str>) -> serde_json::Result<Value> {
	match raw {
		None | Some("") => Ok(Value::Null),
		Some(raw) => serde_json::from_str(raw),
	}
}

/// Decodes numeric text the way a number box should: as an integer where that loses nothing, else as a float.
///
/// Parsing takes the longest numeric prefix after leading whitespace,
/// so `"12px"` yields `12` and `"1.5e3kg"` yields `1500`.
/// Text without any numeric prefix yields `0`.
/// Infinite values have no JSON representation and yield `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn parse_int_float(raw: &str) -> Value {
	let float = match parse_float_prefix(raw) {
		Some(float) => float,
		None => return Value::from(0),
	};
	if float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER {
		Value::from(float as i64)
	} else {
		Number::from_f64(float).map_or(Value::Null, Value::Number)
	}
}

/// Beyond this, not every integer has an exact float representation.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn split_sign(s: &str) -> (bool, &str) {
	match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	}
}

fn digit_run(s: &str) -> usize {
	s.bytes().take_while(u8::is_ascii_digit).count()
}

fn parse_float_prefix(raw: &str) -> Option<f64> {
	let (negative, rest) = split_sign(raw.trim_start());
	let sign = if negative { -1.0 } else { 1.0 };
	if rest.starts_with("Infinity") {
		return Some(sign * f64::INFINITY);
	}

	let integer = &rest[..digit_run(rest)];
	let mut rest = &rest[integer.len()..];
	let mut fraction = "";
	if let Some(after_point) = rest.strip_prefix('.') {
		fraction = &after_point[..digit_run(after_point)];
		rest = &after_point[fraction.len()..];
	}
	if integer.is_empty() && fraction.is_empty() {
		return None;
	}

	let mut exponent = String::new();
	if let Some(after_e) = rest.strip_prefix(&['e', 'E'][..]) {
		let (exponent_negative, after_sign) = split_sign(after_e);
		let exponent_digits = &after_sign[..digit_run(after_sign)];
		if !exponent_digits.is_empty() {
			exponent = format!("e{}{}", if exponent_negative { "-" } else { "" }, exponent_digits);
		}
	}

	let normalized = format!(
		"{}.{}{}",
		if integer.is_empty() { "0" } else { integer },
		if fraction.is_empty() { "0" } else { fraction },
		exponent
	);
	normalized.parse::<f64>().ok().map(|float| sign * float)
}
