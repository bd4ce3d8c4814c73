//! The backend-authored UI tree.
//!
//! A [`TreeNode`] is a tag name, a free-form property bag and an ordered list of children.
//! Missing or `null` `props` and `children` both mean "empty".

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
	/// The tag name. The empty string denotes a fragment.
	#[serde(default)]
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub props: Props,
	#[serde(default, deserialize_with = "null_as_default")]
	pub children: Vec<TreeNode>,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TreeNode {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.props.insert(key, value);
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
		self.children.extend(children);
		self
	}

	/// Parses a list of nodes, as found in a render response's `children`.
	///
	/// # Errors
	///
	/// Iff `json` is not a JSON array of node objects.
	pub fn parse_list(json: &str) -> serde_json::Result<Vec<TreeNode>> {
		serde_json::from_str(json)
	}

	/// Visits `nodes` and all of their descendants in pre-order, alongside each node's index path.
	pub fn walk<'a>(nodes: &'a [TreeNode], visit: &mut impl FnMut(&'a TreeNode, &[usize])) {
		fn walk_inner<'a>(
			nodes: &'a [TreeNode],
			path: &mut Vec<usize>,
			visit: &mut impl FnMut(&'a TreeNode, &[usize]),
		) {
			for (i, node) in nodes.iter().enumerate() {
				path.push(i);
				visit(node, path);
				walk_inner(&node.children, path, visit);
				path.pop();
			}
		}
		walk_inner(nodes, &mut Vec::new(), visit);
	}
}

/// Formats an index path the way element ids and UI state keys use it, for example `0.3.1`.
#[must_use]
pub fn path_key(path: &[usize]) -> String {
	let mut key = String::new();
	for (i, index) in path.iter().enumerate() {
		if i > 0 {
			key.push('.');
		}
		write!(key, "{}", index).ok();
	}
	key
}

/// The form field an expander's open state is submitted under.
///
/// Expanders without an explicit `name` get a synthetic one derived from their position.
#[must_use]
pub fn expander_field(node: &TreeNode, path: &[usize]) -> String {
	match node.props.field_name() {
		Some(name) => name.to_owned(),
		None => format!("__expander_{}", path_key(path)),
	}
}

/// A node's property bag.
///
/// `null` values are treated as absent by all accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl From<Map<String, Value>> for Props {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl Props {
	#[must_use]
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key).filter(|value| !value.is_null())
	}

	/// The first present value among `keys`.
	#[must_use]
	pub fn first_of(&self, keys: &[&str]) -> Option<&Value> {
		keys.iter().find_map(|key| self.get(key))
	}

	/// The value of `key` iff it is a JSON string.
	#[must_use]
	pub fn str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// The value of `key` as attribute text. Strings are taken as-is, numbers and booleans are formatted.
	#[must_use]
	pub fn text(&self, key: &str) -> Option<String> {
		self.get(key).and_then(attribute_text)
	}

	/// JavaScript-style truthiness of `key`.
	#[must_use]
	pub fn flag(&self, key: &str) -> bool {
		match self.get(key) {
			None | Some(Value::Null) => false,
			Some(Value::Bool(b)) => *b,
			Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
			Some(Value::String(s)) => !s.is_empty(),
			Some(Value::Array(_) | Value::Object(_)) => true,
		}
	}

	/// The node's form field name, if it has a non-empty one.
	#[must_use]
	pub fn field_name(&self) -> Option<&str> {
		self.str("name").filter(|name| !name.is_empty())
	}

	#[must_use]
	pub fn class_name(&self) -> Option<&str> {
		self.str("className").or_else(|| self.str("class"))
	}

	/// Inline CSS from `style`, which may be a ready-made declaration string or an object with camelCase keys.
	#[must_use]
	pub fn style(&self) -> Option<String> {
		match self.get("style")? {
			Value::String(css) => Some(css.clone()).filter(|css| !css.is_empty()),
			Value::Object(declarations) => {
				let mut css = String::new();
				for (property, value) in declarations {
					let value = match value {
						Value::Null => continue,
						Value::Number(n) if !is_unitless(property) => format!("{}px", n),
						other => match attribute_text(other) {
							Some(text) => text,
							None => continue,
						},
					};
					if !css.is_empty() {
						css.push(' ');
					}
					write!(css, "{}: {};", kebab_case(property), value).ok();
				}
				Some(css).filter(|css| !css.is_empty())
			}
			_ => None,
		}
	}
}

/// Formats a scalar JSON value for use in markup. Arrays and objects yield their JSON text.
#[must_use]
pub fn attribute_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

fn kebab_case(property: &str) -> String {
	if property.starts_with("--") {
		return property.to_owned();
	}
	let mut css = String::with_capacity(property.len() + 4);
	for c in property.chars() {
		if c.is_ascii_uppercase() {
			css.push('-');
			css.push(c.to_ascii_lowercase());
		} else {
			css.push(c);
		}
	}
	css
}

fn is_unitless(property: &str) -> bool {
	matches!(
		property,
		"opacity"
			| "zIndex" | "flex"
			| "flexGrow" | "flexShrink"
			| "fontWeight" | "lineHeight"
			| "order" | "zoom"
			| "gridRow" | "gridColumn"
	)
}
