//! Recording which decoder each named field of a tree needs.

use crate::node::{expander_field, TreeNode};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Field name → field kind, as consulted by [`TransformRegistry::decode`](crate::transform::TransformRegistry::decode).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformMap(HashMap<String, String>);

impl TransformMap {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `kind` for `field`, replacing any earlier entry.
	pub fn insert(&mut self, field: impl Into<String>, kind: impl Into<String>) -> Option<String> {
		self.0.insert(field.into(), kind.into())
	}

	#[must_use]
	pub fn kind_of(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates `(field, kind)` pairs in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(field, kind)| (field.as_str(), kind.as_str()))
	}
}

impl<F: Into<String>, K: Into<String>> FromIterator<(F, K)> for TransformMap {
	fn from_iter<T: IntoIterator<Item = (F, K)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(field, kind)| (field.into(), kind.into()))
				.collect(),
		)
	}
}

/// Collects the kind of every named field in `nodes`.
///
/// `input` nodes are keyed by their `type` prop (`"text"` when absent),
/// expanders by their (possibly synthetic) field name,
/// and every other node with a non-empty `name` prop by its tag name.
/// Nodes are visited in pre-order and later duplicates win.
#[must_use]
#[instrument(skip(nodes), fields(roots = nodes.len()))]
pub fn extract(nodes: &[TreeNode]) -> TransformMap {
	let mut transforms = TransformMap::new();
	TreeNode::walk(nodes, &mut |node, path| {
		let entry = match node.name.as_str() {
			"expander" | "details" => Some((expander_field(node, path), node.name.clone())),
			"input" => node.props.field_name().map(|field| {
				let kind = node.props.str("type").filter(|kind| !kind.is_empty()).unwrap_or("text");
				(field.to_owned(), kind.to_owned())
			}),
			tag => node
				.props
				.field_name()
				.map(|field| (field.to_owned(), tag.to_owned())),
		};
		if let Some((field, kind)) = entry {
			trace!(field = field.as_str(), kind = kind.as_str(), "Recorded field kind.");
			transforms.insert(field, kind);
		}
	});
	transforms
}
