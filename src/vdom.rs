//! A small owned virtual DOM.
//!
//! The renderer produces it, [`html`](crate::html) serializes it and [`dom`](crate::dom) mounts and patches it.
//! Event handling is declarative: elements carry [`Binding`]s to [`Behavior`]s, which only the DOM layer interprets.
//!
//! Nodes own their data: every tree is built at runtime from backend JSON and replaced on the next response.
//! Handlers are plain values instead of borrowed callbacks, so trees can be compared, cloned,
//! rendered to HTML on a server and tested without a browser.

use crate::controller::ChangeSource;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
	Element(Element),
	Text(String),
	/// Flattened into the parent. Useful for fragments and optional content.
	Multi(Vec<VNode>),
}

impl VNode {
	/// Text content. Empty text renders nothing.
	#[must_use]
	pub fn text(text: impl Into<String>) -> Self {
		let text = text.into();
		if text.is_empty() {
			Self::empty()
		} else {
			Self::Text(text)
		}
	}

	#[must_use]
	pub fn empty() -> Self {
		Self::Multi(Vec::new())
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Element(_) => false,
			Self::Text(text) => text.is_empty(),
			Self::Multi(nodes) => nodes.iter().all(Self::is_empty),
		}
	}

	/// Resolves [`VNode::Multi`] recursively, yielding only nodes that correspond to a single DOM node.
	#[must_use]
	pub fn flatten(nodes: &[VNode]) -> Vec<&VNode> {
		fn flatten_into<'a>(nodes: &'a [VNode], flat: &mut Vec<&'a VNode>) {
			for node in nodes {
				match node {
					VNode::Multi(nodes) => flatten_into(nodes, flat),
					VNode::Text(text) if text.is_empty() => (),
					other => flat.push(other),
				}
			}
		}
		let mut flat = Vec::new();
		flatten_into(nodes, &mut flat);
		flat
	}

	/// All elements in this subtree, in document order.
	#[must_use]
	pub fn elements(&self) -> Vec<&Element> {
		fn collect<'a>(node: &'a VNode, elements: &mut Vec<&'a Element>) {
			match node {
				VNode::Element(element) => {
					elements.push(element);
					if let Content::Nodes(nodes) = &element.content {
						for node in nodes {
							collect(node, elements);
						}
					}
				}
				VNode::Text(_) => (),
				VNode::Multi(nodes) => {
					for node in nodes {
						collect(node, elements);
					}
				}
			}
		}
		let mut elements = Vec::new();
		collect(self, &mut elements);
		elements
	}

	/// The first element in document order that has `name` as tag name.
	#[must_use]
	pub fn find(&self, name: &str) -> Option<&Element> {
		self.elements().into_iter().find(|element| element.name == name)
	}

	/// Concatenated text, not including trusted markup.
	#[must_use]
	pub fn text_content(&self) -> String {
		let mut text = String::new();
		self.text_into(&mut text);
		text
	}

	fn text_into(&self, text: &mut String) {
		match self {
			VNode::Element(element) => {
				if let Content::Nodes(nodes) = &element.content {
					for node in nodes {
						node.text_into(text);
					}
				}
			}
			VNode::Text(t) => text.push_str(t),
			VNode::Multi(nodes) => {
				for node in nodes {
					node.text_into(text);
				}
			}
		}
	}
}

impl From<Element> for VNode {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl From<Vec<VNode>> for VNode {
	fn from(nodes: Vec<VNode>) -> Self {
		Self::Multi(nodes)
	}
}

impl From<Option<VNode>> for VNode {
	fn from(node: Option<VNode>) -> Self {
		node.unwrap_or_else(VNode::empty)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	pub name: &'static str,
	/// In order of assignment. On `input`s, `value` should come last so that range bounds apply to it.
	pub attributes: Vec<Attribute>,
	pub content: Content,
	pub bindings: Vec<Binding>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
	Nodes(Vec<VNode>),
	/// Trusted HTML, set as the element's inner HTML.
	Markup(Markup),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
	pub name: &'static str,
	pub value: String,
}

/// Trusted HTML, set as `innerHTML`. Inline scripts in it run once per mount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markup {
	pub html: String,
}

impl From<String> for Markup {
	fn from(html: String) -> Self {
		Self { html }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
	pub event: &'static str,
	pub behavior: Behavior,
}

/// What happens when a bound event fires.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
	/// The element's field changed.
	Notify(ChangeSource),
	/// Flip an expander's local open state and its hidden checkbox, then notify.
	ToggleExpander { key: String, carrier_id: String },
	SelectTab { group: String, index: usize },
	/// Copy the element's value into the element with id `peer_id`.
	MirrorValue { peer_id: String },
	/// Write the JSON of the selected `options` (by index) into the carrier, then notify.
	EncodeSelection {
		carrier_id: String,
		options: Vec<Value>,
		multiple: bool,
	},
	/// Upload the picked files and add their URLs to the carrier.
	PickFiles {
		carrier_id: String,
		multiple: bool,
		existing: Vec<String>,
	},
	/// Write `remaining` into the carrier, then notify.
	RemoveFile {
		carrier_id: String,
		multiple: bool,
		remaining: Vec<String>,
	},
	/// Submit immediately, with `name` set to `value`.
	Press { name: String, value: String },
	OpenInNewWindow { url: String },
}

impl Element {
	#[must_use]
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			attributes: Vec::new(),
			content: Content::Nodes(Vec::new()),
			bindings: Vec::new(),
		}
	}

	/// Sets `name`, replacing any earlier value.
	#[must_use]
	pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
		let value = value.into();
		match self.attributes.iter_mut().find(|a| a.name == name) {
			Some(existing) => existing.value = value,
			None => self.attributes.push(Attribute { name, value }),
		}
		self
	}

	#[must_use]
	pub fn attr_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
		match value {
			Some(value) => self.attr(name, value),
			None => self,
		}
	}

	/// A boolean attribute, present iff `on`.
	#[must_use]
	pub fn flag(self, name: &'static str, on: bool) -> Self {
		if on {
			self.attr(name, "")
		} else {
			self
		}
	}

	/// Appends `class` to the `class` attribute.
	#[must_use]
	pub fn class(self, class: &str) -> Self {
		let class = match self.get_attribute("class") {
			Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
			_ => class.to_owned(),
		};
		self.attr("class", class)
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<VNode>) -> Self {
		match &mut self.content {
			Content::Nodes(nodes) => nodes.push(child.into()),
			Content::Markup(_) => self.content = Content::Nodes(vec![child.into()]),
		}
		self
	}

	#[must_use]
	pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
		for child in children {
			self = self.child(child);
		}
		self
	}

	#[must_use]
	pub fn markup(mut self, markup: Markup) -> Self {
		self.content = Content::Markup(markup);
		self
	}

	#[must_use]
	pub fn on(mut self, event: &'static str, behavior: Behavior) -> Self {
		self.bindings.push(Binding { event, behavior });
		self
	}

	#[must_use]
	pub fn get_attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|a| a.name == name)
			.map(|a| a.value.as_str())
	}

	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	#[must_use]
	pub fn has_class(&self, class: &str) -> bool {
		self.get_attribute("class")
			.map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
	}

	#[must_use]
	pub fn child_nodes(&self) -> &[VNode] {
		match &self.content {
			Content::Nodes(nodes) => nodes,
			Content::Markup(_) => &[],
		}
	}
}
