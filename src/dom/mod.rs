//! The live DOM side: mounting, hydrating and patching rendered trees, and interpreting their behaviors.

use crate::{
	controller::ChangeSource,
	script::ScriptLifecycle,
	vdom::{Attribute, Binding, Content, Element, Markup, VNode},
	Error, Result,
};
use std::rc::Rc;
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{JsCast, JsValue};

mod behavior;
mod listener;
pub mod load;

pub(crate) use behavior::write_carrier;
pub(crate) use listener::Listener;

/// What the mounted tree reports to its owner.
#[derive(Debug)]
pub enum Signal {
	Changed(ChangeSource),
	ExpanderToggled {
		key: String,
		open: bool,
	},
	TabSelected {
		group: String,
		index: usize,
	},
	Pressed {
		name: String,
		value: String,
	},
	/// Files were picked but not uploaded yet.
	FilesPicked {
		carrier_id: String,
		multiple: bool,
		existing: Vec<String>,
		files: Vec<web_sys::File>,
	},
}

/// Receives [`Signal`]s. Called synchronously from event listeners.
pub type SignalSink = Rc<dyn Fn(Signal)>;

/// Attached to a specific [`web_sys::Element`], this `struct` owns that element's child nodes
/// and keeps them in line with successive [`VNode`] trees.
///
/// Event listeners belong to the mounted node they were bound on and are removed along with it.
pub struct Mounted {
	root: web_sys::Element,
	document: web_sys::Document,
	children: Vec<MountedNode>,
	sink: SignalSink,
}

enum MountedNode {
	Element(MountedElement),
	Text { node: web_sys::Text, text: String },
}

struct MountedElement {
	element: web_sys::Element,
	name: &'static str,
	attributes: Vec<Attribute>,
	bindings: Vec<Binding>,
	_listeners: Vec<Listener>,
	content: MountedContent,
}

enum MountedContent {
	Nodes(Vec<MountedNode>),
	Markup { html: String, scripts: Vec<ScriptLifecycle> },
}

impl MountedNode {
	fn dom(&self) -> &web_sys::Node {
		match self {
			MountedNode::Element(mounted) => mounted.element.as_ref(),
			MountedNode::Text { node, .. } => node.as_ref(),
		}
	}
}

struct Cx<'a> {
	document: &'a web_sys::Document,
	sink: &'a SignalSink,
}

impl Mounted {
	/// Replaces `root`'s children with freshly created nodes for `vdom`.
	///
	/// Inline scripts in markup are run once.
	///
	/// # Errors
	///
	/// Iff `root` is not part of a document.
	#[instrument(skip(vdom, sink))]
	pub fn mount(root: web_sys::Element, vdom: &[VNode], sink: SignalSink) -> Result<Self> {
		let document = owner_document(&root)?;
		root.set_text_content(None);
		let cx = Cx {
			document: &document,
			sink: &sink,
		};
		let mut children = Vec::new();
		for vnode in VNode::flatten(vdom) {
			if let Some(created) = create(&cx, vnode) {
				append(&root, &created);
				children.push(created);
			}
		}
		Ok(Self {
			root,
			document,
			children,
			sink,
		})
	}

	/// Takes over `root`'s existing, server-rendered children as the rendering of `vdom`.
	///
	/// Matching nodes are kept and only get their listeners attached. Inline scripts count as already run.
	/// Nodes that don't match are recreated, and surplus nodes are removed.
	///
	/// # Errors
	///
	/// Iff `root` is not part of a document.
	#[instrument(skip(vdom, sink))]
	pub fn adopt(root: web_sys::Element, vdom: &[VNode], sink: SignalSink) -> Result<Self> {
		let document = owner_document(&root)?;
		let children = {
			let cx = Cx {
				document: &document,
				sink: &sink,
			};
			adopt_children(&cx, &root, vdom)
		};
		Ok(Self {
			root,
			document,
			children,
			sink,
		})
	}

	/// Patches the DOM from the previous tree to `vdom`, position by position.
	#[instrument(skip(self, vdom))]
	pub fn update(&mut self, vdom: &[VNode]) {
		let cx = Cx {
			document: &self.document,
			sink: &self.sink,
		};
		update_children(&cx, &self.root, &mut self.children, vdom);
	}

	#[must_use]
	pub fn root(&self) -> &web_sys::Element {
		&self.root
	}

	/// The lifecycle states of all inline scripts, in document order.
	#[must_use]
	pub fn script_states(&self) -> Vec<ScriptLifecycle> {
		fn collect(nodes: &[MountedNode], states: &mut Vec<ScriptLifecycle>) {
			for node in nodes {
				if let MountedNode::Element(mounted) = node {
					match &mounted.content {
						MountedContent::Nodes(children) => collect(children, states),
						MountedContent::Markup { scripts, .. } => states.extend_from_slice(scripts),
					}
				}
			}
		}
		let mut states = Vec::new();
		collect(&self.children, &mut states);
		states
	}
}

impl Drop for Mounted {
	fn drop(&mut self) {
		trace!(children = self.children.len(), "Unmounting. Listeners are removed, nodes stay.");
	}
}

fn owner_document(root: &web_sys::Element) -> Result<web_sys::Document> {
	root.owner_document()
		.ok_or_else(|| Error::Transport("root element has no owner document".to_owned()))
}

fn append(parent: &web_sys::Element, node: &MountedNode) {
	if let Err(error) = parent.append_child(node.dom()) {
		error!(?error, "Failed to append node.");
	}
}

fn create(cx: &Cx<'_>, vnode: &VNode) -> Option<MountedNode> {
	match vnode {
		VNode::Text(text) => Some(MountedNode::Text {
			node: cx.document.create_text_node(text),
			text: text.clone(),
		}),
		VNode::Element(element) => create_element(cx, element).map(MountedNode::Element),
		VNode::Multi(_) => {
			error!("Unflattened multi node. Skipping.");
			None
		}
	}
}

fn create_element(cx: &Cx<'_>, next: &Element) -> Option<MountedElement> {
	let span = trace_span!("Creating element", tag = next.name);
	let _enter = span.enter();

	let element = match cx.document.create_element(next.name) {
		Ok(element) => element,
		Err(error) => {
			error!(?error, "Failed to create element. Skipping.");
			return None;
		}
	};
	for attribute in &next.attributes {
		set_attribute(cx, &element, next.name, attribute.name, &attribute.value, true);
	}
	let listeners = bind(cx, &element, &next.bindings);

	let content = match &next.content {
		Content::Nodes(nodes) => {
			let mut children = Vec::new();
			for vnode in VNode::flatten(nodes) {
				if let Some(created) = create(cx, vnode) {
					append(&element, &created);
					children.push(created);
				}
			}
			MountedContent::Nodes(children)
		}
		Content::Markup(markup) => fill_markup(cx, &element, markup),
	};

	Some(MountedElement {
		element,
		name: next.name,
		attributes: next.attributes.clone(),
		bindings: next.bindings.clone(),
		_listeners: listeners,
		content,
	})
}

/// Sets `markup` as inner HTML and revives its inline scripts, which `innerHTML` leaves inert.
fn fill_markup(cx: &Cx<'_>, element: &web_sys::Element, markup: &Markup) -> MountedContent {
	element.set_inner_html(&markup.html);
	let inert = script_elements(element);
	let mut scripts: Vec<ScriptLifecycle> = inert.iter().map(|_| ScriptLifecycle::NotYetMounted.mount()).collect();
	for (state, script) in scripts.iter_mut().zip(&inert) {
		if !state.should_execute() {
			continue;
		}
		match revive_script(cx.document, script) {
			Ok(()) => *state = state.executed(),
			Err(error) => error!(?error, "Failed to revive inline script."),
		}
	}

	MountedContent::Markup {
		html: markup.html.clone(),
		scripts,
	}
}

/// All `<script>` elements below `element`, in document order. This includes scripts in SVG and MathML content.
fn script_elements(element: &web_sys::Element) -> Vec<web_sys::Element> {
	let scripts = element.get_elements_by_tag_name("script");
	(0..scripts.length()).filter_map(|i| scripts.item(i)).collect()
}

/// Replaces an inert script with a fresh copy inside a hidden holder. The copy runs once it's connected.
fn revive_script(document: &web_sys::Document, inert: &web_sys::Element) -> core::result::Result<(), JsValue> {
	let fresh = document.create_element("script")?;
	for name in inert.get_attribute_names().iter() {
		if let Some(name) = name.as_string() {
			if let Some(value) = inert.get_attribute(&name) {
				fresh.set_attribute(&name, &value)?;
			}
		}
	}
	fresh.set_text_content(inert.text_content().as_deref());

	let holder = document.create_element("div")?;
	holder.set_attribute("hidden", "")?;
	holder.append_child(&fresh)?;
	inert.replace_with_with_node_1(&holder)
}

fn bind(cx: &Cx<'_>, element: &web_sys::Element, bindings: &[Binding]) -> Vec<Listener> {
	bindings
		.iter()
		.filter_map(|binding| {
			let behavior = binding.behavior.clone();
			let sink = Rc::clone(cx.sink);
			Listener::attach(element.as_ref(), binding.event, move |event| behavior::dispatch(&behavior, &event, &sink))
		})
		.collect()
}

/// `value` on a `textarea` is content, not an attribute.
///
/// With `force_property`, the matching live property is written even on a focused element.
fn set_attribute(cx: &Cx<'_>, element: &web_sys::Element, tag: &str, name: &str, value: &str, force_property: bool) {
	if !(tag == "textarea" && name == "value") {
		if let Err(error) = element.set_attribute(name, value) {
			error!(attribute = name, ?error, "Failed to set attribute.");
		}
	}
	sync_property(cx, element, name, Some(value), force_property);
}

fn remove_attribute(cx: &Cx<'_>, element: &web_sys::Element, name: &str) {
	if let Err(error) = element.remove_attribute(name) {
		error!(attribute = name, ?error, "Failed to remove attribute.");
	}
	sync_property(cx, element, name, None, false);
}

/// Keeps live form state in line with a changed attribute, which on its own only affects defaults.
fn sync_property(cx: &Cx<'_>, element: &web_sys::Element, name: &str, value: Option<&str>, force: bool) {
	match name {
		"value" => {
			if !force && cx.document.active_element().as_ref() == Some(element) {
				trace!("Not overwriting the value of the focused control.");
				return;
			}
			let value = value.unwrap_or_default();
			if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
				input.set_value(value);
			} else if let Some(textarea) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
				textarea.set_value(value);
			}
		}
		"checked" => {
			if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
				input.set_checked(value.is_some());
			}
		}
		"selected" => {
			if let Some(option) = element.dyn_ref::<web_sys::HtmlOptionElement>() {
				option.set_selected(value.is_some());
			}
		}
		_ => (),
	}
}

fn adopt_children(cx: &Cx<'_>, parent: &web_sys::Element, vdom: &[VNode]) -> Vec<MountedNode> {
	let mut cursor = parent.first_child();
	let mut mounted = Vec::new();
	for vnode in VNode::flatten(vdom) {
		match cursor.as_ref().and_then(|dom| adopt(cx, dom, vnode)) {
			Some(adopted) => {
				cursor = adopted.dom().next_sibling();
				mounted.push(adopted);
			}
			None => {
				warn!("Hydration mismatch. Recreating the node.");
				if let Some(created) = create(cx, vnode) {
					if let Err(error) = parent.insert_before(created.dom(), cursor.as_ref()) {
						error!(?error, "Failed to insert node.");
					}
					mounted.push(created);
				}
			}
		}
	}
	while let Some(surplus) = cursor {
		cursor = surplus.next_sibling();
		trace!(node = ?surplus.node_name(), "Removing surplus node.");
		if let Err(error) = parent.remove_child(&surplus) {
			error!(?error, "Failed to remove surplus node.");
		}
	}
	mounted
}

fn adopt(cx: &Cx<'_>, dom: &web_sys::Node, vnode: &VNode) -> Option<MountedNode> {
	match vnode {
		VNode::Text(text) => {
			let node = dom.dyn_ref::<web_sys::Text>()?.clone();
			if node.data() != *text {
				node.set_data(text);
			}
			Some(MountedNode::Text { node, text: text.clone() })
		}
		VNode::Element(next) => {
			let element = dom.dyn_ref::<web_sys::Element>()?.clone();
			if !element.tag_name().eq_ignore_ascii_case(next.name) {
				return None;
			}
			let span = trace_span!("Adopting element", tag = next.name);
			let _enter = span.enter();

			for attribute in &next.attributes {
				if element.get_attribute(attribute.name).as_deref() != Some(attribute.value.as_str()) {
					set_attribute(cx, &element, next.name, attribute.name, &attribute.value, false);
				}
			}
			let listeners = bind(cx, &element, &next.bindings);
			let content = match &next.content {
				// A textarea's text child is its initial value.
				Content::Nodes(_) if next.name == "textarea" => MountedContent::Nodes(Vec::new()),
				Content::Nodes(nodes) => MountedContent::Nodes(adopt_children(cx, &element, nodes)),
				Content::Markup(markup) => MountedContent::Markup {
					html: markup.html.clone(),
					scripts: script_elements(&element).iter().map(|_| ScriptLifecycle::adopted()).collect(),
				},
			};
			Some(MountedNode::Element(MountedElement {
				element,
				name: next.name,
				attributes: next.attributes.clone(),
				bindings: next.bindings.clone(),
				_listeners: listeners,
				content,
			}))
		}
		VNode::Multi(_) => None,
	}
}

fn update_children(cx: &Cx<'_>, parent: &web_sys::Element, mounted: &mut Vec<MountedNode>, vdom: &[VNode]) {
	let mut previous = core::mem::take(mounted).into_iter();
	for vnode in VNode::flatten(vdom) {
		match previous.next() {
			Some(existing) => match patch(cx, existing, vnode) {
				Ok(patched) => mounted.push(patched),
				Err(existing) => {
					trace!("Replacing node.");
					match create(cx, vnode) {
						Some(created) => {
							if let Err(error) = parent.replace_child(created.dom(), existing.dom()) {
								error!(?error, "Failed to replace node.");
							}
							mounted.push(created);
						}
						None => remove(parent, &existing),
					}
				}
			},
			None => {
				if let Some(created) = create(cx, vnode) {
					append(parent, &created);
					mounted.push(created);
				}
			}
		}
	}
	for surplus in previous {
		remove(parent, &surplus);
	}
}

fn remove(parent: &web_sys::Element, node: &MountedNode) {
	if let Err(error) = parent.remove_child(node.dom()) {
		error!(?error, "Failed to remove node.");
	}
}

/// Updates `existing` in place, or hands it back if it can't become `vnode`.
fn patch(cx: &Cx<'_>, existing: MountedNode, vnode: &VNode) -> core::result::Result<MountedNode, MountedNode> {
	match (existing, vnode) {
		(MountedNode::Text { node, text }, VNode::Text(next)) => {
			if text != *next {
				node.set_data(next);
			}
			Ok(MountedNode::Text { node, text: next.clone() })
		}
		(MountedNode::Element(mounted), VNode::Element(next)) => patch_element(cx, mounted, next).map(MountedNode::Element).map_err(MountedNode::Element),
		(existing, _) => Err(existing),
	}
}

fn patch_element(cx: &Cx<'_>, mut mounted: MountedElement, next: &Element) -> core::result::Result<MountedElement, MountedElement> {
	let same_kind = mounted.name == next.name && (next.name != "input" || find_attribute(&mounted.attributes, "type") == next.get_attribute("type"));
	if !same_kind {
		return Err(mounted);
	}
	let span = trace_span!("Patching element", tag = next.name);
	let _enter = span.enter();

	for old in &mounted.attributes {
		if !next.has_attribute(old.name) {
			remove_attribute(cx, &mounted.element, old.name);
		}
	}
	for attribute in &next.attributes {
		if find_attribute(&mounted.attributes, attribute.name) != Some(attribute.value.as_str()) {
			set_attribute(cx, &mounted.element, next.name, attribute.name, &attribute.value, false);
		}
	}
	mounted.attributes = next.attributes.clone();

	if mounted.bindings != next.bindings {
		trace!(count = next.bindings.len(), "Rebinding listeners.");
		mounted._listeners = bind(cx, &mounted.element, &next.bindings);
		mounted.bindings = next.bindings.clone();
	}

	let content = match (&mut mounted.content, &next.content) {
		(MountedContent::Nodes(children), Content::Nodes(nodes)) => {
			update_children(cx, &mounted.element, children, nodes);
			None
		}
		(MountedContent::Markup { html, .. }, Content::Markup(markup)) if *html == markup.html => None,
		(_, Content::Markup(markup)) => Some(fill_markup(cx, &mounted.element, markup)),
		(MountedContent::Markup { .. }, Content::Nodes(nodes)) => {
			mounted.element.set_text_content(None);
			let mut children = Vec::new();
			for vnode in VNode::flatten(nodes) {
				if let Some(created) = create(cx, vnode) {
					append(&mounted.element, &created);
					children.push(created);
				}
			}
			Some(MountedContent::Nodes(children))
		}
	};
	if let Some(content) = content {
		mounted.content = content;
	}
	Ok(mounted)
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
	attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
}
