//! Turning [`TreeNode`]s into [`VNode`]s.
//!
//! A [`Renderer`] dispatches on tag names through an open registry.
//! Unknown tags render as a visible JSON fallback instead of failing, so one bad node never blanks a page.

use crate::{
	config::Config,
	node::{path_key, TreeNode},
	payload::{FormState, REQUEST_BODY_FIELD},
	vdom::{Element, VNode},
};
use hashbrown::HashMap;
use tracing::{instrument, trace, warn};

mod disclosure;
mod form;
mod markup;
mod rich;

pub use form::{choices, encode_selection, initial_selection, Choice};
pub use rich::markdown_to_html;

/// Renders one node. Handlers render their children through [`Renderer::render_children`].
pub type RenderFn = fn(&Renderer, &TreeNode, &mut RenderContext<'_>) -> VNode;

pub struct Renderer {
	handlers: HashMap<&'static str, RenderFn>,
	uploaded_url_marker: String,
}

impl Default for Renderer {
	/// A renderer for the full standard vocabulary.
	fn default() -> Self {
		let mut renderer = Self::empty();
		markup::register(&mut renderer);
		rich::register(&mut renderer);
		form::register(&mut renderer);
		disclosure::register(&mut renderer);
		renderer
	}
}

impl Renderer {
	/// A renderer without any handlers. Everything but fragments renders as fallback.
	#[must_use]
	pub fn empty() -> Self {
		let mut renderer = Self {
			handlers: HashMap::new(),
			uploaded_url_marker: Config::default().uploaded_url_marker,
		};
		renderer.register("", markup::fragment);
		renderer
	}

	/// Registers `handler` for `tag`, returning the handler it replaces, if any.
	pub fn register(&mut self, tag: &'static str, handler: RenderFn) -> Option<RenderFn> {
		self.handlers.insert(tag, handler)
	}

	/// Sets the substring that identifies URLs of files users uploaded themselves. See [`display_filename`](crate::upload::display_filename).
	#[must_use]
	pub fn with_uploaded_url_marker(mut self, marker: impl Into<String>) -> Self {
		self.uploaded_url_marker = marker.into();
		self
	}

	#[must_use]
	pub fn uploaded_url_marker(&self) -> &str {
		&self.uploaded_url_marker
	}

	#[must_use]
	pub fn handles(&self, tag: &str) -> bool {
		self.handlers.contains_key(tag)
	}

	/// Renders a single node, at the context's current path.
	pub fn render(&self, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
		match self.handlers.get(node.name.as_str()) {
			Some(handler) => handler(self, node, cx),
			None => {
				#[cfg(feature = "log-paths")]
				warn!(tag = node.name.as_str(), path = cx.path_key().as_str(), "Unknown tag. Rendering fallback.");
				#[cfg(not(feature = "log-paths"))]
				warn!(tag = node.name.as_str(), "Unknown tag. Rendering fallback.");
				fallback(node)
			}
		}
	}

	/// Renders `nodes` in order, each at its index below the context's current path.
	pub fn render_children(&self, nodes: &[TreeNode], cx: &mut RenderContext<'_>) -> Vec<VNode> {
		nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				cx.path.push(i);
				let vnode = self.render(node, cx);
				cx.path.pop();
				vnode
			})
			.collect()
	}

	/// Renders a whole tree.
	#[must_use]
	#[instrument(skip_all, fields(roots = children.len()))]
	pub fn render_tree(&self, children: &[TreeNode], state: &FormState, ui: &UiState) -> Vec<VNode> {
		let mut cx = RenderContext::new(state, ui);
		self.render_children(children, &mut cx)
	}

	/// Renders a tree as the content of its form, followed by the request body carrier.
	#[must_use]
	pub fn render_form(&self, children: &[TreeNode], state: &FormState, ui: &UiState) -> Vec<VNode> {
		let carrier = crate::payload::RequestBody::for_tree(state.clone(), children);
		trace!(transforms = carrier.transforms.len(), "Rendering form.");
		let mut nodes = self.render_tree(children, state, ui);
		nodes.push(
			Element::new("input")
				.attr("type", "hidden")
				.attr("name", REQUEST_BODY_FIELD)
				.attr("value", carrier.encode())
				.into(),
		);
		nodes
	}
}

/// Per-render information handlers may consult.
pub struct RenderContext<'a> {
	/// The backend state the tree was rendered alongside.
	pub state: &'a FormState,
	pub ui: &'a UiState,
	path: Vec<usize>,
}

impl<'a> RenderContext<'a> {
	#[must_use]
	pub fn new(state: &'a FormState, ui: &'a UiState) -> Self {
		Self {
			state,
			ui,
			path: Vec::new(),
		}
	}

	/// The index path of the node being rendered.
	#[must_use]
	pub fn path(&self) -> &[usize] {
		&self.path
	}

	#[must_use]
	pub fn path_key(&self) -> String {
		path_key(&self.path)
	}

	/// A document-unique element id for `role` at the current path.
	#[must_use]
	pub fn element_id(&self, role: &str) -> String {
		format!("gui-{}-{}", role, self.path_key())
	}
}

/// Client-only presentation state that survives re-renders but is never submitted by itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
	tabs: HashMap<String, usize>,
	expanders: HashMap<String, bool>,
}

impl UiState {
	#[must_use]
	pub fn selected_tab(&self, group: &str) -> Option<usize> {
		self.tabs.get(group).copied()
	}

	pub fn select_tab(&mut self, group: impl Into<String>, index: usize) {
		self.tabs.insert(group.into(), index);
	}

	#[must_use]
	pub fn expander_open(&self, key: &str) -> Option<bool> {
		self.expanders.get(key).copied()
	}

	pub fn set_expander(&mut self, key: impl Into<String>, open: bool) {
		self.expanders.insert(key.into(), open);
	}
}

/// A visible placeholder showing the unrenderable node as JSON.
#[must_use]
pub fn fallback(node: &TreeNode) -> VNode {
	let json = serde_json::to_string(node).unwrap_or_else(|_| node.name.clone());
	Element::new("div")
		.attr("class", "gui-fallback")
		.child(Element::new("pre").child(Element::new("code").child(VNode::text(json))))
		.into()
}
