//! Trusted rich content: markdown and raw HTML.

use super::{markup::styled, RenderContext, Renderer};
use crate::{
	node::TreeNode,
	vdom::{Element, Markup, VNode},
};
use pulldown_cmark::{html, Options, Parser};

pub(super) fn register(renderer: &mut Renderer) {
	renderer.register("markdown", markdown);
	renderer.register("html", raw_html);
}

/// Renders GitHub-flavoured markdown. Embedded HTML passes through.
#[must_use]
pub fn markdown_to_html(body: &str) -> String {
	let mut options = Options::empty();
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_STRIKETHROUGH);
	options.insert(Options::ENABLE_TASKLISTS);
	options.insert(Options::ENABLE_FOOTNOTES);

	let mut rendered = String::with_capacity(body.len() * 3 / 2);
	html::push_html(&mut rendered, Parser::new_ext(body, options));
	rendered
}

/// A markdown snippet inside a `div` with `class`, or nothing for a blank `body`.
pub(super) fn markdown_block(body: &str, class: &str) -> VNode {
	if body.trim().is_empty() {
		return VNode::empty();
	}
	Element::new("div")
		.attr("class", format!("gui-markdown {}", class))
		.markup(Markup::from(markdown_to_html(body)))
		.into()
}

fn markdown(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let body = node.props.text("body").unwrap_or_default();
	if body.trim().is_empty() {
		return VNode::empty();
	}
	styled(Element::new("div").attr("class", "gui-markdown"), &node.props)
		.markup(Markup::from(markdown_to_html(&body)))
		.into()
}

fn raw_html(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let body = node.props.text("body").unwrap_or_default();
	if body.is_empty() {
		return VNode::empty();
	}
	styled(Element::new("div").attr("class", "gui-html-container"), &node.props)
		.markup(Markup::from(body))
		.into()
}
