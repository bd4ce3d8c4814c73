//! Server-side rendering into HTML text.
//!
//! The output is what [`dom::Mounted::adopt`](crate::dom::Mounted::adopt) expects to find when hydrating.

use crate::{
	config::Config,
	render::{Renderer, UiState},
	response::RenderResponse,
	vdom::{Content, Element, VNode},
};
use tracing::instrument;

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Serializes `nodes` as HTML.
#[must_use]
pub fn render_to_string(nodes: &[VNode]) -> String {
	let mut html = String::new();
	for node in nodes {
		write_node(&mut html, node);
	}
	html
}

/// A complete, hydratable form for `response`.
///
/// This is the form element (with the request body carrier as its last control)
/// followed by the response itself as embedded JSON, which the client picks up while hydrating.
#[must_use]
#[instrument(skip_all, fields(roots = response.children.len()))]
pub fn render_form(renderer: &Renderer, response: &RenderResponse, config: &Config) -> String {
	let nodes = renderer.render_form(&response.children, &response.state, &UiState::default());

	let mut html = String::new();
	html.push_str("<form id=\"");
	escape_into(&mut html, &config.form_id, true);
	html.push_str("\" method=\"POST\" novalidate=\"\">");
	for node in &nodes {
		write_node(&mut html, node);
	}
	html.push_str("</form>");

	html.push_str("<script type=\"application/json\" id=\"");
	escape_into(&mut html, &config.initial_data_id, true);
	html.push_str("\">");
	html.push_str(&script_safe_json(response));
	html.push_str("</script>");
	html
}

/// JSON that can't terminate the `<script>` element embedding it.
fn script_safe_json(response: &RenderResponse) -> String {
	serde_json::to_string(response)
		.unwrap_or_else(|_| "{}".to_owned())
		.replace('<', "\\u003c")
}

fn write_node(html: &mut String, node: &VNode) {
	match node {
		VNode::Element(element) => write_element(html, element),
		VNode::Text(text) => escape_into(html, text, false),
		VNode::Multi(nodes) => {
			for node in nodes {
				write_node(html, node);
			}
		}
	}
}

fn write_element(html: &mut String, element: &Element) {
	html.push('<');
	html.push_str(element.name);
	for attribute in &element.attributes {
		// A textarea's value is its content.
		if element.name == "textarea" && attribute.name == "value" {
			continue;
		}
		html.push(' ');
		html.push_str(attribute.name);
		html.push_str("=\"");
		escape_into(html, &attribute.value, true);
		html.push('"');
	}
	html.push('>');

	if VOID_ELEMENTS.contains(&element.name) {
		return;
	}

	if element.name == "textarea" {
		if let Some(value) = element.get_attribute("value") {
			// A leading newline would be eaten by the parser.
			if value.starts_with('\n') {
				html.push('\n');
			}
			escape_into(html, value, false);
		}
	} else {
		match &element.content {
			Content::Nodes(nodes) => {
				for node in nodes {
					write_node(html, node);
				}
			}
			Content::Markup(markup) => html.push_str(&markup.html),
		}
	}

	html.push_str("</");
	html.push_str(element.name);
	html.push('>');
}

fn escape_into(html: &mut String, text: &str, attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' => html.push_str("&lt;"),
			'>' => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			'\u{a0}' => html.push_str("&nbsp;"),
			c => html.push(c),
		}
	}
}
