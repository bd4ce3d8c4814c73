//! Tabs and expanders.

use super::{markup::styled, rich, RenderContext, Renderer};
use crate::{
	node::{expander_field, TreeNode},
	vdom::{Behavior, Element, VNode},
};
use serde_json::Value;

pub(super) fn register(renderer: &mut Renderer) {
	renderer.register("tabs", tabs);
	renderer.register("expander", expander);
	renderer.register("details", expander);
}

/// Each child is one tab. All panels are rendered so that fields on hidden tabs are still submitted.
fn tabs(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let group = cx.path_key();
	let selected = cx
		.ui
		.selected_tab(&group)
		.filter(|&index| index < node.children.len())
		.unwrap_or(0);

	let mut list = Element::new("div")
		.attr("class", "gui-tab-list")
		.attr("role", "tablist");
	let mut panels = Vec::with_capacity(node.children.len());
	for (index, tab) in node.children.iter().enumerate() {
		let active = index == selected;
		let label = tab
			.props
			.text("label")
			.unwrap_or_else(|| format!("Tab {}", index + 1));
		list = list.child(
			Element::new("button")
				.attr("type", "button")
				.attr("role", "tab")
				.attr("class", if active { "gui-tab gui-tab-active" } else { "gui-tab" })
				.attr("aria-selected", active.to_string())
				.on(
					"click",
					Behavior::SelectTab {
						group: group.clone(),
						index,
					},
				)
				.child(VNode::text(label)),
		);

		cx.path.push(index);
		let content = renderer.render_children(&tab.children, cx);
		cx.path.pop();
		panels.push(
			Element::new("div")
				.attr("class", "gui-tab-panel")
				.attr("role", "tabpanel")
				.flag("hidden", !active)
				.children(content)
				.into(),
		);
	}

	styled(Element::new("div").attr("class", "gui-tabs"), &node.props)
		.child(list)
		.children(panels)
		.into()
}

/// Open state precedence: a local toggle, then the backend's state for the field, then the `open` prop.
fn expander(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let field = expander_field(node, cx.path());
	let open = cx
		.ui
		.expander_open(&field)
		.or_else(|| cx.state.get(&field).and_then(Value::as_bool))
		.unwrap_or_else(|| node.props.flag("open"));
	let carrier_id = cx.element_id("expander");
	let label = node.props.text("label").unwrap_or_default();

	let carrier = Element::new("input")
		.attr("type", "checkbox")
		.flag("hidden", true)
		.attr("id", carrier_id.as_str())
		.attr("name", field.as_str())
		.flag("checked", open);
	let summary = Element::new("div")
		.attr("class", "gui-expander-summary")
		.attr("role", "button")
		.attr("tabindex", "0")
		.attr("aria-expanded", open.to_string())
		.on(
			"click",
			Behavior::ToggleExpander {
				key: field,
				carrier_id,
			},
		)
		.child(
			Element::new("span")
				.attr("class", "gui-expander-marker")
				.child(VNode::text(if open { "\u{25be}" } else { "\u{25b8}" })),
		)
		.child(rich::markdown_block(&label, "gui-expander-label"));
	let body = Element::new("div")
		.attr("class", "gui-expander-body")
		.flag("hidden", !open)
		.children(renderer.render_children(&node.children, cx));

	styled(Element::new("div").attr("class", "gui-expander"), &node.props)
		.attr("data-open", open.to_string())
		.child(carrier)
		.child(summary)
		.child(body)
		.into()
}
