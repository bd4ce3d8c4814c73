//! Containers and display-only tags.

use super::{rich, RenderContext, Renderer};
use crate::{
	node::{Props, TreeNode},
	vdom::{Behavior, Element, VNode},
};
use serde_json::Value;

/// Tags that render as the element of the same name around their children.
const CONTAINERS: &[&str] = &[
	"div", "span", "section", "ul", "ol", "li", "table", "thead", "tbody", "tr", "th", "td",
];

pub(super) fn register(renderer: &mut Renderer) {
	for &tag in CONTAINERS {
		renderer.register(tag, container);
	}
	renderer.register("form-row", form_row);
	renderer.register("columns", columns);
	renderer.register("pre", pre);
	renderer.register("img", img);
	renderer.register("video", media);
	renderer.register("audio", media);
	renderer.register("json", json);
}

/// Applies the `className` and `style` props every tag accepts.
pub(super) fn styled(element: Element, props: &Props) -> Element {
	let element = match props.class_name() {
		Some(class) if !class.is_empty() => element.class(class),
		_ => element,
	};
	element.attr_opt("style", props.style())
}

pub(super) fn fragment(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	renderer.render_children(&node.children, cx).into()
}

fn container(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let tag = CONTAINERS
		.iter()
		.copied()
		.find(|tag| *tag == node.name)
		.unwrap_or("div");
	styled(Element::new(tag), &node.props)
		.children(renderer.render_children(&node.children, cx))
		.into()
}

fn form_row(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	styled(Element::new("div").attr("class", "gui-form-row"), &node.props)
		.children(renderer.render_children(&node.children, cx))
		.into()
}

fn columns(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	styled(Element::new("div").attr("class", "gui-columns"), &node.props)
		.children(renderer.render_children(&node.children, cx))
		.into()
}

fn pre(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	styled(Element::new("pre"), &node.props)
		.child(VNode::text(node.props.text("body").unwrap_or_default()))
		.into()
}

fn caption(props: &Props) -> VNode {
	props
		.str("caption")
		.map(|caption| rich::markdown_block(caption, "gui-caption"))
		.into()
}

fn img(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let src = node.props.text("src").unwrap_or_default();
	let mut image = styled(Element::new("img").attr("class", "gui-image"), &node.props)
		.attr_opt("alt", node.props.text("alt"))
		.attr("src", src.as_str());
	if !src.is_empty() && !src.starts_with("data:") {
		image = image.on("click", Behavior::OpenInNewWindow { url: src });
	}
	Element::new("div")
		.attr("class", "gui-media")
		.child(caption(&node.props))
		.child(image)
		.into()
}

fn media(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let tag = if node.name == "audio" { "audio" } else { "video" };
	Element::new("div")
		.attr("class", "gui-media")
		.child(caption(&node.props))
		.child(
			styled(Element::new(tag), &node.props)
				.flag("controls", true)
				.attr_opt("src", node.props.text("src")),
		)
		.into()
}

fn json(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let value = node.props.get("value").cloned().unwrap_or(Value::Null);
	let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
	let open = node
		.props
		.get("defaultInspectDepth")
		.and_then(Value::as_f64)
		.map_or(true, |depth| depth != 0.0);
	styled(Element::new("details").attr("class", "gui-json"), &node.props)
		.flag("open", open)
		.child(Element::new("summary").child(VNode::text("JSON")))
		.child(Element::new("pre").child(Element::new("code").child(VNode::text(pretty))))
		.into()
}
