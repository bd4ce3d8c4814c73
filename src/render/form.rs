//! Form controls.
//!
//! Controls that submit structured values (selects, file lists, expanders) write JSON into a hidden carrier input,
//! so that every field arrives as exactly one raw string no matter how many values it holds.

use super::{markup::styled, rich, RenderContext, Renderer};
use crate::{
	controller::ChangeSource,
	node::{attribute_text, Props, TreeNode},
	upload,
	vdom::{Behavior, Element, VNode},
};
use serde_json::Value;
use tracing::warn;

/// Native attributes forwarded from an `input`'s props, with whether they are boolean.
const INPUT_PASSTHROUGH: &[(&str, bool)] = &[
	("placeholder", false),
	("min", false),
	("max", false),
	("step", false),
	("maxlength", false),
	("pattern", false),
	("autocomplete", false),
	("accept", false),
	("required", true),
	("readonly", true),
	("multiple", true),
];

/// Input types whose changes are debounced like text entry.
const TEXT_LIKE: &[&str] = &["text", "search", "email", "url", "tel", "password"];

pub(super) fn register(renderer: &mut Renderer) {
	renderer.register("input", input);
	renderer.register("textarea", textarea);
	renderer.register("button", button);
	renderer.register("gui-button", button);
	renderer.register("select", select);
	renderer.register("option", option);
}

fn label(props: &Props, for_id: &str) -> VNode {
	match props.text("label") {
		Some(label) if !label.trim().is_empty() => Element::new("label")
			.attr("for", for_id)
			.child(rich::markdown_block(&label, "gui-label"))
			.into(),
		_ => VNode::empty(),
	}
}

fn wrapper(kind: &str) -> Element {
	Element::new("div").attr("class", format!("gui-input gui-input-{}", kind))
}

/// The current value as attribute text, preferring `value` over `defaultValue`.
fn initial_value(props: &Props) -> Option<String> {
	props
		.first_of(&["value", "defaultValue"])
		.and_then(attribute_text)
}

fn passthrough(mut element: Element, props: &Props) -> Element {
	for &(name, boolean) in INPUT_PASSTHROUGH {
		element = if boolean {
			element.flag(name, props.flag(name))
		} else {
			element.attr_opt(name, props.text(name))
		};
	}
	element
}

fn input(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let kind = node
		.props
		.str("type")
		.filter(|kind| !kind.is_empty())
		.unwrap_or("text");
	match kind {
		"hidden" => Element::new("input")
			.attr("type", "hidden")
			.attr_opt("name", node.props.field_name())
			.attr_opt("value", initial_value(&node.props))
			.into(),
		"checkbox" | "radio" => toggle(node, kind, cx),
		"range" => range(node, cx),
		"file" => file(renderer, node, cx),
		_ => field(node, kind, cx),
	}
}

fn field(node: &TreeNode, kind: &str, cx: &RenderContext<'_>) -> VNode {
	let props = &node.props;
	let id = cx.element_id("input");
	let mut control = passthrough(
		styled(Element::new("input"), props)
			.attr("type", kind)
			.attr("id", id.as_str())
			.attr_opt("name", props.field_name()),
		props,
	)
	.flag("disabled", props.flag("disabled"))
	.attr_opt("value", initial_value(props));
	control = if TEXT_LIKE.contains(&kind) {
		control.on("input", Behavior::Notify(ChangeSource::Text))
	} else {
		control.on("change", Behavior::Notify(ChangeSource::Control))
	};
	wrapper(kind).child(label(props, &id)).child(control).into()
}

fn toggle(node: &TreeNode, kind: &str, cx: &RenderContext<'_>) -> VNode {
	let props = &node.props;
	let id = cx.element_id("input");
	let (checked, value) = match props.get("value") {
		Some(Value::Bool(checked)) if kind == "checkbox" => (*checked, None),
		value => (
			props.flag("checked") || props.flag("defaultChecked"),
			value.and_then(attribute_text),
		),
	};
	let control = styled(Element::new("input"), props)
		.attr("type", kind)
		.attr("id", id.as_str())
		.attr_opt("name", props.field_name())
		.attr_opt("value", value)
		.flag("checked", checked)
		.flag("required", props.flag("required"))
		.flag("disabled", props.flag("disabled"))
		.on("change", Behavior::Notify(ChangeSource::Control));
	wrapper(kind).child(control).child(label(props, &id)).into()
}

/// A named slider with an unnamed number box mirroring it both ways.
fn range(node: &TreeNode, cx: &RenderContext<'_>) -> VNode {
	let props = &node.props;
	let slider_id = cx.element_id("range");
	let box_id = cx.element_id("range-value");
	let value = initial_value(props);

	let bounds = |element: Element| {
		element
			.attr_opt("min", props.text("min"))
			.attr_opt("max", props.text("max"))
			.attr_opt("step", props.text("step"))
			.flag("disabled", props.flag("disabled"))
	};
	let slider = bounds(
		styled(Element::new("input"), props)
			.attr("type", "range")
			.attr("id", slider_id.as_str())
			.attr_opt("name", props.field_name()),
	)
	.attr_opt("value", value.clone())
	.on(
		"input",
		Behavior::MirrorValue {
			peer_id: box_id.clone(),
		},
	)
	.on("change", Behavior::Notify(ChangeSource::Control));
	let number_box = bounds(
		Element::new("input")
			.attr("type", "number")
			.attr("class", "gui-range-value")
			.attr("id", box_id.as_str()),
	)
	.attr_opt("value", value)
	.on(
		"input",
		Behavior::MirrorValue {
			peer_id: slider_id.clone(),
		},
	)
	.on(
		"change",
		Behavior::MirrorValue {
			peer_id: slider_id.clone(),
		},
	)
	.on("change", Behavior::Notify(ChangeSource::Control));

	wrapper("range")
		.child(label(props, &slider_id))
		.child(
			Element::new("div")
				.attr("class", "gui-range")
				.child(slider)
				.child(number_box),
		)
		.into()
}

/// Uploaded files are listed with remove buttons. Newly picked files are uploaded before they're added.
fn file(renderer: &Renderer, node: &TreeNode, cx: &RenderContext<'_>) -> VNode {
	let props = &node.props;
	let multiple = props.flag("multiple");
	let carrier_id = cx.element_id("file");
	let picker_id = cx.element_id("file-picker");
	let urls = props
		.first_of(&["value", "defaultValue"])
		.map(upload::decode_urls)
		.unwrap_or_default();
	let marker = renderer.uploaded_url_marker();

	let carrier = Element::new("input")
		.attr("type", "hidden")
		.attr("id", carrier_id.as_str())
		.attr_opt("name", props.field_name())
		.attr("value", upload::encode_urls(&urls, multiple));

	let list = Element::new("ul")
		.attr("class", "gui-file-list")
		.children(urls.iter().enumerate().map(|(i, url)| {
			let remaining = urls
				.iter()
				.enumerate()
				.filter(|&(j, _)| j != i)
				.map(|(_, url)| url.clone())
				.collect();
			Element::new("li")
				.attr("class", "gui-file")
				.child(
					Element::new("a")
						.attr("href", url.as_str())
						.attr("target", "_blank")
						.attr("rel", "noopener")
						.child(VNode::text(upload::display_filename(url, marker))),
				)
				.child(
					Element::new("button")
						.attr("type", "button")
						.attr("class", "gui-file-remove")
						.flag("disabled", props.flag("disabled"))
						.on(
							"click",
							Behavior::RemoveFile {
								carrier_id: carrier_id.clone(),
								multiple,
								remaining,
							},
						)
						.child(VNode::text("Remove")),
				)
				.into()
		}));

	let picker = Element::new("input")
		.attr("type", "file")
		.attr("id", picker_id.as_str())
		.attr_opt("accept", accept(props))
		.flag("multiple", multiple)
		.flag("disabled", props.flag("disabled"))
		.on(
			"change",
			Behavior::PickFiles {
				carrier_id: carrier_id.clone(),
				multiple,
				existing: urls.clone(),
			},
		);

	styled(wrapper("file"), props)
		.child(label(props, &picker_id))
		.child(carrier)
		.child(list)
		.child(picker)
		.into()
}

/// `accept` may be a list of MIME types and extensions or a ready-made attribute value.
fn accept(props: &Props) -> Option<String> {
	match props.get("accept")? {
		Value::Array(types) => {
			let types: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
			Some(types.join(",")).filter(|accept| !accept.is_empty())
		}
		other => attribute_text(other),
	}
}

fn textarea(_: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let props = &node.props;
	let id = cx.element_id("textarea");
	let control = styled(Element::new("textarea"), props)
		.attr("id", id.as_str())
		.attr_opt("name", props.field_name())
		.attr_opt("rows", props.text("rows"))
		.attr_opt("placeholder", props.text("placeholder"))
		.flag("disabled", props.flag("disabled"))
		.attr("value", initial_value(props).unwrap_or_default())
		.on("input", Behavior::Notify(ChangeSource::Text));
	wrapper("textarea").child(label(props, &id)).child(control).into()
}

/// Buttons never submit natively. A press records the button's name and value and submits immediately.
fn button(renderer: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let props = &node.props;
	let content = match props.text("label") {
		Some(label) if !label.trim().is_empty() => rich::markdown_block(&label, "gui-button-label"),
		_ => renderer.render_children(&node.children, cx).into(),
	};
	let name = props.field_name().unwrap_or_default().to_owned();
	let value = props.text("value").unwrap_or_default();
	styled(Element::new("button").attr("class", "gui-button"), props)
		.attr("type", "button")
		.attr_opt("name", Some(name.as_str()).filter(|name| !name.is_empty()))
		.attr_opt("value", Some(value.as_str()).filter(|value| !value.is_empty()))
		.flag("disabled", props.flag("disabled"))
		.on("click", Behavior::Press { name, value })
		.child(content)
		.into()
}

fn option(_: &Renderer, node: &TreeNode, _: &mut RenderContext<'_>) -> VNode {
	let props = &node.props;
	let value = props.get("value").cloned().unwrap_or(Value::Null);
	Element::new("option")
		.attr_opt("value", attribute_text(&value))
		.flag("selected", props.flag("selected"))
		.child(VNode::text(
			props.text("label").unwrap_or_else(|| choice_label(&value)),
		))
		.into()
}

/// One selectable entry, as given by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
	/// Submitted as-is when selected.
	pub entry: Value,
	pub label: String,
}

fn choice_label(value: &Value) -> String {
	match value {
		Value::Object(option) => option
			.get("label")
			.or_else(|| option.get("value"))
			.and_then(attribute_text)
			.unwrap_or_default(),
		other => attribute_text(other).unwrap_or_default(),
	}
}

fn choice_value(entry: &Value) -> &Value {
	match entry {
		Value::Object(option) => option.get("value").unwrap_or(entry),
		other => other,
	}
}

/// The choices of a `select`, from its `options` prop or, failing that, from `option` children.
#[must_use]
pub fn choices(node: &TreeNode) -> Vec<Choice> {
	match node.props.get("options") {
		Some(Value::Array(options)) => options
			.iter()
			.map(|entry| Choice {
				label: choice_label(entry),
				entry: entry.clone(),
			})
			.collect(),
		_ => node
			.children
			.iter()
			.filter(|child| child.name == "option")
			.map(|child| {
				let entry = child.props.get("value").cloned().unwrap_or(Value::Null);
				Choice {
					label: child
						.props
						.text("label")
						.unwrap_or_else(|| choice_label(&entry)),
					entry,
				}
			})
			.collect(),
	}
}

/// Computes which choices start out selected, and whether that required correcting `current`.
///
/// A current value matches a choice if it equals the choice's entry or its `value`, either way round.
/// Without a match, the first choice is selected, unless `allow_none` (or `multiple`) permits an empty selection.
#[must_use]
pub fn initial_selection(
	choices: &[Choice],
	current: Option<&Value>,
	multiple: bool,
	allow_none: bool,
) -> (Vec<usize>, bool) {
	let matches = |choice: &Choice, wanted: &Value| {
		choice.entry == *wanted || choice_value(&choice.entry) == choice_value(wanted)
	};
	let wanted: Vec<&Value> = match current {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(values)) if multiple => values.iter().collect(),
		Some(value) => vec![value],
	};
	let mut selected: Vec<usize> = choices
		.iter()
		.enumerate()
		.filter(|(_, choice)| wanted.iter().any(|wanted| matches(choice, wanted)))
		.map(|(i, _)| i)
		.collect();
	if !multiple {
		selected.truncate(1);
	}

	if selected.is_empty() && !allow_none && !multiple && !choices.is_empty() {
		(vec![0], true)
	} else {
		(selected, false)
	}
}

/// The carrier's JSON: an array of entries if `multiple`, else the single entry or `null`.
#[must_use]
pub fn encode_selection(entries: &[Value], selected: &[usize], multiple: bool) -> String {
	let mut picked = selected.iter().filter_map(|&i| entries.get(i).cloned());
	let value = if multiple {
		Value::Array(picked.collect())
	} else {
		picked.next().unwrap_or(Value::Null)
	};
	value.to_string()
}

fn select(_: &Renderer, node: &TreeNode, cx: &mut RenderContext<'_>) -> VNode {
	let props = &node.props;
	let multiple = props.flag("multiple") || props.flag("isMulti");
	let allow_none = props.flag("allow_none");
	let choices = choices(node);
	let current = props.first_of(&["value", "defaultValue"]).cloned().or_else(|| {
		let selected: Vec<Value> = node
			.children
			.iter()
			.filter(|child| child.name == "option" && child.props.flag("selected"))
			.map(|child| child.props.get("value").cloned().unwrap_or(Value::Null))
			.collect();
		match selected.len() {
			0 => None,
			1 if !multiple => selected.into_iter().next(),
			_ => Some(Value::Array(selected)),
		}
	});
	let (selected, corrected) = initial_selection(&choices, current.as_ref(), multiple, allow_none);
	if corrected {
		warn!(
			field = props.field_name().unwrap_or_default(),
			"Current value matches no option. Selecting the first one."
		);
	}

	let entries: Vec<Value> = choices.iter().map(|choice| choice.entry.clone()).collect();
	let carrier_id = cx.element_id("select");
	let id = cx.element_id("select-control");

	let carrier = Element::new("input")
		.attr("type", "hidden")
		.attr("id", carrier_id.as_str())
		.attr_opt("name", props.field_name())
		.attr("value", encode_selection(&entries, &selected, multiple));

	let mut control = styled(Element::new("select"), props)
		.attr("id", id.as_str())
		.flag("multiple", multiple)
		.flag("disabled", props.flag("disabled"));
	if allow_none && !multiple {
		control = control.child(
			Element::new("option")
				.attr("value", "")
				.flag("selected", selected.is_empty())
				.child(VNode::text("\u{2014}")),
		);
	}
	control = control
		.children(choices.iter().enumerate().map(|(i, choice)| {
			Element::new("option")
				.attr("value", i.to_string())
				.flag("selected", selected.contains(&i))
				.child(VNode::text(choice.label.as_str()))
				.into()
		}))
		.on(
			"change",
			Behavior::EncodeSelection {
				carrier_id: carrier_id.clone(),
				options: entries,
				multiple,
			},
		);

	wrapper("select")
		.child(label(props, &id))
		.child(carrier)
		.child(control)
		.into()
}
