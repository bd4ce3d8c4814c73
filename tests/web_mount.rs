#![cfg(target_arch = "wasm32")]

use gooey_dom::{
	controller::ChangeSource,
	dom::{Mounted, Signal},
	html::render_to_string,
	script::ScriptLifecycle,
	vdom::{Behavior, Element, Markup, VNode},
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{HtmlButtonElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

use web_fixture_::{by_id, recorder, Root};

fn trusted(html: &str) -> Markup {
	Markup::from(html.to_owned())
}

fn runs(counter: &str) -> f64 {
	js_sys::Reflect::get(&web_sys::window().unwrap(), &JsValue::from_str(counter))
		.unwrap()
		.as_f64()
		.unwrap_or(0.0)
}

#[wasm_bindgen_test]
fn mount_creates() {
	let root = Root::new();
	let (sink, _) = recorder();
	let vdom = [
		Element::new("p").attr("class", "x").child(VNode::text("Hello")).into(),
		VNode::Multi(vec![VNode::text("a"), VNode::empty()]),
	];
	let _mounted = Mounted::mount(root.element(), &vdom, sink).unwrap();
	assert_eq!(root.0.inner_html(), "<p class=\"x\">Hello</p>a");
}

#[wasm_bindgen_test]
fn update_patches_in_place() {
	let root = Root::new();
	let (sink, _) = recorder();
	let input = |value: &str| -> Vec<VNode> { vec![Element::new("input").attr("id", "patch-input").attr("value", value).into()] };

	let mut mounted = Mounted::mount(root.element(), &input("a"), sink).unwrap();
	let before: HtmlInputElement = by_id("patch-input");
	assert_eq!(before.value(), "a");

	// Unchanged backend values leave typed text alone.
	before.set_value("typed");
	mounted.update(&input("a"));
	assert_eq!(before.value(), "typed");

	mounted.update(&input("b"));
	let after: HtmlInputElement = by_id("patch-input");
	assert!(before.is_same_node(Some(&after)));
	assert_eq!(after.value(), "b");
	assert_eq!(after.get_attribute("value").as_deref(), Some("b"));
}

#[wasm_bindgen_test]
fn update_replaces_other_tags() {
	let root = Root::new();
	let (sink, _) = recorder();
	let mut mounted = Mounted::mount(root.element(), &[Element::new("p").into(), Element::new("b").into()], sink).unwrap();
	mounted.update(&[Element::new("span").child(VNode::text("s")).into()]);
	assert_eq!(root.0.inner_html(), "<span>s</span>");
	mounted.update(&[]);
	assert_eq!(root.0.inner_html(), "");
}

#[wasm_bindgen_test]
fn listeners_live_as_long_as_their_nodes() {
	let root = Root::new();
	let (sink, signals) = recorder();
	let button = Element::new("button")
		.attr("id", "press-me")
		.on(
			"click",
			Behavior::Press {
				name: "go".to_owned(),
				value: "1".to_owned(),
			},
		)
		.into();
	let mut mounted = Mounted::mount(root.element(), &[button], sink).unwrap();

	let dom_button: HtmlButtonElement = by_id("press-me");
	dom_button.click();
	assert_eq!(signals.borrow().len(), 1);
	assert!(matches!(&signals.borrow()[0], Signal::Pressed { name, value } if name == "go" && value == "1"));

	mounted.update(&[]);
	dom_button.click();
	assert_eq!(signals.borrow().len(), 1);
}

#[wasm_bindgen_test]
fn notify_on_input() {
	let root = Root::new();
	let (sink, signals) = recorder();
	let input = Element::new("input")
		.attr("id", "notify-input")
		.on("input", Behavior::Notify(ChangeSource::Text))
		.into();
	let _mounted = Mounted::mount(root.element(), &[input], sink).unwrap();

	let input: HtmlInputElement = by_id("notify-input");
	input
		.dispatch_event(&web_sys::Event::new("input").unwrap())
		.unwrap();
	assert!(matches!(signals.borrow().as_slice(), [Signal::Changed(ChangeSource::Text)]));
}

#[wasm_bindgen_test]
fn client_markup_scripts_run_once() {
	let root = Root::new();
	let (sink, _) = recorder();
	let markup = |extra: &str| -> Vec<VNode> {
		vec![Element::new("div")
			.markup(trusted(&format!(
				"<p>{}</p><script>window.gooeyMountRuns = (window.gooeyMountRuns || 0) + 1;</script>",
				extra
			)))
			.into()]
	};

	let mut mounted = Mounted::mount(root.element(), &markup("one"), sink).unwrap();
	assert_eq!(runs("gooeyMountRuns"), 1.0);
	assert_eq!(mounted.script_states(), [ScriptLifecycle::Executed]);

	mounted.update(&markup("one"));
	assert_eq!(runs("gooeyMountRuns"), 1.0);

	mounted.update(&markup("two"));
	assert_eq!(runs("gooeyMountRuns"), 2.0);
	assert_eq!(mounted.script_states(), [ScriptLifecycle::Executed]);
}

#[wasm_bindgen_test]
fn foreign_content_scripts_are_counted() {
	let root = Root::new();
	let (sink, _) = recorder();
	let vdom: Vec<VNode> = vec![Element::new("div")
		.markup(trusted(
			"<svg><script href=\"x\"/></svg><script>window.gooeyForeignRuns = (window.gooeyForeignRuns || 0) + 1;</script>",
		))
		.into()];

	let mounted = Mounted::mount(root.element(), &vdom, sink).unwrap();
	assert_eq!(mounted.script_states().len(), 2);
	assert_eq!(runs("gooeyForeignRuns"), 1.0);
}

#[wasm_bindgen_test]
fn adopt_keeps_server_nodes() {
	let root = Root::new();
	let (sink, signals) = recorder();
	let vdom: Vec<VNode> = vec![
		Element::new("button")
			.attr("id", "adopted-button")
			.on(
				"click",
				Behavior::Press {
					name: String::new(),
					value: String::new(),
				},
			)
			.child(VNode::text("Go"))
			.into(),
		Element::new("div")
			.markup(trusted("<script>window.gooeyAdoptRuns = (window.gooeyAdoptRuns || 0) + 1;</script>"))
			.into(),
	];
	root.0.set_inner_html(&render_to_string(&vdom));
	let server_button: HtmlButtonElement = by_id("adopted-button");

	let mounted = Mounted::adopt(root.element(), &vdom, sink).unwrap();
	let adopted: HtmlButtonElement = by_id("adopted-button");
	assert!(server_button.is_same_node(Some(&adopted)));
	assert_eq!(mounted.script_states(), [ScriptLifecycle::Executed]);
	assert_eq!(runs("gooeyAdoptRuns"), 0.0);

	adopted.click();
	assert_eq!(signals.borrow().len(), 1);
}

#[wasm_bindgen_test]
fn adopt_repairs_mismatches() {
	let root = Root::new();
	let (sink, _) = recorder();
	root.0.set_inner_html("<span>x</span><b>surplus</b>");
	let _mounted = Mounted::adopt(root.element(), &[Element::new("p").child(VNode::text("x")).into()], sink).unwrap();
	assert_eq!(root.0.inner_html(), "<p>x</p>");
}
