#![cfg(target_arch = "wasm32")]

use gooey_dom::{
	html::render_form,
	payload::{RequestBody, REQUEST_BODY_FIELD},
	render::Renderer,
	response::RenderResponse,
	App, Config,
};
use serde_json::{json, Value};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{HtmlElement, HtmlFormElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

use web_fixture_::{by_id, Root};

fn page(config: &Config, response: &RenderResponse) -> (Root, HtmlFormElement) {
	let root = Root::new();
	root.0.set_inner_html(&render_form(&Renderer::default(), response, config));
	let form = by_id(&config.form_id);
	(root, form)
}

async fn sleep(ms: i32) {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		let resolve = Closure::once_into_js(move || {
			resolve.call0(&JsValue::NULL).unwrap();
		});
		web_sys::window()
			.unwrap()
			.set_timeout_with_callback_and_timeout_and_arguments_0(resolve.unchecked_ref(), ms)
			.unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

fn run_js(source: &str) {
	js_sys::Function::new_no_args(source).call0(&JsValue::NULL).unwrap();
}

fn global(name: &str) -> JsValue {
	js_sys::Reflect::get(&web_sys::window().unwrap(), &JsValue::from_str(name)).unwrap()
}

/// Stands in for `window.fetch` while alive. Requests are recorded and stay pending until answered.
struct FetchStub;

impl FetchStub {
	fn install() -> Self {
		run_js(
			"window.gooeyRealFetch = window.fetch;
			window.gooeyRequests = [];
			window.gooeyPending = [];
			window.fetch = function (request) {
				window.gooeyRequests.push(request);
				return new Promise(function (resolve) { window.gooeyPending.push(resolve); });
			};",
		);
		Self
	}

	fn requests(&self) -> Vec<web_sys::Request> {
		js_sys::Array::from(&global("gooeyRequests"))
			.iter()
			.map(JsCast::unchecked_into)
			.collect()
	}

	/// Answers the oldest pending request.
	fn respond(&self, response: &web_sys::Response) {
		let resolve: js_sys::Function = js_sys::Array::from(&global("gooeyPending")).shift().unchecked_into();
		resolve.call1(&JsValue::NULL, response).unwrap();
	}
}

impl Drop for FetchStub {
	fn drop(&mut self) {
		run_js("window.fetch = window.gooeyRealFetch;");
	}
}

fn json_response(body: &Value) -> web_sys::Response {
	web_sys::Response::new_with_opt_str(Some(&body.to_string())).unwrap()
}

async fn body_of(request: &web_sys::Request) -> Value {
	let text = JsFuture::from(request.text().unwrap()).await.unwrap();
	serde_json::from_str(&text.as_string().unwrap()).unwrap()
}

fn type_into(input: &HtmlInputElement, value: &str) {
	input.set_value(value);
	input.dispatch_event(&web_sys::Event::new("input").unwrap()).unwrap();
}

#[wasm_bindgen_test]
fn hydration_is_announced() {
	let config = Config {
		form_id: "hydration-form".to_owned(),
		..Config::default()
	};
	let response: RenderResponse = serde_json::from_value(json!({
		"children": [{ "name": "input", "props": { "name": "title", "value": "Hi" } }],
		"state": { "title": "Hi" },
		"meta": { "title": "Hydrated page" }
	}))
	.unwrap();
	let (_root, form) = page(&config, &response);
	let input = form.query_selector("input[name=title]").unwrap().unwrap();

	let app = App::hydrate(config, form.clone(), response).unwrap();

	let window = web_sys::window().unwrap();
	assert_eq!(js_sys::Reflect::get(&window, &JsValue::from_str("hydrated")).unwrap(), JsValue::TRUE);
	assert_eq!(window.document().unwrap().title(), "Hydrated page");
	let adopted = form.query_selector("input[name=title]").unwrap().unwrap();
	assert!(input.is_same_node(Some(&adopted)));
	assert!(!app.is_halted());

	app.teardown();
	assert!(app.is_halted());
}

#[wasm_bindgen_test]
async fn failed_submissions_show_a_notice() {
	let config = Config {
		form_id: "failing-form".to_owned(),
		backend_base: "/__gooey-dom-test/no-such-backend".to_owned(),
		..Config::default()
	};
	let response: RenderResponse = serde_json::from_value(json!({
		"children": [{ "name": "button", "props": { "name": "go", "label": "Go" } }]
	}))
	.unwrap();
	let (_root, form) = page(&config, &response);
	let app = App::hydrate(config, form.clone(), response).unwrap();

	let button: HtmlElement = form.query_selector("button").unwrap().unwrap().unchecked_into();
	button.click();

	for _ in 0..50 {
		if app.is_halted() {
			break;
		}
		sleep(100).await;
	}
	assert!(app.is_halted());
	assert!(form.query_selector(".gui-error[role=alert]").unwrap().is_some());
	assert!(form.get_attribute("aria-busy").is_none());
	assert!(!form.class_list().contains("gui-submitting"));
}

#[wasm_bindgen_test]
async fn changes_during_a_submission_are_sent_once_afterwards() {
	let fetch = FetchStub::install();
	let config = Config {
		form_id: "serial-form".to_owned(),
		debounce_ms: 1,
		..Config::default()
	};
	let response: RenderResponse = serde_json::from_value(json!({
		"children": [{ "name": "input", "props": { "name": "title" } }],
		"state": { "title": "" }
	}))
	.unwrap();
	let (_root, form) = page(&config, &response);
	let app = App::hydrate(config, form.clone(), response).unwrap();
	let input: HtmlInputElement = form.query_selector("input[name=title]").unwrap().unwrap().unchecked_into();

	type_into(&input, "one");
	sleep(50).await;
	assert_eq!(fetch.requests().len(), 1);

	type_into(&input, "two");
	sleep(50).await;
	type_into(&input, "three");
	sleep(50).await;
	assert_eq!(fetch.requests().len(), 1);

	fetch.respond(&json_response(&json!({
		"children": [{ "name": "input", "props": { "name": "title" } }],
		"state": { "title": "one" }
	})));
	sleep(50).await;

	let requests = fetch.requests();
	assert_eq!(requests.len(), 2);
	assert_eq!(body_of(&requests[0]).await["title"], json!("one"));
	let second = body_of(&requests[1]).await;
	assert_eq!(second["title"], json!("three"));
	assert_eq!(second["state"]["title"], json!("three"));

	sleep(50).await;
	assert_eq!(fetch.requests().len(), 2);
	assert!(!app.is_halted());
	app.teardown();
}

#[wasm_bindgen_test]
async fn redirects_are_left_to_a_native_submission() {
	let fetch = FetchStub::install();
	run_js(
		"window.gooeyNativeSubmits = [];
		window.gooeyRealSubmit = HTMLFormElement.prototype.submit;
		HTMLFormElement.prototype.submit = function () { window.gooeyNativeSubmits.push(this); };",
	);
	let config = Config {
		form_id: "redirecting-form".to_owned(),
		..Config::default()
	};
	let response: RenderResponse = serde_json::from_value(json!({
		"children": [{ "name": "button", "props": { "name": "go", "value": "yes", "label": "Go" } }],
		"state": { "step": 1 }
	}))
	.unwrap();
	let (_root, form) = page(&config, &response);
	let app = App::hydrate(config, form.clone(), response).unwrap();

	let button: HtmlElement = form.query_selector("button").unwrap().unwrap().unchecked_into();
	button.click();
	sleep(50).await;

	let requests = fetch.requests();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].redirect(), web_sys::RequestRedirect::Manual);

	let redirect = js_sys::Function::new_with_args(
		"response",
		"Object.defineProperty(response, 'type', { value: 'opaqueredirect' }); return response;",
	)
	.call1(&JsValue::NULL, &web_sys::Response::new().unwrap())
	.unwrap();
	fetch.respond(redirect.unchecked_ref());
	sleep(50).await;

	let submitted = js_sys::Array::from(&global("gooeyNativeSubmits"));
	run_js("HTMLFormElement.prototype.submit = window.gooeyRealSubmit;");
	assert_eq!(submitted.length(), 1);
	let native: HtmlFormElement = submitted.get(0).unchecked_into();
	native.remove();

	assert!(app.is_halted());
	assert!(form.query_selector(".gui-error").unwrap().is_none());
	assert_eq!(native.method(), "post");
	assert!(native.action().contains("/__/gui"), "{}", native.action());

	let carrier: HtmlInputElement = native
		.query_selector(&format!("input[name={}]", REQUEST_BODY_FIELD))
		.unwrap()
		.unwrap()
		.unchecked_into();
	let carrier = RequestBody::decode(&carrier.value()).unwrap();
	assert_eq!(carrier.state.get("step"), Some(&json!(1)));
	assert_eq!(carrier.state.get("go"), Some(&json!("yes")));
	let pressed: HtmlInputElement = native.query_selector("input[name=go]").unwrap().unwrap().unchecked_into();
	assert_eq!(pressed.value(), "yes");
}
