use gooey_dom::{
	response::{backend_url, reconcile_query, resolve_backend, rewrite_redirect, BackendReply, RenderResponse},
	Error,
};
use serde_json::{json, Map, Value};
use url::Url;

fn backend() -> Url {
	Url::parse("https://api.example.com/__/gui/").unwrap()
}

fn object(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		_ => panic!("not an object"),
	}
}

#[test]
fn parse_render_response() {
	let response = RenderResponse::parse(
		r#"{
			"children": [{ "name": "markdown", "props": { "body": "hi" } }],
			"state": { "x": 1 },
			"channels": ["a"],
			"query_params": { "run": "1" },
			"meta": [{ "title": "Page" }, { "name": "description" }]
		}"#,
	)
	.unwrap();
	assert_eq!(response.children.len(), 1);
	assert_eq!(response.state.get("x"), Some(&json!(1)));
	assert_eq!(response.channels, ["a"]);
	assert_eq!(response.title(), Some("Page"));
}

#[test]
fn nulls_and_missing_fields() {
	let response = RenderResponse::parse(r#"{ "children": null, "state": null }"#).unwrap();
	assert_eq!(response, RenderResponse::default());
	assert_eq!(response.title(), None);
	assert!(matches!(RenderResponse::parse("<html>"), Err(Error::MalformedResponse(_))));
}

#[test]
fn object_meta_title() {
	let response = RenderResponse {
		meta: Some(json!({ "title": "Object" })),
		..RenderResponse::default()
	};
	assert_eq!(response.title(), Some("Object"));
}

#[test]
fn classify_replies() {
	let ok = BackendReply::from_parts(200, None, r#"{ "state": { "a": true } }"#, &backend()).unwrap();
	assert!(matches!(ok, BackendReply::Render(response) if response.state.get("a") == Some(&json!(true))));

	for status in [301, 302, 303, 307, 308] {
		let reply = BackendReply::from_parts(status, Some("https://api.example.com/next?x=1"), "", &backend()).unwrap();
		assert_eq!(reply, BackendReply::Redirect("/next?x=1".to_owned()));
	}

	assert_eq!(
		BackendReply::from_parts(302, None, "", &backend()).unwrap(),
		BackendReply::Redirect("/".to_owned())
	);
	assert!(matches!(
		BackendReply::from_parts(500, None, "oops", &backend()),
		Err(Error::Backend { status: 500 })
	));
	assert!(matches!(
		BackendReply::from_parts(404, None, "", &backend()),
		Err(Error::Backend { status: 404 })
	));
	assert!(matches!(
		BackendReply::from_parts(200, None, "not json", &backend()),
		Err(Error::MalformedResponse(_))
	));
}

#[test]
fn redirect_rewriting() {
	let backend = backend();
	assert_eq!(rewrite_redirect("https://api.example.com/a/b?c=d#e", &backend), "/a/b?c=d#e");
	assert_eq!(rewrite_redirect("https://api.example.com:443/a", &backend), "/a");
	assert_eq!(rewrite_redirect("/relative", &backend), "/relative");
	assert_eq!(rewrite_redirect("sibling", &backend), "/__/gui/sibling");
	assert_eq!(rewrite_redirect("https://elsewhere.org/x", &backend), "https://elsewhere.org/x");
	assert_eq!(rewrite_redirect("https://api.example.com:8443/x", &backend), "https://api.example.com:8443/x");
}

#[test]
fn backend_urls() {
	let base = Url::parse("https://example.com/__/gui").unwrap();
	assert_eq!(backend_url(&base, "", "").as_str(), "https://example.com/__/gui");
	assert_eq!(backend_url(&base, "/run/", "?a=1").as_str(), "https://example.com/__/gui/run/?a=1");

	let slashed = Url::parse("https://example.com/__/gui/").unwrap();
	assert_eq!(backend_url(&slashed, "/run", "a=1").as_str(), "https://example.com/__/gui/run?a=1");
}

#[test]
fn resolving_the_backend() {
	assert_eq!(
		resolve_backend("https://example.com", "/__/gui").unwrap().as_str(),
		"https://example.com/__/gui"
	);
	assert_eq!(
		resolve_backend("https://example.com", "https://api.example.com/gui").unwrap().as_str(),
		"https://api.example.com/gui"
	);
	assert!(matches!(resolve_backend("not a url", "/__/gui"), Err(Error::Url { .. })));
}

#[test]
fn query_reconciliation() {
	assert_eq!(reconcile_query("?a=1&b=two", &object(json!({ "a": "1", "b": "two" }))), None);
	assert_eq!(reconcile_query("a=1", &object(json!({ "a": 1 }))), None);
	assert_eq!(reconcile_query("?a=1", &object(json!({ "a": 2 }))), Some("a=2".to_owned()));
	assert_eq!(
		reconcile_query("", &object(json!({ "q": "a b", "n": null }))),
		Some("q=a+b&n=null".to_owned())
	);
	assert_eq!(reconcile_query("?a=1", &Map::new()), Some(String::new()));
	assert_eq!(reconcile_query("", &Map::new()), None);
}

#[test]
fn list_query_params_join_with_commas() {
	assert_eq!(reconcile_query("?tags=a%2Cb", &object(json!({ "tags": ["a", "b"] }))), None);
	assert_eq!(reconcile_query("?tags=a,b", &object(json!({ "tags": ["a", "b"] }))), None);
	assert_eq!(
		reconcile_query("", &object(json!({ "ids": [1, null, [2, 3]] }))),
		Some("ids=1%2C%2C2%2C3".to_owned())
	);
}
