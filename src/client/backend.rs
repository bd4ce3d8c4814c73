use crate::{
	payload::{RequestBody, Submission, REQUEST_BODY_FIELD},
	response::{backend_url, BackendReply},
	Error, Result,
};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// What became of a submission.
#[derive(Debug)]
pub enum Delivery {
	Reply(BackendReply),
	/// The backend redirected. `fetch` doesn't get to see where to, so only a navigation of the browser itself
	/// (posting to `action`) can follow it.
	OpaqueRedirect { action: String },
}

/// Posts submissions to the backend. One instance per [`App`](super::App).
#[derive(Clone, Debug)]
pub struct BackendClient {
	base: Url,
}

impl BackendClient {
	#[must_use]
	pub fn new(base: Url) -> Self {
		Self { base }
	}

	#[must_use]
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Sends `submission` for the page route `route` with the page's query string `query`.
	///
	/// Redirects aren't followed. They come back as [`Delivery::OpaqueRedirect`].
	///
	/// # Errors
	///
	/// [`Error::Transport`] if the request fails outright, otherwise like [`BackendReply::from_parts`].
	#[instrument(skip(self, submission), fields(fields = submission.fields.len()))]
	pub async fn submit(&self, route: &str, query: &str, submission: &Submission) -> Result<Delivery> {
		let url = backend_url(&self.base, route, query);

		let headers = web_sys::Headers::new().map_err(|e| Error::transport(&e))?;
		headers.set("Content-Type", "application/json").map_err(|e| Error::transport(&e))?;
		headers.set("Accept", "application/json").map_err(|e| Error::transport(&e))?;

		let init = web_sys::RequestInit::new();
		init.set_method("POST");
		init.set_headers(&headers);
		init.set_body(&JsValue::from_str(&submission.body()));
		init.set_redirect(web_sys::RequestRedirect::Manual);
		let request = web_sys::Request::new_with_str_and_init(url.as_str(), &init).map_err(|e| Error::transport(&e))?;

		let window = web_sys::window().ok_or_else(|| Error::Transport("no window".to_owned()))?;
		let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| Error::transport(&e))?
			.dyn_into()
			.map_err(|e| Error::transport(&e))?;

		if response.type_() == web_sys::ResponseType::Opaqueredirect {
			debug!("Backend redirected. Leaving it to a navigation.");
			return Ok(Delivery::OpaqueRedirect { action: url.into() });
		}

		let location = response.headers().get("Location").ok().flatten();
		let body = JsFuture::from(response.text().map_err(|e| Error::transport(&e))?)
			.await
			.map_err(|e| Error::transport(&e))?
			.as_string()
			.unwrap_or_default();
		BackendReply::from_parts(response.status(), location.as_deref(), &body, &self.base).map(Delivery::Reply)
	}
}

/// Posts `submission` to `action` through a hidden native form, navigating the page.
///
/// The browser then follows whatever redirect the backend answers with. The body is form-encoded:
/// the request body carrier holding the merged state and transforms, plus each decoded field,
/// strings as they are and everything else as JSON.
pub(crate) fn navigate_by_form(action: &str, submission: &Submission) -> core::result::Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|window| window.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let form: web_sys::HtmlFormElement = document.create_element("form")?.dyn_into()?;
	form.set_method("post");
	form.set_action(action);
	form.set_attribute("hidden", "")?;

	let carrier = RequestBody {
		state: submission.state.clone(),
		transforms: submission.transforms.clone(),
	};
	let fields = core::iter::once((REQUEST_BODY_FIELD.to_owned(), carrier.encode())).chain(
		submission.fields.iter().map(|(name, value)| {
			let value = match value {
				Value::String(text) => text.clone(),
				other => other.to_string(),
			};
			(name.clone(), value)
		}),
	);
	for (name, value) in fields {
		let input: web_sys::HtmlInputElement = document.create_element("input")?.dyn_into()?;
		input.set_type("hidden");
		input.set_name(&name);
		input.set_value(&value);
		form.append_child(&input)?;
	}

	document
		.body()
		.ok_or_else(|| JsValue::from_str("no body"))?
		.append_child(&form)?;
	form.submit()
}
