//! Interpreting the backend's answer: render responses, redirects and query parameters.

use crate::{
	node::{null_as_default, TreeNode},
	payload::{FormState, RequestBody},
	Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use url::{form_urlencoded, Url};

/// Statuses that carry a `Location` to navigate to.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// A successful backend answer: the next UI tree and everything that goes with it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
	#[serde(default, deserialize_with = "null_as_default")]
	pub children: Vec<TreeNode>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub state: FormState,
	/// Realtime channels whose events should trigger a resubmission.
	#[serde(default, deserialize_with = "null_as_default")]
	pub channels: Vec<String>,
	/// The query parameters the page URL should carry, if the backend cares.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_params: Option<Map<String, Value>>,
	/// Document metadata. Only the title is applied.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<Value>,
}

impl RenderResponse {
	/// # Errors
	///
	/// [`Error::MalformedResponse`] iff `body` is not a JSON render response.
	pub fn parse(body: &str) -> Result<Self> {
		serde_json::from_str(body).map_err(Error::MalformedResponse)
	}

	/// The carrier contents for this response's form.
	#[must_use]
	pub fn request_body(&self) -> RequestBody {
		RequestBody::for_tree(self.state.clone(), &self.children)
	}

	/// The document title from `meta`, which is either an object or a list of head entries.
	#[must_use]
	pub fn title(&self) -> Option<&str> {
		match self.meta.as_ref()? {
			Value::Object(meta) => meta.get("title").and_then(Value::as_str),
			Value::Array(entries) => entries
				.iter()
				.find_map(|entry| entry.get("title").and_then(Value::as_str)),
			_ => None,
		}
	}
}

/// What to do after a submission completed.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendReply {
	Render(RenderResponse),
	/// Navigate away, to an already rewritten location.
	Redirect(String),
}

impl BackendReply {
	/// Classifies a completed backend exchange.
	///
	/// Redirects without a `Location` navigate to the site root.
	///
	/// # Errors
	///
	/// - [`Error::Backend`] for statuses that are neither successes nor [`REDIRECT_STATUSES`].
	/// - [`Error::MalformedResponse`] for a successful response whose body does not parse.
	#[instrument(skip(body, backend), fields(body_len = body.len()))]
	pub fn from_parts(status: u16, location: Option<&str>, body: &str, backend: &Url) -> Result<Self> {
		if REDIRECT_STATUSES.contains(&status) {
			let location = location.unwrap_or("/");
			let rewritten = rewrite_redirect(location, backend);
			debug!(rewritten = rewritten.as_str(), "Backend redirected.");
			Ok(Self::Redirect(rewritten))
		} else if (200..300).contains(&status) {
			RenderResponse::parse(body).map(Self::Render)
		} else {
			warn!("Backend failed.");
			Err(Error::Backend { status })
		}
	}
}

/// Strips the backend's own origin from a redirect target, so that navigation stays on the page's origin.
///
/// Relative targets resolve against `backend` first.
/// Targets on any other host are returned unchanged.
#[must_use]
pub fn rewrite_redirect(location: &str, backend: &Url) -> String {
	let target = match backend.join(location) {
		Ok(target) => target,
		Err(error) => {
			warn!(%error, "Unparseable redirect target. Passing it through.");
			return location.to_owned();
		}
	};
	if target.host_str() != backend.host_str()
		|| target.port_or_known_default() != backend.port_or_known_default()
	{
		return location.to_owned();
	}

	let mut relative = target.path().to_owned();
	if let Some(query) = target.query() {
		relative.push('?');
		relative.push_str(query);
	}
	if let Some(fragment) = target.fragment() {
		relative.push('#');
		relative.push_str(fragment);
	}
	relative
}

/// The backend endpoint for the page route `route` (relative to the route prefix) with the page's query string.
#[must_use]
pub fn backend_url(base: &Url, route: &str, query: &str) -> Url {
	let mut url = base.clone();
	let route = route.trim_start_matches('/');
	if !route.is_empty() {
		let path = format!("{}/{}", base.path().trim_end_matches('/'), route);
		url.set_path(&path);
	}
	let query = query.trim_start_matches('?');
	url.set_query(Some(query).filter(|query| !query.is_empty()));
	url
}

/// Resolves the configured backend base against the page origin.
///
/// # Errors
///
/// [`Error::Url`] iff either part does not form a valid URL.
pub fn resolve_backend(origin: &str, backend_base: &str) -> Result<Url> {
	Url::parse(origin)
		.and_then(|origin| origin.join(backend_base))
		.map_err(|source| Error::Url {
			url: backend_base.to_owned(),
			source,
		})
}

/// Compares the page's query string with the parameters the backend wants.
///
/// Returns the new query string (without `?`) iff it differs from `current_search`.
/// Values are stringified the way a browser's `URLSearchParams` would: `null` as `"null"`,
/// arrays as their comma-joined elements (`["a", "b"]` as `a,b`).
/// Objects serialize as JSON.
#[must_use]
pub fn reconcile_query(current_search: &str, wanted: &Map<String, Value>) -> Option<String> {
	let current: String = form_urlencoded::Serializer::new(String::new())
		.extend_pairs(form_urlencoded::parse(current_search.trim_start_matches('?').as_bytes()))
		.finish();
	let wanted: String = form_urlencoded::Serializer::new(String::new())
		.extend_pairs(wanted.iter().map(|(key, value)| (key.as_str(), query_value(value))))
		.finish();
	if current == wanted {
		None
	} else {
		Some(wanted)
	}
}

fn query_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Array(items) => items.iter().map(joined_item).collect::<Vec<_>>().join(","),
		other => other.to_string(),
	}
}

/// Inside an array, `null` stringifies as nothing.
fn joined_item(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		other => query_value(other),
	}
}
