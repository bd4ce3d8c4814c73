//! File uploads: the URL list a file field submits, and the client that turns picked files into URLs.

use crate::{Error, Result};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// The upload endpoint's answer.
#[derive(Debug, Deserialize)]
struct Uploaded {
	url: String,
}

/// Reads a file field's current URLs from a `value` or `defaultValue` prop, which may be a URL or a list of them.
#[must_use]
pub fn decode_urls(value: &Value) -> Vec<String> {
	match value {
		Value::String(url) if !url.is_empty() => vec![url.clone()],
		Value::Array(urls) => urls
			.iter()
			.filter_map(Value::as_str)
			.filter(|url| !url.is_empty())
			.map(ToOwned::to_owned)
			.collect(),
		_ => Vec::new(),
	}
}

/// The carrier value for `urls`: a JSON array if `multiple`, else the first URL as JSON string.
///
/// A single-file field without a file encodes as the empty string, which decodes as `null`.
#[must_use]
pub fn encode_urls(urls: &[String], multiple: bool) -> String {
	if multiple {
		Value::from(urls.to_vec()).to_string()
	} else {
		urls.first()
			.map(|url| Value::from(url.as_str()).to_string())
			.unwrap_or_default()
	}
}

/// The name a listed file is shown under.
///
/// URLs the backend supplied itself are shown by their decoded basename,
/// while URLs containing `uploaded_url_marker` (previous uploads) are shown whole.
#[must_use]
pub fn display_filename(url: &str, uploaded_url_marker: &str) -> String {
	if !uploaded_url_marker.is_empty() && url.contains(uploaded_url_marker) {
		return url.to_owned();
	}
	let parsed = match Url::parse(url) {
		Ok(parsed) => parsed,
		Err(_) => return url.to_owned(),
	};
	parsed
		.path_segments()
		.and_then(|segments| segments.rev().find(|segment| !segment.is_empty()))
		.map(|basename| percent_decode_str(basename).decode_utf8_lossy().into_owned())
		.unwrap_or_else(|| url.to_owned())
}

/// Posts files to the upload endpoint, one request per file.
#[derive(Clone, Debug)]
pub struct UploadClient {
	endpoint: String,
}

impl UploadClient {
	#[must_use]
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}

	#[must_use]
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Uploads `file` as multipart form field `file` and returns the URL it is now stored under.
	///
	/// # Errors
	///
	/// [`Error::Upload`] iff the request fails, is rejected or doesn't answer with `{ "url": … }`.
	#[instrument(skip(self, file), fields(endpoint = self.endpoint.as_str(), size = file.size()))]
	pub async fn upload(&self, file: &web_sys::File) -> Result<String> {
		let form = web_sys::FormData::new().map_err(|e| Error::upload(&e))?;
		form.append_with_blob_and_filename("file", file, &file.name())
			.map_err(|e| Error::upload(&e))?;

		let init = web_sys::RequestInit::new();
		init.set_method("POST");
		init.set_body(&form);
		let request = web_sys::Request::new_with_str_and_init(&self.endpoint, &init)
			.map_err(|e| Error::upload(&e))?;

		let window = web_sys::window().ok_or_else(|| Error::Upload("no window".to_owned()))?;
		let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| Error::upload(&e))?
			.dyn_into()
			.map_err(|e| Error::upload(&e))?;
		if !response.ok() {
			return Err(Error::Upload(format!(
				"upload endpoint responded with status {}",
				response.status()
			)));
		}

		let body = JsFuture::from(response.text().map_err(|e| Error::upload(&e))?)
			.await
			.map_err(|e| Error::upload(&e))?
			.as_string()
			.unwrap_or_default();
		let uploaded: Uploaded =
			serde_json::from_str(&body).map_err(|error| Error::Upload(error.to_string()))?;
		debug!("Uploaded file.");
		Ok(uploaded.url)
	}
}
