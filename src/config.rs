//! Deployment settings: where the backend, realtime and upload endpoints live, and how the page is laid out.

use crate::{Error, Result};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound for [`Config::debounce_ms`].
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Client configuration, usually embedded into the page as JSON next to the form.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Base URL of the backend, absolute or relative to the page origin.
	pub backend_base: String,
	/// Page path prefix that is stripped before the remaining route is appended to [`backend_base`](`Config::backend_base`).
	pub route_prefix: String,
	pub realtime_path: String,
	pub upload_endpoint: String,
	/// Substring identifying URLs of files users uploaded, as opposed to URLs the backend supplied.
	pub uploaded_url_marker: String,
	pub debounce_ms: u64,
	pub form_id: String,
	pub initial_data_id: String,
	pub config_id: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			backend_base: "/__/gui".to_owned(),
			route_prefix: String::new(),
			realtime_path: "/__/realtime/".to_owned(),
			upload_endpoint: "/__/file-upload/".to_owned(),
			uploaded_url_marker: "daras_ai/media".to_owned(),
			debounce_ms: 500,
			form_id: "gooey-form".to_owned(),
			initial_data_id: "gooey-initial-data".to_owned(),
			config_id: "gooey-config".to_owned(),
		}
	}
}

impl Config {
	/// Parses and validates a JSON configuration.
	///
	/// # Errors
	///
	/// [`Error::Config`] iff `json` doesn't parse or [`validate`](`Config::validate`) rejects it.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self =
			serde_json::from_str(json).map_err(|error| Error::Config(error.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Reads the configuration embedded in `document` under [`config_id`](`Config::config_id`),
	/// falling back to defaults if there is none.
	///
	/// # Errors
	///
	/// Like [`from_json`](`Config::from_json`).
	pub fn from_document(document: &web_sys::Document) -> Result<Self> {
		let default = Self::default();
		match document
			.get_element_by_id(&default.config_id)
			.and_then(|element| element.text_content())
		{
			Some(json) => Self::from_json(&json),
			None => {
				debug!("No embedded configuration. Using defaults.");
				Ok(default)
			}
		}
	}

	/// # Errors
	///
	/// [`Error::Config`] for empty endpoint paths or element ids, or an excessive debounce delay.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [
			("backend_base", &self.backend_base),
			("realtime_path", &self.realtime_path),
			("upload_endpoint", &self.upload_endpoint),
			("form_id", &self.form_id),
			("initial_data_id", &self.initial_data_id),
			("config_id", &self.config_id),
		] {
			if value.is_empty() {
				return Err(Error::Config(format!("`{}` must not be empty", name)));
			}
		}
		if self.debounce_ms > MAX_DEBOUNCE_MS {
			return Err(Error::Config(format!(
				"`debounce_ms` must be at most {}, but is {}",
				MAX_DEBOUNCE_MS, self.debounce_ms
			)));
		}
		Ok(())
	}

	#[must_use]
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// The part of a page path that is forwarded to the backend.
	///
	/// Paths outside of [`route_prefix`](`Config::route_prefix`) are forwarded whole.
	#[must_use]
	pub fn route_remainder<'a>(&self, pathname: &'a str) -> &'a str {
		match pathname.strip_prefix(self.route_prefix.trim_end_matches('/')) {
			Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
			_ => pathname,
		}
	}
}
