use thiserror::Error;
use wasm_bindgen::JsValue;

/// Shorthand for this crate's fallible results.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong between capturing a form and applying the backend's answer.
///
/// Decoding and backend failures are fatal to the submission attempt that raised them.
/// Upload failures are not: the affected file is skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// A submitted field could not be decoded with the transform registered for its kind.
	#[error("failed to decode field {field:?} as {kind:?}")]
	Decode {
		field: String,
		kind: String,
		#[source]
		source: serde_json::Error,
	},

	/// The hidden request body carrier is missing its JSON or contains something else.
	#[error("malformed request body carrier")]
	RequestBody(#[source] serde_json::Error),

	/// The backend answered with a status that is neither a success nor a known redirect.
	#[error("backend responded with status {status}")]
	Backend { status: u16 },

	/// A successful backend response whose body is not a render response.
	#[error("malformed backend response")]
	MalformedResponse(#[source] serde_json::Error),

	#[error("invalid URL {url:?}")]
	Url {
		url: String,
		#[source]
		source: url::ParseError,
	},

	/// The browser refused or failed an operation, usually a `fetch`.
	#[error("transport failure: {0}")]
	Transport(String),

	#[error("upload failed: {0}")]
	Upload(String),

	#[error("invalid configuration: {0}")]
	Config(String),
}

impl Error {
	pub(crate) fn transport(value: &JsValue) -> Self {
		Self::Transport(describe(value))
	}

	pub(crate) fn upload(value: &JsValue) -> Self {
		Self::Upload(describe(value))
	}
}

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
