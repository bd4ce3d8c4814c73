//! Server-pushed events that tell the client to submit again.
//!
//! The realtime endpoint is an event stream. Each `event` event carries `[channel, payload]` as JSON.
//! The payload itself is irrelevant here: any event means "state changed on the backend".

use crate::{Error, Result};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::form_urlencoded;
use wasm_bindgen::{closure::Closure, JsCast};

/// The name of the stream events that carry channel messages.
pub const EVENT_NAME: &str = "event";

/// The subscription URL for `channels`, as `path?channels=a&channels=b`.
#[must_use]
pub fn realtime_url(path: &str, channels: &[String]) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.extend_pairs(channels.iter().map(|channel| ("channels", channel)))
		.finish();
	if query.is_empty() {
		return path.to_owned();
	}
	let separator = if path.contains('?') { '&' } else { '?' };
	format!("{}{}{}", path, separator, query)
}

/// One message received on a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct RealtimeEvent {
	pub channel: Option<String>,
	pub payload: Value,
}

impl RealtimeEvent {
	/// Parses an event's data. Data that isn't `[channel, payload]` is kept whole as payload.
	#[must_use]
	pub fn parse(data: &str) -> Self {
		match serde_json::from_str::<Value>(data) {
			Ok(Value::Array(mut parts)) if parts.len() == 2 => {
				let payload = parts.pop().unwrap_or(Value::Null);
				let channel = parts.pop().and_then(|channel| channel.as_str().map(ToOwned::to_owned));
				Self { channel, payload }
			}
			Ok(payload) => Self {
				channel: None,
				payload,
			},
			Err(_) => Self {
				channel: None,
				payload: Value::String(data.to_owned()),
			},
		}
	}
}

/// An open `EventSource`. Dropping it closes the stream.
pub struct RealtimeSubscription {
	source: web_sys::EventSource,
	channels: Vec<String>,
	on_event: Closure<dyn FnMut(web_sys::MessageEvent)>,
	_on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl RealtimeSubscription {
	/// Subscribes to `channels` at `path`. `handler` is called for each message.
	///
	/// # Errors
	///
	/// [`Error::Transport`] iff the browser refuses to open the stream.
	pub fn open(
		path: &str,
		channels: Vec<String>,
		mut handler: impl FnMut(RealtimeEvent) + 'static,
	) -> Result<Self> {
		let url = realtime_url(path, &channels);
		let source = web_sys::EventSource::new(&url).map_err(|e| Error::transport(&e))?;

		let on_event = Closure::wrap(Box::new(move |event: web_sys::MessageEvent| {
			let data = event.data().as_string().unwrap_or_default();
			let event = RealtimeEvent::parse(&data);
			#[cfg(feature = "dangerous-logging")]
			trace!(channel = ?event.channel, payload = %event.payload, "Realtime event.");
			#[cfg(not(feature = "dangerous-logging"))]
			trace!(channel = ?event.channel, "Realtime event.");
			handler(event);
		}) as Box<dyn FnMut(web_sys::MessageEvent)>);
		source
			.add_event_listener_with_callback(EVENT_NAME, on_event.as_ref().unchecked_ref())
			.map_err(|e| Error::transport(&e))?;

		let on_error = Closure::wrap(Box::new(move |_: web_sys::Event| {
			warn!("Realtime stream error. The browser will reconnect.");
		}) as Box<dyn FnMut(web_sys::Event)>);
		source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

		debug!(channels = channels.len(), "Subscribed to realtime channels.");
		Ok(Self {
			source,
			channels,
			on_event,
			_on_error: on_error,
		})
	}

	#[must_use]
	pub fn channels(&self) -> &[String] {
		&self.channels
	}
}

impl Drop for RealtimeSubscription {
	fn drop(&mut self) {
		self.source
			.remove_event_listener_with_callback(EVENT_NAME, self.on_event.as_ref().unchecked_ref())
			.ok();
		self.source.set_onerror(None);
		self.source.close();
		debug!(channels = self.channels.len(), "Closed realtime subscription.");
	}
}
