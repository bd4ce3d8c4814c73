use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast};

/// An event listener that is removed from its target when dropped.
///
/// Owning the [`Closure`] here ties its lifetime to the mounted node it belongs to,
/// so a listener can never outlive the element it was attached to.
pub(crate) struct Listener {
	target: web_sys::EventTarget,
	event: &'static str,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
	/// Attaches `handler` to `target`.
	///
	/// Returns [`None`] (and logs an error) iff the browser refuses the listener.
	pub(crate) fn attach(target: &web_sys::EventTarget, event: &'static str, handler: impl FnMut(web_sys::Event) + 'static) -> Option<Self> {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
		match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
			Ok(()) => {
				trace!(event, "Attached listener.");
				Some(Self {
					target: target.clone(),
					event,
					closure,
				})
			}
			Err(error) => {
				error!(event, ?error, "Failed to attach listener.");
				None
			}
		}
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		if let Err(error) = self.target.remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref()) {
			error!(event = self.event, ?error, "Failed to remove listener.");
		}
	}
}
