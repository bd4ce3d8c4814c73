use core::time::Duration;
use tracing::error;
use wasm_bindgen::{closure::Closure, JsCast};

/// A pending `setTimeout`, cleared when dropped.
pub(crate) struct Timer {
	handle: i32,
	_callback: Closure<dyn FnMut()>,
}

impl Timer {
	/// Schedules `callback` to run once after `delay`. Returns [`None`] (and logs an error) iff that fails.
	pub(crate) fn once(delay: Duration, callback: impl FnOnce() + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let callback: Closure<dyn FnMut()> = Closure::once(callback);
		let millis: i32 = delay.as_millis().try_into().unwrap_or(i32::MAX);
		match window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), millis) {
			Ok(handle) => Some(Self {
				handle,
				_callback: callback,
			}),
			Err(error) => {
				error!(?error, "Failed to set timeout.");
				None
			}
		}
	}
}

impl Drop for Timer {
	fn drop(&mut self) {
		if let Some(window) = web_sys::window() {
			window.clear_timeout_with_handle(self.handle);
		}
	}
}
