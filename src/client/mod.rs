//! The browser driver: hydrates the server-rendered form and keeps it in sync with the backend.
//!
//! Everything that calls back into the [`App`] (DOM listeners, timers, realtime events, finished fetches)
//! goes through [`post`], which defers to a fresh task. Handlers therefore never run while the app is borrowed.

use crate::{
	config::Config,
	controller::{ChangeSource, Command, SubmissionController, TimerToken},
	dom::{self, load, Listener, Mounted, Signal, SignalSink},
	payload::{RequestBody, Submission, REQUEST_BODY_FIELD},
	realtime::RealtimeSubscription,
	render::{Renderer, UiState},
	response::{reconcile_query, resolve_backend, BackendReply, RenderResponse},
	transform::TransformRegistry,
	upload::{self, UploadClient},
	vdom::{Element, VNode},
	Error, Result,
};
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::{debug, error, info, instrument, trace, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

mod backend;
mod timer;

pub use backend::{BackendClient, Delivery};
use timer::Timer;

/// A running client. Dropping it detaches all listeners and stops all scheduling.
pub struct App(Rc<RefCell<Inner>>);

struct Inner {
	config: Config,
	backend: BackendClient,
	uploader: UploadClient,
	renderer: Renderer,
	registry: TransformRegistry,
	controller: SubmissionController,
	form: web_sys::HtmlFormElement,
	mounted: Option<Mounted>,
	response: RenderResponse,
	ui: UiState,
	realtime: Option<RealtimeSubscription>,
	debounce: Option<Timer>,
	/// The button that requested the next submission, as `(name, value)`.
	pressed: Option<(String, String)>,
	submit_listener: Option<Listener>,
}

enum Input {
	Signal(Signal),
	SubmitRequested,
	DebounceElapsed(TimerToken),
	Realtime,
}

impl App {
	/// Hydrates the page's form using the configuration and initial data embedded in the document.
	///
	/// # Errors
	///
	/// - [`Error::Config`] iff the configuration is invalid or the form or initial data can't be found.
	/// - [`Error::MalformedResponse`] iff the initial data doesn't parse.
	/// - Otherwise like [`App::hydrate`].
	pub fn start() -> Result<Self> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| Error::Transport("no document".to_owned()))?;
		let config = Config::from_document(&document)?;

		let form = document
			.get_element_by_id(&config.form_id)
			.and_then(|element| element.dyn_into::<web_sys::HtmlFormElement>().ok())
			.ok_or_else(|| Error::Config(format!("no form with id `{}`", config.form_id)))?;
		let initial = document
			.get_element_by_id(&config.initial_data_id)
			.and_then(|element| element.text_content())
			.ok_or_else(|| Error::Config(format!("no initial data with id `{}`", config.initial_data_id)))?;
		let initial = RenderResponse::parse(&initial)?;

		Self::hydrate(config, form, initial)
	}

	/// Takes over `form`, which must contain the server rendering of `initial`.
	///
	/// # Errors
	///
	/// [`Error::Url`] iff the backend base doesn't resolve against the page origin,
	/// [`Error::Transport`] iff `form` is detached.
	#[instrument(skip_all)]
	pub fn hydrate(config: Config, form: web_sys::HtmlFormElement, initial: RenderResponse) -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| Error::Transport("no window".to_owned()))?;
		let origin = window.location().origin().map_err(|e| Error::transport(&e))?;
		let backend = BackendClient::new(resolve_backend(&origin, &config.backend_base)?);

		let app = Rc::new(RefCell::new(Inner {
			backend,
			uploader: UploadClient::new(config.upload_endpoint.clone()),
			renderer: Renderer::default().with_uploaded_url_marker(config.uploaded_url_marker.clone()),
			registry: TransformRegistry::default(),
			controller: SubmissionController::new(config.debounce()),
			form: form.clone(),
			mounted: None,
			response: initial,
			ui: UiState::default(),
			realtime: None,
			debounce: None,
			pressed: None,
			submit_listener: None,
			config,
		}));
		let weak = Rc::downgrade(&app);

		{
			let mut inner = app.borrow_mut();
			let vdom = inner
				.renderer
				.render_form(&inner.response.children, &inner.response.state, &inner.ui);
			inner.mounted = Some(Mounted::adopt(form.clone().into(), &vdom, sink(&weak))?);

			let submit_weak = weak.clone();
			inner.submit_listener = Listener::attach(form.as_ref(), "submit", move |event| {
				event.prevent_default();
				post(&submit_weak, Input::SubmitRequested);
			});

			inner.sync_page();
			inner.sync_realtime(&weak);
		}

		announce_hydrated(&window);
		info!("Hydrated.");
		Ok(Self(app))
	}

	/// Whether the app stopped submitting after a failure or redirect.
	#[must_use]
	pub fn is_halted(&self) -> bool {
		self.0.borrow().controller.is_halted()
	}

	/// Closes the realtime subscription and detaches all listeners.
	/// A submission still in flight is abandoned.
	pub fn teardown(&self) {
		let mut inner = self.0.borrow_mut();
		inner.controller.halt();
		inner.realtime = None;
		inner.debounce = None;
		inner.submit_listener = None;
		inner.mounted = None;
		debug!("Torn down.");
	}
}

fn sink(app: &Weak<RefCell<Inner>>) -> SignalSink {
	let app = app.clone();
	Rc::new(move |signal| post(&app, Input::Signal(signal)))
}

/// Handles `input` in a task of its own.
fn post(app: &Weak<RefCell<Inner>>, input: Input) {
	let app = app.clone();
	spawn_local(async move {
		if let Some(app) = app.upgrade() {
			handle(&app, input);
		}
	});
}

fn handle(app: &Rc<RefCell<Inner>>, input: Input) {
	let weak = Rc::downgrade(app);
	let mut inner = app.borrow_mut();
	let command = match input {
		Input::Signal(Signal::Changed(source)) => inner.controller.on_change(source),
		Input::Signal(Signal::ExpanderToggled { key, open }) => {
			inner.ui.set_expander(key, open);
			inner.rerender();
			inner.controller.on_change(ChangeSource::Widget)
		}
		Input::Signal(Signal::TabSelected { group, index }) => {
			inner.ui.select_tab(group, index);
			inner.rerender();
			Command::None
		}
		Input::Signal(Signal::Pressed { name, value }) => {
			if !name.is_empty() {
				inner.pressed = Some((name, value));
			}
			inner.controller.on_submit_requested()
		}
		Input::Signal(Signal::FilesPicked {
			carrier_id,
			multiple,
			existing,
			files,
		}) => {
			spawn_local(upload_files(
				weak.clone(),
				inner.uploader.clone(),
				carrier_id,
				multiple,
				existing,
				files,
			));
			Command::None
		}
		Input::SubmitRequested => inner.controller.on_submit_requested(),
		Input::DebounceElapsed(token) => inner.controller.on_debounce_elapsed(token),
		Input::Realtime => inner.controller.on_realtime_event(),
	};
	inner.perform(&weak, command);
}

/// Uploads `files` one by one and writes the resulting URLs into the widget's carrier.
///
/// A single-file widget keeps its previous file unless an upload succeeded.
async fn upload_files(
	app: Weak<RefCell<Inner>>,
	uploader: UploadClient,
	carrier_id: String,
	multiple: bool,
	existing: Vec<String>,
	files: Vec<web_sys::File>,
) {
	let mut uploaded = Vec::with_capacity(files.len());
	for file in &files {
		match uploader.upload(file).await {
			Ok(url) => uploaded.push(url),
			Err(error) => warn!(%error, "Upload failed. Skipping the file."),
		}
	}
	if uploaded.is_empty() {
		return;
	}
	let urls: Vec<String> = if multiple {
		existing.into_iter().chain(uploaded).collect()
	} else {
		uploaded
	};
	if dom::write_carrier(&carrier_id, &upload::encode_urls(&urls, multiple)) {
		post(&app, Input::Signal(Signal::Changed(ChangeSource::Widget)));
	}
}

async fn submit(app: Weak<RefCell<Inner>>, backend: BackendClient, route: String, query: String, submission: Submission) {
	let delivery = backend.submit(&route, &query, &submission).await;
	if let Some(app) = app.upgrade() {
		let weak = Rc::downgrade(&app);
		app.borrow_mut().complete(&weak, delivery, &submission);
	} else {
		trace!("App dropped. Discarding reply.");
	}
}

impl Inner {
	fn perform(&mut self, app: &Weak<RefCell<Inner>>, command: Command) {
		match command {
			Command::None => (),
			Command::ArmDebounce { token, delay } => {
				let app = app.clone();
				self.debounce = Timer::once(delay, move || post(&app, Input::DebounceElapsed(token)));
			}
			Command::Submit => {
				self.debounce = None;
				self.submit(app);
			}
		}
	}

	fn submit(&mut self, app: &Weak<RefCell<Inner>>) {
		let submission = match self.prepare() {
			Ok(submission) => submission,
			Err(error) => return self.fail(&error),
		};
		let location = match web_sys::window() {
			Some(window) => window.location(),
			None => return self.fail(&Error::Transport("no window".to_owned())),
		};
		let pathname = location.pathname().unwrap_or_default();
		let route = self.config.route_remainder(&pathname).to_owned();
		let query = location.search().unwrap_or_default();

		self.set_busy(true);
		spawn_local(submit(app.clone(), self.backend.clone(), route, query, submission));
	}

	/// Captures the form as it is now.
	fn prepare(&mut self) -> Result<Submission> {
		let mut fields = load::form_fields(&self.form);
		if let Some(pressed) = self.pressed.take() {
			fields.push(pressed);
		}
		let carrier = match fields.iter().rev().find(|(name, _)| name == REQUEST_BODY_FIELD) {
			Some((_, raw)) => RequestBody::decode(raw)?,
			None => {
				warn!("Request body carrier missing. Using the last response.");
				self.response.request_body()
			}
		};
		Submission::assemble(carrier, fields, &self.registry)
	}

	#[instrument(skip_all)]
	fn complete(&mut self, app: &Weak<RefCell<Inner>>, delivery: Result<Delivery>, submission: &Submission) {
		self.set_busy(false);
		if self.controller.is_halted() {
			trace!("Halted. Discarding reply.");
			return;
		}
		match delivery {
			Ok(Delivery::Reply(BackendReply::Render(response))) => {
				self.apply(app, response);
				let command = self.controller.on_completed();
				self.perform(app, command);
			}
			Ok(Delivery::Reply(BackendReply::Redirect(location))) => {
				self.leave();
				info!(location = location.as_str(), "Navigating.");
				if let Some(window) = web_sys::window() {
					if let Err(error) = window.location().assign(&location) {
						error!(?error, "Failed to navigate.");
					}
				}
			}
			Ok(Delivery::OpaqueRedirect { action }) => {
				self.leave();
				info!(action = action.as_str(), "Resubmitting natively to follow a redirect.");
				if let Err(error) = backend::navigate_by_form(&action, submission) {
					self.fail(&Error::transport(&error));
				}
			}
			Err(error) => self.fail(&error),
		}
	}

	/// Stops scheduling ahead of a navigation.
	fn leave(&mut self) {
		self.controller.halt();
		self.debounce = None;
		self.realtime = None;
	}

	fn apply(&mut self, app: &Weak<RefCell<Inner>>, response: RenderResponse) {
		self.response = response;
		self.rerender();
		self.sync_page();
		self.sync_realtime(app);
	}

	fn rerender(&mut self) {
		let vdom = self
			.renderer
			.render_form(&self.response.children, &self.response.state, &self.ui);
		if let Some(mounted) = &mut self.mounted {
			mounted.update(&vdom);
		}
	}

	/// Brings the URL's query string and the document title in line with the current response.
	fn sync_page(&self) {
		let window = match web_sys::window() {
			Some(window) => window,
			None => return,
		};

		if let Some(wanted) = &self.response.query_params {
			let location = window.location();
			let search = location.search().unwrap_or_default();
			if let Some(query) = reconcile_query(&search, wanted) {
				let pathname = location.pathname().unwrap_or_default();
				let hash = location.hash().unwrap_or_default();
				let url = if query.is_empty() {
					format!("{}{}", pathname, hash)
				} else {
					format!("{}?{}{}", pathname, query, hash)
				};
				let replaced = window
					.history()
					.and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&url)));
				if let Err(error) = replaced {
					error!(?error, "Failed to replace the page URL.");
				}
			}
		}

		if let (Some(title), Some(document)) = (self.response.title(), window.document()) {
			document.set_title(title);
		}
	}

	/// Resubscribes iff the response's channels differ from the current subscription's.
	fn sync_realtime(&mut self, app: &Weak<RefCell<Inner>>) {
		let channels = &self.response.channels;
		let unchanged = match &self.realtime {
			Some(subscription) => subscription.channels() == channels.as_slice(),
			None => channels.is_empty(),
		};
		if unchanged {
			return;
		}

		self.realtime = None;
		if channels.is_empty() {
			return;
		}
		let app = app.clone();
		match RealtimeSubscription::open(&self.config.realtime_path, channels.clone(), move |_| {
			post(&app, Input::Realtime);
		}) {
			Ok(subscription) => self.realtime = Some(subscription),
			Err(error) => warn!(%error, "Failed to subscribe to realtime channels."),
		}
	}

	fn set_busy(&self, busy: bool) {
		let class_list = self.form.class_list();
		let result = if busy {
			self.form
				.set_attribute("aria-busy", "true")
				.and_then(|()| class_list.add_1("gui-submitting"))
		} else {
			self.form
				.remove_attribute("aria-busy")
				.and_then(|()| class_list.remove_1("gui-submitting"))
		};
		if let Err(error) = result {
			error!(?error, "Failed to update the busy state.");
		}
	}

	/// The error boundary: stops everything and replaces the form's content with a notice.
	fn fail(&mut self, error: &Error) {
		error!(%error, "Submission failed. Halting.");
		self.controller.halt();
		self.debounce = None;
		self.realtime = None;
		self.pressed = None;
		self.mounted = None;

		let notice: VNode = Element::new("div")
			.class("gui-error")
			.attr("role", "alert")
			.child(VNode::text("Something went wrong. Please reload the page."))
			.into();
		let noop: SignalSink = Rc::new(|_| ());
		match Mounted::mount(self.form.clone().into(), &[notice], noop) {
			Ok(mounted) => self.mounted = Some(mounted),
			Err(error) => error!(%error, "Failed to show the failure notice."),
		}
	}
}

fn announce_hydrated(window: &web_sys::Window) {
	if let Err(error) = js_sys::Reflect::set(window, &JsValue::from_str("hydrated"), &JsValue::TRUE) {
		error!(?error, "Failed to set `window.hydrated`.");
	}
	match web_sys::Event::new("hydrated") {
		Ok(event) => {
			if let Err(error) = window.dispatch_event(&event) {
				error!(?error, "Failed to dispatch `hydrated`.");
			}
		}
		Err(error) => error!(?error, "Failed to create `hydrated` event."),
	}
}
