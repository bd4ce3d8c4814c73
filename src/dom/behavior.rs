use super::{Signal, SignalSink};
use crate::{
	controller::ChangeSource,
	render::encode_selection,
	upload,
	vdom::Behavior,
};
use tracing::{error, trace_span, warn};
use wasm_bindgen::JsCast;

/// Carries out `behavior` for `event`, which was dispatched to a listener bound for it.
pub(crate) fn dispatch(behavior: &Behavior, event: &web_sys::Event, sink: &SignalSink) {
	let span = trace_span!("dispatch", event = %event.type_());
	let _enter = span.enter();

	match behavior {
		Behavior::Notify(source) => sink(Signal::Changed(*source)),

		Behavior::ToggleExpander { key, carrier_id } => {
			let open = match element_by_id::<web_sys::HtmlInputElement>(carrier_id) {
				Some(carrier) => {
					let open = !carrier.checked();
					carrier.set_checked(open);
					open
				}
				None => return warn!(carrier_id = carrier_id.as_str(), "Expander carrier not found."),
			};
			sink(Signal::ExpanderToggled { key: key.clone(), open });
		}

		Behavior::SelectTab { group, index } => sink(Signal::TabSelected {
			group: group.clone(),
			index: *index,
		}),

		Behavior::MirrorValue { peer_id } => {
			let value = match current_target::<web_sys::HtmlInputElement>(event) {
				Some(input) => input.value(),
				None => return,
			};
			match element_by_id::<web_sys::HtmlInputElement>(peer_id) {
				Some(peer) => {
					if peer.value() != value {
						peer.set_value(&value);
					}
				}
				None => warn!(peer_id = peer_id.as_str(), "Mirror peer not found."),
			}
		}

		Behavior::EncodeSelection { carrier_id, options, multiple } => {
			let select = match current_target::<web_sys::HtmlSelectElement>(event) {
				Some(select) => select,
				None => return,
			};
			let selected_options = select.selected_options();
			let selected: Vec<usize> = (0..selected_options.length())
				.filter_map(|i| selected_options.item(i))
				.filter_map(|option| option.dyn_into::<web_sys::HtmlOptionElement>().ok())
				.filter_map(|option| option.value().parse().ok())
				.collect();
			if write_carrier(carrier_id, &encode_selection(options, &selected, *multiple)) {
				sink(Signal::Changed(ChangeSource::Widget));
			}
		}

		Behavior::PickFiles { carrier_id, multiple, existing } => {
			let input = match current_target::<web_sys::HtmlInputElement>(event) {
				Some(input) => input,
				None => return,
			};
			let files: Vec<web_sys::File> = match input.files() {
				Some(list) => (0..list.length()).filter_map(|i| list.get(i)).collect(),
				None => Vec::new(),
			};
			// Allows picking the same file again.
			input.set_value("");
			if !files.is_empty() {
				sink(Signal::FilesPicked {
					carrier_id: carrier_id.clone(),
					multiple: *multiple,
					existing: existing.clone(),
					files,
				});
			}
		}

		Behavior::RemoveFile { carrier_id, multiple, remaining } => {
			if write_carrier(carrier_id, &upload::encode_urls(remaining, *multiple)) {
				sink(Signal::Changed(ChangeSource::Widget));
			}
		}

		Behavior::Press { name, value } => sink(Signal::Pressed {
			name: name.clone(),
			value: value.clone(),
		}),

		Behavior::OpenInNewWindow { url } => {
			if let Some(window) = web_sys::window() {
				if let Err(error) = window.open_with_url_and_target(url, "_blank") {
					error!(?error, "Failed to open new window.");
				}
			}
		}
	}
}

fn current_target<T: JsCast>(event: &web_sys::Event) -> Option<T> {
	event.current_target()?.dyn_into::<T>().ok()
}

pub(crate) fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
	web_sys::window()?.document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

/// Sets the value of the hidden input with id `carrier_id`. Returns whether it was found.
pub(crate) fn write_carrier(carrier_id: &str, value: &str) -> bool {
	match element_by_id::<web_sys::HtmlInputElement>(carrier_id) {
		Some(carrier) => {
			carrier.set_value(value);
			true
		}
		None => {
			warn!(carrier_id, "Carrier not found.");
			false
		}
	}
}
