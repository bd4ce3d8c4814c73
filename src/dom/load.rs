use tracing::{instrument, trace};
use wasm_bindgen::JsCast;

/// Input types that never contribute a value on their own.
const VALUELESS_TYPES: &[&str] = &["button", "submit", "reset", "image", "file"];

/// Collects the raw `(name, value)` pairs `form` would submit, in document order.
///
/// Unnamed and disabled controls are skipped, as are unchecked checkboxes and radio buttons.
/// Buttons don't contribute. A pressed button's name and value are added by the caller.
/// Multi-selects contribute one pair per selected option.
#[must_use]
#[instrument(skip(form))]
pub fn form_fields(form: &web_sys::HtmlFormElement) -> Vec<(String, String)> {
	let controls = form.elements();
	let mut fields = Vec::with_capacity(controls.length() as usize);
	for i in 0..controls.length() {
		let control = match controls.item(i) {
			Some(control) => control,
			None => continue,
		};

		if let Some(input) = control.dyn_ref::<web_sys::HtmlInputElement>() {
			let kind = input.type_();
			if input.name().is_empty() || input.disabled() || VALUELESS_TYPES.contains(&kind.as_str()) {
				continue;
			}
			if (kind == "checkbox" || kind == "radio") && !input.checked() {
				continue;
			}
			fields.push((input.name(), input.value()));
		} else if let Some(textarea) = control.dyn_ref::<web_sys::HtmlTextAreaElement>() {
			if !textarea.name().is_empty() && !textarea.disabled() {
				fields.push((textarea.name(), textarea.value()));
			}
		} else if let Some(select) = control.dyn_ref::<web_sys::HtmlSelectElement>() {
			if select.name().is_empty() || select.disabled() {
				continue;
			}
			let selected = select.selected_options();
			for j in 0..selected.length() {
				if let Some(option) = selected.item(j).and_then(|option| option.dyn_into::<web_sys::HtmlOptionElement>().ok()) {
					fields.push((select.name(), option.value()));
				}
			}
		}
	}
	trace!(fields = fields.len(), "Loaded form fields.");
	fields
}
