//! The JSON body sent to the backend on each submission.

use crate::{
	extract::{extract, TransformMap},
	node::TreeNode,
	transform::TransformRegistry,
	Error, Result,
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Name of the hidden form field that carries the current state and transform map.
///
/// It is excluded from the decoded fields of a submission.
pub const REQUEST_BODY_FIELD: &str = "__gooey_gui_request_body";

/// The backend-owned state object, echoed back and forth between submissions.
pub type FormState = Map<String, Value>;

/// The contents of the [`REQUEST_BODY_FIELD`] carrier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
	#[serde(default)]
	pub state: FormState,
	#[serde(default)]
	pub transforms: TransformMap,
}

impl RequestBody {
	/// Pairs `state` with the transforms extracted from the tree it was rendered alongside.
	#[must_use]
	pub fn for_tree(state: FormState, children: &[TreeNode]) -> Self {
		Self {
			state,
			transforms: extract(children),
		}
	}

	/// The carrier field's value.
	#[must_use]
	pub fn encode(&self) -> String {
		let transforms: Map<String, Value> = self
			.transforms
			.iter()
			.map(|(field, kind)| (field.to_owned(), Value::String(kind.to_owned())))
			.collect();
		let mut body = Map::new();
		body.insert("state".to_owned(), Value::Object(self.state.clone()));
		body.insert("transforms".to_owned(), Value::Object(transforms));
		Value::Object(body).to_string()
	}

	/// Parses the carrier field's value.
	///
	/// # Errors
	///
	/// Iff `raw` is not a JSON object of the expected shape.
	pub fn decode(raw: &str) -> Result<Self> {
		serde_json::from_str(raw).map_err(Error::RequestBody)
	}
}

/// One outgoing submission: the merged state, the transform map and the decoded fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
	/// The previous state with all decoded fields merged over it.
	pub state: FormState,
	pub transforms: TransformMap,
	/// The decoded form fields, without the carrier.
	pub fields: Map<String, Value>,
}

impl Submission {
	/// Decodes `raw_fields` with the kinds recorded in `carrier` and merges them over its state.
	///
	/// Repeated field names keep their last value.
	/// Fields the carrier has no kind for pass through as strings.
	/// Fields that weren't submitted at all keep their previous state,
	/// except for kinds that decode absence (unchecked checkboxes).
	///
	/// # Errors
	///
	/// [`Error::Decode`] for the first field whose transform rejects its raw value.
	#[instrument(skip_all, fields(transforms = carrier.transforms.len()))]
	pub fn assemble(
		carrier: RequestBody,
		raw_fields: impl IntoIterator<Item = (String, String)>,
		registry: &TransformRegistry,
	) -> Result<Self> {
		let mut raw: HashMap<String, String> = raw_fields
			.into_iter()
			.filter(|(name, _)| name != REQUEST_BODY_FIELD)
			.collect();

		let mut fields = Map::new();
		for (field, kind) in carrier.transforms.iter() {
			let value = registry
				.decode(kind, raw.remove(field).as_deref())
				.map_err(|source| Error::Decode {
					field: field.to_owned(),
					kind: kind.to_owned(),
					source,
				})?;
			if let Some(value) = value {
				fields.insert(field.to_owned(), value);
			}
		}
		for (field, value) in raw {
			fields.insert(field, Value::String(value));
		}
		debug!(fields = fields.len(), "Decoded form fields.");
		#[cfg(feature = "dangerous-logging")]
		tracing::trace!(fields = %Value::Object(fields.clone()), "Decoded field values.");

		let mut state = carrier.state;
		for (field, value) in &fields {
			state.insert(field.clone(), value.clone());
		}

		Ok(Self {
			state,
			transforms: carrier.transforms,
			fields,
		})
	}

	/// `{ state, transforms, ...fields }`.
	///
	/// Fields named `state` or `transforms` remain reachable through the merged state only.
	#[must_use]
	pub fn to_json(&self) -> Value {
		let mut body = Map::new();
		body.insert("state".to_owned(), Value::Object(self.state.clone()));
		body.insert(
			"transforms".to_owned(),
			Value::Object(
				self.transforms
					.iter()
					.map(|(field, kind)| (field.to_owned(), Value::String(kind.to_owned())))
					.collect(),
			),
		);
		for (field, value) in &self.fields {
			if !body.contains_key(field) {
				body.insert(field.clone(), value.clone());
			}
		}
		Value::Object(body)
	}

	/// The request body text.
	#[must_use]
	pub fn body(&self) -> String {
		self.to_json().to_string()
	}
}
