//! Value providers queried during element population.
//!
//! Sources attached to a form are consulted in attachment order; the first
//! source that claims a name wins. Submitted-data sources additionally carry
//! multipart upload descriptors and mark themselves as submissions, which
//! lets checkboxes distinguish "unchecked" from "form never submitted".

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueMap};

/// One prioritized provider of element values.
pub trait DataSource {
	/// Returns the value for a (possibly bracketed) submitted name.
	fn value(&self, name: &str) -> Option<Value>;

	/// Whether this source claims the name at all. The default cannot tell an
	/// explicitly absent value from an unclaimed name; null-aware sources
	/// override it so resolution stops at them even when the value is empty.
	fn has_value(&self, name: &str) -> bool {
		self.value(name).is_some()
	}

	/// Upload descriptor for the name, for upload-capable sources.
	fn upload(&self, _name: &str) -> Option<&UploadInfo> {
		None
	}

	/// Whether this source represents a form submission.
	fn is_submit(&self) -> bool {
		false
	}
}

/// Data source over a fixed nested mapping, e.g. defaults or session values.
pub struct ArrayDataSource {
	values: ValueMap,
}

impl ArrayDataSource {
	pub fn new(values: ValueMap) -> ArrayDataSource {
		ArrayDataSource { values }
	}

	/// Builds the source from request-style JSON.
	///
	/// # Examples
	///
	/// ```
	/// use formtree::{ArrayDataSource, DataSource, Value};
	/// use serde_json::json;
	///
	/// let ds = ArrayDataSource::from_json(&json!({"user": {"city": "Oslo"}}));
	/// assert_eq!(ds.value("user[city]"), Some(Value::scalar("Oslo")));
	/// assert_eq!(ds.value("user[zip]"), None);
	/// ```
	pub fn from_json(values: &serde_json::Value) -> ArrayDataSource {
		let values = match Value::from_json(values) {
			Some(Value::Map(map)) => map,
			_ => ValueMap::new(),
		};
		ArrayDataSource::new(values)
	}
}

impl DataSource for ArrayDataSource {
	fn value(&self, name: &str) -> Option<Value> {
		self.values.lookup(name).cloned()
	}

	fn has_value(&self, name: &str) -> bool {
		self.values.lookup(name).is_some()
	}
}

/// Data source over submitted request data, with upload descriptors.
pub struct SubmitDataSource {
	values: ValueMap,
	uploads: Vec<(String, UploadInfo)>,
}

impl SubmitDataSource {
	pub fn new(values: ValueMap) -> SubmitDataSource {
		SubmitDataSource {
			values,
			uploads: vec![],
		}
	}

	pub fn from_json(values: &serde_json::Value) -> SubmitDataSource {
		let values = match Value::from_json(values) {
			Some(Value::Map(map)) => map,
			_ => ValueMap::new(),
		};
		SubmitDataSource::new(values)
	}

	pub fn with_upload(mut self, name: impl Into<String>, upload: UploadInfo) -> SubmitDataSource {
		self.uploads.push((name.into(), upload));
		self
	}
}

impl DataSource for SubmitDataSource {
	fn value(&self, name: &str) -> Option<Value> {
		self.values.lookup(name).cloned()
	}

	fn has_value(&self, name: &str) -> bool {
		self.values.lookup(name).is_some()
	}

	fn upload(&self, name: &str) -> Option<&UploadInfo> {
		self.uploads
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, u)| u)
	}

	fn is_submit(&self) -> bool {
		true
	}
}

/// Multipart upload descriptor relayed to file elements and rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadInfo {
	pub name: String,
	pub content_type: String,
	pub tmp_path: PathBuf,
	pub size: u64,
	pub error: UploadError,
}

/// The closed set of upload outcome codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadError {
	Ok,
	NoFile,
	Partial,
	/// The file exceeds the size limit the form itself declared.
	FormSizeExceeded,
	/// The file exceeds the server-side size limit.
	ServerSizeExceeded,
	NoTmpDir,
	WriteFailed,
}
