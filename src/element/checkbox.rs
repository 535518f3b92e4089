//! Checkbox input.

use std::rc::Rc;

use crate::data_source::DataSource;
use crate::element::Element;
use crate::value::Value;

/// `<input type="checkbox">`: submits its fixed value only when checked.
#[derive(Debug)]
pub struct Checkbox {
	checked: bool,
	submit_value: String,
}

impl Checkbox {
	pub fn new() -> Checkbox {
		Checkbox {
			checked: false,
			submit_value: "1".to_string(),
		}
	}

	/// Overrides the value submitted when the box is checked (default `"1"`).
	pub fn with_submit_value(value: impl Into<String>) -> Checkbox {
		Checkbox {
			checked: false,
			submit_value: value.into(),
		}
	}

	pub fn is_checked(&self) -> bool {
		self.checked
	}
}

impl Default for Checkbox {
	fn default() -> Self {
		Checkbox::new()
	}
}

impl Element for Checkbox {
	fn element_type(&self) -> &'static str {
		"checkbox"
	}

	fn raw_value(&self) -> Option<Value> {
		self.checked
			.then(|| Value::scalar(self.submit_value.clone()))
	}

	fn set_value(&mut self, value: Value) {
		self.checked = value.as_scalar() == Some(self.submit_value.as_str());
	}

	/// An unclaimed name in submitted data means the box was unchecked: an
	/// unchecked checkbox simply does not appear in the submission.
	fn update_value(&mut self, name: &str, sources: &[Rc<dyn DataSource>]) {
		for source in sources {
			if source.has_value(name) {
				if let Some(value) = source.value(name) {
					self.set_value(value);
				}
				return;
			}
		}
		if sources.iter().any(|s| s.is_submit()) {
			self.checked = false;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data_source::{ArrayDataSource, SubmitDataSource};
	use serde_json::json;

	#[test]
	fn test_checkbox_checked_by_matching_value() {
		let mut cb = Checkbox::new();
		cb.set_value(Value::scalar("1"));
		assert!(cb.is_checked());
		assert_eq!(cb.raw_value(), Some(Value::scalar("1")));

		cb.set_value(Value::scalar("0"));
		assert!(!cb.is_checked());
		assert_eq!(cb.raw_value(), None);
	}

	#[test]
	fn test_checkbox_unchecked_when_absent_from_submission() {
		let mut cb = Checkbox::new();
		cb.set_value(Value::scalar("1"));

		let sources: Vec<Rc<dyn DataSource>> =
			vec![Rc::new(SubmitDataSource::from_json(&json!({"other": "x"})))];
		cb.update_value("agree", &sources);
		assert!(!cb.is_checked());
	}

	#[test]
	fn test_checkbox_keeps_state_without_submission() {
		let mut cb = Checkbox::new();
		cb.set_value(Value::scalar("1"));

		let sources: Vec<Rc<dyn DataSource>> =
			vec![Rc::new(ArrayDataSource::from_json(&json!({"other": "x"})))];
		cb.update_value("agree", &sources);
		assert!(cb.is_checked());
	}
}
