//! Single-line text input.

use crate::element::Element;
use crate::value::Value;

/// `<input type="text">`: stores one scalar.
#[derive(Debug, Default)]
pub struct Text {
	value: Option<String>,
}

impl Text {
	pub fn new() -> Text {
		Text::default()
	}

	pub fn with_value(value: impl Into<String>) -> Text {
		Text {
			value: Some(value.into()),
		}
	}
}

impl Element for Text {
	fn element_type(&self) -> &'static str {
		"text"
	}

	fn raw_value(&self) -> Option<Value> {
		self.value.clone().map(Value::Scalar)
	}

	fn set_value(&mut self, value: Value) {
		match value {
			Value::Scalar(s) => self.value = Some(s),
			Value::Map(_) => {
				tracing::debug!(kind = "text", "ignoring non-scalar value");
			}
		}
	}
}
