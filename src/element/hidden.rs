//! Hidden input.

use crate::element::Element;
use crate::value::Value;

/// `<input type="hidden">`: a scalar that renders through the hidden path.
#[derive(Debug, Default)]
pub struct Hidden {
	value: Option<String>,
}

impl Hidden {
	pub fn new() -> Hidden {
		Hidden::default()
	}

	pub fn with_value(value: impl Into<String>) -> Hidden {
		Hidden {
			value: Some(value.into()),
		}
	}
}

impl Element for Hidden {
	fn element_type(&self) -> &'static str {
		"hidden"
	}

	fn is_hidden(&self) -> bool {
		true
	}

	fn raw_value(&self) -> Option<Value> {
		self.value.clone().map(Value::Scalar)
	}

	fn set_value(&mut self, value: Value) {
		if let Value::Scalar(s) = value {
			self.value = Some(s);
		}
	}
}
