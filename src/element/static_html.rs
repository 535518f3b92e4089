//! Display-only content.

use std::rc::Rc;

use crate::data_source::DataSource;
use crate::element::Element;
use crate::value::Value;

/// A block of static markup inside the form. It carries no value, ignores
/// data sources, and cannot have validation rules attached.
#[derive(Debug, Default)]
pub struct StaticHtml {
	content: String,
}

impl StaticHtml {
	pub fn new(content: impl Into<String>) -> StaticHtml {
		StaticHtml {
			content: content.into(),
		}
	}

	pub fn content(&self) -> &str {
		&self.content
	}
}

impl Element for StaticHtml {
	fn element_type(&self) -> &'static str {
		"static"
	}

	fn can_validate(&self) -> bool {
		false
	}

	fn set_value(&mut self, _value: Value) {}

	fn update_value(&mut self, _name: &str, _sources: &[Rc<dyn DataSource>]) {}
}
