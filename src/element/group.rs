//! Container kinds.

use crate::element::Element;
use crate::value::Value;

/// A named group of elements. A non-empty effective name nests the children's
/// submitted values under the group's bracketed key.
#[derive(Debug, Default)]
pub struct Group;

impl Group {
	pub fn new() -> Group {
		Group
	}
}

impl Element for Group {
	fn element_type(&self) -> &'static str {
		"group"
	}

	fn is_container(&self) -> bool {
		true
	}

	fn prepends_name(&self) -> bool {
		true
	}

	fn set_value(&mut self, _value: Value) {}
}

/// A transparent grouping construct: children keep their own names and their
/// values merge directly into the surrounding mapping.
#[derive(Debug, Default)]
pub struct Fieldset;

impl Fieldset {
	pub fn new() -> Fieldset {
		Fieldset
	}
}

impl Element for Fieldset {
	fn element_type(&self) -> &'static str {
		"fieldset"
	}

	fn is_container(&self) -> bool {
		true
	}

	fn set_value(&mut self, _value: Value) {}
}
