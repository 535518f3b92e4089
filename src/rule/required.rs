//! The "value must be present" rule.

use crate::error::FormResult;
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::{RuleLogic, js_string};
use crate::value::Value;

/// Fails when the owner has no value, an empty scalar, or (for containers) a
/// mapping without a single non-empty scalar inside.
#[derive(Debug, Default)]
pub struct Required;

impl Required {
	pub fn new() -> Required {
		Required
	}
}

/// Whether a resolved value counts as empty for required-style checks.
pub(crate) fn is_empty_value(value: Option<&Value>) -> bool {
	match value {
		None => true,
		Some(Value::Scalar(s)) => s.is_empty(),
		Some(Value::Map(map)) => !map
			.iter()
			.any(|(_, v)| !is_empty_value(Some(v))),
	}
}

impl RuleLogic for Required {
	fn name(&self) -> &'static str {
		"required"
	}

	fn is_required(&self) -> bool {
		true
	}

	fn check(&self, form: &mut Form, owner: NodeId) -> bool {
		!is_empty_value(form.value(owner).as_ref())
	}

	fn javascript_callback(&self, form: &Form, owner: NodeId) -> FormResult<String> {
		let id = js_string(form.id(owner));
		Ok(format!(
			"function() {{ return qf.rules.nonempty(qf.form.getValue({id})); }}"
		))
	}
}
