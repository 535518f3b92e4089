//! Pattern-matching rule.

use std::sync::LazyLock;

use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::{RuleLogic, js_string};
use crate::value::Value;

/// Validates a scalar value against a regular expression. Empty and absent
/// values pass; pair with [`Required`](crate::rule::Required) to forbid them.
pub struct RegexRule {
	pattern: String,
	regex: regex::Regex,
}

impl RegexRule {
	/// Compiles the pattern, failing with `InvalidArgument` when it is not a
	/// valid regular expression.
	pub fn new(pattern: impl Into<String>) -> FormResult<RegexRule> {
		let pattern = pattern.into();
		let regex = regex::Regex::new(&pattern)
			.map_err(|e| FormError::invalid(format!("invalid regex pattern: {e}")))?;
		Ok(RegexRule { pattern, regex })
	}

	/// A pre-compiled rule matching common email address shapes.
	pub fn email() -> RegexRule {
		RegexRule {
			pattern: EMAIL_PATTERN.to_string(),
			regex: EMAIL_REGEX.clone(),
		}
	}
}

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
	regex::Regex::new(EMAIL_PATTERN).expect("email pattern is valid")
});

impl RuleLogic for RegexRule {
	fn name(&self) -> &'static str {
		"regex"
	}

	fn check(&self, form: &mut Form, owner: NodeId) -> bool {
		match form.value(owner) {
			None => true,
			Some(Value::Scalar(s)) => s.is_empty() || self.regex.is_match(&s),
			Some(Value::Map(_)) => false,
		}
	}

	fn javascript_callback(&self, form: &Form, owner: NodeId) -> FormResult<String> {
		let id = js_string(form.id(owner));
		let pattern = js_string(&self.pattern);
		Ok(format!(
			"function() {{ var v = qf.form.getValue({id}); return v === '' || new RegExp({pattern}).test(v); }}"
		))
	}
}
