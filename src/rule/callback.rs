//! Closure-backed rule.

use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::RuleLogic;

type CheckFn = Box<dyn Fn(&mut Form, NodeId) -> bool>;

/// Wraps an arbitrary typed closure as a rule predicate. The closure gets the
/// whole form, so it can read other elements' values or set errors on them.
///
/// A client-side expression is attached separately with
/// [`with_javascript`](Callback::with_javascript); without one, requesting
/// client code fails.
pub struct Callback {
	check: CheckFn,
	javascript: Option<String>,
}

impl Callback {
	pub fn new<F>(check: F) -> Callback
	where
		F: Fn(&mut Form, NodeId) -> bool + 'static,
	{
		Callback {
			check: Box::new(check),
			javascript: None,
		}
	}

	/// Supplies the client-side callback expression mirroring the closure.
	pub fn with_javascript(mut self, javascript: impl Into<String>) -> Callback {
		self.javascript = Some(javascript.into());
		self
	}
}

impl RuleLogic for Callback {
	fn name(&self) -> &'static str {
		"callback"
	}

	fn check(&self, form: &mut Form, owner: NodeId) -> bool {
		(self.check)(form, owner)
	}

	fn javascript_callback(&self, _form: &Form, _owner: NodeId) -> FormResult<String> {
		self.javascript.clone().ok_or_else(|| {
			FormError::Logic("callback rule has no client-side implementation".to_string())
		})
	}
}
