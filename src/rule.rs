//! Validation rules.
//!
//! A [`Rule`] binds a predicate ([`RuleLogic`]) to one owner node together
//! with a failure message, and can be chained with [`Rule::and_`] /
//! [`Rule::or_`] into a disjunctive-normal-form boolean expression: an
//! ordered list of conjunctive clauses, the head rule being the implicit
//! first conjunct of the first clause. `and_` distributes the new conjunct
//! over every existing clause, so `a.or_(b).and_(c)` reads left to right as
//! `(a or b) and c`.
//!
//! Every rule can additionally describe itself as a client-side expression
//! via [`Rule::javascript`], mirroring the server-side semantics for a
//! browser runtime.

pub mod callback;
pub mod compare;
pub mod length;
pub mod regex;
pub mod required;

pub use callback::Callback;
pub use compare::{Compare, Operand, Operator};
pub use length::Length;
pub use regex::RegexRule;
pub use required::Required;

use std::rc::Rc;

use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;

/// The predicate part of a validation rule.
pub trait RuleLogic {
	/// Registry type name, e.g. `"required"`.
	fn name(&self) -> &'static str;

	/// Required-kind rules are structurally forbidden from appearing as a
	/// non-head chain member and refuse to be extended with `or_`.
	fn is_required(&self) -> bool {
		false
	}

	/// Evaluates the predicate against the owner's current value. The form
	/// is mutable so container rules may set errors on descendants.
	fn check(&self, form: &mut Form, owner: NodeId) -> bool;

	/// The client-side callback expression mirroring [`check`](Self::check).
	/// Rules without a client implementation fail with [`FormError::Logic`].
	fn javascript_callback(&self, _form: &Form, _owner: NodeId) -> FormResult<String> {
		Err(FormError::Logic(format!(
			"rule '{}' has no client-side implementation",
			self.name()
		)))
	}
}

/// A validation rule chain attached to one owner node.
pub struct Rule {
	logic: Box<dyn RuleLogic>,
	owner: NodeId,
	message: String,
	/// DNF clauses beyond the implicit head conjunct. Conjuncts are shared
	/// because `and_` distributes one rule into several clauses.
	clauses: Vec<Vec<Rc<Rule>>>,
}

impl Rule {
	/// Binds `logic` to an owner node.
	///
	/// Fails with `InvalidArgument` when the owner is a display-only element,
	/// or when a required-kind rule is given an empty message (a silent
	/// required check would be invisible to the user).
	pub fn new(
		form: &Form,
		owner: NodeId,
		logic: Box<dyn RuleLogic>,
		message: impl Into<String>,
	) -> FormResult<Rule> {
		if !form.can_validate(owner) {
			return Err(FormError::invalid(format!(
				"validation rules cannot be added to '{}' elements",
				form.element_type(owner)
			)));
		}
		let message = message.into();
		if logic.is_required() && message.is_empty() {
			return Err(FormError::invalid(
				"a required rule needs a non-empty error message",
			));
		}
		Ok(Rule {
			logic,
			owner,
			message,
			clauses: vec![vec![]],
		})
	}

	pub fn owner(&self) -> NodeId {
		self.owner
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn is_required(&self) -> bool {
		self.logic.is_required()
	}

	/// Adds `next` as a conjunct: the combined chain is valid only when both
	/// sides are. `next` is never evaluated when the current expression is
	/// already false.
	pub fn and_(mut self, next: Rule) -> FormResult<Rule> {
		if next.is_required() {
			return Err(FormError::invalid(
				"a required rule cannot be chained to another rule",
			));
		}
		let link = Rc::new(next);
		for clause in &mut self.clauses {
			clause.push(Rc::clone(&link));
		}
		Ok(self)
	}

	/// Adds `next` as an alternative clause: the combined chain is valid when
	/// either side is. `next` is never evaluated when the expression so far
	/// is already true.
	pub fn or_(mut self, next: Rule) -> FormResult<Rule> {
		if self.is_required() {
			return Err(FormError::invalid(
				"cannot extend a required rule with an alternative",
			));
		}
		if next.is_required() {
			return Err(FormError::invalid(
				"a required rule cannot be chained to another rule",
			));
		}
		self.clauses.push(vec![Rc::new(next)]);
		Ok(self)
	}

	/// Full validation pass: evaluates the DNF expression and, on failure,
	/// sets the head rule's message on the owner unless an error is already
	/// present. Chained links never write messages.
	pub(crate) fn validate(&self, form: &mut Form) -> bool {
		let valid = self.evaluate(form);
		if !valid && form.error(self.owner).is_empty() {
			form.set_error(self.owner, self.message.clone());
		}
		valid
	}

	fn evaluate(&self, form: &mut Form) -> bool {
		let head = self.logic.check(form, self.owner);
		let mut global = false;
		for (index, clause) in self.clauses.iter().enumerate() {
			let mut local = if index == 0 { head } else { true };
			for link in clause {
				if !local {
					break;
				}
				local = link.evaluate(form);
			}
			global = global || local;
			if global {
				break;
			}
		}
		global
	}

	/// Client-side representation: callback, owner id, encoded message,
	/// optional trigger element ids, and the chained clause structure.
	pub fn javascript(&self, form: &Form, output_triggers: bool) -> FormResult<String> {
		let callback = self.logic.javascript_callback(form, self.owner)?;
		let owner = js_string(form.id(self.owner));
		let message = js_string(&self.message);

		let triggers = if output_triggers {
			let mut ids: Vec<String> = vec![];
			self.collect_triggers(form, &mut ids);
			let encoded: Vec<String> = ids.iter().map(|i| js_string(i)).collect();
			format!(",\n triggers: [{}]", encoded.join(", "))
		} else {
			String::new()
		};

		let mut clauses: Vec<String> = vec![];
		for clause in &self.clauses {
			if clause.is_empty() {
				continue;
			}
			let links: FormResult<Vec<String>> =
				clause.iter().map(|link| link.javascript(form, false)).collect();
			clauses.push(format!("[{}]", links?.join(", ")));
		}
		let chained = format!("[{}]", clauses.join(", "));

		Ok(format!(
			"{{\n callback: {callback},\n owner: {owner},\n message: {message}{triggers},\n chained: {chained}\n}}"
		))
	}

	fn collect_triggers(&self, form: &Form, ids: &mut Vec<String>) {
		for id in form.trigger_ids(self.owner) {
			if !ids.contains(&id) {
				ids.push(id);
			}
		}
		for clause in &self.clauses {
			for link in clause {
				link.collect_triggers(form, ids);
			}
		}
	}
}

/// JSON-encodes a string for embedding into generated client code.
pub(crate) fn js_string(value: &str) -> String {
	serde_json::to_string(value).expect("string serialization cannot fail")
}
