//! Value comparison rule.

use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::{RuleLogic, js_string};
use crate::value::Value;

/// Comparison operators. Ordering comparisons are numeric when both sides
/// parse as numbers and lexicographic otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl Operator {
	pub fn parse(token: &str) -> FormResult<Operator> {
		match token {
			"==" | "===" => Ok(Operator::Eq),
			"!=" | "!==" => Ok(Operator::Ne),
			"<" => Ok(Operator::Lt),
			"<=" => Ok(Operator::Le),
			">" => Ok(Operator::Gt),
			">=" => Ok(Operator::Ge),
			other => Err(FormError::invalid(format!(
				"unknown comparison operator '{other}'"
			))),
		}
	}

	fn js(self) -> &'static str {
		match self {
			Operator::Eq => "==",
			Operator::Ne => "!=",
			Operator::Lt => "<",
			Operator::Le => "<=",
			Operator::Gt => ">",
			Operator::Ge => ">=",
		}
	}
}

/// The right-hand side of a comparison: a constant or another element's
/// resolved value (a cross-element rule, e.g. password confirmation).
pub enum Operand {
	Constant(String),
	Element(NodeId),
}

/// Compares the owner's scalar value against the operand.
pub struct Compare {
	operator: Operator,
	operand: Operand,
}

impl Compare {
	pub fn new(operator: Operator, operand: Operand) -> Compare {
		Compare { operator, operand }
	}

	/// Builds the rule from registry configuration:
	/// `{"operator": "<=", "operand": "100"}`. A registered global config
	/// overrides the local one wholesale.
	pub fn from_config(
		local: Option<&serde_json::Value>,
		global: Option<&serde_json::Value>,
	) -> FormResult<Compare> {
		let config = global
			.or(local)
			.ok_or_else(|| FormError::invalid("compare rule needs a config"))?;
		let operator = config
			.get("operator")
			.and_then(|v| v.as_str())
			.ok_or_else(|| FormError::invalid("compare rule config needs an 'operator'"))?;
		let operand = config
			.get("operand")
			.and_then(|v| v.as_str())
			.ok_or_else(|| FormError::invalid("compare rule config needs an 'operand'"))?;
		Ok(Compare::new(
			Operator::parse(operator)?,
			Operand::Constant(operand.to_string()),
		))
	}

	fn operand_value(&self, form: &Form) -> String {
		match &self.operand {
			Operand::Constant(s) => s.clone(),
			Operand::Element(id) => match form.value(*id) {
				Some(Value::Scalar(s)) => s,
				_ => String::new(),
			},
		}
	}

	fn compare(&self, left: &str, right: &str) -> bool {
		match self.operator {
			Operator::Eq => left == right,
			Operator::Ne => left != right,
			_ => {
				let ordering = match (left.parse::<f64>(), right.parse::<f64>()) {
					(Ok(l), Ok(r)) => l.partial_cmp(&r),
					_ => Some(left.cmp(right)),
				};
				let Some(ordering) = ordering else {
					return false;
				};
				match self.operator {
					Operator::Lt => ordering.is_lt(),
					Operator::Le => ordering.is_le(),
					Operator::Gt => ordering.is_gt(),
					Operator::Ge => ordering.is_ge(),
					Operator::Eq | Operator::Ne => unreachable!(),
				}
			}
		}
	}
}

impl RuleLogic for Compare {
	fn name(&self) -> &'static str {
		"compare"
	}

	fn check(&self, form: &mut Form, owner: NodeId) -> bool {
		let left = match form.value(owner) {
			Some(Value::Scalar(s)) => s,
			_ => String::new(),
		};
		let right = self.operand_value(form);
		self.compare(&left, &right)
	}

	fn javascript_callback(&self, form: &Form, owner: NodeId) -> FormResult<String> {
		let id = js_string(form.id(owner));
		let op = self.operator.js();
		let rhs = match &self.operand {
			Operand::Constant(s) => js_string(s),
			Operand::Element(other) => {
				format!("qf.form.getValue({})", js_string(form.id(*other)))
			}
		};
		Ok(format!(
			"function() {{ return qf.rules.compare(qf.form.getValue({id}), '{op}', {rhs}); }}"
		))
	}
}
