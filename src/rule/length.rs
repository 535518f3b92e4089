//! Value length rule.

use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::{RuleLogic, js_string};
use crate::value::Value;

/// Validates the character count of a scalar value. Lengths are measured in
/// characters, not bytes, so multi-byte input behaves as users expect.
/// Empty and absent values pass.
#[derive(Debug, Clone, Copy)]
pub struct Length {
	min: Option<u64>,
	max: Option<u64>,
}

impl Length {
	pub fn new(min: Option<u64>, max: Option<u64>) -> FormResult<Length> {
		if min.is_none() && max.is_none() {
			return Err(FormError::invalid(
				"length rule needs a 'min' and/or 'max' bound",
			));
		}
		if let (Some(min), Some(max)) = (min, max)
			&& min > max
		{
			return Err(FormError::invalid(format!(
				"length rule bounds are inverted: min {min} > max {max}"
			)));
		}
		Ok(Length { min, max })
	}

	/// Builds the rule from registry configuration: either an object with
	/// `min`/`max` keys or a bare number meaning "exactly this long".
	/// A registered global config overrides local bounds key by key.
	pub fn from_config(
		local: Option<&serde_json::Value>,
		global: Option<&serde_json::Value>,
	) -> FormResult<Length> {
		let (local_min, local_max) = Length::bounds_of(local)?;
		let (global_min, global_max) = Length::bounds_of(global)?;
		Length::new(global_min.or(local_min), global_max.or(local_max))
	}

	fn bounds_of(config: Option<&serde_json::Value>) -> FormResult<(Option<u64>, Option<u64>)> {
		match config {
			None => Ok((None, None)),
			Some(serde_json::Value::Number(n)) => {
				let exact = n
					.as_u64()
					.ok_or_else(|| FormError::invalid("length bound must be a non-negative integer"))?;
				Ok((Some(exact), Some(exact)))
			}
			Some(serde_json::Value::Object(fields)) => {
				let bound = |key: &str| -> FormResult<Option<u64>> {
					match fields.get(key) {
						None | Some(serde_json::Value::Null) => Ok(None),
						Some(v) => v.as_u64().map(Some).ok_or_else(|| {
							FormError::invalid(format!(
								"length '{key}' must be a non-negative integer"
							))
						}),
					}
				};
				Ok((bound("min")?, bound("max")?))
			}
			Some(other) => Err(FormError::invalid(format!(
				"unusable length config: {other}"
			))),
		}
	}
}

impl RuleLogic for Length {
	fn name(&self) -> &'static str {
		"length"
	}

	fn check(&self, form: &mut Form, owner: NodeId) -> bool {
		let Some(Value::Scalar(s)) = form.value(owner) else {
			return true;
		};
		if s.is_empty() {
			return true;
		}
		let count = s.chars().count() as u64;
		self.min.is_none_or(|min| count >= min) && self.max.is_none_or(|max| count <= max)
	}

	fn javascript_callback(&self, form: &Form, owner: NodeId) -> FormResult<String> {
		let id = js_string(form.id(owner));
		let min = self.min.map_or("null".to_string(), |m| m.to_string());
		let max = self.max.map_or("null".to_string(), |m| m.to_string());
		Ok(format!(
			"function() {{ return qf.rules.length(qf.form.getValue({id}), {{min: {min}, max: {max}}}); }}"
		))
	}
}
