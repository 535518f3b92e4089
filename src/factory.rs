//! Type registries for elements and rules.
//!
//! The factory is the plugin boundary: new element and rule kinds are added
//! by registering a constructor closure under a case-insensitive type name,
//! without touching the core. Re-registering a name silently replaces the
//! previous entry.

use std::collections::HashMap;

use crate::element::{Checkbox, Element, Fieldset, Group, Hidden, StaticHtml, Text};
use crate::error::{FormError, FormResult};
use crate::form::Form;
use crate::node::NodeId;
use crate::rule::{Compare, Length, RegexRule, Required, Rule, RuleLogic};

type ElementCtor = Box<dyn Fn() -> FormResult<Box<dyn Element>>>;

/// Rule constructor: receives the call-site config and the registered global
/// config and applies its own merge policy (default: global overrides local).
type RuleCtor =
	Box<dyn Fn(Option<&serde_json::Value>, Option<&serde_json::Value>) -> FormResult<Box<dyn RuleLogic>>>;

struct RuleEntry {
	ctor: RuleCtor,
	global_config: Option<serde_json::Value>,
}

/// Registries mapping type names to constructors.
pub struct Factory {
	elements: HashMap<String, ElementCtor>,
	rules: HashMap<String, RuleEntry>,
}

impl Factory {
	/// An empty factory with no registered types.
	pub fn new() -> Factory {
		Factory {
			elements: HashMap::new(),
			rules: HashMap::new(),
		}
	}

	/// A factory with every built-in element and rule kind registered.
	pub fn with_defaults() -> Factory {
		let mut factory = Factory::new();

		factory.register_element("text", || Ok(Box::new(Text::new())));
		factory.register_element("hidden", || Ok(Box::new(Hidden::new())));
		factory.register_element("checkbox", || Ok(Box::new(Checkbox::new())));
		factory.register_element("static", || Ok(Box::new(StaticHtml::new(""))));
		factory.register_element("group", || Ok(Box::new(Group::new())));
		factory.register_element("fieldset", || Ok(Box::new(Fieldset::new())));

		factory.register_rule("required", |_, _| Ok(Box::new(Required::new())), None);
		factory.register_rule(
			"regex",
			|local, global| {
				let pattern = global
					.or(local)
					.and_then(|v| v.as_str())
					.ok_or_else(|| FormError::invalid("regex rule needs a pattern config"))?;
				Ok(Box::new(RegexRule::new(pattern)?))
			},
			None,
		);
		factory.register_rule("email", |_, _| Ok(Box::new(RegexRule::email())), None);
		factory.register_rule(
			"length",
			|local, global| Ok(Box::new(Length::from_config(local, global)?)),
			None,
		);
		factory.register_rule(
			"minlength",
			|local, global| {
				let min = scalar_bound(global.or(local), "minlength")?;
				Ok(Box::new(Length::new(Some(min), None)?))
			},
			None,
		);
		factory.register_rule(
			"maxlength",
			|local, global| {
				let max = scalar_bound(global.or(local), "maxlength")?;
				Ok(Box::new(Length::new(None, Some(max))?))
			},
			None,
		);
		factory.register_rule(
			"compare",
			|local, global| Ok(Box::new(Compare::from_config(local, global)?)),
			None,
		);

		factory
	}

	/// Registers (or replaces) an element constructor under `type_name`.
	pub fn register_element<F>(&mut self, type_name: &str, ctor: F)
	where
		F: Fn() -> FormResult<Box<dyn Element>> + 'static,
	{
		self.elements
			.insert(type_name.to_lowercase(), Box::new(ctor));
		tracing::debug!(type_name, "registered element type");
	}

	/// Registers (or replaces) a rule constructor under `type_name`,
	/// optionally with a global config handed to every construction.
	pub fn register_rule<F>(
		&mut self,
		type_name: &str,
		ctor: F,
		global_config: Option<serde_json::Value>,
	) where
		F: Fn(Option<&serde_json::Value>, Option<&serde_json::Value>) -> FormResult<Box<dyn RuleLogic>>
			+ 'static,
	{
		self.rules.insert(
			type_name.to_lowercase(),
			RuleEntry {
				ctor: Box::new(ctor),
				global_config,
			},
		);
		tracing::debug!(type_name, "registered rule type");
	}

	pub fn has_element(&self, type_name: &str) -> bool {
		self.elements.contains_key(&type_name.to_lowercase())
	}

	pub fn has_rule(&self, type_name: &str) -> bool {
		self.rules.contains_key(&type_name.to_lowercase())
	}

	/// Instantiates a registered element kind.
	///
	/// Fails with `InvalidArgument` for an unknown type and propagates the
	/// constructor's own error (conventionally `NotFound`) when the
	/// registered closure cannot produce an instance.
	pub fn create_element(&self, type_name: &str) -> FormResult<Box<dyn Element>> {
		let ctor = self.elements.get(&type_name.to_lowercase()).ok_or_else(|| {
			FormError::invalid(format!("element type '{type_name}' is not known"))
		})?;
		ctor()
	}

	/// Instantiates a registered rule kind bound to `owner`.
	pub fn create_rule(
		&self,
		form: &Form,
		type_name: &str,
		owner: NodeId,
		message: impl Into<String>,
		config: Option<serde_json::Value>,
	) -> FormResult<Rule> {
		let entry = self.rules.get(&type_name.to_lowercase()).ok_or_else(|| {
			FormError::invalid(format!("rule type '{type_name}' is not known"))
		})?;
		let logic = (entry.ctor)(config.as_ref(), entry.global_config.as_ref())?;
		Rule::new(form, owner, logic, message)
	}
}

impl Default for Factory {
	fn default() -> Self {
		Factory::with_defaults()
	}
}

fn scalar_bound(config: Option<&serde_json::Value>, rule: &str) -> FormResult<u64> {
	config
		.and_then(|v| v.as_u64())
		.ok_or_else(|| FormError::invalid(format!("{rule} rule needs a numeric config")))
}
