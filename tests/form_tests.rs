//! End-to-end tests for tree construction, naming, data binding, validation
//! chains, and rendering.

use std::cell::Cell;
use std::rc::Rc;

use rstest::rstest;
use serde_json::json;

use formtree::{
	ArrayDataSource, Callback, Checkbox, Fieldset, Form, FormError, Group, JavascriptBuilder,
	NodeId, Renderer, Required, Rule, RunAt, SubmitDataSource, Text, Value,
};

fn text(form: &mut Form, parent: NodeId, name: &str) -> NodeId {
	form.append_kind(parent, Box::new(Text::new()), name).unwrap()
}

fn group(form: &mut Form, parent: NodeId, name: &str) -> NodeId {
	form.append_kind(parent, Box::new(Group::new()), name).unwrap()
}

// ---- naming ----------------------------------------------------------------

#[test]
fn test_group_prefixes_child_names() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let e1 = text(&mut form, g1, "e1");
	assert_eq!(form.qualified_name(e1), "g1[e1]");
	assert_eq!(form.name(e1), "e1");
}

#[test]
fn test_nested_groups_stack_prefixes() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let g4 = group(&mut form, g1, "g4");
	let e1 = text(&mut form, g4, "e1");
	assert_eq!(form.qualified_name(g4), "g1[g4]");
	assert_eq!(form.qualified_name(e1), "g1[g4][e1]");
}

#[test]
fn test_renaming_a_group_cascades_to_descendants() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let e1 = text(&mut form, g1, "e1");

	form.set_name(g1, "g2");
	assert_eq!(form.qualified_name(e1), "g2[e1]");

	// An unnamed group stops prefixing entirely.
	form.set_name(g1, "");
	assert_eq!(form.qualified_name(e1), "e1");
}

#[test]
fn test_renaming_a_bracketed_group_cascades() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1[g4]");
	let e1 = text(&mut form, g1, "e1");
	assert_eq!(form.qualified_name(e1), "g1[g4][e1]");

	form.set_name(g1, "g2");
	assert_eq!(form.qualified_name(e1), "g2[e1]");

	form.set_name(g1, "");
	assert_eq!(form.qualified_name(e1), "e1");
}

#[rstest]
#[case("", "g1[]")]
#[case("[e4]", "g1[][e4]")]
#[case("a[b]", "g1[a][b]")]
fn test_bracketed_child_names_re_nest(#[case] child_name: &str, #[case] expected: &str) {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let child = text(&mut form, g1, child_name);
	assert_eq!(form.qualified_name(child), expected);
}

#[test]
fn test_fieldset_is_transparent_for_names() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let fieldset = form
		.append_kind(g1, Box::new(Fieldset::new()), "legend")
		.unwrap();
	let inner = text(&mut form, fieldset, "inner");
	// The fieldset's own name never reaches the child; the group's does.
	assert_eq!(form.qualified_name(inner), "g1[inner]");
}

#[test]
fn test_elements_by_name_uses_qualified_names() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let inner = text(&mut form, g1, "e1");
	let outer = text(&mut form, root, "e1");

	assert_eq!(form.elements_by_name(root, "e1"), vec![outer]);
	assert_eq!(form.elements_by_name(root, "g1[e1]"), vec![inner]);
}

// ---- ids -------------------------------------------------------------------

#[test]
fn test_generated_ids_are_unique() {
	let mut form = Form::new("f");
	let root = form.root();
	let first = text(&mut form, root, "foo");
	let second = text(&mut form, root, "foo");
	assert_ne!(form.id(first), form.id(second));
	assert_eq!(form.id(first), "foo-0");
	assert_eq!(form.id(second), "foo-1");
}

#[rstest]
#[case("a b")]
#[case(" a")]
#[case("a ")]
#[case("a\rb")]
#[case("a\x0cb")]
fn test_whitespace_in_ids_is_rejected(#[case] id: &str) {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	assert!(matches!(
		form.set_id(element, Some(id)),
		Err(FormError::InvalidArgument(_))
	));
}

#[test]
fn test_regenerated_id_avoids_reserved_ones() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	form.set_id(element, Some("custom")).unwrap();
	form.set_id(element, None).unwrap();
	assert_eq!(form.id(element), "foo-1");
}

#[test]
fn test_element_lookup_by_id() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let e1 = text(&mut form, g1, "e1");
	assert_eq!(form.element_by_id(root, form.id(e1)), Some(e1));
	assert_eq!(form.element_by_id(root, "nope"), None);
}

#[test]
fn test_shared_explicit_id_survives_removal() {
	let mut form = Form::new("f");
	let root = form.root();
	let first = text(&mut form, root, "a");
	let second = text(&mut form, root, "b");
	form.set_id(first, Some("dup")).unwrap();
	form.set_id(second, Some("dup")).unwrap();

	form.remove_child(root, first).unwrap();
	assert_eq!(form.element_by_id(root, "dup"), Some(second));
}

// ---- moving ----------------------------------------------------------------

#[test]
fn test_moving_between_containers_detaches_first() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let g2 = group(&mut form, root, "g2");
	let e1 = text(&mut form, g1, "e1");

	form.append_child(g2, e1).unwrap();
	assert!(form.children(g1).is_empty());
	assert_eq!(form.children(g2), &[e1]);
	assert_eq!(form.qualified_name(e1), "g2[e1]");
}

#[test]
fn test_insert_before_repositions_within_a_container() {
	let mut form = Form::new("f");
	let root = form.root();
	let a = text(&mut form, root, "a");
	let b = text(&mut form, root, "b");
	let c = text(&mut form, root, "c");

	form.insert_before(root, c, Some(a)).unwrap();
	assert_eq!(form.children(root), &[c, a, b]);
}

#[test]
fn test_moving_into_own_descendant_fails() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let g2 = group(&mut form, g1, "g2");

	assert!(matches!(
		form.append_child(g2, g1),
		Err(FormError::InvalidArgument(_))
	));
	assert!(matches!(
		form.append_child(g1, g1),
		Err(FormError::InvalidArgument(_))
	));
}

#[test]
fn test_appending_to_a_leaf_fails() {
	let mut form = Form::new("f");
	let root = form.root();
	let leaf = text(&mut form, root, "leaf");
	let other = text(&mut form, root, "other");
	assert!(matches!(
		form.append_child(leaf, other),
		Err(FormError::InvalidArgument(_))
	));
}

#[test]
fn test_removing_a_non_child_fails() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let stray = text(&mut form, root, "stray");
	assert!(matches!(
		form.remove_child(g1, stray),
		Err(FormError::NotFound(_))
	));
}

// ---- values ----------------------------------------------------------------

#[test]
fn test_form_value_aggregates_children_by_name() {
	let mut form = Form::new("f");
	let root = form.root();
	let foo = text(&mut form, root, "foo");
	let bar = text(&mut form, root, "bar");
	form.set_value(foo, Value::scalar("1"));
	form.set_value(bar, Value::scalar("2"));

	let values = form.value(root).unwrap();
	assert_eq!(
		values.to_json(),
		json!({"foo": "1", "bar": "2"})
	);
}

#[test]
fn test_group_value_is_unwrapped_to_its_own_subtree() {
	let mut form = Form::new("f");
	let root = form.root();
	let address = group(&mut form, root, "address");
	let city = text(&mut form, address, "city");
	form.set_value(city, Value::scalar("Graz"));

	assert_eq!(
		form.value(root).unwrap().to_json(),
		json!({"address": {"city": "Graz"}})
	);
	assert_eq!(
		form.value(address).unwrap().to_json(),
		json!({"city": "Graz"})
	);
}

#[test]
fn test_container_set_value_distributes_by_name() {
	let mut form = Form::new("f");
	let root = form.root();
	let address = group(&mut form, root, "address");
	let city = text(&mut form, address, "city");
	let zip = text(&mut form, address, "zip");

	form.set_value(
		address,
		Value::from_json(&json!({"city": "Graz", "zip": "8010"})).unwrap(),
	);
	assert_eq!(form.raw_value(city), Some(Value::scalar("Graz")));
	assert_eq!(form.raw_value(zip), Some(Value::scalar("8010")));
}

#[test]
fn test_unnamed_children_consume_consecutive_indexes() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let first = text(&mut form, g1, "");
	let second = text(&mut form, g1, "");

	form.set_value(g1, Value::from_json(&json!(["a", "b"])).unwrap());
	assert_eq!(form.raw_value(first), Some(Value::scalar("a")));
	assert_eq!(form.raw_value(second), Some(Value::scalar("b")));

	assert_eq!(
		form.value(root).unwrap().to_json(),
		json!({"g1": ["a", "b"]})
	);
}

#[test]
fn test_earlier_data_source_wins() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	form.add_data_source(root, ArrayDataSource::from_json(&json!({"foo": "first"})));
	form.add_data_source(root, ArrayDataSource::from_json(&json!({"foo": "second"})));
	assert_eq!(form.value(element), Some(Value::scalar("first")));
}

#[test]
fn test_sources_resolve_bracketed_names() {
	let mut form = Form::new("f");
	let root = form.root();
	let address = group(&mut form, root, "address");
	let city = text(&mut form, address, "city");
	form.add_data_source(
		root,
		ArrayDataSource::from_json(&json!({"address": {"city": "Graz"}})),
	);
	assert_eq!(form.value(city), Some(Value::scalar("Graz")));
}

#[test]
fn test_rename_rebinds_against_sources() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "old");
	form.add_data_source(root, ArrayDataSource::from_json(&json!({"new": "value"})));
	assert_eq!(form.value(element), None);

	form.set_name(element, "new");
	assert_eq!(form.value(element), Some(Value::scalar("value")));
}

#[test]
fn test_checkbox_ignores_non_submit_sources() {
	let mut form = Form::new("f");
	let root = form.root();
	let checkbox = form
		.append_kind(root, Box::new(Checkbox::new()), "agree")
		.unwrap();
	form.set_value(checkbox, Value::scalar("1"));
	assert_eq!(form.value(checkbox), Some(Value::scalar("1")));

	// A non-submit source that does not mention the checkbox leaves it alone.
	form.add_data_source(root, ArrayDataSource::from_json(&json!({})));
	assert_eq!(form.value(checkbox), Some(Value::scalar("1")));
}

#[test]
fn test_checkbox_follows_submit_semantics() {
	let mut form = Form::new("f");
	let root = form.root();
	let checkbox = form
		.append_kind(root, Box::new(Checkbox::new()), "agree")
		.unwrap();
	form.set_value(checkbox, Value::scalar("1"));

	// Browsers omit unchecked checkboxes from the submission entirely.
	form.add_data_source(root, SubmitDataSource::from_json(&json!({})));
	assert_eq!(form.value(checkbox), None);
}

#[test]
fn test_filters_apply_on_retrieval_only() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	form.set_value(element, Value::scalar("  padded  "));
	form.add_filter(element, |value| match value {
		Value::Scalar(s) => Value::scalar(s.trim()),
		other => other,
	});

	assert_eq!(form.value(element), Some(Value::scalar("padded")));
	assert_eq!(form.raw_value(element), Some(Value::scalar("  padded  ")));
}

#[test]
fn test_recursive_filters_reach_nested_scalars() {
	let mut form = Form::new("f");
	let root = form.root();
	let address = group(&mut form, root, "address");
	let city = text(&mut form, address, "city");
	form.set_value(city, Value::scalar("graz"));
	form.add_recursive_filter(root, |value| match value {
		Value::Scalar(s) => Value::scalar(s.to_uppercase()),
		other => other,
	});

	assert_eq!(
		form.value(root).unwrap().to_json(),
		json!({"address": {"city": "GRAZ"}})
	);
}

#[test]
fn test_recursive_filters_apply_once_per_scalar() {
	let mut form = Form::new("f");
	let root = form.root();
	let address = group(&mut form, root, "address");
	let city = text(&mut form, address, "city");
	form.set_value(city, Value::scalar("a"));
	// A non-idempotent filter exposes any re-application during aggregation.
	form.add_recursive_filter(root, |value| match value {
		Value::Scalar(s) => Value::scalar(format!("{s}!")),
		other => other,
	});

	assert_eq!(form.value(city), Some(Value::scalar("a!")));
	assert_eq!(
		form.value(address).unwrap().to_json(),
		json!({"city": "a!"})
	);
	assert_eq!(
		form.value(root).unwrap().to_json(),
		json!({"address": {"city": "a!"}})
	);
}

// ---- validation ------------------------------------------------------------

fn counting_rule(
	form: &Form,
	owner: NodeId,
	result: bool,
	counter: &Rc<Cell<u32>>,
) -> Rule {
	let counter = Rc::clone(counter);
	Rule::new(
		form,
		owner,
		Box::new(Callback::new(move |_, _| {
			counter.set(counter.get() + 1);
			result
		})),
		"failed",
	)
	.unwrap()
}

#[test]
fn test_required_rule_fails_on_empty_value() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let rule = Rule::new(&form, element, Box::new(Required::new()), "fill this in").unwrap();
	form.add_rule(rule, RunAt::SERVER);

	assert!(!form.validate(root));
	assert_eq!(form.error(element), "fill this in");
	assert!(form.is_required(element));
}

#[test]
fn test_and_or_precedence_reads_left_to_right() {
	// a.or_(b).and_(c) evaluates as (a or b) and c.
	let truth_table = [
		(true, true, true, true),
		(true, false, true, true),
		(false, true, true, true),
		(false, false, true, false),
		(true, true, false, false),
		(false, false, false, false),
	];
	for (a, b, c, expected) in truth_table {
		let mut form = Form::new("f");
		let root = form.root();
		let element = text(&mut form, root, "foo");
		let count = Rc::new(Cell::new(0));
		let chain = counting_rule(&form, element, a, &count)
			.or_(counting_rule(&form, element, b, &count))
			.unwrap()
			.and_(counting_rule(&form, element, c, &count))
			.unwrap();
		form.add_rule(chain, RunAt::SERVER);
		assert_eq!(form.validate(element), expected, "a={a} b={b} c={c}");
	}
}

#[test]
fn test_or_short_circuits() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let count = Rc::new(Cell::new(0));
	let chain = counting_rule(&form, element, true, &count)
		.or_(counting_rule(&form, element, true, &count))
		.unwrap();
	form.add_rule(chain, RunAt::SERVER);

	assert!(form.validate(element));
	// The head succeeded, so the alternative never ran.
	assert_eq!(count.get(), 1);
}

#[test]
fn test_and_short_circuits() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let count = Rc::new(Cell::new(0));
	let chain = counting_rule(&form, element, false, &count)
		.and_(counting_rule(&form, element, true, &count))
		.unwrap();
	form.add_rule(chain, RunAt::SERVER);

	assert!(!form.validate(element));
	assert_eq!(count.get(), 1);
}

#[test]
fn test_only_the_head_rule_sets_the_message() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let count = Rc::new(Cell::new(0));
	let head = Rule::new(
		&form,
		element,
		Box::new(Callback::new(|_, _| true)),
		"head message",
	)
	.unwrap();
	let chain = head
		.and_(counting_rule(&form, element, false, &count))
		.unwrap();
	form.add_rule(chain, RunAt::SERVER);

	assert!(!form.validate(element));
	assert_eq!(form.error(element), "head message");
}

#[test]
fn test_an_existing_error_stops_later_rules() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let count = Rc::new(Cell::new(0));
	let failing = counting_rule(&form, element, false, &count);
	let never_run = counting_rule(&form, element, true, &count);
	form.add_rule(failing, RunAt::SERVER);
	form.add_rule(never_run, RunAt::SERVER);

	assert!(!form.validate(element));
	assert_eq!(count.get(), 1);
}

#[test]
fn test_required_rules_refuse_chaining() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");

	let required = Rule::new(&form, element, Box::new(Required::new()), "required").unwrap();
	let other = Rule::new(&form, element, Box::new(Callback::new(|_, _| true)), "").unwrap();
	assert!(matches!(required.or_(other), Err(FormError::InvalidArgument(_))));

	let required = Rule::new(&form, element, Box::new(Required::new()), "required").unwrap();
	let other = Rule::new(&form, element, Box::new(Callback::new(|_, _| true)), "").unwrap();
	assert!(matches!(other.and_(required), Err(FormError::InvalidArgument(_))));

	assert!(matches!(
		Rule::new(&form, element, Box::new(Required::new()), ""),
		Err(FormError::InvalidArgument(_))
	));
}

#[test]
fn test_rules_reject_display_only_elements() {
	let mut form = Form::new("f");
	let root = form.root();
	let banner = form
		.append_kind(root, Box::new(formtree::StaticHtml::new("<hr/>")), "banner")
		.unwrap();
	assert!(matches!(
		Rule::new(&form, banner, Box::new(Required::new()), "msg"),
		Err(FormError::InvalidArgument(_))
	));
}

#[test]
fn test_container_rule_errors_on_a_descendant_fail_validation() {
	let mut form = Form::new("f");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	let e1 = text(&mut form, g1, "e1");

	// A container rule that passes itself but flags a child.
	let rule = Rule::new(
		&form,
		g1,
		Box::new(Callback::new(move |form: &mut Form, _| {
			form.set_error(e1, "child is wrong");
			true
		})),
		"",
	)
	.unwrap();
	form.add_rule(rule, RunAt::SERVER);

	assert!(!form.validate(root));
	assert_eq!(form.error(e1), "child is wrong");
	assert_eq!(form.error(g1), "");
}

#[test]
fn test_client_only_rules_do_not_run_on_the_server() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let count = Rc::new(Cell::new(0));
	let rule = counting_rule(&form, element, false, &count);
	form.add_rule(rule, RunAt::CLIENT);

	assert!(form.validate(root));
	assert_eq!(count.get(), 0);
}

// ---- rendering -------------------------------------------------------------

#[derive(Default)]
struct RecordingRenderer {
	events: Vec<String>,
	builder: JavascriptBuilder,
}

impl Renderer for RecordingRenderer {
	fn start_form(&mut self, form: &Form) {
		self.events.push(format!("start-form:{}", form.id(form.root())));
	}

	fn finish_form(&mut self, _form: &Form) {
		self.events.push("finish-form".to_string());
	}

	fn start_group(&mut self, form: &Form, group: NodeId) {
		self.events.push(format!("start-group:{}", form.name(group)));
	}

	fn finish_group(&mut self, form: &Form, group: NodeId) {
		self.events.push(format!("finish-group:{}", form.name(group)));
	}

	fn render_element(&mut self, form: &Form, element: NodeId) {
		self.events
			.push(format!("element:{}", form.qualified_name(element)));
	}

	fn render_hidden(&mut self, form: &Form, element: NodeId) {
		self.events
			.push(format!("hidden:{}", form.qualified_name(element)));
	}

	fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
		Some(&mut self.builder)
	}
}

#[test]
fn test_render_walks_depth_first() {
	let mut form = Form::new("signup");
	let root = form.root();
	let g1 = group(&mut form, root, "g1");
	text(&mut form, g1, "inner");
	text(&mut form, root, "outer");
	form.append_kind(root, Box::new(formtree::Hidden::new()), "token")
		.unwrap();

	let mut renderer = RecordingRenderer::default();
	form.render(&mut renderer).unwrap();
	assert_eq!(
		renderer.events,
		vec![
			"start-form:signup",
			"start-group:g1",
			"element:g1[inner]",
			"finish-group:g1",
			"element:outer",
			"hidden:token",
			"finish-form",
		]
	);
}

#[test]
fn test_frozen_persistent_elements_render_hidden() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	form.toggle_frozen(element, Some(true));
	form.persistent_freeze(element, Some(true));

	let mut renderer = RecordingRenderer::default();
	form.render(&mut renderer).unwrap();
	assert!(renderer.events.contains(&"hidden:foo".to_string()));
}

#[test]
fn test_client_rules_are_collected_during_render() {
	let mut form = Form::new("login");
	let root = form.root();
	let element = text(&mut form, root, "username");
	let rule = Rule::new(&form, element, Box::new(Required::new()), "required!").unwrap();
	form.add_rule(rule, RunAt::SERVER | RunAt::ONBLUR_CLIENT);

	let mut renderer = RecordingRenderer::default();
	form.render(&mut renderer).unwrap();

	let validator = renderer.builder.validator(Some("login"), false);
	assert!(validator.starts_with("new qf.Validator(document.getElementById(\"login\")"));
	assert!(validator.contains("qf.rules.nonempty"));
	assert!(validator.contains("\"required!\""));
	// On-blur rules list their trigger element ids.
	assert!(validator.contains(&format!("triggers: [\"{}\"]", form.id(element))));
}

#[test]
fn test_rules_without_client_code_fail_rendering() {
	let mut form = Form::new("f");
	let root = form.root();
	let element = text(&mut form, root, "foo");
	let rule = Rule::new(
		&form,
		element,
		Box::new(Callback::new(|_, _| true)),
		"msg",
	)
	.unwrap();
	form.add_rule(rule, RunAt::CLIENT);

	let mut renderer = RecordingRenderer::default();
	assert!(matches!(form.render(&mut renderer), Err(FormError::Logic(_))));
}
