//! The form tree.
//!
//! A [`Form`] owns every node of one element tree in an arena and exposes
//! all structural operations through [`NodeId`] handles: building and moving
//! subtrees, name and id management, value resolution against prioritized
//! data sources, validation, and rendering.

use std::collections::HashMap;
use std::rc::Rc;

use crate::data_source::DataSource;
use crate::element::Element;
use crate::error::{FormError, FormResult};
use crate::factory::Factory;
use crate::id_pool::IdPool;
use crate::node::{NodeData, NodeId, RunAt};
use crate::render::Renderer;
use crate::rule::Rule;
use crate::value::{Key, Value, ValueMap, name_tokens};

/// The root element backing a [`Form`]. A plain transparent container: its
/// name never prefixes descendants.
struct FormRoot;

impl Element for FormRoot {
	fn element_type(&self) -> &'static str {
		"form"
	}

	fn is_container(&self) -> bool {
		true
	}

	fn set_value(&mut self, _value: Value) {}
}

/// An element tree with data binding, validation and rendering.
///
/// Nodes are created through [`create`](Form::create) (or the
/// [`Factory`]-driven [`add_element`](Form::add_element)) and wired into the
/// tree with [`append_child`](Form::append_child) /
/// [`insert_before`](Form::insert_before). Submitted names are computed from
/// the ancestor chain, so renaming or moving a container transparently
/// renames everything below it.
pub struct Form {
	nodes: Vec<NodeData>,
	root: NodeId,
	ids: IdPool,
}

impl Form {
	/// Creates an empty form whose root carries `id` as both its name and
	/// its document id.
	pub fn new(id: &str) -> Form {
		let mut ids = IdPool::new();
		ids.reserve(id);
		let root = NodeData::new(Box::new(FormRoot), id.to_string(), id.to_string());
		Form {
			nodes: vec![root],
			root: NodeId(0),
			ids,
		}
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	fn node(&self, id: NodeId) -> &NodeData {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
		&mut self.nodes[id.0]
	}

	// ---- construction ------------------------------------------------------

	/// Creates a detached node with an auto-generated id and returns its
	/// handle. The node joins the tree via [`append_child`](Form::append_child)
	/// or [`insert_before`](Form::insert_before).
	pub fn create(&mut self, kind: Box<dyn Element>, name: impl Into<String>) -> NodeId {
		let name = name.into();
		let id = self.ids.allocate(&name);
		tracing::debug!(%name, %id, "created element");
		self.nodes.push(NodeData::new(kind, name, id));
		NodeId(self.nodes.len() - 1)
	}

	/// Creates a node and appends it to `parent` in one step.
	pub fn append_kind(
		&mut self,
		parent: NodeId,
		kind: Box<dyn Element>,
		name: impl Into<String>,
	) -> FormResult<NodeId> {
		let child = self.create(kind, name);
		self.append_child(parent, child)?;
		Ok(child)
	}

	/// Creates an element of a registered type and appends it to `parent`.
	pub fn add_element(
		&mut self,
		factory: &Factory,
		parent: NodeId,
		type_name: &str,
		name: impl Into<String>,
	) -> FormResult<NodeId> {
		let kind = factory.create_element(type_name)?;
		self.append_kind(parent, kind, name)
	}

	// ---- tree structure ----------------------------------------------------

	/// Appends `child` as the last child of `parent`, detaching it from its
	/// previous parent first.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> FormResult<()> {
		self.insert_before(parent, child, None)
	}

	/// Inserts `child` into `parent` before `reference` (or at the end when
	/// `reference` is `None`).
	///
	/// Fails with `InvalidArgument` when `parent` is not a container or when
	/// the move would place an element inside itself or one of its own
	/// descendants, and with `NotFound` when `reference` is not a child of
	/// `parent`. Inserting an element already inside `parent` repositions it.
	pub fn insert_before(
		&mut self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
	) -> FormResult<()> {
		if !self.node(parent).kind.is_container() {
			return Err(FormError::invalid(format!(
				"'{}' elements cannot contain children",
				self.element_type(parent)
			)));
		}
		let mut ancestor = Some(parent);
		while let Some(current) = ancestor {
			if current == child {
				return Err(FormError::invalid(
					"cannot move an element inside itself or its own descendant",
				));
			}
			ancestor = self.node(current).parent;
		}

		let mut position = match reference {
			Some(reference) => self
				.node(parent)
				.children
				.iter()
				.position(|&c| c == reference)
				.ok_or_else(|| {
					FormError::not_found("the reference element was not found in this container")
				})?,
			None => self.node(parent).children.len(),
		};

		if let Some(old_parent) = self.node(child).parent
			&& let Some(index) = self
				.node(old_parent)
				.children
				.iter()
				.position(|&c| c == child)
		{
			self.node_mut(old_parent).children.remove(index);
			if old_parent == parent && index < position {
				position -= 1;
			}
		}

		self.node_mut(parent).children.insert(position, child);
		self.node_mut(child).parent = Some(parent);
		self.refresh_subtree(child);
		Ok(())
	}

	/// Detaches `child` from `parent` and returns its handle. The subtree
	/// stays alive and can be re-inserted elsewhere.
	pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> FormResult<NodeId> {
		let index = self
			.node(parent)
			.children
			.iter()
			.position(|&c| c == child)
			.ok_or_else(|| FormError::not_found("the element was not found in this container"))?;
		self.node_mut(parent).children.remove(index);
		self.node_mut(child).parent = None;
		Ok(child)
	}

	pub fn children(&self, parent: NodeId) -> &[NodeId] {
		&self.node(parent).children
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.node(id).parent
	}

	/// Pre-order walk of everything below `id`, excluding `id` itself.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
		while let Some(current) = stack.pop() {
			out.push(current);
			stack.extend(self.node(current).children.iter().rev());
		}
		out
	}

	/// Depth-first search for an element with the given document id.
	pub fn element_by_id(&self, from: NodeId, id: &str) -> Option<NodeId> {
		if self.node(from).id == id {
			return Some(from);
		}
		self.descendants(from)
			.into_iter()
			.find(|&node| self.node(node).id == id)
	}

	/// All elements below (and including) `from` whose qualified name equals
	/// `name`, in tree order.
	pub fn elements_by_name(&self, from: NodeId, name: &str) -> Vec<NodeId> {
		let mut matches = Vec::new();
		if self.qualified_name(from) == name {
			matches.push(from);
		}
		for node in self.descendants(from) {
			if self.qualified_name(node) == name {
				matches.push(node);
			}
		}
		matches
	}

	fn root_ancestor(&self, id: NodeId) -> NodeId {
		let mut current = id;
		while let Some(parent) = self.node(current).parent {
			current = parent;
		}
		current
	}

	// ---- names and ids -----------------------------------------------------

	/// The bare name, without ancestor prefixes.
	pub fn name(&self, id: NodeId) -> &str {
		&self.node(id).name
	}

	/// Renames the element. Descendants' qualified names follow automatically
	/// since they are computed from the ancestor chain; the subtree is
	/// re-resolved against the data sources under its new names.
	pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
		self.node_mut(id).name = name.into();
		self.refresh_subtree(id);
	}

	/// The effective submitted name: the bare name prefixed by the nearest
	/// named prepending ancestor, bracket tokens re-nested. An element named
	/// `city` inside a group named `address` submits as `address[city]`.
	pub fn qualified_name(&self, id: NodeId) -> String {
		let bare = &self.node(id).name;
		match self.name_prefix(id) {
			Some(prefix) => join_name(&prefix, bare),
			None => bare.clone(),
		}
	}

	fn name_prefix(&self, id: NodeId) -> Option<String> {
		let mut ancestor = self.node(id).parent;
		while let Some(current) = ancestor {
			if self.prepends(current) {
				return Some(self.qualified_name(current));
			}
			ancestor = self.node(current).parent;
		}
		None
	}

	/// Whether this container's name prefixes its descendants. Transparent
	/// containers and containers whose qualified name is empty do not.
	fn prepends(&self, id: NodeId) -> bool {
		self.node(id).kind.prepends_name() && !self.qualified_name(id).is_empty()
	}

	pub fn id(&self, id: NodeId) -> &str {
		&self.node(id).id
	}

	/// Sets the document id, or regenerates one from the name when `None`.
	/// Ids may not contain whitespace of any kind.
	pub fn set_id(&mut self, node: NodeId, id: Option<&str>) -> FormResult<()> {
		let id = match id {
			Some(id) => {
				if id.chars().any(char::is_whitespace) {
					return Err(FormError::invalid(format!(
						"whitespace is not allowed in an id: '{id}'"
					)));
				}
				self.ids.reserve(id);
				id.to_string()
			}
			None => {
				let name = self.node(node).name.clone();
				self.ids.allocate(&name)
			}
		};
		self.node_mut(node).id = id;
		Ok(())
	}

	// ---- attributes --------------------------------------------------------

	pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		let node = self.node(id);
		match name {
			"name" => Some(&node.name),
			"id" => Some(&node.id),
			_ => node.attributes.get(name).map(String::as_str),
		}
	}

	/// Sets an HTML attribute. `name` and `id` are routed through
	/// [`set_name`](Form::set_name) and [`set_id`](Form::set_id) so their
	/// side effects always apply.
	pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> FormResult<()> {
		match name {
			"name" => {
				self.set_name(id, value);
				Ok(())
			}
			"id" => self.set_id(id, Some(value)),
			_ => {
				self.node_mut(id)
					.attributes
					.insert(name.to_string(), value.to_string());
				Ok(())
			}
		}
	}

	/// Removes an HTML attribute. `name` and `id` are structural and cannot
	/// be removed.
	pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> FormResult<()> {
		if name == "name" || name == "id" {
			return Err(FormError::invalid(format!(
				"the '{name}' attribute cannot be removed"
			)));
		}
		self.node_mut(id).attributes.remove(name);
		Ok(())
	}

	// ---- element state -----------------------------------------------------

	pub fn element_type(&self, id: NodeId) -> &'static str {
		self.node(id).kind.element_type()
	}

	pub fn is_container(&self, id: NodeId) -> bool {
		self.node(id).kind.is_container()
	}

	pub fn can_validate(&self, id: NodeId) -> bool {
		self.node(id).kind.can_validate()
	}

	pub fn error(&self, id: NodeId) -> &str {
		&self.node(id).error
	}

	pub fn set_error(&mut self, id: NodeId, message: impl Into<String>) {
		self.node_mut(id).error = message.into();
	}

	pub fn is_frozen(&self, id: NodeId) -> bool {
		self.node(id).frozen
	}

	/// Gets or sets the frozen state. With `Some(state)` the whole subtree is
	/// frozen or thawed; the previous state of `id` itself is returned.
	pub fn toggle_frozen(&mut self, id: NodeId, state: Option<bool>) -> bool {
		let previous = self.node(id).frozen;
		if let Some(state) = state {
			self.node_mut(id).frozen = state;
			for node in self.descendants(id) {
				self.node_mut(node).frozen = state;
			}
		}
		previous
	}

	/// Gets or sets persistent freezing: a frozen persistent element still
	/// submits its value through a hidden input when rendered.
	pub fn persistent_freeze(&mut self, id: NodeId, state: Option<bool>) -> bool {
		let previous = self.node(id).persistent;
		if let Some(state) = state {
			self.node_mut(id).persistent = state;
			for node in self.descendants(id) {
				self.node_mut(node).persistent = state;
			}
		}
		previous
	}

	// ---- rules and filters -------------------------------------------------

	/// Attaches a rule to its owner node. The returned handle can be kept to
	/// inspect the rule later; ownership stays with the form.
	pub fn add_rule(&mut self, rule: Rule, run_at: RunAt) -> Rc<Rule> {
		let owner = rule.owner();
		let rule = Rc::new(rule);
		self.node_mut(owner).rules.push((Rc::clone(&rule), run_at));
		rule
	}

	/// Creates a rule of a registered type and attaches it in one step.
	pub fn add_rule_of(
		&mut self,
		factory: &Factory,
		type_name: &str,
		owner: NodeId,
		message: impl Into<String>,
		config: Option<serde_json::Value>,
		run_at: RunAt,
	) -> FormResult<Rc<Rule>> {
		let rule = factory.create_rule(self, type_name, owner, message, config)?;
		Ok(self.add_rule(rule, run_at))
	}

	/// Whether any attached rule chain is headed by a required-kind rule.
	pub fn is_required(&self, id: NodeId) -> bool {
		self.node(id).rules.iter().any(|(rule, _)| rule.is_required())
	}

	/// Attaches a filter applied to this element's value on retrieval.
	pub fn add_filter(&mut self, id: NodeId, filter: impl Fn(Value) -> Value + 'static) {
		self.node_mut(id).filters.push(Box::new(filter));
	}

	/// Attaches a filter applied to every scalar inside this subtree's value.
	pub fn add_recursive_filter(&mut self, id: NodeId, filter: impl Fn(Value) -> Value + 'static) {
		self.node_mut(id).recursive_filters.push(Box::new(filter));
	}

	// ---- data sources and values -------------------------------------------

	/// Adds a data source to this tree. Sources are consulted in the order
	/// they were added; the whole tree re-resolves its values immediately.
	pub fn add_data_source(&mut self, id: NodeId, source: impl DataSource + 'static) {
		let top = self.root_ancestor(id);
		self.node_mut(top).sources.push(Rc::new(source));
		self.refresh_subtree(top);
	}

	/// The prioritized data sources of the tree containing `id`.
	pub fn data_sources(&self, id: NodeId) -> Vec<Rc<dyn DataSource>> {
		self.node(self.root_ancestor(id)).sources.clone()
	}

	/// Re-resolves every leaf below `id` against the data sources. Called
	/// automatically after renames, moves, and source additions.
	fn refresh_subtree(&mut self, id: NodeId) {
		if self.node(id).kind.is_container() {
			for child in self.node(id).children.clone() {
				self.refresh_subtree(child);
			}
			return;
		}
		let name = self.qualified_name(id);
		let sources = self.data_sources(id);
		tracing::debug!(%name, sources = sources.len(), "resolving element value");
		self.node_mut(id).kind.update_value(&name, &sources);
	}

	/// The unfiltered value: the element's stored value, or for containers
	/// the aggregated mapping of child values keyed by submitted names.
	/// `None` when nothing below holds a value.
	pub fn raw_value(&self, id: NodeId) -> Option<Value> {
		if self.node(id).kind.is_container() {
			let values = self.child_values(id, false)?;
			self.unwrap_own_path(id, values)
		} else {
			self.node(id).kind.raw_value()
		}
	}

	/// The filtered value.
	///
	/// A leaf passes its raw value through the recursive filters of itself
	/// and its ancestors (applied to every scalar, nearest node first) and
	/// then its own plain filters. A container aggregates the already
	/// filtered child values and applies only its own plain filters on top:
	/// its recursive filters reached each scalar while the leaves climbed the
	/// ancestor chain, so every filter touches a scalar exactly once no
	/// matter which node the value is read from.
	pub fn value(&self, id: NodeId) -> Option<Value> {
		let filtered = if self.node(id).kind.is_container() {
			let values = self.child_values(id, true)?;
			self.unwrap_own_path(id, values)?
		} else {
			let raw = self.node(id).kind.raw_value()?;
			self.apply_recursive_filters(id, raw)
		};
		Some(
			self.node(id)
				.filters
				.iter()
				.fold(filtered, |value, f| f(value)),
		)
	}

	fn apply_recursive_filters(&self, id: NodeId, value: Value) -> Value {
		match value {
			Value::Map(map) => {
				let mut out = ValueMap::new();
				for (key, inner) in map.iter() {
					out.set(key.clone(), self.apply_recursive_filters(id, inner.clone()));
				}
				Value::Map(out)
			}
			scalar => {
				let mut current = scalar;
				let mut node = Some(id);
				while let Some(at) = node {
					for filter in &self.node(at).recursive_filters {
						current = filter(current);
					}
					node = self.node(at).parent;
				}
				current
			}
		}
	}

	/// Aggregates child values into a mapping keyed by submitted names.
	/// Transparent container children merge their mappings in directly;
	/// everything else lands at the path its qualified name spells out, a
	/// trailing `[]` appending at the next integer index.
	fn child_values(&self, id: NodeId, filtered: bool) -> Option<Value> {
		let mut values = ValueMap::new();
		let mut contributed = false;
		for &child in &self.node(id).children {
			let value = if filtered {
				self.value(child)
			} else {
				self.raw_value(child)
			};
			let Some(value) = value else {
				continue;
			};
			if self.node(child).kind.is_container() && !self.prepends(child) {
				if let Value::Map(map) = value {
					values.merge(map);
					contributed = true;
				}
				continue;
			}
			let name = self.qualified_name(child);
			if name.is_empty() {
				continue;
			}
			if !name.contains('[') {
				values.set(Key::from_token(&name), value);
			} else {
				let tokens = name_tokens(&name);
				let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
				values.set_path(&refs, value);
			}
			contributed = true;
		}
		contributed.then_some(Value::Map(values))
	}

	/// A prepending container's aggregate is keyed by its own full path;
	/// unwrap it so `value()` returns just the container's portion.
	fn unwrap_own_path(&self, id: NodeId, value: Value) -> Option<Value> {
		if !self.prepends(id) {
			return Some(value);
		}
		let tokens = name_tokens(&self.qualified_name(id));
		let mut current = value;
		for token in &tokens {
			match current {
				Value::Map(map) => current = map.get(&Key::from_token(token))?.clone(),
				_ => return None,
			}
		}
		Some(current)
	}

	/// Sets the element's value directly, bypassing data sources.
	///
	/// Containers accept a mapping and distribute it to their children by
	/// name: each child receives the entry its bare name addresses, children
	/// named with a trailing `[]` consume consecutive integer indexes, and
	/// transparent container children receive the whole mapping.
	pub fn set_value(&mut self, id: NodeId, value: Value) {
		if !self.node(id).kind.is_container() {
			self.node_mut(id).kind.set_value(value);
			return;
		}
		let Value::Map(map) = value else {
			tracing::debug!(
				element = self.element_type(id),
				"ignoring scalar value assigned to a container"
			);
			return;
		};
		let mut append_counters: HashMap<String, usize> = HashMap::new();
		for child in self.node(id).children.clone() {
			if self.node(child).kind.is_container() && !self.node(child).kind.prepends_name() {
				self.set_value(child, Value::Map(map.clone()));
				continue;
			}
			let bare = self.node(child).name.clone();
			let tokens = name_tokens(&bare);
			let mut current: Option<&Value> = None;
			for (depth, token) in tokens.iter().enumerate() {
				let key = if token.is_empty() {
					let counter = append_counters.entry(tokens[..depth].join("[")).or_insert(0);
					let key = Key::Index(*counter);
					*counter += 1;
					key
				} else {
					Key::from_token(token)
				};
				let level = match (depth, current) {
					(0, _) => Some(&map),
					(_, Some(Value::Map(inner))) => Some(inner),
					_ => None,
				};
				current = level.and_then(|m| m.get(&key));
				if current.is_none() {
					break;
				}
			}
			if let Some(value) = current.cloned() {
				self.set_value(child, value);
			}
		}
	}

	// ---- validation --------------------------------------------------------

	/// Runs the server-side rules of `id` and everything below it, children
	/// first. A container is valid only when its own rules pass and no
	/// descendant carries an error afterwards, including errors a container
	/// rule placed on a descendant.
	pub fn validate(&mut self, id: NodeId) -> bool {
		let mut valid = true;
		for child in self.node(id).children.clone() {
			valid = self.validate(child) && valid;
		}
		valid = self.run_own_rules(id) && valid;
		if valid && self.node(id).kind.is_container() {
			valid = self
				.descendants(id)
				.into_iter()
				.all(|node| self.node(node).error.is_empty());
		}
		valid
	}

	/// Rules run in attachment order and stop at the first failure that left
	/// an error message on this element.
	fn run_own_rules(&mut self, id: NodeId) -> bool {
		let rules = self.node(id).rules.clone();
		for (rule, run_at) in rules {
			if !self.node(id).error.is_empty() {
				break;
			}
			if run_at.contains(RunAt::SERVER) {
				rule.validate(self);
			}
		}
		let error = &self.node(id).error;
		if !error.is_empty() {
			tracing::debug!(element = self.element_type(id), %error, "validation failed");
		}
		error.is_empty()
	}

	// ---- rendering ---------------------------------------------------------

	/// Walks the tree depth-first, firing renderer hooks for every node and
	/// collecting client-side rules and element scripts into the renderer's
	/// [`JavascriptBuilder`](crate::JavascriptBuilder), if it has one.
	pub fn render(&self, renderer: &mut dyn Renderer) -> FormResult<()> {
		if let Some(builder) = renderer.javascript_builder() {
			builder.set_form_id(self.id(self.root));
		}
		renderer.start_form(self);
		for &child in &self.node(self.root).children {
			self.render_node(child, renderer)?;
		}
		self.emit_client_rules(self.root, renderer)?;
		renderer.finish_form(self);
		Ok(())
	}

	fn render_node(&self, id: NodeId, renderer: &mut dyn Renderer) -> FormResult<()> {
		let node = self.node(id);
		if node.kind.is_container() {
			let grouped = node.kind.element_type() == "group";
			if grouped {
				renderer.start_group(self, id);
			} else {
				renderer.start_container(self, id);
			}
			for &child in &node.children {
				self.render_node(child, renderer)?;
			}
			self.emit_client_rules(id, renderer)?;
			if grouped {
				renderer.finish_group(self, id);
			} else {
				renderer.finish_container(self, id);
			}
		} else {
			if node.kind.is_hidden() || (node.frozen && node.persistent) {
				renderer.render_hidden(self, id);
			} else {
				renderer.render_element(self, id);
			}
			self.emit_client_rules(id, renderer)?;
			if let Some(script) = node.kind.setup_javascript(&node.id)
				&& let Some(builder) = renderer.javascript_builder()
			{
				builder.add_element_javascript(script);
			}
		}
		Ok(())
	}

	fn emit_client_rules(&self, id: NodeId, renderer: &mut dyn Renderer) -> FormResult<()> {
		if renderer.javascript_builder().is_none() {
			return Ok(());
		}
		for (rule, run_at) in &self.node(id).rules {
			if !run_at.contains(RunAt::CLIENT) {
				continue;
			}
			let code = rule.javascript(self, run_at.contains(RunAt::ONBLUR_CLIENT))?;
			if let Some(builder) = renderer.javascript_builder() {
				builder.add_rule(code);
			}
		}
		Ok(())
	}

	/// The document ids whose change/blur events re-trigger a client rule on
	/// `id`: the element's own id, or for containers every leaf below.
	pub fn trigger_ids(&self, id: NodeId) -> Vec<String> {
		if !self.node(id).kind.is_container() {
			return vec![self.node(id).id.clone()];
		}
		self.descendants(id)
			.into_iter()
			.filter(|&node| !self.node(node).kind.is_container())
			.map(|node| self.node(node).id.clone())
			.collect()
	}
}

fn join_name(prefix: &str, bare: &str) -> String {
	let mut joined = String::from(prefix);
	for token in name_tokens(bare) {
		joined.push('[');
		joined.push_str(&token);
		joined.push(']');
	}
	joined
}
